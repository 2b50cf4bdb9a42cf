use std::fmt;

use serde::Serialize;

use crate::bot::{MwBot, lock};
use crate::error::{Error, Result};
use crate::form::MwForm;
use crate::response::{Extract, token_field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// CSRF token used by every state-changing action.
    Csrf,
    CreateAccount,
}

impl TokenKind {
    /// Value of the `type` parameter of a `meta=tokens` query.
    pub fn query_type(self) -> &'static str {
        match self {
            TokenKind::Csrf => "csrf",
            TokenKind::CreateAccount => "createaccount",
        }
    }

    /// Field under `query.tokens` carrying the token.
    pub fn response_field(self) -> &'static str {
        match self {
            TokenKind::Csrf => "csrftoken",
            TokenKind::CreateAccount => "createaccounttoken",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Csrf => "edit",
            TokenKind::CreateAccount => "account creation",
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TokenCache {
    edit: Option<String>,
    create_account: Option<String>,
}

impl TokenCache {
    fn slot(&mut self, kind: TokenKind) -> &mut Option<String> {
        match kind {
            TokenKind::Csrf => &mut self.edit,
            TokenKind::CreateAccount => &mut self.create_account,
        }
    }

    pub(crate) fn get(&self, kind: TokenKind) -> Option<&String> {
        match kind {
            TokenKind::Csrf => self.edit.as_ref(),
            TokenKind::CreateAccount => self.create_account.as_ref(),
        }
    }

    pub(crate) fn store(&mut self, kind: TokenKind, token: String) {
        *self.slot(kind) = Some(token);
    }
}

impl MwBot {
    /// Cached token of `kind`, fetching it on first use.
    pub fn get_token(&self, kind: TokenKind) -> Result<String> {
        let cached = lock(&self.tokens).get(kind).cloned();
        match cached {
            Some(token) => Ok(token),
            None => self.refresh_token(kind),
        }
    }

    /// Always asks the server for a new token and overwrites the cache.
    pub fn refresh_token(&self, kind: TokenKind) -> Result<String> {
        let form = MwForm::new("query")
            .with("meta", "tokens")
            .with("type", kind.query_type());
        let response = self.request_json(form, None)?;
        match token_field(&response, kind.response_field()) {
            Extract::Found((tokens, token)) => {
                self.merge_into_state(&tokens);
                lock(&self.tokens).store(kind, token.clone());
                Ok(token)
            }
            Extract::Missing(field) => {
                self.log(&format!("Could not get {kind} token (missing {field})"));
                Err(Error::TokenAcquisition { kind, response })
            }
        }
    }

    pub fn get_edit_token(&self) -> Result<String> {
        self.get_token(TokenKind::Csrf)
    }

    pub fn refresh_edit_token(&self) -> Result<String> {
        self.refresh_token(TokenKind::Csrf)
    }

    pub fn get_account_creation_token(&self) -> Result<String> {
        self.get_token(TokenKind::CreateAccount)
    }

    pub fn refresh_account_creation_token(&self) -> Result<String> {
        self.refresh_token(TokenKind::CreateAccount)
    }

    /// Token currently held in the cache, without touching the network.
    pub fn cached_token(&self, kind: TokenKind) -> Option<String> {
        lock(&self.tokens).get(kind).cloned()
    }
}
