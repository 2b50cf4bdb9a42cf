//! Typed views over the handful of API payloads the session lifecycle depends on.
//!
//! Each view either finds the field it needs or names the one that was missing; callers
//! map the missing case onto a specific [`crate::Error`].

use serde_json::{Map, Value};

/// Outcome of looking up an expected response field.
#[derive(Debug, Clone, PartialEq)]
pub enum Extract<T> {
    Found(T),
    Missing(&'static str),
}

impl<T> Extract<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Extract::Found(value) => Some(value),
            Extract::Missing(_) => None,
        }
    }
}

/// The `login` block of a login response. Each field is read on its own, so a field of
/// an unexpected shape (an object `reason` under `errorformat=plaintext`) only loses itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct LoginResponse {
    present: bool,
    result: Option<String>,
    token: Option<String>,
    reason: Option<String>,
}

impl LoginResponse {
    pub(crate) fn parse(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get("login")
                .and_then(|login| login.get(name))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        Self {
            present: login_object(value).is_some(),
            result: field("result"),
            token: field("token"),
            reason: field("reason"),
        }
    }

    pub(crate) fn challenge_token(&self) -> Extract<String> {
        match (self.present, &self.token) {
            (false, _) => Extract::Missing("login"),
            (true, Some(token)) => Extract::Found(token.clone()),
            (true, None) => Extract::Missing("login.token"),
        }
    }

    pub(crate) fn is_success(&self) -> bool {
        self.result.as_deref() == Some("Success")
    }

    /// Server-reported reason for a refused login.
    pub(crate) fn rejection_reason(&self) -> String {
        self.reason
            .clone()
            .or_else(|| self.result.clone())
            .unwrap_or_else(|| "Unknown reason".to_string())
    }
}

/// `login` sub-object of a login response, for merging into session state.
pub(crate) fn login_object(value: &Value) -> Option<&Value> {
    value.get("login").filter(|login| login.is_object())
}

/// `query.general` of a site-info response.
pub(crate) fn site_info_general(value: &Value) -> Extract<&Value> {
    match value.get("query") {
        None => Extract::Missing("query"),
        Some(query) => match query.get("general").filter(|general| general.is_object()) {
            Some(general) => Extract::Found(general),
            None => Extract::Missing("query.general"),
        },
    }
}

/// `query.tokens` of a token response together with the requested token.
pub(crate) fn token_field(value: &Value, field: &'static str) -> Extract<(Value, String)> {
    let Some(tokens) = value.get("query").and_then(|query| query.get("tokens")) else {
        return Extract::Missing("query.tokens");
    };
    match tokens.get(field).and_then(Value::as_str) {
        Some(token) => Extract::Found((tokens.clone(), token.to_string())),
        None => Extract::Missing(field),
    }
}

/// MediaWiki error block of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub info: String,
}

impl ApiError {
    /// True for a stale or foreign CSRF token.
    pub fn is_bad_token(&self) -> bool {
        self.code == "badtoken"
    }
}

/// Extract `{error: {code, info}}` from a response, if present.
pub fn api_error(value: &Value) -> Option<ApiError> {
    let error: &Map<String, Value> = value.get("error")?.as_object()?;
    Some(ApiError {
        code: error
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string(),
        info: error
            .get("info")
            .and_then(Value::as_str)
            .unwrap_or("unknown info")
            .to_string(),
    })
}
