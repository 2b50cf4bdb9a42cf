//! Two-step bot login followed by site-info version detection.

use crate::bot::{MwBot, lock};
use crate::config::{BotOptions, derive_wiki_url};
use crate::error::{Error, Result};
use crate::form::MwForm;
use crate::response::{Extract, LoginResponse, login_object, site_info_general};
use crate::state::{LoginState, SessionState};
use crate::version::MwVersion;

impl MwBot {
    /// Log in with `credentials` merged over the current options.
    ///
    /// Runs `Unauthenticated -> AwaitingChallenge -> AwaitingConfirmation -> Authenticated`,
    /// then fetches site info and detects the server version. Any failure leaves the
    /// machine in [`LoginState::Failed`].
    pub fn login(&self, credentials: BotOptions) -> Result<SessionState> {
        self.set_options(credentials);
        let outcome = self.run_login();
        if outcome.is_err() {
            lock(&self.session).login = LoginState::Failed;
        }
        outcome
    }

    /// Log in, then fetch a fresh CSRF token.
    pub fn login_then_edit_token(&self, credentials: BotOptions) -> Result<String> {
        self.login(credentials)?;
        self.refresh_edit_token()
    }

    /// Log in, then fetch a fresh account creation token.
    pub fn login_then_account_creation_token(&self, credentials: BotOptions) -> Result<String> {
        self.login(credentials)?;
        self.refresh_account_creation_token()
    }

    /// Fetch `siprop=general` and merge it into the session state.
    pub fn get_site_info(&self) -> Result<SessionState> {
        let response = self.request_json(
            MwForm::new("query")
                .with("meta", "siteinfo")
                .with("siprop", "general"),
            None,
        )?;
        match site_info_general(&response) {
            Extract::Found(general) => {
                self.merge_into_state(general);
                Ok(self.state())
            }
            Extract::Missing(field) => {
                self.log(&format!("Could not get siteinfo (missing {field})"));
                Err(Error::SiteInfoUnavailable)
            }
        }
    }

    fn run_login(&self) -> Result<SessionState> {
        // A new attempt drops the previous session, including when it fails up front.
        {
            let mut session = lock(&self.session);
            session.logged_in = false;
            session.version = None;
            session.login = LoginState::AwaitingChallenge;
        }

        let options = self.options();
        let non_blank = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
        let (Some(username), Some(password), Some(api_url)) = (
            non_blank(options.username),
            non_blank(options.password),
            non_blank(options.api_url),
        ) else {
            self.log("Missing login credentials");
            return Err(Error::MissingCredentials);
        };
        let login_string = format!(
            "{username}@{}",
            derive_wiki_url(&api_url).unwrap_or(api_url)
        );

        let form = MwForm::new("login")
            .with("lgname", username)
            .with("lgpassword", password);
        let challenge = self.request_json(form.clone(), None)?;
        let token = match LoginResponse::parse(&challenge).challenge_token() {
            Extract::Found(token) => token,
            Extract::Missing(field) => {
                self.log(&format!(
                    "Login failed with invalid response (missing {field}): {login_string}"
                ));
                return Err(Error::InvalidLoginResponse {
                    response: challenge,
                });
            }
        };
        if let Some(login) = login_object(&challenge) {
            self.merge_into_state(login);
        }
        lock(&self.session).login = LoginState::AwaitingConfirmation;

        let confirmation = self.request_json(form.with("lgtoken", token), None)?;
        let parsed = LoginResponse::parse(&confirmation);
        if !parsed.is_success() {
            self.log(&format!("Login failed: {login_string}"));
            return Err(Error::LoginRejected {
                reason: parsed.rejection_reason(),
            });
        }
        {
            let mut session = lock(&self.session);
            if let Some(login) = login_object(&confirmation) {
                session.state.merge_in(login);
            }
            session.logged_in = true;
            session.login = LoginState::Authenticated;
        }

        let state = self.get_site_info()?;
        let generator = state.generator().map(ToString::to_string);
        let Some(version) = generator.as_deref().and_then(MwVersion::coerce) else {
            self.log(&format!("Invalid MediaWiki version: {generator:?}"));
            return Err(Error::UnsupportedServerVersion { generator });
        };
        lock(&self.session).version = Some(version);
        self.log(&format!("Logged in as {login_string} (MediaWiki {version})"));
        Ok(state)
    }
}
