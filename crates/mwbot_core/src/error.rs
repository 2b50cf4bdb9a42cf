//! Error taxonomy for the bot client.
//!
//! Every failure is returned to the caller as-is; nothing here is retried. Transport
//! failures keep the shape the HTTP layer produced so callers can inspect status codes
//! and bodies directly.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::tokens::TokenKind;

/// Failures raised by the HTTP capability.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network/protocol failure from reqwest (timeouts, TLS, I/O, redirects).
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server responded with HTTP {status}: {body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Response body captured for diagnostics.
        body: String,
    },
}

/// The crate's top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// `login` was called without username, password or API URL.
    #[error("missing login credentials: username, password and api_url are all required")]
    MissingCredentials,

    /// The first login step returned no challenge token.
    #[error("invalid login response from API: {response}")]
    InvalidLoginResponse { response: Value },

    /// The server refused the confirmation step.
    #[error("could not login: {reason}")]
    LoginRejected { reason: String },

    /// Site info query returned no `general` block.
    #[error("could not get siteinfo")]
    SiteInfoUnavailable,

    /// The `generator` string could not be coerced into a version.
    #[error("invalid MediaWiki version: {generator:?}")]
    UnsupportedServerVersion { generator: Option<String> },

    /// The token query response did not carry the requested token.
    #[error("could not get {kind} token")]
    TokenAcquisition { kind: TokenKind, response: Value },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not valid JSON.
    #[error("failed to decode MediaWiki API JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No endpoint was configured on either the options or the request defaults.
    #[error("no API URL configured")]
    MissingApiUrl,

    #[error("no title provided for upload")]
    MissingUploadTitle,

    #[error("failed to read {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The raw server payload attached to the error, when there is one.
    pub fn response(&self) -> Option<&Value> {
        match self {
            Error::InvalidLoginResponse { response } | Error::TokenAcquisition { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::Http(err))
    }
}

/// A specialized `Result` type for bot operations.
pub type Result<T> = std::result::Result<T, Error>;
