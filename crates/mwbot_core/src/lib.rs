//! MediaWiki API client for bots.
//!
//! [`MwBot`] owns the session: options, request defaults, cookies (through its
//! transport), cached tokens, detected server version and call counters. Actions fetch
//! the CSRF token they need before issuing their own request.
//!
//! ```no_run
//! use mwbot_core::{BotOptions, MwBot, RequestOptions};
//!
//! let bot = MwBot::new(
//!     BotOptions::default().with_api_url("https://en.wikipedia.org/w/api.php"),
//!     RequestOptions::default(),
//! )?;
//! bot.login_then_edit_token(BotOptions::credentials("ExampleBot", "bot-password"))?;
//! bot.edit("User:ExampleBot/sandbox", "Hello World!", Some("test edit"), None)?;
//! # Ok::<_, mwbot_core::Error>(())
//! ```

mod actions;
mod bot;
pub mod config;
mod counter;
mod error;
pub mod form;
mod login;
pub mod merge;
mod pipeline;
pub mod request;
pub mod response;
mod state;
mod tokens;
pub mod transport;
mod version;

#[cfg(test)]
mod test_support;

pub use actions::UploadSource;
pub use bot::MwBot;
pub use config::{BotOptions, load_options};
pub use counter::CounterSnapshot;
pub use error::{Error, Result, TransportError};
pub use form::{Form, FormValue, MwForm};
pub use request::{Method, PreparedRequest, RequestOptions};
pub use response::{ApiError, api_error};
pub use state::{LoginState, SessionState};
pub use tokens::TokenKind;
pub use transport::{HttpTransport, ReqwestTransport};
pub use version::{MwVersion, SLOT_REVISIONS_SINCE};
