use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::config::BotOptions;
use crate::counter::{CallCounter, CounterSnapshot};
use crate::error::Result;
use crate::merge::Merge;
use crate::request::RequestOptions;
use crate::state::{LoginState, SessionState};
use crate::tokens::TokenCache;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::version::MwVersion;

#[derive(Debug, Default)]
pub(crate) struct Session {
    pub(crate) state: SessionState,
    pub(crate) login: LoginState,
    pub(crate) logged_in: bool,
    pub(crate) version: Option<MwVersion>,
}

/// Client for one MediaWiki API endpoint.
///
/// All methods take `&self`; the client is `Send + Sync` and can be shared across
/// threads. It never runs work of its own in the background.
pub struct MwBot {
    pub(crate) options: RwLock<BotOptions>,
    pub(crate) request_options: RwLock<RequestOptions>,
    pub(crate) session: Mutex<Session>,
    pub(crate) tokens: Mutex<TokenCache>,
    pub(crate) counter: CallCounter,
    pub(crate) transport: Arc<dyn HttpTransport>,
}

impl MwBot {
    /// Client over a reqwest transport with its own cookie jar.
    pub fn new(options: BotOptions, request_options: RequestOptions) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(
            options,
            request_options,
            Arc::new(transport),
        ))
    }

    pub fn with_transport(
        options: BotOptions,
        request_options: RequestOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            options: RwLock::new(BotOptions::defaults().merge(options)),
            request_options: RwLock::new(RequestOptions::defaults().merge(request_options)),
            session: Mutex::new(Session::default()),
            tokens: Mutex::new(TokenCache::default()),
            counter: CallCounter::default(),
            transport,
        }
    }

    /// Merge `options` over the current bot options.
    pub fn set_options(&self, options: BotOptions) {
        let mut current = write(&self.options);
        *current = current.clone().merge(options);
    }

    /// Merge `request_options` over the current request defaults.
    pub fn set_request_options(&self, request_options: RequestOptions) {
        let mut current = write(&self.request_options);
        *current = current.clone().merge(request_options);
    }

    pub fn set_api_url(&self, api_url: impl Into<String>) {
        write(&self.options).api_url = Some(api_url.into());
    }

    pub fn options(&self) -> BotOptions {
        read(&self.options).clone()
    }

    pub fn request_options(&self) -> RequestOptions {
        read(&self.request_options).clone()
    }

    pub fn state(&self) -> SessionState {
        lock(&self.session).state.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        lock(&self.session).logged_in
    }

    pub fn login_state(&self) -> LoginState {
        lock(&self.session).login
    }

    /// Server version detected at login; `None` before a complete login.
    pub fn mw_version(&self) -> Option<MwVersion> {
        lock(&self.session).version
    }

    pub fn counter(&self) -> CounterSnapshot {
        self.counter.snapshot()
    }

    /// Version of this library.
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub(crate) fn merge_into_state(&self, partial: &Value) {
        lock(&self.session).state.merge_in(partial);
    }

    pub(crate) fn log(&self, message: &str) {
        if read(&self.options).is_verbose() {
            tracing::info!(target: "mwbot", "{message}");
        }
    }
}

impl fmt::Debug for MwBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MwBot")
            .field("api_url", &read(&self.options).api_url)
            .field("login_state", &self.login_state())
            .field("counter", &self.counter())
            .finish_non_exhaustive()
    }
}

// Every update under these guards is a single assignment, so poison is ignored.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockTransport, TEST_API_URL};

    #[test]
    fn construction_merges_over_builtin_defaults() {
        let mock = MockTransport::new();
        let bot = MwBot::with_transport(
            BotOptions::default().with_api_url(TEST_API_URL),
            RequestOptions::default(),
            mock,
        );
        let options = bot.options();
        assert_eq!(options.api_url.as_deref(), Some(TEST_API_URL));
        assert_eq!(options.summary(), "MWBot");
        assert_eq!(bot.request_options(), RequestOptions::defaults());
        assert_eq!(bot.login_state(), LoginState::Unauthenticated);
        assert!(!bot.is_logged_in());
        assert!(bot.mw_version().is_none());
        assert!(bot.state().is_empty());
        assert_eq!(bot.counter(), CounterSnapshot::default());
    }

    #[test]
    fn setters_amend_in_place() {
        let bot = MwBot::with_transport(
            BotOptions::default(),
            RequestOptions::default(),
            MockTransport::new(),
        );
        bot.set_options(BotOptions {
            default_summary: Some("tidy".to_string()),
            ..BotOptions::default()
        });
        bot.set_api_url("https://other.example/api.php");
        bot.set_request_options(RequestOptions::default().with_url("https://override/api.php"));

        let options = bot.options();
        assert_eq!(options.summary(), "tidy");
        assert_eq!(
            options.api_url.as_deref(),
            Some("https://other.example/api.php")
        );
        assert_eq!(
            bot.request_options().url.as_deref(),
            Some("https://override/api.php")
        );
        assert!(bot.request_options().headers.is_some());
    }

    #[test]
    fn version_is_the_crate_version() {
        let bot = MwBot::with_transport(
            BotOptions::default(),
            RequestOptions::default(),
            MockTransport::new(),
        );
        assert_eq!(bot.version(), env!("CARGO_PKG_VERSION"));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            lock(&self.0).extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&lock(&self.0)).into_owned()
        }
    }

    fn login_without_password(verbose: bool) -> (crate::Error, String) {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        let mock = MockTransport::new();
        let bot = MwBot::with_transport(
            BotOptions {
                verbose: Some(verbose),
                ..BotOptions::default().with_api_url(TEST_API_URL)
            },
            RequestOptions::default(),
            mock,
        );
        let error = tracing::subscriber::with_default(subscriber, || {
            bot.login(BotOptions::credentials("ExampleBot", ""))
                .expect_err("login without password must fail")
        });
        (error, captured.text())
    }

    #[test]
    fn verbose_failures_are_logged_then_returned() {
        let (error, output) = login_without_password(true);
        assert!(matches!(error, crate::Error::MissingCredentials));
        assert!(output.contains("Missing login credentials"), "log was: {output}");
        assert!(output.contains("mwbot"));
    }

    #[test]
    fn quiet_bot_returns_the_same_error_without_logging() {
        let (error, output) = login_without_password(false);
        assert!(matches!(error, crate::Error::MissingCredentials));
        assert!(!output.contains("Missing login credentials"), "log was: {output}");
    }

    #[test]
    fn bot_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MwBot>();
    }
}
