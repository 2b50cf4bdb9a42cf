use std::collections::BTreeMap;
use std::time::Duration;

use crate::form::Form;
use crate::merge::Merge;

pub const DEFAULT_USER_AGENT: &str = concat!("mwbot/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
}

/// Shape of an outgoing call. Instance defaults and per-call overrides use the same
/// type; unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub url: Option<String>,
    /// Replaced wholesale on merge.
    pub headers: Option<BTreeMap<String, String>>,
    /// Default form fields. Replaced wholesale on merge; action params are folded in later.
    pub form: Option<Form>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn defaults() -> Self {
        Self {
            method: Some(Method::Post),
            url: None,
            headers: Some(BTreeMap::from([(
                "User-Agent".to_string(),
                DEFAULT_USER_AGENT.to_string(),
            )])),
            form: Some(Form::new().with("format", "json")),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }
}

impl Merge for RequestOptions {
    fn merge(self, other: Self) -> Self {
        Self {
            method: other.method.or(self.method),
            url: other.url.or(self.url),
            headers: other.headers.or(self.headers),
            form: other.form.or(self.form),
            timeout: other.timeout.or(self.timeout),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    UrlEncoded,
    /// Every form field becomes one part, files included.
    Multipart,
}

/// Fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub form: Form,
    pub encoding: BodyEncoding,
    pub timeout: Option<Duration>,
}

impl PreparedRequest {
    pub fn action(&self) -> Option<&str> {
        self.form.text("action")
    }
}
