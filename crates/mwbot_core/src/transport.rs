//! HTTP capability used by the request pipeline.

use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::blocking::multipart;
use reqwest::cookie::Jar;

use crate::error::TransportError;
use crate::form::FormValue;
use crate::request::{BodyEncoding, Method, PreparedRequest};

/// Issues one request and returns the raw response body.
///
/// Implementations keep whatever session state they need (cookies) across calls.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: &PreparedRequest) -> Result<String, TransportError>;
}

/// Blocking reqwest client with a persistent in-memory cookie jar.
pub struct ReqwestTransport {
    client: Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder().cookie_provider(Arc::clone(&jar)).build()?;
        Ok(Self { client, jar })
    }

    /// The cookie store shared by every call made through this transport.
    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &PreparedRequest) -> Result<String, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match (request.encoding, request.method) {
            (BodyEncoding::Multipart, _) => builder.multipart(multipart_body(request)),
            (BodyEncoding::UrlEncoded, Method::Get) => builder.query(&request.form.to_pairs()),
            (BodyEncoding::UrlEncoded, Method::Post) => builder.form(&request.form.to_pairs()),
        };

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn multipart_body(request: &PreparedRequest) -> multipart::Form {
    request
        .form
        .iter()
        .fold(multipart::Form::new(), |form, (name, value)| match value {
            FormValue::File { file_name, bytes } => form.part(
                name.clone(),
                multipart::Part::bytes(bytes.clone()).file_name(file_name.clone()),
            ),
            other => match other.as_text() {
                Some(text) => form.text(name.clone(), text),
                None => form,
            },
        })
}
