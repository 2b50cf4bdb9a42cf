use serde_json::Value;

use crate::bot::{MwBot, read};
use crate::error::{Error, Result};
use crate::form::Form;
use crate::merge::Merge;
use crate::request::{BodyEncoding, PreparedRequest, RequestOptions};

impl MwBot {
    /// Resolve defaults, per-call overrides and action params into one request.
    ///
    /// Action params win over same-named default form fields. `format=json` is sent
    /// unless a form layer sets `format` itself, so replacing the default form keeps it.
    /// The endpoint falls back to the configured `api_url` when the request defaults
    /// don't set one.
    pub fn prepare(
        &self,
        params: impl Into<Form>,
        overrides: Option<&RequestOptions>,
    ) -> Result<PreparedRequest> {
        let defaults = read(&self.request_options).clone();
        let merged = match overrides {
            Some(overrides) => defaults.merge(overrides.clone()),
            None => defaults,
        };
        let url = match merged.url {
            Some(url) => url,
            None => read(&self.options)
                .api_url
                .clone()
                .ok_or(Error::MissingApiUrl)?,
        };

        Ok(PreparedRequest {
            method: merged.method.unwrap_or_default(),
            url,
            headers: merged.headers.unwrap_or_default(),
            form: Form::new()
                .with("format", "json")
                .merge_all([merged.form.unwrap_or_default(), params.into()]),
            encoding: BodyEncoding::UrlEncoded,
            timeout: merged.timeout,
        })
    }

    pub fn request(
        &self,
        params: impl Into<Form>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        self.request_json(params, overrides)
    }

    pub fn request_json(
        &self,
        params: impl Into<Form>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let request = self.prepare(params, overrides)?;
        self.dispatch_json(&request)
    }

    pub fn request_text(
        &self,
        params: impl Into<Form>,
        overrides: Option<&RequestOptions>,
    ) -> Result<String> {
        let request = self.prepare(params, overrides)?;
        self.dispatch_text(&request)
    }

    pub fn dispatch_json(&self, request: &PreparedRequest) -> Result<Value> {
        self.dispatch(request, |body| Ok(serde_json::from_str(&body)?))
    }

    pub fn dispatch_text(&self, request: &PreparedRequest) -> Result<String> {
        self.dispatch(request, Ok)
    }

    /// Issue one call, settling the counters exactly once whatever the outcome.
    fn dispatch<T>(
        &self,
        request: &PreparedRequest,
        decode: impl FnOnce(String) -> Result<T>,
    ) -> Result<T> {
        self.counter.begin();
        tracing::debug!(
            action = request.action().unwrap_or("-"),
            url = %request.url,
            "dispatching MediaWiki API request"
        );
        let outcome = self
            .transport
            .execute(request)
            .map_err(Error::from)
            .and_then(decode);
        if let Err(error) = &outcome {
            self.log(&format!(
                "Request {} failed: {error}",
                request.action().unwrap_or("-")
            ));
        }
        self.counter.settle(outcome)
    }
}
