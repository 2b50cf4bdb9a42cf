use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::bot::{MwBot, lock, read};
use crate::error::{Error, Result};
use crate::form::{Form, FormValue, MwForm};
use crate::request::{BodyEncoding, Method, RequestOptions};

/// File content for [`MwBot::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Read in full before the request is built.
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl MwBot {
    /// Edit a page, creating it if needed.
    pub fn edit(
        &self,
        title: &str,
        content: &str,
        summary: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = self.edit_form(summary).with("title", title).with("text", content);
        self.request_with_token(form, overrides)
    }

    /// Create a page; the server refuses if it already exists.
    pub fn create(
        &self,
        title: &str,
        content: &str,
        summary: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = self
            .edit_form(summary)
            .with("title", title)
            .with("text", content)
            .with("createonly", true);
        self.request_with_token(form, overrides)
    }

    /// Update an existing page; the server refuses if it is missing.
    pub fn update(
        &self,
        title: &str,
        content: &str,
        summary: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = self
            .edit_form(summary)
            .with("title", title)
            .with("text", content)
            .with("nocreate", true);
        self.request_with_token(form, overrides)
    }

    pub fn update_from_id(
        &self,
        page_id: u64,
        content: &str,
        summary: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = self
            .edit_form(summary)
            .with("pageid", page_id)
            .with("text", content)
            .with("nocreate", true);
        self.request_with_token(form, overrides)
    }

    pub fn delete(
        &self,
        title: &str,
        reason: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = MwForm::new("delete")
            .with("title", title)
            .with("reason", self.summary_or_default(reason))
            .with("bot", true);
        self.request_with_token(form, overrides)
    }

    pub fn move_page(
        &self,
        old_title: &str,
        new_title: &str,
        reason: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = MwForm::new("move")
            .with("from", old_title)
            .with("to", new_title)
            .with("reason", self.summary_or_default(reason))
            .with("bot", true);
        self.request_with_token(form, overrides)
    }

    /// Protect a page against edits by anyone but sysops, indefinitely.
    pub fn protect(
        &self,
        title: &str,
        reason: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = MwForm::new("protect")
            .with("title", title)
            .with("protections", "edit=sysop")
            .with("expiry", "infinite")
            .with("reason", self.summary_or_default(reason));
        self.request_with_token(form, overrides)
    }

    /// Current content of `title`.
    pub fn read(
        &self,
        title: &str,
        redirect: bool,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        self.read_with_props(title, "content", redirect, overrides)
    }

    /// Latest revision of `title` with the given `rvprop` list.
    pub fn read_with_props(
        &self,
        title: &str,
        props: &str,
        redirect: bool,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = self.revisions_form(props, redirect).with("titles", title);
        self.request_json(form, overrides)
    }

    pub fn read_from_id(
        &self,
        page_id: u64,
        redirect: bool,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        self.read_with_props_from_id(page_id, "content", redirect, overrides)
    }

    pub fn read_with_props_from_id(
        &self,
        page_id: u64,
        props: &str,
        redirect: bool,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let form = self.revisions_form(props, redirect).with("pageids", page_id);
        self.request_json(form, overrides)
    }

    /// Upload a file as multipart form data.
    ///
    /// With [`UploadSource::Path`] and no title, the remote title is the file's base name.
    /// `extra` fields are merged over the built upload form.
    pub fn upload(
        &self,
        title: Option<&str>,
        file: UploadSource,
        comment: &str,
        extra: Option<Form>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let title = title
            .filter(|title| !title.is_empty())
            .map(ToString::to_string);
        let (title, bytes) = match file {
            UploadSource::Path(path) => {
                let title = title.or_else(|| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                });
                let bytes = fs::read(&path).map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
                (title, bytes)
            }
            UploadSource::Bytes(bytes) => (title, bytes),
        };
        let Some(title) = title else {
            self.log("No title provided for upload");
            return Err(Error::MissingUploadTitle);
        };

        let token = self.get_edit_token()?;
        let form = MwForm::new("upload")
            .with("filename", title.clone())
            .with("comment", comment)
            .with(
                "file",
                FormValue::File {
                    file_name: title,
                    bytes,
                },
            )
            .with("token", token)
            .extend(extra.unwrap_or_default());

        let mut request = self.prepare(form, overrides)?;
        request.method = Method::Post;
        request.encoding = BodyEncoding::Multipart;
        self.dispatch_json(&request)
    }

    /// [`MwBot::upload`] with `ignorewarnings` forced on, replacing any existing file.
    pub fn upload_overwrite(
        &self,
        title: Option<&str>,
        file: UploadSource,
        comment: &str,
        extra: Option<Form>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let extra = extra.unwrap_or_default().with("ignorewarnings", true);
        self.upload(title, file, comment, Some(extra), overrides)
    }

    /// Semantic MediaWiki `action=ask` query against `api_url`, or the configured endpoint.
    pub fn ask_query(
        &self,
        query: &str,
        api_url: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let mut overrides = overrides.cloned().unwrap_or_default();
        if let Some(api_url) = api_url {
            overrides.url = Some(api_url.to_string());
        }
        self.request_json(MwForm::new("ask").with("query", query), Some(&overrides))
    }

    /// SPARQL query against `endpoint`, or the configured SPARQL endpoint.
    pub fn sparql_query(
        &self,
        query: &str,
        endpoint: Option<&str>,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let mut overrides = overrides.cloned().unwrap_or_default();
        match endpoint {
            Some(endpoint) => overrides.url = Some(endpoint.to_string()),
            None if overrides.url.is_none() => {
                overrides.url = Some(read(&self.options).sparql_endpoint().to_string());
            }
            None => {}
        }
        let form = Form::new().with("query", query).with("format", "json");
        self.request_json(form, Some(&overrides))
    }

    fn edit_form(&self, summary: Option<&str>) -> MwForm {
        MwForm::new("edit")
            .with("summary", self.summary_or_default(summary))
            .with("bot", true)
    }

    fn revisions_form(&self, props: &str, redirect: bool) -> MwForm {
        let mut form = MwForm::new("query")
            .with("prop", "revisions")
            .with("rvprop", props);
        let slots = lock(&self.session)
            .version
            .is_some_and(|version| version.supports_slot_revisions());
        if slots {
            form.insert("rvslots", "main");
        }
        if redirect {
            form.insert("redirects", "true");
        }
        form
    }

    /// Fetch the edit token first, then issue the action with it.
    fn request_with_token(
        &self,
        form: MwForm,
        overrides: Option<&RequestOptions>,
    ) -> Result<Value> {
        let token = self.get_edit_token()?;
        self.request_json(form.with("token", token), overrides)
    }

    fn summary_or_default(&self, summary: Option<&str>) -> String {
        match summary {
            Some(summary) => summary.to_string(),
            None => read(&self.options).summary().to_string(),
        }
    }
}
