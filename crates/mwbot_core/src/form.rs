use std::collections::BTreeMap;

use crate::merge::Merge;

/// One value of an API form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// MediaWiki treats a present parameter as true; `false` is dropped on encode.
    Flag(bool),
    /// Binary payload, only meaningful in multipart bodies.
    File { file_name: String, bytes: Vec<u8> },
}

impl FormValue {
    /// Text rendering used for url-encoded bodies. Files and unset flags have none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FormValue::Text(text) => Some(text.clone()),
            FormValue::Flag(true) => Some("1".to_string()),
            FormValue::Flag(false) | FormValue::File { .. } => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<&String> for FormValue {
    fn from(value: &String) -> Self {
        FormValue::Text(value.clone())
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Flag(value)
    }
}

impl From<u64> for FormValue {
    fn from(value: u64) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Text(value.to_string())
    }
}

/// Flat key/value body of an API call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form(BTreeMap<String, FormValue>);

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.0.get(key)
    }

    /// Text value of `key`, if it is a text field.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(FormValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormValue)> {
        self.0.iter()
    }

    /// Url-encodable pairs; files and unset flags are skipped.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| value.as_text().map(|text| (key.clone(), text)))
            .collect()
    }
}

impl Merge for Form {
    fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl<K, V> FromIterator<(K, V)> for Form
where
    K: Into<String>,
    V: Into<FormValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Form {
    type Item = (String, FormValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FormValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An API form with its mandatory `action` discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MwForm {
    action: String,
    fields: Form,
}

impl MwForm {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: Form::new(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a field. A text `action` value replaces the action; any other value for
    /// `action` is ignored, since the action is always a plain name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        let key = key.into();
        let value = value.into();
        if key == "action" {
            if let FormValue::Text(action) = value {
                self.action = action;
            }
            return;
        }
        self.fields.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.fields.get(key)
    }

    /// Merge extra fields over this form.
    pub fn extend(mut self, extra: Form) -> Self {
        for (key, value) in extra {
            self.insert(key, value);
        }
        self
    }

    pub fn into_form(self) -> Form {
        self.fields.with("action", self.action)
    }
}

impl From<MwForm> for Form {
    fn from(form: MwForm) -> Self {
        form.into_form()
    }
}
