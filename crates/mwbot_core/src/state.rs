use serde::Serialize;
use serde_json::{Map, Value};

use crate::merge::Merge;

/// Everything the server has told us about the session: site info, login result and
/// issued tokens. Only ever grows by merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionState(Map<String, Value>);

impl SessionState {
    pub(crate) fn merge_in(&mut self, partial: &Value) {
        if let Some(object) = partial.as_object() {
            let current = std::mem::take(&mut self.0);
            self.0 = current.merge(object.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Server software string from site info, e.g. `MediaWiki 1.35.0`.
    pub fn generator(&self) -> Option<&str> {
        self.0.get("generator").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Progress of the two-step login sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    #[default]
    Unauthenticated,
    AwaitingChallenge,
    AwaitingConfirmation,
    Authenticated,
    Failed,
}
