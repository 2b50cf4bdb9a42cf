use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::MwBot;
use crate::config::BotOptions;
use crate::error::TransportError;
use crate::form::FormValue;
use crate::request::{PreparedRequest, RequestOptions};
use crate::transport::HttpTransport;

pub(crate) const TEST_API_URL: &str = "https://wiki.example.org/w/api.php";

pub(crate) enum Reply {
    Json(Value),
    Text(String),
    Status(u16),
}

struct Route {
    when: Vec<(String, String)>,
    reply: Reply,
}

/// Scripted transport. A request is answered by the route whose form conditions all
/// match, preferring the route with the most conditions and, among equals, the latest.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn on(&self, when: &[(&str, &str)], reply: Reply) {
        self.routes.lock().expect("routes lock").push(Route {
            when: owned_pairs(when),
            reply,
        });
    }

    pub(crate) fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn hits(&self, when: &[(&str, &str)]) -> usize {
        let when = owned_pairs(when);
        self.requests()
            .iter()
            .filter(|request| matches(request, &when))
            .count()
    }
}

impl HttpTransport for MockTransport {
    fn execute(&self, request: &PreparedRequest) -> Result<String, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let routes = self.routes.lock().expect("routes lock");
        let route = routes
            .iter()
            .filter(|route| matches(request, &route.when))
            .max_by_key(|route| route.when.len());
        match route.map(|route| &route.reply) {
            Some(Reply::Json(value)) => Ok(value.to_string()),
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Status(status)) => Err(TransportError::Status {
                status: *status,
                body: String::new(),
            }),
            None => Err(TransportError::Status {
                status: 404,
                body: format!("no scripted route for {:?}", request.form),
            }),
        }
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

fn matches(request: &PreparedRequest, when: &[(String, String)]) -> bool {
    when.iter().all(|(key, value)| {
        request.form.get(key).and_then(FormValue::as_text).as_deref() == Some(value.as_str())
    })
}

pub(crate) fn bot_with(mock: &Arc<MockTransport>) -> MwBot {
    MwBot::with_transport(
        BotOptions::default().with_api_url(TEST_API_URL),
        RequestOptions::default(),
        Arc::clone(mock) as Arc<dyn HttpTransport>,
    )
}

/// Two-step login accepting challenge token `T1`, then site info reporting `generator`.
pub(crate) fn script_login(mock: &MockTransport, generator: &str) {
    mock.on(
        &[("action", "login")],
        Reply::Json(json!({"login": {"result": "NeedToken", "token": "T1"}})),
    );
    mock.on(
        &[("action", "login"), ("lgtoken", "T1")],
        Reply::Json(json!({"login": {
            "result": "Success",
            "lguserid": 7,
            "lgusername": "ExampleBot"
        }})),
    );
    mock.on(
        &[("meta", "siteinfo")],
        Reply::Json(json!({"query": {"general": {
            "generator": generator,
            "sitename": "Example Wiki"
        }}})),
    );
}
