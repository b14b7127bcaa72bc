//! Test doubles: a scripted in-memory [`ScrapeApi`] and a local HTTP stub of
//! the scraping API.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use scrapay_core::{AppConfig, Error};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::api::ScrapeApi;
use crate::x402::PaymentError;

/// Replays queued responses and records every call.
///
/// An exhausted link or extraction queue answers with an `HttpError`; an
/// exhausted payment queue answers with success.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    link_responses: Mutex<VecDeque<Value>>,
    extract_responses: Mutex<VecDeque<Value>>,
    payment_outcomes: Mutex<VecDeque<Result<(), PaymentError>>>,
    link_calls: Mutex<Vec<String>>,
    extract_calls: Mutex<Vec<(Vec<String>, String)>>,
    payment_calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_links(self, body: Value) -> Self {
        self.link_responses.lock().unwrap().push_back(body);
        self
    }

    pub(crate) fn with_extract(self, body: Value) -> Self {
        self.extract_responses.lock().unwrap().push_back(body);
        self
    }

    pub(crate) fn with_payment(self, outcome: Result<(), PaymentError>) -> Self {
        self.payment_outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub(crate) fn link_calls(&self) -> Vec<String> {
        self.link_calls.lock().unwrap().clone()
    }

    pub(crate) fn extract_calls(&self) -> Vec<(Vec<String>, String)> {
        self.extract_calls.lock().unwrap().clone()
    }

    pub(crate) fn payments(&self) -> Vec<String> {
        self.payment_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScrapeApi for ScriptedApi {
    async fn links(&self, url: &str) -> Result<Value, Error> {
        self.link_calls.lock().unwrap().push(url.to_string());
        self.link_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::HttpError("no scripted links response".into()))
    }

    async fn extract_text(&self, urls: &[String], domain: &str) -> Result<Value, Error> {
        self.extract_calls
            .lock()
            .unwrap()
            .push((urls.to_vec(), domain.to_string()));
        self.extract_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::HttpError("no scripted extract response".into()))
    }

    async fn do_payment(&self, resource: &str) -> Result<(), PaymentError> {
        self.payment_calls.lock().unwrap().push(resource.to_string());
        self.payment_outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// A request received by [`StubServer`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) user_agent: Option<String>,
    pub(crate) body: String,
}

impl RecordedRequest {
    pub(crate) fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

struct StubState {
    responses: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local HTTP server answering each path with a fixed status and body.
///
/// The API is mounted under `/api` so endpoint joins are exercised. Unknown
/// paths answer `404` with an empty body.
pub(crate) struct StubServer {
    base_url: String,
    state: Arc<StubState>,
}

impl StubServer {
    /// Serve `routes`, given as `(path, status, body)`.
    pub(crate) async fn start(routes: &[(&str, u16, &str)]) -> Self {
        let responses = routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
            .collect();
        let state = Arc::new(StubState { responses, requests: Mutex::default() });

        let app = Router::new().fallback(answer).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{}/api", addr), state }
    }

    pub(crate) fn config(&self) -> AppConfig {
        AppConfig { api_base_url: self.base_url.clone(), timeout_ms: Some(5_000), ..Default::default() }
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn answer(
    State(state): State<Arc<StubState>>, method: Method, uri: Uri, headers: HeaderMap, body: String,
) -> (StatusCode, String) {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        user_agent,
        body,
    });

    match state.responses.get(uri.path()) {
        Some((status, body)) => (StatusCode::from_u16(*status).unwrap(), body.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}
