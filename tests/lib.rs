//! Shared fixtures for engine behavior tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

pub use tickline_core::{
    EngineConfig, HttpClient, HttpError, HttpRequest, HttpResponse, MarketDataEngine,
};

/// HTTP client that replays a scripted sequence of responses and records
/// every request it receives. An exhausted script fails loudly instead of
/// inventing a response.
#[derive(Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(self: Arc<Self>, body: &str) -> Arc<Self> {
        self.push(Ok(HttpResponse::ok(body)))
    }

    pub fn push_status(self: Arc<Self>, status: u16, body: &str) -> Arc<Self> {
        self.push(Ok(HttpResponse {
            status,
            body: body.to_owned(),
        }))
    }

    pub fn push_error(self: Arc<Self>, error: HttpError) -> Arc<Self> {
        self.push(Err(error))
    }

    fn push(self: Arc<Self>, response: Result<HttpResponse, HttpError>) -> Arc<Self> {
        self.responses
            .lock()
            .expect("response script should not be poisoned")
            .push_back(response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .len()
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self
            .responses
            .lock()
            .expect("response script should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("response script exhausted")));
        Box::pin(async move { response })
    }
}

/// Engine wired to a scripted client with a valid test credential.
pub fn engine_with(client: Arc<ScriptedHttpClient>) -> MarketDataEngine {
    let config = EngineConfig::new("db-test-key").expect("test credential is valid");
    MarketDataEngine::with_http_client(config, client)
}
