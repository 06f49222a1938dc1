//! Nullable transport — scripted responses, recorded requests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use idv_client::Transport;
use idv_types::{HttpResponse, RequestEnvelope, TransportFailure};
use serde_json::Value;

/// A transport that answers from a script instead of the network.
///
/// Responses are consumed in order; once the script runs dry every request
/// fails with a connection error.
#[derive(Debug, Default)]
pub struct NullTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportFailure>>>,
    requests: Mutex<Vec<RequestEnvelope>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw outcome.
    pub fn push(&self, outcome: Result<HttpResponse, TransportFailure>) -> &Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    /// Queue a JSON response with the given status.
    pub fn respond_json(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(HttpResponse::json(status, &body)))
    }

    /// Queue a response with an arbitrary body.
    pub fn respond_raw(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(HttpResponse::new(status, body)))
    }

    /// Queue a timeout with no response.
    pub fn time_out(&self) -> &Self {
        self.push(Err(TransportFailure::timeout(Duration::from_millis(30_000))))
    }

    /// Every envelope received, in order.
    pub fn requests(&self) -> Vec<RequestEnvelope> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RequestEnvelope> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Transport for NullTransport {
    async fn execute(&self, envelope: RequestEnvelope) -> Result<HttpResponse, TransportFailure> {
        self.requests.lock().unwrap().push(envelope);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::connect("no scripted response")))
    }
}
