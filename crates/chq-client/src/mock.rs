//! Scriptable in-memory transport for tests.
//!
//! Responses are queued per `(method, path)`. The path is matched against
//! the URL suffix so tests never spell out the base URL or prefix, and the
//! longest matching suffix wins. When a route has several queued responses
//! they are served in order and the last one repeats.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::{
    HttpRequest, HttpResponse, Method, Transport, TransportError, TransportErrorKind,
};

type Scripted = Result<HttpResponse, TransportError>;

/// A [`Transport`] that replays scripted responses and records requests.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Vec<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Creates a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw response for `method path`.
    pub fn respond(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.push(method, path, Ok(response))
    }

    /// Queues a JSON response for `method path`.
    pub fn respond_json(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.respond(method, path, HttpResponse::json(status, &body))
    }

    /// Queues a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, kind: TransportErrorKind, message: &str) -> &Self {
        self.push(method, path, Err(TransportError::new(kind, message)))
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) -> &Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes
                .entry((method, path.to_string()))
                .or_default()
                .push(scripted);
        }
        self
    }

    /// All requests seen so far, in send order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Requests whose URL ends with `path`.
    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(path))
            .collect()
    }

    /// Number of requests sent to `path`.
    pub fn call_count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        let mut routes = self
            .routes
            .lock()
            .map_err(|_| TransportError::new(TransportErrorKind::Other, "mock poisoned"))?;
        let queue = routes
            .iter_mut()
            .filter(|((method, path), _)| *method == request.method && request.url.ends_with(path))
            .max_by_key(|((_, path), _)| path.len())
            .map(|(_, queue)| queue);

        match queue {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue.first().cloned().unwrap_or_else(|| {
                Err(TransportError::new(TransportErrorKind::Other, "empty route"))
            }),
            None => Ok(HttpResponse::json(
                404,
                &serde_json::json!({ "message": format!("no mock for {} {}", request.method, request.url) }),
            )),
        }
    }
}
