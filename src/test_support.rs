//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::network::{Headers, HttpRequest, RawResponse, Transport, TransportError};

type Handler = dyn Fn(&HttpRequest) -> Result<RawResponse, TransportError> + Send + Sync;

/// A transport that answers from a closure and records every request.
pub struct StubTransport {
    handler: Box<Handler>,
    delay: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new(
        handler: impl Fn(&HttpRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `status` with `body`.
    pub fn json(status: u16, body: &str) -> Self {
        let body = body.as_bytes().to_vec();
        Self::new(move |_| {
            Ok(RawResponse {
                status,
                headers: Headers::new(),
                body: body.clone(),
            })
        })
    }

    /// Always fails with `err`, as if no response arrived.
    pub fn failing(err: TransportError) -> Self {
        Self::new(move |_| Err(err.clone()))
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for StubTransport {
    fn name(&self) -> &str {
        "stub"
    }

    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(request)
    }
}
