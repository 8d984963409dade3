//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;

use super::FetchRequest;
use super::FetchResponse;
use super::Transport;
use crate::error::FetchError;

/// A transport that replays scripted outcomes and records what it was sent.
///
/// Outcomes are consumed in call order. Once the script runs out, the
/// fallback response (if any) is returned for every further call.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Result<FetchResponse, FetchError>>>,
    fallback: Option<FetchResponse>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockTransport {
    /// Creates a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a successful response to the script.
    pub fn respond(self, response: FetchResponse) -> Self {
        self.push(Ok(response))
    }

    /// Appends a failure to the script.
    pub fn fail(self, error: FetchError) -> Self {
        self.push(Err(error))
    }

    /// Returns `response` once the script is exhausted.
    pub fn always(mut self, response: FetchResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Waits `delay` before completing each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(self, outcome: Result<FetchResponse, FetchError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }

    /// Number of calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let outcome = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match (outcome, &self.fallback) {
            (Some(outcome), _) => outcome,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(FetchError::Transport("mock script exhausted".to_string())),
        }
    }
}
