//! In-memory transport for outbound API calls.
//!
//! This transport answers requests from a scripted queue of canned responses
//! instead of touching the network, and records every request it was asked
//! to send. It is primarily useful for testing client call flows and for
//! mock backends during development.
//!
//! # Example
//!
//! ```
//! use route_bind::transports::{InMemory, WireResponse};
//!
//! let transport = InMemory::new();
//! transport.push_response(WireResponse::new(200, "OK", r#"{"id":"7"}"#));
//! // hand the transport to an ApiClient; the next call resolves with the
//! // scripted response, and `transport.requests()` shows what was sent.
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::Error;
use crate::transports::transport::{Transport, TransportFuture, WireRequest, WireResponse};

/// Scripted in-memory transport.
///
/// Responses are consumed in FIFO order, one per [`Transport::send`] call. A
/// call with nothing scripted fails with a transport error rather than
/// hanging.
#[derive(Debug, Default)]
pub struct InMemory {
    responses: Mutex<VecDeque<Result<WireResponse, Error>>>,
    requests: Mutex<Vec<WireRequest>>,
}

impl InMemory {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for the next unanswered request.
    pub fn push_response(&self, response: WireResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response));
    }

    /// Script a failure for the next unanswered request.
    pub fn push_error(&self, error: Error) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for InMemory {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            let scripted = self
                .responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            scripted.unwrap_or_else(|| Err(Error::transport("no scripted response left")))
        })
    }
}
