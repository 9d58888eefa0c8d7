//! Transport trait for outbound API calls.
//!
//! A transport takes a fully shaped request (URL, method, headers, optional
//! body text) and returns the raw response (status, headers, body text), or
//! fails with a transport-level error. Everything above this seam is the
//! client call builder's job; everything below it is the transport's.

use std::collections::HashMap;

use futures::future::BoxFuture;

use crate::error::Error;
use crate::schema::Method;

/// One outbound request, fully shaped and immutable. Built fresh per call
/// and discarded after the call completes or fails.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// Target URL, after parameter substitution.
    pub url: String,
    /// HTTP verb.
    pub method: Method,
    /// All request headers, already merged.
    pub headers: HashMap<String, String>,
    /// Serialized request body, if the call carries one.
    pub body: Option<String>,
}

/// The raw response a transport hands back.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// HTTP status text.
    pub status_text: String,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body text, empty when the server sent no body.
    pub body: String,
}

impl WireResponse {
    /// Build a response with a status, status text, and body, and no
    /// headers.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header to the response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = BoxFuture<'a, Result<WireResponse, Error>>;

/// Trait defining the interface for outbound API call transports.
///
/// Implementations issue the request however they like (an HTTP client, a
/// test double, an in-process loopback) and resolve with the raw response.
/// A failure to obtain any response at all must surface as
/// [`Error::Transport`]; non-2xx statuses are *not* transport failures and
/// must resolve normally so the call builder can shape an API error from
/// them.
pub trait Transport: Send + Sync {
    /// Issue a single request and await its raw response.
    fn send(&self, request: WireRequest) -> TransportFuture<'_>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        (**self).send(request)
    }
}
