//! Error types for the route binding layer.
//!
//! This module defines the crate-level error taxonomy shared by the client
//! call builder, the server route builder, and the polymorphic codec. The
//! variants map one-to-one to the failure modes a caller can observe: the
//! transport failed outright, the server answered with a non-success status,
//! the codec met an unknown or unregistered type, or the inbound payload was
//! rejected before the handler ran.

use std::fmt;

/// Errors that can occur while building, sending, or handling a call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No response was obtained at all (network, DNS, timeout). Never
    /// retried by the core; routed through the client's transport-error hook
    /// before surfacing.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response was obtained with a non-2xx status.
    #[error("{0}")]
    Api(ApiError),

    /// Deserialization met a type tag absent from the registry. Fatal for
    /// the whole payload; indicates a registry/schema mismatch between peers.
    #[error("Unknown type tag: {0}")]
    UnknownTypeTag(String),

    /// A tagged object could not be serialized, typically because its
    /// concrete type has no reverse-map entry in the registry.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A request payload was rejected: the server-side transformer refused
    /// the inbound body, or a payload was supplied for a parameter-only
    /// verb. Kept distinct from handler failures so the response wrapper
    /// can map it to a client-fault status.
    #[error("Payload error: {0}")]
    Payload(String),

    /// A route pattern failed to parse, or supplied parameters do not match
    /// the pattern's slots.
    #[error("Template error: {0}")]
    Template(String),

    /// Polymorphic (de)serialization was attempted against a registry with
    /// no registered types.
    #[error("Class registry is empty; register types before use")]
    EmptyRegistry,

    /// The server signalled maintenance mode; the call resolves with neither
    /// a value nor an API error.
    #[error("Server is in maintenance mode")]
    Maintenance,

    /// A server-side handler failed internally.
    #[error("Handler error: {0}")]
    Handler(String),

    /// JSON parsing or emission error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a new payload error.
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload(message.into())
    }

    /// Create a new template error.
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template(message.into())
    }

    /// Create a new handler error.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

/// Details of a non-success HTTP response.
///
/// Created only when a response was obtained with a non-2xx status. Carries
/// the route attempted (post-substitution URL), the status line, the raw
/// body, and a best-effort parsed JSON body (`None` if the body is not valid
/// JSON).
#[derive(Debug, Clone)]
pub struct ApiError {
    /// The URL the call was issued against, after parameter substitution.
    pub route: String,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status text.
    pub status_text: String,
    /// Raw response body.
    pub body: String,
    /// The body parsed as JSON, if it was valid JSON.
    pub json: Option<serde_json::Value>,
}

impl ApiError {
    /// Build an `ApiError` from a raw response, parsing the body as JSON on
    /// a best-effort basis.
    pub fn new(
        route: impl Into<String>,
        status: u16,
        status_text: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        let json = serde_json::from_str(&body).ok();
        Self {
            route: route.into(),
            status,
            status_text: status_text.into(),
            body,
            json,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API error {} {} for {}",
            self.status, self.status_text, self.route
        )
    }
}
