//! Route schema types shared by the client and the server.
//!
//! A schema is a set of `const` [`Endpoint`] values, one per route and verb,
//! declared once and consumed by both sides: the client builds type-checked
//! calls from them, the server uses their patterns when registering handlers.
//! An endpoint produces no runtime code of its own; it only ties an input
//! payload type and an output body type to a verb and a route pattern.
//!
//! # Example
//!
//! ```
//! use route_bind::Endpoint;
//! use serde_json::Value;
//!
//! const WIDGET_GET: Endpoint<(), Value> = Endpoint::get("/widgets/:id");
//! const WIDGET_PUT: Endpoint<Value, Value> = Endpoint::put("/widgets/@id");
//!
//! assert_eq!(WIDGET_GET.pattern(), "/widgets/:id");
//! ```

use std::fmt;
use std::marker::PhantomData;

/// HTTP verbs supported by the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// The canonical upper-case wire name of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether this verb carries a request payload (PUT/PATCH) rather than
    /// path parameters only (GET/DELETE).
    pub fn has_payload(&self) -> bool {
        matches!(self, Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single route contract: verb, pattern, input type, output type.
///
/// `I` is the request payload type (use `()` for parameter-only verbs), `O`
/// is the response body type (use `()` for routes that answer with no body).
/// The pattern may contain `:name` string slots and `@name` identity slots;
/// see the [`template`](crate::template) module.
pub struct Endpoint<I = (), O = ()> {
    method: Method,
    pattern: &'static str,
    _io: PhantomData<fn(I) -> O>,
}

impl<I, O> Endpoint<I, O> {
    /// Declare an endpoint with an explicit verb.
    pub const fn new(method: Method, pattern: &'static str) -> Self {
        Self {
            method,
            pattern,
            _io: PhantomData,
        }
    }

    /// Declare a GET endpoint.
    pub const fn get(pattern: &'static str) -> Self {
        Self::new(Method::Get, pattern)
    }

    /// Declare a PUT endpoint.
    pub const fn put(pattern: &'static str) -> Self {
        Self::new(Method::Put, pattern)
    }

    /// Declare a PATCH endpoint.
    pub const fn patch(pattern: &'static str) -> Self {
        Self::new(Method::Patch, pattern)
    }

    /// Declare a DELETE endpoint.
    pub const fn delete(pattern: &'static str) -> Self {
        Self::new(Method::Delete, pattern)
    }

    /// The verb this endpoint answers to.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The route pattern, as declared.
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }
}

impl<I, O> fmt::Debug for Endpoint<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish()
    }
}
