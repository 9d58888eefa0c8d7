//! Loopback transport: client and server wired together in one process.
//!
//! [`Loopback`] plays both roles of the binding layer. As an
//! [`HttpRouter`] it accepts route registrations from an
//! [`ApiBuilder`](crate::ApiBuilder); as a [`Transport`] it dispatches each
//! outbound request to the matching registered handler and converts the
//! handler's [`Reply`] back into a raw response. No sockets are involved,
//! which makes it the natural backbone for end-to-end tests of a shared
//! route schema.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::error::Error;
use crate::schema::Method;
use crate::server::{HttpRouter, NativeRequest, RouteHandler};
use crate::template::RoutePattern;
use crate::transports::transport::{Transport, TransportFuture, WireRequest, WireResponse};

struct RouteEntry {
    method: Method,
    pattern: RoutePattern,
    handler: RouteHandler,
}

/// In-process router and transport in one.
#[derive(Default)]
pub struct Loopback {
    routes: Mutex<Vec<RouteEntry>>,
}

impl Loopback {
    /// Create a loopback with no routes registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn register(&mut self, method: Method, pattern: &str, handler: RouteHandler) {
        match RoutePattern::parse(pattern) {
            Ok(parsed) => {
                // Recover a poisoned lock; a registration must never be
                // dropped without trace.
                self.routes
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(RouteEntry {
                        method,
                        pattern: parsed,
                        handler,
                    });
            }
            Err(e) => error!("Rejecting unparsable pattern {}: {}", pattern, e),
        }
    }

    fn find(&self, request: &WireRequest) -> Option<(RouteHandler, HashMap<String, String>)> {
        let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes.iter().find_map(|entry| {
            if entry.method != request.method {
                return None;
            }
            entry.pattern.match_path(&request.url).map(|params| {
                let native = params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect();
                (Arc::clone(&entry.handler), native)
            })
        })
    }
}

impl HttpRouter for Loopback {
    fn get(&mut self, pattern: &str, handler: RouteHandler) {
        self.register(Method::Get, pattern, handler);
    }

    fn put(&mut self, pattern: &str, handler: RouteHandler) {
        self.register(Method::Put, pattern, handler);
    }

    fn patch(&mut self, pattern: &str, handler: RouteHandler) {
        self.register(Method::Patch, pattern, handler);
    }

    fn delete(&mut self, pattern: &str, handler: RouteHandler) {
        self.register(Method::Delete, pattern, handler);
    }
}

impl Transport for Loopback {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        let matched = self.find(&request);
        Box::pin(async move {
            let Some((handler, params)) = matched else {
                return Ok(WireResponse::new(404, "Not Found", ""));
            };

            let body = match request.body.as_deref() {
                Some(text) if !text.is_empty() => match serde_json::from_str(text) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        return Ok(WireResponse::new(
                            400,
                            "Bad Request",
                            r#"{"message":"invalid JSON body"}"#,
                        ));
                    }
                },
                _ => None,
            };

            let reply = handler(NativeRequest { params, body }).await;
            let has_body = reply.body.is_some();
            let mut response = WireResponse::new(
                reply.status,
                status_text(reply.status),
                reply.body.unwrap_or_default(),
            );
            if has_body {
                response = response.with_header("Content-Type", "application/json");
            }
            Ok::<_, Error>(response)
        })
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
