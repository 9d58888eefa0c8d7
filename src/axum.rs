//! Axum integration for the server route builder.
//!
//! This module provides an optional [`HttpRouter`] implementation backed by
//! an `axum::Router`. Enable the `axum` feature in Cargo.toml to use it.
//!
//! Patterns arrive in the binding layer's colon syntax (identity slots
//! already rewritten to `:uuid_name`); the adapter converts them to axum
//! 0.8's `{name}` syntax. Path parameters are extracted as a string map and
//! the raw body as text, so one adapter shape serves all four verbs.
//!
//! ```toml
//! [dependencies]
//! route-bind-rs = { version = "0.2", features = ["axum"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use route_bind::axum::AxumRouter;
//! use route_bind::{ApiBuilder, Params, json_wrapper};
//! use serde_json::{Value, json};
//!
//! let mut api = ApiBuilder::new(AxumRouter::new(), json_wrapper::<Value>());
//! api.get("/widgets/@id", |params: Params| async move {
//!     let id = params.get("uuid_id").unwrap_or_default().to_string();
//!     Ok(Some(json!({ "id": id })))
//! })?;
//!
//! let app: axum::Router = api.into_router().into_inner();
//! # Ok::<(), route_bind::Error>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use axum::routing::{self, MethodRouter};
use futures::future::BoxFuture;
use http::{StatusCode, header};

use crate::server::{HttpRouter, NativeRequest, Reply, RouteHandler};

/// [`HttpRouter`] implementation over `axum::Router`.
#[derive(Default)]
pub struct AxumRouter {
    inner: axum::Router,
}

impl AxumRouter {
    /// Create an adapter over an empty `axum::Router`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the configured `axum::Router` to serve it.
    pub fn into_inner(self) -> axum::Router {
        self.inner
    }

    fn route(&mut self, pattern: &str, method_router: MethodRouter) {
        let inner = std::mem::take(&mut self.inner);
        self.inner = inner.route(&axum_path(pattern), method_router);
    }
}

impl HttpRouter for AxumRouter {
    fn get(&mut self, pattern: &str, handler: RouteHandler) {
        self.route(pattern, routing::get(adapt(handler)));
    }

    fn put(&mut self, pattern: &str, handler: RouteHandler) {
        self.route(pattern, routing::put(adapt(handler)));
    }

    fn patch(&mut self, pattern: &str, handler: RouteHandler) {
        self.route(pattern, routing::patch(adapt(handler)));
    }

    fn delete(&mut self, pattern: &str, handler: RouteHandler) {
        self.route(pattern, routing::delete(adapt(handler)));
    }
}

/// Convert colon-syntax named parameters to axum 0.8's brace syntax.
fn axum_path(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Wrap a native route handler as an axum handler function.
fn adapt(
    handler: RouteHandler,
) -> impl Fn(Path<HashMap<String, String>>, String) -> BoxFuture<'static, Response>
+ Clone
+ Send
+ Sync
+ 'static {
    move |Path(params): Path<HashMap<String, String>>, body: String| {
        let handler = Arc::clone(&handler);
        Box::pin(async move {
            let body = if body.is_empty() {
                None
            } else {
                match serde_json::from_str(&body) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::error!("Invalid JSON request body: {}", e);
                        return into_response(Reply::error(400, "invalid JSON body"));
                    }
                }
            };
            let reply = handler(NativeRequest { params, body }).await;
            into_response(reply)
        })
    }
}

/// Convert a wrapper-produced reply into an axum response.
fn into_response(reply: Reply) -> Response {
    let status =
        StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match reply.body {
        Some(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => status.into_response(),
    }
}
