//! Server route builder.
//!
//! [`ApiBuilder`] registers typed handlers against an external router
//! through the narrow [`HttpRouter`] trait: four verb-keyed registration
//! methods, nothing else. Route patterns are translated into the router's
//! native colon syntax before registration, parameter-only verbs (GET,
//! DELETE) hand their handler the extracted parameter record, and payload
//! verbs (PUT, PATCH) run the raw body through a caller-supplied
//! [`Transformer`] first.
//!
//! The builder never writes a response itself. Every handler outcome,
//! success or failure, goes through the caller's response [`Wrapper`], which
//! owns the translation into a concrete wire [`Reply`]. Transformer
//! rejections reach the wrapper as [`Error::Payload`], so malformed client
//! input can be told apart from handler-internal failures.

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::schema::Method;
use crate::template::{Params, RoutePattern};

/// The concrete wire response a [`Wrapper`] produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Response body, if any.
    pub body: Option<String>,
}

impl Reply {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: Some(body.into()),
        }
    }

    /// A 204 response with no body.
    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    /// An error response with a JSON `{"message": ...}` body.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Some(serde_json::json!({ "message": message }).to_string()),
        }
    }
}

/// What the external router hands back for one matched request: its
/// extracted path parameters and the parsed request body, if any.
#[derive(Debug, Clone, Default)]
pub struct NativeRequest {
    /// Router-extracted path parameters, keyed by the translated slot names
    /// (`uuid_`-prefixed for identity slots).
    pub params: HashMap<String, String>,
    /// Parsed JSON request body, for payload verbs.
    pub body: Option<Value>,
}

/// Future resolving to the wire response for one request.
pub type RouteFuture = BoxFuture<'static, Reply>;

/// The native handler callback registered with the external router.
pub type RouteHandler = Arc<dyn Fn(NativeRequest) -> RouteFuture + Send + Sync>;

/// The router dependency: verb-keyed registration methods accepting a path
/// pattern in colon syntax and a native handler callback. The core only
/// ever calls these four methods, never the dispatch mechanism itself.
pub trait HttpRouter {
    fn get(&mut self, pattern: &str, handler: RouteHandler);
    fn put(&mut self, pattern: &str, handler: RouteHandler);
    fn patch(&mut self, pattern: &str, handler: RouteHandler);
    fn delete(&mut self, pattern: &str, handler: RouteHandler);
}

/// Future resolving to a handler's outcome: an optional result value or an
/// error.
pub type HandlerFuture<D> = BoxFuture<'static, Result<Option<D>, Error>>;

/// Zero-argument function producing a handler's outcome future. The
/// response wrapper receives one of these per request.
pub type Promiser<D> = Box<dyn FnOnce() -> HandlerFuture<D> + Send>;

/// The response-wrapper hook: translates a handler's outcome into the
/// concrete wire response. Entirely owned by the caller; the builder routes
/// every outcome through it.
pub type Wrapper<D> = Arc<dyn Fn(Promiser<D>) -> RouteFuture + Send + Sync>;

/// Payload conversion supplied per payload route.
///
/// Expected to fail with any error on invalid input; the builder recasts
/// whatever it raises into [`Error::Payload`] before the wrapper sees it.
pub trait Transformer<T>: Send + Sync {
    fn from_object(&self, raw: Value) -> Result<T, Error>;
}

/// Stock transformer that deserializes the body with serde.
pub struct SerdeTransformer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeTransformer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Transformer<T> for SerdeTransformer<T> {
    fn from_object(&self, raw: Value) -> Result<T, Error> {
        Ok(serde_json::from_value(raw)?)
    }
}

/// A ready-made response wrapper for JSON APIs.
///
/// Maps `Ok(Some(value))` to a 200 with the serialized value, `Ok(None)` to
/// a 204, [`Error::Payload`] to a 400 (client fault), and every other error
/// to a 500.
pub fn json_wrapper<D>() -> Wrapper<D>
where
    D: Serialize + Send + 'static,
{
    Arc::new(|promiser: Promiser<D>| {
        Box::pin(async move {
            match promiser().await {
                Ok(Some(value)) => match serde_json::to_string(&value) {
                    Ok(body) => Reply::ok(body),
                    Err(e) => {
                        tracing::error!("Failed to serialize response body: {}", e);
                        Reply::error(500, "response serialization failed")
                    }
                },
                Ok(None) => Reply::no_content(),
                Err(Error::Payload(message)) => Reply::error(400, &message),
                Err(e) => Reply::error(500, &e.to_string()),
            }
        })
    })
}

/// Registers typed route handlers against an external router.
///
/// `R` is the router implementation, `D` the domain result type handlers
/// resolve with (and the wrapper translates).
///
/// # Example
///
/// ```no_run
/// use route_bind::{ApiBuilder, Params, SerdeTransformer, json_wrapper};
/// use serde_json::{Value, json};
/// # use route_bind::transports::Loopback;
///
/// # let router = Loopback::new();
/// let mut api = ApiBuilder::new(router, json_wrapper::<Value>());
///
/// api.get("/widgets/:id", |params: Params| async move {
///     let id = params.get("id").unwrap_or_default().to_string();
///     Ok(Some(json!({ "id": id })))
/// })?;
///
/// api.put(
///     "/widgets/@id",
///     |payload: Value| async move { Ok(Some(payload)) },
///     SerdeTransformer::new(),
/// )?;
/// # Ok::<(), route_bind::Error>(())
/// ```
pub struct ApiBuilder<R, D> {
    router: R,
    wrap: Wrapper<D>,
}

impl<R, D> ApiBuilder<R, D>
where
    R: HttpRouter,
    D: Send + 'static,
{
    /// Create a builder over a router and a response wrapper.
    pub fn new(router: R, wrap: Wrapper<D>) -> Self {
        Self { router, wrap }
    }

    /// Get a reference to the underlying router.
    pub fn router(&self) -> &R {
        &self.router
    }

    /// Finish building and take the configured router.
    pub fn into_router(self) -> R {
        self.router
    }

    /// Register a GET handler. The handler receives the parameter record
    /// extracted by the router.
    pub fn get<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<D>, Error>> + Send + 'static,
    {
        self.register_params(Method::Get, pattern, handler)
    }

    /// Register a DELETE handler. The handler receives the parameter record
    /// extracted by the router.
    pub fn delete<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<D>, Error>> + Send + 'static,
    {
        self.register_params(Method::Delete, pattern, handler)
    }

    /// Register a PUT handler. The raw body goes through the transformer
    /// first; the handler receives the typed payload.
    pub fn put<I, X, F, Fut>(
        &mut self,
        pattern: &str,
        handler: F,
        transformer: X,
    ) -> Result<&mut Self, Error>
    where
        I: Send + 'static,
        X: Transformer<I> + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<D>, Error>> + Send + 'static,
    {
        self.register_payload(Method::Put, pattern, handler, transformer)
    }

    /// Register a PATCH handler. The raw body goes through the transformer
    /// first; the handler receives the typed payload.
    pub fn patch<I, X, F, Fut>(
        &mut self,
        pattern: &str,
        handler: F,
        transformer: X,
    ) -> Result<&mut Self, Error>
    where
        I: Send + 'static,
        X: Transformer<I> + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<D>, Error>> + Send + 'static,
    {
        self.register_payload(Method::Patch, pattern, handler, transformer)
    }

    fn register_params<F, Fut>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<&mut Self, Error>
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<D>, Error>> + Send + 'static,
    {
        let route = RoutePattern::parse(pattern)?;
        let router_pattern = route.router_pattern();
        debug!("Registering {} {}", method, router_pattern);

        let wrap = Arc::clone(&self.wrap);
        let handler = Arc::new(handler);
        let native: RouteHandler = Arc::new(move |request: NativeRequest| {
            let params = route.record_from(&request.params);
            let handler = Arc::clone(&handler);
            let promiser: Promiser<D> = Box::new(move || Box::pin(handler(params)));
            wrap(promiser)
        });

        self.route(method, &router_pattern, native);
        Ok(self)
    }

    fn register_payload<I, X, F, Fut>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
        transformer: X,
    ) -> Result<&mut Self, Error>
    where
        I: Send + 'static,
        X: Transformer<I> + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<D>, Error>> + Send + 'static,
    {
        let route = RoutePattern::parse(pattern)?;
        let router_pattern = route.router_pattern();
        debug!("Registering {} {}", method, router_pattern);

        let wrap = Arc::clone(&self.wrap);
        let handler = Arc::new(handler);
        let transformer = Arc::new(transformer);
        let native: RouteHandler = Arc::new(move |request: NativeRequest| {
            let raw = request.body.unwrap_or(Value::Null);
            // Recast transformer rejections so the wrapper can tell
            // malformed input apart from handler failures.
            let payload = transformer.from_object(raw).map_err(|e| match e {
                Error::Payload(_) => e,
                other => Error::payload(other.to_string()),
            });
            let handler = Arc::clone(&handler);
            let promiser: Promiser<D> = Box::new(move || {
                Box::pin(async move {
                    let payload = payload?;
                    handler(payload).await
                })
            });
            wrap(promiser)
        });

        self.route(method, &router_pattern, native);
        Ok(self)
    }

    fn route(&mut self, method: Method, pattern: &str, handler: RouteHandler) {
        match method {
            Method::Get => self.router.get(pattern, handler),
            Method::Put => self.router.put(pattern, handler),
            Method::Patch => self.router.patch(pattern, handler),
            Method::Delete => self.router.delete(pattern, handler),
        }
    }
}
