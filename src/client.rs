//! Client call builder.
//!
//! [`ApiClient`] turns schema endpoints into outbound requests. A call is
//! built fluently: pick the endpoint, set path parameters and a payload in
//! any order, then `execute()`. Execution is the single suspension point of
//! a call: it substitutes parameters into the route pattern, serializes the
//! payload through the shared registry, merges headers from the
//! header-source hook, hands the finished request to the transport, and
//! shapes the raw response into either a typed value or an error.
//!
//! The client never retries: a failed transport call fails once, after
//! being offered to the transport-error hook. A response carrying the
//! maintenance header resolves with neither a value nor an API error; the
//! maintenance hook fires and the call fails with [`Error::Maintenance`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use route_bind::transports::InMemory;
//! use route_bind::{ApiClient, Endpoint, Params, Registry};
//! use serde_json::Value;
//!
//! const WIDGET_GET: Endpoint<(), Value> = Endpoint::get("/widgets/:id");
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let client = ApiClient::new(InMemory::new(), Arc::new(Registry::new()));
//!
//! let widget = client
//!     .request(&WIDGET_GET)
//!     .params(Params::new().set("id", "42"))
//!     .execute()
//!     .await?;
//! # Ok::<(), route_bind::Error>(())
//! # });
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::codec::{Entity, Registry, Tagged};
use crate::error::{ApiError, Error};
use crate::schema::{Endpoint, Method};
use crate::template::{Params, RoutePattern};
use crate::transports::{Transport, WireRequest};

/// Response header signalling server maintenance. When its value is `true`
/// the call never resolves with a value; the caller is expected to restart
/// its execution context.
pub const MAINTENANCE_HEADER: &str = "X-API-Maintenance";

/// Literal token in a route pattern replaced with the client's configured
/// base address before substitution.
pub const ADDRESS_TOKEN: &str = "[api]";

type HeaderSource = Box<dyn Fn() -> HashMap<String, String> + Send + Sync>;
type ErrorHook = Box<dyn Fn(&Error) + Send + Sync>;
type MaintenanceHook = Box<dyn Fn() + Send + Sync>;

/// Issues type-checked calls against a shared route schema.
///
/// Owns the transport, the class registry, and three replaceable hooks: a
/// header source merged into every request, a transport-error hook for
/// telemetry, and a maintenance hook fired on the maintenance signal.
pub struct ApiClient<T> {
    transport: T,
    registry: Arc<Registry>,
    address: String,
    header_source: Option<HeaderSource>,
    on_transport_error: ErrorHook,
    on_maintenance: MaintenanceHook,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client over a transport and a shared registry.
    pub fn new(transport: T, registry: Arc<Registry>) -> Self {
        Self {
            transport,
            registry,
            address: String::new(),
            header_source: None,
            on_transport_error: Box::new(|error| {
                tracing::error!("Transport failure: {}", error);
            }),
            on_maintenance: Box::new(|| {
                tracing::warn!("Maintenance signal received; execution context must restart");
            }),
        }
    }

    /// Set the base address substituted for the `[api]` pattern token.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the header-source hook, called once per request for extra
    /// headers (session, auth).
    pub fn with_header_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> HashMap<String, String> + Send + Sync + 'static,
    {
        self.header_source = Some(Box::new(source));
        self
    }

    /// Replace the transport-error hook. The default records the failure
    /// with `tracing::error!`.
    pub fn with_transport_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_transport_error = Box::new(hook);
        self
    }

    /// Replace the maintenance hook. The default records the signal with
    /// `tracing::warn!`.
    pub fn with_maintenance_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_maintenance = Box::new(hook);
        self
    }

    /// The registry this client serializes and deserializes with.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a typed call for a schema endpoint.
    pub fn request<I, O>(&self, endpoint: &Endpoint<I, O>) -> ApiCall<'_, T, I, O> {
        ApiCall::new(self, endpoint.method(), endpoint.pattern().to_string())
    }

    /// Start an untyped call: both payload and response are raw JSON
    /// values.
    pub fn call(&self, method: Method, pattern: &str) -> ApiCall<'_, T, Value, Value> {
        ApiCall::new(self, method, pattern.to_string())
    }

    fn patch_url(&self, pattern: &str) -> String {
        pattern.replace(ADDRESS_TOKEN, &self.address)
    }
}

/// The two payload doors: tagged objects are encoded strictly through the
/// registry, plain values pass through it.
enum WirePayload {
    Object(Box<dyn Tagged>),
    Value(Box<dyn Entity>),
}

/// One in-flight call, built fluently and consumed by [`ApiCall::execute`].
pub struct ApiCall<'c, T, I, O> {
    client: &'c ApiClient<T>,
    method: Method,
    pattern: String,
    params: Option<Params>,
    payload: Option<WirePayload>,
    headers: HashMap<String, String>,
    _io: PhantomData<fn(I) -> O>,
}

impl<'c, T: Transport, I, O> ApiCall<'c, T, I, O> {
    fn new(client: &'c ApiClient<T>, method: Method, pattern: String) -> Self {
        Self {
            client,
            method,
            pattern,
            params: None,
            payload: None,
            headers: HashMap::new(),
            _io: PhantomData,
        }
    }

    /// Set the path parameter record. Validated against the pattern's slots
    /// at execution time; a parameter left out stays literally in the URL.
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the request payload to a tagged object. Encoded through the
    /// registry at execution time; a type that was never registered fails
    /// the call with a serialization error instead of leaving the process
    /// untagged.
    pub fn payload(mut self, payload: I) -> Self
    where
        I: Tagged,
    {
        self.payload = Some(WirePayload::Object(Box::new(payload)));
        self
    }

    /// Set the request payload to a plain structural value (raw JSON,
    /// untyped bodies). Registered types still pick up their type tag.
    pub fn payload_value(mut self, payload: I) -> Self
    where
        I: Entity,
    {
        self.payload = Some(WirePayload::Value(Box::new(payload)));
        self
    }

    /// Add a caller-supplied header to this call.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Build the request, send it, and shape the response.
    ///
    /// Resolves with `Ok(None)` for a 2xx response with an empty body, and
    /// with the deserialized body otherwise. Non-2xx statuses fail with
    /// [`Error::Api`]; transport failures are offered to the
    /// transport-error hook and then surfaced.
    pub async fn execute(self) -> Result<Option<O>, Error>
    where
        O: DeserializeOwned,
    {
        if self.payload.is_some() && !self.method.has_payload() {
            return Err(Error::payload(format!(
                "{} {} does not take a request payload",
                self.method, self.pattern
            )));
        }

        let pattern = self.client.patch_url(&self.pattern);
        let route = RoutePattern::parse(&pattern)?;
        let url = match &self.params {
            Some(params) => {
                route.validate(params)?;
                route.substitute(params)
            }
            None => pattern,
        };

        let mut headers = self
            .client
            .header_source
            .as_ref()
            .map(|source| source())
            .unwrap_or_default();
        for (name, value) in self.headers {
            headers.insert(name, value);
        }

        let body = match &self.payload {
            Some(payload) => {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                let encoded = match payload {
                    WirePayload::Object(value) => {
                        self.client.registry.encode_object(value.as_ref())?
                    }
                    WirePayload::Value(value) => {
                        self.client.registry.encode_value(value.as_ref())?
                    }
                };
                Some(serde_json::to_string(&encoded)?)
            }
            None => None,
        };

        let request = WireRequest {
            url: url.clone(),
            method: self.method,
            headers,
            body,
        };
        debug!("Issuing {} {}", request.method, request.url);

        let response = match self.client.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                (self.client.on_transport_error)(&error);
                return Err(error);
            }
        };

        if matches!(response.header(MAINTENANCE_HEADER), Some("true")) {
            (self.client.on_maintenance)();
            return Err(Error::Maintenance);
        }

        if !response.is_success() {
            return Err(Error::Api(ApiError::new(
                url,
                response.status,
                response.status_text,
                response.body,
            )));
        }

        if response.body.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.client.registry.decode(&response.body)?))
    }
}
