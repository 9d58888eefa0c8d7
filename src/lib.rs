//! A bidirectional binding layer over a shared route schema.
//!
//! This library lets a client and a server share one description of an HTTP
//! API: for each URL pattern and verb, the shape of its path parameters,
//! request payload, and response body. The client consumes the schema to
//! build type-checked calls; the server consumes the same schema to register
//! type-checked handlers. Neither side duplicates the contract at runtime.
//!
//! # Design Goals
//!
//! The library prioritizes a small, explicit core over framework ambition.
//! It does not implement a transport, a router, or payload validation: the
//! client issues requests through a [`Transport`](transports::Transport)
//! implementation of your choice (Bring Your Own Transport), the server
//! registers handlers against any router exposing the four verb-keyed
//! methods of [`HttpRouter`], and inbound payloads are converted by a
//! caller-supplied [`Transformer`].
//!
//! # Architecture
//!
//! [`schema`] declares the contract: `const` [`Endpoint`] values tying a
//! verb and a route pattern to an input and output type.
//!
//! [`template`] is the URL template engine. Route patterns mix `:name`
//! string slots and `@name` identity slots; a parsed [`RoutePattern`]
//! derives the parameter record, substitutes concrete values on the client,
//! and translates identity slots into router-native syntax on the server.
//!
//! [`codec`] is the polymorphic object protocol. A [`Registry`] maps type
//! tags to concrete types in both directions, so arbitrary nested object
//! graphs travel over JSON and come back as their concrete types.
//!
//! [`client`] builds outbound calls: substitute, serialize, send, parse,
//! with uniform error shaping and pluggable hooks for session headers,
//! transport failures, and the server's maintenance signal.
//!
//! [`server`] registers typed handlers against the external router and
//! routes every outcome through a caller-owned response wrapper.
//!
//! [`transports`] holds the transport seam plus two stock implementations:
//! a scripted [`InMemory`](transports::InMemory) transport for tests, and a
//! [`Loopback`](transports::Loopback) that wires a client directly to
//! registered routes in-process.
//!
//! [`error`] defines the error taxonomy shared by all of the above.
//!
//! # Quick Start
//!
//! Declare the schema once:
//!
//! ```
//! use route_bind::Endpoint;
//! use serde_json::Value;
//!
//! const WIDGET_GET: Endpoint<(), Value> = Endpoint::get("/widgets/:id");
//! const WIDGET_PUT: Endpoint<Value, Value> = Endpoint::put("/widgets/@id");
//! ```
//!
//! Call it from the client side:
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
//! let widget = client
//!     .request(&WIDGET_GET)
//!     .params(Params::new().set("id", "42"))
//!     .execute()
//!     .await?;
//! # Ok::<(), route_bind::Error>(())
//! # });
//! ```
//!
//! Serve it from the server side:
//!
//! ```no_run
//! use route_bind::transports::Loopback;
//! use route_bind::{ApiBuilder, Params, SerdeTransformer, json_wrapper};
//! use serde_json::{Value, json};
//!
//! let mut api = ApiBuilder::new(Loopback::new(), json_wrapper::<Value>());
//!
//! api.get("/widgets/:id", |params: Params| async move {
//!     let id = params.get("id").unwrap_or_default().to_string();
//!     Ok(Some(json!({ "id": id })))
//! })?;
//!
//! api.put(
//!     "/widgets/@id",
//!     |payload: Value| async move { Ok(Some(payload)) },
//!     SerdeTransformer::new(),
//! )?;
//! # Ok::<(), route_bind::Error>(())
//! ```
//!
//! # Polymorphic Payloads
//!
//! Types that must come back as their concrete type register with the
//! shared [`Registry`] and travel with a reserved `@type` field:
//!
//! ```
//! use route_bind::{Registry, Tagged};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Widget {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Tagged for Widget {}
//!
//! let registry = Registry::new().with_type::<Widget>("Widget");
//! let widget = Widget { id: "7".into(), name: "Widget".into() };
//!
//! let wire = registry.serialize(&widget).unwrap();
//! let back: Widget = registry.decode(&wire).unwrap();
//! assert_eq!(back, widget);
//! ```
//!
//! # Error Handling
//!
//! Every failure surfaces as an [`Error`]: transport failures after being
//! offered to the transport-error hook, non-2xx responses as
//! [`Error::Api`] with the status line and a best-effort parsed body,
//! unknown type tags and unregistered types as codec errors, and rejected
//! inbound payloads as [`Error::Payload`] so the response wrapper can blame
//! the client rather than the handler.

pub use client::{ADDRESS_TOKEN, ApiCall, ApiClient, MAINTENANCE_HEADER};
pub use codec::{Entity, Registry, TYPE_TAG, Tagged};
pub use error::{ApiError, Error};
pub use schema::{Endpoint, Method};
pub use server::{
    ApiBuilder, HandlerFuture, HttpRouter, NativeRequest, Promiser, Reply, RouteFuture,
    RouteHandler, SerdeTransformer, Transformer, Wrapper, json_wrapper,
};
pub use template::{Params, RoutePattern, Slot, SlotKind};

#[cfg(feature = "axum")]
pub mod axum;
pub mod client;
pub mod codec;
pub mod error;
pub mod schema;
pub mod server;
pub mod template;
pub mod transports;
