//! Transport implementations for outbound API calls.
//!
//! This module defines the narrow interface the client call builder uses to
//! issue HTTP requests, plus an in-memory implementation. The core never
//! opens sockets itself: it shapes a [`WireRequest`] and hands it to
//! whatever [`Transport`] it was built with, making transports
//! interchangeable.

pub use in_memory::InMemory;
pub use loopback::Loopback;
pub use transport::{Transport, TransportFuture, WireRequest, WireResponse};

pub mod in_memory;
pub mod loopback;
pub mod transport;
