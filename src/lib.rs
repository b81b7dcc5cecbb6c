//! apiprobe Core Library
//!
//! Execution core of a local API-testing tool: it takes a request described
//! declaratively by the UI, sends it as real HTTP, and returns the remote
//! status, headers, and body (or a classified error) in a form the UI can
//! render directly.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`model`] - Declarative request model and its JSON wire form
//! - [`proxy`] - Request building, transport, body normalization, error mapping
//! - [`server`] - HTTP boundary (`POST /api/proxy/send`, `GET /api/health`)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod model;
pub mod proxy;
pub mod server;
mod user_agent;

// Re-export commonly used types
pub use model::{AuthConfig, BodyConfig, EntryKind, KeyValue, RequestDescriptor};
pub use proxy::{
    HttpTransport, ProxyError, ProxyService, ResponseResult, Transport, TransportFailure,
    classify_transport_failure,
};
pub use server::{ServerConfig, router};
