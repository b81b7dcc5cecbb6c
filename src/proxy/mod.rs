//! Outbound request execution.
//!
//! Turns a [`RequestDescriptor`](crate::model::RequestDescriptor) into a real
//! HTTP call and the call's outcome into a [`ResponseResult`]:
//!
//! - [`RequestBuilder`] materializes the wire request (query, body, headers, auth)
//! - [`Transport`] sends it once under a bounded timeout
//! - the normalizer caps, decompresses, and classifies the body
//! - [`classify_transport_failure`] maps failures onto [`ProxyError`]
//!
//! [`ProxyService`] wires these together and is the only entry point callers
//! need.
//!
//! # Example
//!
//! ```no_run
//! use apiprobe_core::model::{KeyValue, RequestDescriptor};
//! use apiprobe_core::proxy::ProxyService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ProxyService::try_new()?;
//! let descriptor = RequestDescriptor::new("GET", "httpbin.org/get")
//!     .with_param(KeyValue::new("q", "rust"));
//!
//! let result = service.execute(&descriptor).await;
//! match result.error {
//!     Some(error) => eprintln!("failed: {error}"),
//!     None => println!("{} in {} ms", result.status_code, result.elapsed_ms),
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod constants;
mod error;
mod error_mapping;
mod normalizer;
mod response;
mod service;
mod transport;

pub use builder::RequestBuilder;
pub use constants::{MAX_BODY_BYTES, REQUEST_TIMEOUT, REQUEST_TIMEOUT_SECS};
pub use error::ProxyError;
pub use error_mapping::classify_transport_failure;
pub use normalizer::{NormalizedBody, normalize_body, read_capped};
pub use response::{HeaderValues, ResponseResult};
pub use service::ProxyService;
pub use transport::{HttpTransport, Transport, TransportFailure};
