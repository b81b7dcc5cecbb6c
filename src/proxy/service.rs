//! Execution facade: build, send, normalize.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::{info, instrument, warn};

use super::builder::RequestBuilder;
use super::error_mapping::classify_transport_failure;
use super::normalizer::{normalize_body, read_capped};
use super::response::{HeaderValues, ResponseResult};
use super::transport::{HttpTransport, Transport};
use crate::model::RequestDescriptor;

/// Single entry point for executing a [`RequestDescriptor`].
///
/// Holds no per-call state, so one instance is shared (behind an `Arc`) by
/// every concurrent caller.
#[derive(Clone)]
pub struct ProxyService {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ProxyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyService")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl ProxyService {
    /// Creates a service on top of the production [`HttpTransport`].
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built with the static
    /// configuration. Use [`try_new`](Self::try_new) to handle the error.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::try_new().expect("failed to build HTTP client with static configuration")
    }

    /// Creates a service on top of the production [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    pub fn try_new() -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::try_new()?;
        Ok(Self {
            builder: RequestBuilder::new(transport.inner().clone()),
            transport: Arc::new(transport),
        })
    }

    /// Creates a service that sends through `transport`.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the request factory client cannot be built.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Result<Self, reqwest::Error> {
        let factory = Client::builder().build()?;
        Ok(Self {
            builder: RequestBuilder::new(factory),
            transport,
        })
    }

    /// Executes one build, send, normalize cycle.
    ///
    /// Never fails: every problem is reported through
    /// [`ResponseResult::error`].
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method, url = %descriptor.url))]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> ResponseResult {
        let request = match self.builder.build(descriptor) {
            Ok(request) => request,
            Err(error) => {
                warn!(code = error.code(), error = %error, "request rejected before sending");
                return ResponseResult::failed(&error, 0);
            }
        };

        let started = Instant::now();
        let sent = self.transport.send(request).await;
        let elapsed_ms = elapsed_millis(started);

        let response = match sent {
            Ok(response) => response,
            Err(failure) => {
                let error = classify_transport_failure(&failure);
                warn!(
                    code = error.code(),
                    detail = %failure.message,
                    elapsed_ms,
                    "request failed"
                );
                return ResponseResult::failed(&error, elapsed_ms);
            }
        };

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());

        let raw = match read_capped(response).await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(status, error = %error, "failed to read response body");
                return ResponseResult::read_failed(status, &error, elapsed_ms);
            }
        };

        let bytes = raw.len();
        let body = normalize_body(raw);
        info!(
            status,
            bytes,
            is_binary = body.is_binary,
            elapsed_ms,
            "request completed"
        );
        ResponseResult::completed(status, headers, body, elapsed_ms)
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Groups header values under their canonical names, keeping arrival order.
fn collect_headers(headers: &HeaderMap) -> HeaderValues {
    let mut collected = HeaderValues::new();
    for (name, value) in headers {
        collected
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

/// `content-type` becomes `Content-Type`.
fn canonical_header_name(name: &str) -> String {
    let mut upper_next = true;
    name.chars()
        .map(|c| {
            let out = if upper_next {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper_next = c == '-';
            out
        })
        .collect()
}
