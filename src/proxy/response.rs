//! Normalized outcome of one proxied call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ProxyError;
use super::normalizer::NormalizedBody;

/// Response headers: canonical name to values in arrival order.
pub type HeaderValues = BTreeMap<String, Vec<String>>;

/// What the UI receives for every call, successful or not.
///
/// When `error` is set the call produced no usable response: `status_code` is
/// 0 (or the remote status if only reading the body failed) and `headers` and
/// `body` are empty. A remote 4xx/5xx is a successful call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseResult {
    #[serde(rename = "status")]
    pub status_code: u16,
    #[serde(default)]
    pub headers: HeaderValues,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_binary: bool,
    /// Milliseconds from dispatch until the response head arrived.
    #[serde(rename = "time_ms", default)]
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseResult {
    /// A completed call carrying the remote status, headers, and body.
    #[must_use]
    pub fn completed(
        status_code: u16,
        headers: HeaderValues,
        body: NormalizedBody,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            status_code,
            headers,
            body: body.body,
            is_binary: body.is_binary,
            elapsed_ms,
            error: None,
        }
    }

    /// A call that failed before any response was obtained.
    #[must_use]
    pub fn failed(error: &ProxyError, elapsed_ms: u64) -> Self {
        Self {
            elapsed_ms,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// A call whose response head arrived but whose body could not be read.
    #[must_use]
    pub fn read_failed(status_code: u16, error: &ProxyError, elapsed_ms: u64) -> Self {
        Self {
            status_code,
            ..Self::failed(error, elapsed_ms)
        }
    }

    /// Whether the call produced a usable response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
