//! Transport seam for proxied requests.
//!
//! [`Transport`] is the single operation the facade needs from the network:
//! send one fully built request, once. [`HttpTransport`] is the production
//! implementation on top of `reqwest`; tests substitute their own
//! implementations returning canned responses or failures.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use tracing::{debug, instrument};

use super::constants::REQUEST_TIMEOUT;
use crate::user_agent;

/// Sends a built request and returns the response head with an unread body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` exactly once.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] when no response was obtained at all.
    /// A response with any status code, 4xx and 5xx included, is `Ok`.
    async fn send(&self, request: Request) -> Result<Response, TransportFailure>;
}

/// What the error classifier needs to know about a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// The client-level deadline elapsed.
    pub deadline_exceeded: bool,
    /// First `std::io::ErrorKind` found in the error's source chain.
    pub io_kind: Option<std::io::ErrorKind>,
    /// The error and all of its sources, joined with `": "`.
    pub message: String,
}

impl TransportFailure {
    /// Creates a failure that carries only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            deadline_exceeded: false,
            io_kind: None,
            message: message.into(),
        }
    }

    /// Creates a client deadline failure.
    pub fn deadline(message: impl Into<String>) -> Self {
        Self {
            deadline_exceeded: true,
            ..Self::new(message)
        }
    }

    /// Creates a failure caused by an I/O error of the given kind.
    pub fn io(kind: std::io::ErrorKind, message: impl Into<String>) -> Self {
        Self {
            io_kind: Some(kind),
            ..Self::new(message)
        }
    }

    /// Extracts the classification inputs from a `reqwest` error.
    #[must_use]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let io_kind = sources(error).find_map(|source| {
            source
                .downcast_ref::<std::io::Error>()
                .map(std::io::Error::kind)
        });
        // reqwest reports both its own deadline and socket timeouts through
        // `is_timeout`; a `TimedOut` I/O error in the chain means the latter.
        let deadline_exceeded =
            error.is_timeout() && io_kind != Some(std::io::ErrorKind::TimedOut);

        Self {
            deadline_exceeded,
            io_kind,
            message: error_chain_message(error),
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(error: reqwest::Error) -> Self {
        Self::from_reqwest(&error)
    }
}

/// Production transport backed by a pooled `reqwest` client.
///
/// Built once and shared; every call is independent. The client follows
/// redirects with reqwest's default policy, honors system proxy settings, and
/// has no response decompression enabled.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport with the 60 second total timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice; use [`try_new`](Self::try_new)
    /// to handle the error instead.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::try_new().expect("failed to build HTTP client with static configuration")
    }

    /// Creates a transport with the 60 second total timeout.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    pub fn try_new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Creates a transport with a custom total timeout.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent::default_proxy_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn send(&self, request: Request) -> Result<Response, TransportFailure> {
        let response = self.client.execute(request).await.map_err(|e| {
            let failure = TransportFailure::from_reqwest(&e);
            debug!(error = %failure.message, "transport failed");
            failure
        })?;
        debug!(status = response.status().as_u16(), "response head received");
        Ok(response)
    }
}

fn sources<'a>(error: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(error), |&e| e.source())
}

/// Renders an error and all of its sources, skipping repeated messages.
pub(crate) fn error_chain_message(error: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    for source in sources(error) {
        let text = source.to_string();
        if parts.last().is_none_or(|last| !last.contains(&text)) {
            parts.push(text);
        }
    }
    parts.join(": ")
}
