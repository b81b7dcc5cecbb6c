//! Error taxonomy for proxied calls.
//!
//! Every variant is terminal for the current call. None of them escape the
//! [`ProxyService`](super::ProxyService) facade: they are rendered into the
//! `error` field of a [`ResponseResult`](super::ResponseResult) instead.
//!
//! The Display form is what the UI shows. Kinds without detail render as their
//! bare code (`Timeout`, `ConnectionRefused`, ...); kinds that carry a message
//! render as `<Code>: <message>`.

use thiserror::Error;

/// Errors that can occur while building, sending, or reading a proxied request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// The URL could not be parsed, even after the `http://` fallback.
    #[error("InvalidURL: {message}")]
    InvalidUrl {
        /// Parser message.
        message: String,
    },

    /// The method, a header, or a body part cannot be put on the wire.
    #[error("InvalidRequest: {message}")]
    InvalidRequest {
        /// What was rejected and why.
        message: String,
    },

    /// The client deadline elapsed before a response arrived.
    #[error("Timeout")]
    Timeout,

    /// A socket-level operation timed out.
    #[error("NetworkTimeout")]
    NetworkTimeout,

    /// The target actively refused the connection.
    #[error("ConnectionRefused")]
    ConnectionRefused,

    /// The target host name could not be resolved.
    #[error("DNSFailure")]
    DnsFailure,

    /// Any other failure to obtain a response.
    #[error("NetworkError: {message}")]
    Network {
        /// Full transport error chain.
        message: String,
    },

    /// Reading the body failed after the response head arrived.
    #[error("IOError: {message}")]
    Io {
        /// Underlying read error.
        message: String,
    },
}

impl ProxyError {
    /// Creates an invalid URL error.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a generic network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a body read error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Stable machine-readable code of this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "InvalidURL",
            Self::InvalidRequest { .. } => "InvalidRequest",
            Self::Timeout => "Timeout",
            Self::NetworkTimeout => "NetworkTimeout",
            Self::ConnectionRefused => "ConnectionRefused",
            Self::DnsFailure => "DNSFailure",
            Self::Network { .. } => "NetworkError",
            Self::Io { .. } => "IOError",
        }
    }
}
