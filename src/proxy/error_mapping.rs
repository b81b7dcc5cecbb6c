use std::io::ErrorKind;

use super::error::ProxyError;
use super::transport::TransportFailure;

/// Substrings that identify a host name resolution failure across resolvers.
const DNS_FAILURE_MARKERS: &[&str] = &[
    "no such host",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "temporary failure in name resolution",
];

/// Maps a failed transport attempt onto the user-facing taxonomy.
///
/// Only called when no response was obtained; a remote 4xx/5xx never gets here.
/// Checks run in precedence order, so a deadline wins over anything found in
/// the message.
#[must_use]
pub fn classify_transport_failure(failure: &TransportFailure) -> ProxyError {
    if failure.deadline_exceeded {
        return ProxyError::Timeout;
    }
    if failure.io_kind == Some(ErrorKind::TimedOut) {
        return ProxyError::NetworkTimeout;
    }

    let message = failure.message.to_ascii_lowercase();
    if failure.io_kind == Some(ErrorKind::ConnectionRefused)
        || message.contains("connection refused")
    {
        return ProxyError::ConnectionRefused;
    }
    if DNS_FAILURE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
    {
        return ProxyError::DnsFailure;
    }

    ProxyError::network(failure.message.clone())
}
