//! Default User-Agent for outbound proxied requests.
//!
//! Applied at the client level, so any `User-Agent` header the user sets on a
//! request replaces it.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/apiprobe/apiprobe";

/// Default User-Agent for proxied requests (identifies the tool).
#[must_use]
pub(crate) fn default_proxy_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("apiprobe/{version} (+{PROJECT_UA_URL})")
}
