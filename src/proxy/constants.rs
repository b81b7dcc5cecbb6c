//! Constants for the proxy module (timeouts, body limits, placeholders).

use std::time::Duration;

/// Total timeout for one outbound call: connect, write, and read headers/body.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// [`REQUEST_TIMEOUT_SECS`] as a `Duration`.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(REQUEST_TIMEOUT_SECS);

/// Maximum response body bytes kept (10 MiB). Anything beyond is dropped silently.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Leading bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Filename sent for file-kind form-data entries.
pub const FILE_PLACEHOLDER_NAME: &str = "test.bin";

/// Content sent for file-kind form-data entries.
pub const FILE_PLACEHOLDER_CONTENT: &[u8] = b"[File Upload]";

/// MIME type of the placeholder file part.
pub const FILE_PLACEHOLDER_MIME: &str = "application/octet-stream";

/// Content-Type of url-encoded bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
