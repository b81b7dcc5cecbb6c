//! Response body capture and normalization.
//!
//! Bodies are read up to [`MAX_BODY_BYTES`] and then turned into something the
//! JSON boundary can carry: gzip payloads are transparently decoded (whatever
//! the response headers claim), valid UTF-8 without NUL bytes is returned as
//! text, and everything else is base64-encoded and flagged as binary.

use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::MultiGzDecoder;
use futures_util::StreamExt;
use reqwest::Response;
use tracing::debug;

use super::constants::{GZIP_MAGIC, MAX_BODY_BYTES};
use super::error::ProxyError;
use super::transport::error_chain_message;

/// A body ready to be placed in a [`ResponseResult`](super::ResponseResult).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBody {
    /// UTF-8 text, or standard base64 when `is_binary` is set.
    pub body: String,
    pub is_binary: bool,
}

/// Reads the response body, keeping at most [`MAX_BODY_BYTES`].
///
/// Bytes past the cap are never read; truncation is silent.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if the body stream fails before the cap is hit.
pub async fn read_capped(response: Response) -> Result<Vec<u8>, ProxyError> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ProxyError::io(error_chain_message(&e)))?;
        let remaining = MAX_BODY_BYTES - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            debug!(limit = MAX_BODY_BYTES, "response body reached size cap");
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Decodes gzip when present and picks the text or base64 representation.
#[must_use]
pub fn normalize_body(raw: Vec<u8>) -> NormalizedBody {
    let payload = if raw.starts_with(&GZIP_MAGIC) {
        gunzip(&raw).unwrap_or(raw)
    } else {
        raw
    };

    if payload.contains(&0) {
        return binary(&payload);
    }
    match String::from_utf8(payload) {
        Ok(body) => NormalizedBody {
            body,
            is_binary: false,
        },
        Err(e) => binary(e.as_bytes()),
    }
}

/// Decompresses every gzip member; `None` if the stream is not valid gzip.
fn gunzip(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoded = Vec::new();
    match MultiGzDecoder::new(data)
        .take(MAX_BODY_BYTES as u64)
        .read_to_end(&mut decoded)
    {
        Ok(_) => Some(decoded),
        Err(e) => {
            debug!(error = %e, "gzip magic present but decoding failed, keeping raw bytes");
            None
        }
    }
}

fn binary(bytes: &[u8]) -> NormalizedBody {
    NormalizedBody {
        body: STANDARD.encode(bytes),
        is_binary: true,
    }
}
