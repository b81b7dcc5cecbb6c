//! Turns a [`RequestDescriptor`] into a wire-ready `reqwest::Request`.
//!
//! Steps run in a fixed order, each later step overwriting what earlier ones
//! set:
//!
//! 1. method and URL (scheme fallback, query merge)
//! 2. body and its derived Content-Type
//! 3. explicit headers (except the body framing headers, which always
//!    describe the materialized body)
//! 4. removal of `Accept-Encoding`
//! 5. configured auth

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{
    ACCEPT_ENCODING, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName,
    HeaderValue, TRANSFER_ENCODING,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Request};
use tracing::debug;
use url::Url;
use url::form_urlencoded;

use super::constants::{
    FILE_PLACEHOLDER_CONTENT, FILE_PLACEHOLDER_MIME, FILE_PLACEHOLDER_NAME, FORM_URLENCODED,
};
use super::error::ProxyError;
use crate::model::{AuthConfig, BodyConfig, EntryKind, KeyValue, RequestDescriptor};

/// Builds outbound requests from descriptors.
///
/// Holds a `reqwest::Client` only as a request factory (multipart bodies can
/// only be attached through a client's `RequestBuilder`); nothing is sent here.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    client: Client,
}

impl RequestBuilder {
    /// Creates a builder that uses `client` as its request factory.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the outbound request described by `descriptor`.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::InvalidUrl`] if the URL cannot be parsed.
    /// - [`ProxyError::InvalidRequest`] if the method, a header, or the auth
    ///   value cannot be represented on the wire.
    pub fn build(&self, descriptor: &RequestDescriptor) -> Result<Request, ProxyError> {
        let method = parse_method(&descriptor.method)?;
        let url = build_url(&descriptor.url, &descriptor.params)?;
        debug!(%method, %url, "building request");

        let mut request = attach_body(self.client.request(method, url), &descriptor.body)?
            .build()
            .map_err(|e| ProxyError::invalid_url(e.to_string()))?;

        let headers = request.headers_mut();
        apply_headers(headers, &descriptor.headers)?;
        headers.remove(ACCEPT_ENCODING);
        apply_auth(headers, &descriptor.auth)?;

        Ok(request)
    }
}

fn parse_method(method: &str) -> Result<Method, ProxyError> {
    Method::from_bytes(method.as_bytes())
        .map_err(|_| ProxyError::invalid_request(format!("invalid HTTP method: {method:?}")))
}

/// Normalizes the scheme and merges enabled params into the query.
fn build_url(raw: &str, params: &[KeyValue]) -> Result<Url, ProxyError> {
    let raw = raw.trim();
    let candidate = if has_http_scheme(raw) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("http://{raw}"))
    };
    let mut url = Url::parse(&candidate).map_err(|e| ProxyError::invalid_url(e.to_string()))?;

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    pairs.extend(active_pairs(params));
    let query = encode_pairs(pairs);
    url.set_query((!query.is_empty()).then_some(query.as_str()));

    Ok(url)
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

fn active_pairs(entries: &[KeyValue]) -> impl Iterator<Item = (String, String)> + '_ {
    entries
        .iter()
        .filter(|entry| entry.is_active())
        .map(|entry| (entry.key.clone(), entry.value.clone()))
}

/// Form-encodes pairs ordered by key; values of one key keep their order.
fn encode_pairs(mut pairs: Vec<(String, String)>) -> String {
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn attach_body(
    builder: reqwest::RequestBuilder,
    body: &BodyConfig,
) -> Result<reqwest::RequestBuilder, ProxyError> {
    let builder = match body {
        BodyConfig::None => builder,
        BodyConfig::Raw { content } if content.is_empty() => builder,
        BodyConfig::Raw { content } => builder.body(content.clone()),
        BodyConfig::UrlEncoded { entries } => builder
            .header(CONTENT_TYPE, FORM_URLENCODED)
            .body(encode_pairs(active_pairs(entries).collect())),
        BodyConfig::FormData { entries } => builder.multipart(build_form(entries)?),
    };
    Ok(builder)
}

fn build_form(entries: &[KeyValue]) -> Result<Form, ProxyError> {
    let mut form = Form::new();
    for entry in entries.iter().filter(|entry| entry.is_active()) {
        form = match entry.kind {
            EntryKind::Text => form.text(entry.key.clone(), entry.value.clone()),
            EntryKind::File => {
                let part = Part::bytes(FILE_PLACEHOLDER_CONTENT)
                    .file_name(FILE_PLACEHOLDER_NAME)
                    .mime_str(FILE_PLACEHOLDER_MIME)
                    .map_err(|e| ProxyError::invalid_request(e.to_string()))?;
                form.part(entry.key.clone(), part)
            }
        };
    }
    Ok(form)
}

fn apply_headers(headers: &mut HeaderMap, entries: &[KeyValue]) -> Result<(), ProxyError> {
    for entry in entries.iter().filter(|entry| entry.enabled) {
        let key = entry.key.trim();
        if key.is_empty() {
            continue;
        }
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ProxyError::invalid_request(format!("invalid header name: {key:?}")))?;
        if name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
            debug!(header = %name, "ignoring explicit body framing header");
            continue;
        }
        let value = HeaderValue::from_bytes(entry.value.as_bytes()).map_err(|_| {
            ProxyError::invalid_request(format!("invalid value for header {key:?}"))
        })?;
        headers.insert(name, value);
    }
    Ok(())
}

fn apply_auth(headers: &mut HeaderMap, auth: &AuthConfig) -> Result<(), ProxyError> {
    let credentials = match auth {
        AuthConfig::None => return Ok(()),
        AuthConfig::Basic { username, password } => {
            format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
        }
        AuthConfig::Bearer { token } => format!("Bearer {token}"),
    };
    let mut value = HeaderValue::from_bytes(credentials.as_bytes())
        .map_err(|_| ProxyError::invalid_request("invalid characters in auth credentials"))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(())
}
