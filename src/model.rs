//! Declarative request model authored by the UI.
//!
//! The JSON payload posted by the frontend is flat and loosely typed: the body
//! is selected by a `body_type` string next to three sibling fields, and auth
//! carries both a `basic` and a `bearer` object whatever `auth.type` says.
//! This module converts that payload into closed enums ([`BodyConfig`],
//! [`AuthConfig`]) on deserialization, so the builder never sees a
//! combination it would have to ignore.
//!
//! # Example
//!
//! ```
//! use apiprobe_core::model::{AuthConfig, BodyConfig, RequestDescriptor};
//!
//! let descriptor: RequestDescriptor = serde_json::from_str(
//!     r#"{"method":"post","url":"example.com/items","body_type":"raw","raw_body":"{}",
//!        "auth":{"type":"bearer","bearer":{"token":"t0k"}}}"#,
//! ).unwrap();
//!
//! assert_eq!(descriptor.method, "POST");
//! assert_eq!(descriptor.body, BodyConfig::Raw { content: "{}".to_string() });
//! assert_eq!(descriptor.auth, AuthConfig::Bearer { token: "t0k".to_string() });
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Wire value of `body_type` that disables the request body.
pub const BODY_TYPE_NONE: &str = "none";
/// Wire value of `body_type` for a literal string body.
pub const BODY_TYPE_RAW: &str = "raw";
/// Wire value of `body_type` for an `application/x-www-form-urlencoded` body.
pub const BODY_TYPE_URL_ENCODED: &str = "x-www-form-urlencoded";
/// Wire value of `body_type` for a `multipart/form-data` body.
pub const BODY_TYPE_FORM_DATA: &str = "form-data";

/// Kind of a key/value entry. Only form-data bodies distinguish the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// File upload slot; materialized as a placeholder part.
    File,
    /// Plain text field. Unrecognized kinds land here too.
    #[default]
    #[serde(other)]
    Text,
}

/// One parameter, header, or form entry as edited in the UI.
///
/// Disabled entries stay in the descriptor so the UI can round-trip them,
/// but never reach the wire. Duplicate keys are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_text"
    )]
    pub kind: EntryKind,
}

impl KeyValue {
    /// Creates an enabled text entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
            ..Self::default()
        }
    }

    /// Creates an enabled file entry.
    pub fn file(key: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File,
            ..Self::new(key, "")
        }
    }

    /// Returns the same entry with `enabled` cleared.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this entry should be materialized on the wire.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty()
    }
}

/// Authentication applied to the outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
}

/// Request body description. Exactly one variant materializes per send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BodyConfig {
    #[default]
    None,
    /// Literal string body; Content-Type is left to explicit headers.
    Raw { content: String },
    /// `application/x-www-form-urlencoded` pairs.
    UrlEncoded { entries: Vec<KeyValue> },
    /// `multipart/form-data` parts.
    FormData { entries: Vec<KeyValue> },
}

/// User-authored description of one outbound HTTP call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RequestPayload", into = "RequestPayload")]
pub struct RequestDescriptor {
    /// Upper-cased HTTP method; defaults to `GET`.
    pub method: String,
    pub url: String,
    pub params: Vec<KeyValue>,
    pub headers: Vec<KeyValue>,
    pub auth: AuthConfig,
    pub body: BodyConfig,
}

impl RequestDescriptor {
    /// Creates a body-less, unauthenticated descriptor.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: normalize_method(&method.into()),
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: KeyValue) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: KeyValue) -> Self {
        self.headers.push(header);
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: BodyConfig) -> Self {
        self.body = body;
        self
    }
}

fn normalize_method(method: &str) -> String {
    let method = method.trim();
    if method.is_empty() {
        "GET".to_string()
    } else {
        method.to_ascii_uppercase()
    }
}

fn is_text(kind: &EntryKind) -> bool {
    *kind == EntryKind::Text
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RequestPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    params: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    headers: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    auth: AuthPayload,
    #[serde(default, deserialize_with = "null_as_default")]
    body_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    raw_body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    form_data: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    url_encoded: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AuthPayload {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    basic: Option<BasicPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bearer: Option<BearerPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BasicPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BearerPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    token: String,
}

impl From<AuthPayload> for AuthConfig {
    fn from(payload: AuthPayload) -> Self {
        match payload.kind.as_str() {
            "basic" => {
                let basic = payload.basic.unwrap_or_default();
                Self::Basic {
                    username: basic.username,
                    password: basic.password,
                }
            }
            "bearer" => Self::Bearer {
                token: payload.bearer.unwrap_or_default().token,
            },
            _ => Self::None,
        }
    }
}

impl From<AuthConfig> for AuthPayload {
    fn from(auth: AuthConfig) -> Self {
        match auth {
            AuthConfig::None => Self::default(),
            AuthConfig::Basic { username, password } => Self {
                kind: "basic".to_string(),
                basic: Some(BasicPayload { username, password }),
                bearer: None,
            },
            AuthConfig::Bearer { token } => Self {
                kind: "bearer".to_string(),
                basic: None,
                bearer: Some(BearerPayload { token }),
            },
        }
    }
}

impl From<RequestPayload> for RequestDescriptor {
    fn from(payload: RequestPayload) -> Self {
        let body = match payload.body_type.as_str() {
            BODY_TYPE_NONE => BodyConfig::None,
            BODY_TYPE_URL_ENCODED => BodyConfig::UrlEncoded {
                entries: payload.url_encoded,
            },
            BODY_TYPE_FORM_DATA => BodyConfig::FormData {
                entries: payload.form_data,
            },
            // "raw" and anything unrecognized.
            _ => BodyConfig::Raw {
                content: payload.raw_body,
            },
        };

        Self {
            method: normalize_method(&payload.method),
            url: payload.url,
            params: payload.params,
            headers: payload.headers,
            auth: payload.auth.into(),
            body,
        }
    }
}

impl From<RequestDescriptor> for RequestPayload {
    fn from(descriptor: RequestDescriptor) -> Self {
        let mut payload = Self {
            method: descriptor.method,
            url: descriptor.url,
            params: descriptor.params,
            headers: descriptor.headers,
            auth: descriptor.auth.into(),
            ..Self::default()
        };
        match descriptor.body {
            BodyConfig::None => payload.body_type = BODY_TYPE_NONE.to_string(),
            BodyConfig::Raw { content } => {
                payload.body_type = BODY_TYPE_RAW.to_string();
                payload.raw_body = content;
            }
            BodyConfig::UrlEncoded { entries } => {
                payload.body_type = BODY_TYPE_URL_ENCODED.to_string();
                payload.url_encoded = entries;
            }
            BodyConfig::FormData { entries } => {
                payload.body_type = BODY_TYPE_FORM_DATA.to_string();
                payload.form_data = entries;
            }
        }
        payload
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RequestDescriptor {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_object_yields_get_with_empty_raw_body() {
        let descriptor = parse("{}");
        assert_eq!(descriptor.method, "GET");
        assert!(descriptor.url.is_empty());
        assert_eq!(descriptor.auth, AuthConfig::None);
        // Missing body_type falls back to the raw body, like any unknown value.
        assert_eq!(
            descriptor.body,
            BodyConfig::Raw {
                content: String::new()
            }
        );
    }

    #[test]
    fn test_body_type_selects_matching_sibling_field() {
        let descriptor = parse(
            r#"{"body_type":"x-www-form-urlencoded","raw_body":"ignored",
                "url_encoded":[{"key":"a","value":"1","enabled":true}],
                "form_data":[{"key":"f","value":"x","enabled":true}]}"#,
        );
        assert_eq!(
            descriptor.body,
            BodyConfig::UrlEncoded {
                entries: vec![KeyValue::new("a", "1")]
            }
        );

        let descriptor = parse(
            r#"{"body_type":"form-data","form_data":[{"key":"up","enabled":true,"type":"file"}]}"#,
        );
        assert_eq!(
            descriptor.body,
            BodyConfig::FormData {
                entries: vec![KeyValue::file("up")]
            }
        );
    }

    #[test]
    fn test_none_and_unknown_body_types() {
        assert_eq!(
            parse(r#"{"body_type":"none","raw_body":"x"}"#).body,
            BodyConfig::None
        );
        assert_eq!(
            parse(r#"{"body_type":"graphql","raw_body":"query {}"}"#).body,
            BodyConfig::Raw {
                content: "query {}".to_string()
            }
        );
    }

    #[test]
    fn test_auth_type_selects_single_variant() {
        let descriptor = parse(
            r#"{"auth":{"type":"basic","basic":{"username":"u","password":"p"},
                        "bearer":{"token":"stale"}}}"#,
        );
        assert_eq!(
            descriptor.auth,
            AuthConfig::Basic {
                username: "u".to_string(),
                password: "p".to_string()
            }
        );

        let descriptor = parse(r#"{"auth":{"type":"bearer"}}"#);
        assert_eq!(
            descriptor.auth,
            AuthConfig::Bearer {
                token: String::new()
            }
        );

        let descriptor = parse(r#"{"auth":{"type":"digest","basic":{"username":"u"}}}"#);
        assert_eq!(descriptor.auth, AuthConfig::None);
    }

    #[test]
    fn test_nulls_are_treated_as_missing() {
        let descriptor = parse(
            r#"{"method":null,"url":"x","params":null,"headers":[{"key":"k","value":null,"enabled":true,"type":null}],
                "auth":null,"body_type":null,"form_data":null}"#,
        );
        assert_eq!(descriptor.method, "GET");
        assert!(descriptor.params.is_empty());
        assert_eq!(descriptor.headers, vec![KeyValue::new("k", "")]);
        assert_eq!(descriptor.auth, AuthConfig::None);
    }

    #[test]
    fn test_entry_kind_unknown_value_is_text() {
        let entry: KeyValue =
            serde_json::from_str(r#"{"key":"a","value":"b","enabled":true,"type":"text"}"#)
                .unwrap();
        assert_eq!(entry.kind, EntryKind::Text);
        let entry: KeyValue =
            serde_json::from_str(r#"{"key":"a","enabled":true,"type":"binary"}"#).unwrap();
        assert_eq!(entry.kind, EntryKind::Text);
    }

    #[test]
    fn test_key_value_activity() {
        assert!(KeyValue::new("a", "1").is_active());
        assert!(!KeyValue::new("a", "1").disabled().is_active());
        assert!(!KeyValue::new("", "1").is_active());
    }

    #[test]
    fn test_method_is_upper_cased() {
        assert_eq!(parse(r#"{"method":"patch"}"#).method, "PATCH");
        assert_eq!(RequestDescriptor::new(" delete ", "x").method, "DELETE");
    }

    #[test]
    fn test_serializes_back_to_flat_wire_shape() {
        let descriptor = RequestDescriptor::new("POST", "http://h/p")
            .with_auth(AuthConfig::Basic {
                username: "u".to_string(),
                password: "p".to_string(),
            })
            .with_body(BodyConfig::FormData {
                entries: vec![KeyValue::new("a", "1")],
            });

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["body_type"], "form-data");
        assert_eq!(json["form_data"][0]["key"], "a");
        assert_eq!(json["auth"]["type"], "basic");
        assert_eq!(json["auth"]["basic"]["username"], "u");
        assert!(json["auth"].get("bearer").is_none());

        let back: RequestDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, descriptor);
    }
}
