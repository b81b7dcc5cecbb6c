//! Integration tests for the proxy execution path.
//!
//! These tests drive `ProxyService` through the real `HttpTransport` against
//! mock HTTP servers.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use apiprobe_core::model::{AuthConfig, BodyConfig, KeyValue, RequestDescriptor};
use apiprobe_core::proxy::{HttpTransport, MAX_BODY_BYTES, ProxyService};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::GzEncoder;
use wiremock::matchers::{basic_auth, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Helper to mount a single GET endpoint.
async fn setup_mock_get(path_str: &str, template: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(template)
        .mount(&mock_server)
        .await;
    mock_server
}

// ==================== Status forwarding ====================

#[tokio::test]
async fn test_remote_404_is_forwarded_without_error() {
    let mock_server =
        setup_mock_get("/missing", ResponseTemplate::new(404).set_body_string("nope")).await;

    let url = format!("{}/missing", mock_server.uri());
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert_eq!(result.status_code, 404);
    assert_eq!(result.error, None);
    assert_eq!(result.body, "nope");
    assert!(!result.is_binary);
}

#[tokio::test]
async fn test_remote_500_keeps_headers() {
    let mock_server = setup_mock_get(
        "/boom",
        ResponseTemplate::new(500)
            .insert_header("X-Request-Id", "abc-123")
            .set_body_string(r#"{"error":"internal"}"#),
    )
    .await;

    let url = format!("{}/boom", mock_server.uri());
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert_eq!(result.status_code, 500);
    assert!(result.error.is_none());
    assert_eq!(result.headers["X-Request-Id"], vec!["abc-123"]);
    assert_eq!(result.body, r#"{"error":"internal"}"#);
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/old", mock_server.uri());
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert_eq!(result.status_code, 200);
    assert_eq!(result.body, "moved here");
}

// ==================== Body normalization ====================

#[tokio::test]
async fn test_gzip_body_is_decoded_regardless_of_headers() {
    let mock_server = setup_mock_get(
        "/archive",
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "application/x-gzip")
            .set_body_bytes(gzip(b"compressed text payload")),
    )
    .await;

    let url = format!("{}/archive", mock_server.uri());
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert_eq!(result.body, "compressed text payload");
    assert!(!result.is_binary);
    assert_eq!(result.headers["Content-Type"], vec!["application/x-gzip"]);
}

#[tokio::test]
async fn test_content_encoding_gzip_is_reported_and_decoded() {
    let mock_server = setup_mock_get(
        "/encoded",
        ResponseTemplate::new(200)
            .insert_header("Content-Encoding", "gzip")
            .set_body_bytes(gzip(br#"{"ok":true}"#)),
    )
    .await;

    let url = format!("{}/encoded", mock_server.uri());
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert_eq!(result.body, r#"{"ok":true}"#);
    assert_eq!(result.headers["Content-Encoding"], vec!["gzip"]);
}

#[tokio::test]
async fn test_binary_body_is_base64_encoded() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00];
    let mock_server = setup_mock_get(
        "/logo.png",
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "image/png")
            .set_body_bytes(png.clone()),
    )
    .await;

    let url = format!("{}/logo.png", mock_server.uri());
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert!(result.is_binary);
    assert_eq!(STANDARD.decode(&result.body).expect("valid base64"), png);
}

#[tokio::test]
async fn test_oversized_body_is_truncated_to_cap() {
    let mock_server = setup_mock_get(
        "/huge",
        ResponseTemplate::new(200).set_body_bytes(vec![b'x'; MAX_BODY_BYTES + 1024]),
    )
    .await;

    let url = format!("{}/huge", mock_server.uri());
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert!(result.error.is_none());
    assert_eq!(result.body.len(), MAX_BODY_BYTES);
}

// ==================== Request construction on the wire ====================

#[tokio::test]
async fn test_params_and_headers_reach_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("page", "2"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = RequestDescriptor::new("GET", format!("{}/search", mock_server.uri()))
        .with_param(KeyValue::new("q", "rust"))
        .with_param(KeyValue::new("page", "2"))
        .with_param(KeyValue::new("debug", "1").disabled())
        .with_header(KeyValue::new("X-Api-Key", "secret"));

    let result = ProxyService::new().execute(&descriptor).await;
    assert_eq!(result.body, "matched");

    let requests = mock_server.received_requests().await.expect("recording on");
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("debug"), "disabled param leaked: {query}");
}

#[tokio::test]
async fn test_accept_encoding_is_not_sent_and_user_agent_is_set() {
    let mock_server = setup_mock_get("/plain", ResponseTemplate::new(200)).await;

    let descriptor = RequestDescriptor::new("GET", format!("{}/plain", mock_server.uri()))
        .with_header(KeyValue::new("Accept-Encoding", "gzip"));
    ProxyService::new().execute(&descriptor).await;

    let requests = mock_server.received_requests().await.expect("recording on");
    let headers = &requests[0].headers;
    assert!(headers.get("accept-encoding").is_none());
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(user_agent.starts_with("apiprobe/"), "got {user_agent}");
}

#[tokio::test]
async fn test_url_encoded_body_reaches_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("a=1"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = RequestDescriptor::new("POST", format!("{}/form", mock_server.uri()))
        .with_body(BodyConfig::UrlEncoded {
            entries: vec![KeyValue::new("a", "1"), KeyValue::new("b", "2").disabled()],
        });

    let result = ProxyService::new().execute(&descriptor).await;
    assert_eq!(result.status_code, 201);
}

#[tokio::test]
async fn test_pasted_content_length_does_not_truncate_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_string("hello world"))
        .respond_with(ResponseTemplate::new(200).set_body_string("full body"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = RequestDescriptor::new("POST", format!("{}/echo", mock_server.uri()))
        .with_header(KeyValue::new("Content-Length", "5"))
        .with_body(BodyConfig::Raw {
            content: "hello world".to_string(),
        });

    let result = ProxyService::new().execute(&descriptor).await;
    assert_eq!(result.error, None);
    assert_eq!(result.body, "full body");

    let requests = mock_server.received_requests().await.expect("recording on");
    assert_eq!(requests[0].body, b"hello world");
    assert_eq!(
        requests[0]
            .headers
            .get("content-length")
            .and_then(|v| v.to_str().ok()),
        Some("11")
    );
}

#[tokio::test]
async fn test_form_data_sends_fields_and_placeholder_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let descriptor = RequestDescriptor::new("POST", format!("{}/upload", mock_server.uri()))
        .with_body(BodyConfig::FormData {
            entries: vec![
                KeyValue::new("title", "quarterly report"),
                KeyValue::file("attachment"),
                KeyValue::new("draft", "yes").disabled(),
            ],
        });

    let result = ProxyService::new().execute(&descriptor).await;
    assert_eq!(result.status_code, 200);

    let requests = mock_server.received_requests().await.expect("recording on");
    let request = &requests[0];
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="title""#));
    assert!(body.contains("quarterly report"));
    assert!(body.contains(r#"name="attachment"; filename="test.bin""#));
    assert!(body.contains("[File Upload]"));
    assert!(!body.contains(r#"name="draft""#));
}

#[tokio::test]
async fn test_basic_auth_reaches_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .and(basic_auth("u", "p"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = RequestDescriptor::new("GET", format!("{}/private", mock_server.uri()))
        .with_header(KeyValue::new("Authorization", "Bearer stale"))
        .with_auth(AuthConfig::Basic {
            username: "u".to_string(),
            password: "p".to_string(),
        });

    let result = ProxyService::new().execute(&descriptor).await;
    assert_eq!(result.body, "welcome");
}

// ==================== Failure classification ====================

#[tokio::test]
async fn test_slow_server_is_timeout() {
    let mock_server = setup_mock_get(
        "/slow",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(3)),
    )
    .await;

    let transport =
        HttpTransport::with_timeout(Duration::from_millis(200)).expect("client builds");
    let service = ProxyService::with_transport(Arc::new(transport)).expect("service builds");

    let url = format!("{}/slow", mock_server.uri());
    let result = service.execute(&RequestDescriptor::new("GET", url)).await;

    assert_eq!(result.error.as_deref(), Some("Timeout"));
    assert_eq!(result.status_code, 0);
    assert!(result.elapsed_ms >= 150, "elapsed {}", result.elapsed_ms);
}

#[tokio::test]
async fn test_closed_port_is_connection_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };

    let url = format!("http://127.0.0.1:{port}/");
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", url))
        .await;

    assert_eq!(result.error.as_deref(), Some("ConnectionRefused"));
    assert_eq!(result.status_code, 0);
    assert!(result.body.is_empty());
}

#[tokio::test]
async fn test_unresolvable_host_is_dns_failure() {
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new(
            "GET",
            "http://apiprobe-does-not-exist.invalid/",
        ))
        .await;

    assert_eq!(result.error.as_deref(), Some("DNSFailure"));
}

#[tokio::test]
async fn test_invalid_url_never_hits_network() {
    let result = ProxyService::new()
        .execute(&RequestDescriptor::new("GET", "http://exa mple.com/"))
        .await;

    assert_eq!(result.elapsed_ms, 0);
    assert!(
        result
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("InvalidURL: ")),
        "got {:?}",
        result.error
    );
}
