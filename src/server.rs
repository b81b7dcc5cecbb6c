//! HTTP boundary for the UI.
//!
//! Routes:
//! - `POST /api/proxy/send` executes a [`RequestDescriptor`] and answers with
//!   its [`ResponseResult`]
//! - `GET /api/health` liveness probe
//!
//! A proxied call that fails still answers 200; the failure travels in the
//! result's `error` field. Only a body that is not a valid descriptor gets a
//! 400.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::model::RequestDescriptor;
use crate::proxy::ProxyService;

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 17780;

/// Where the HTTP boundary listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port`, suitable for `TcpListener::bind`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Builds the router with `service` as shared state.
#[must_use]
pub fn router(service: Arc<ProxyService>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/proxy/send", post(send))
        .with_state(service)
}

/// Serves the router on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the accept loop.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<ProxyService>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        message: "Service is running",
    })
}

async fn send(State(service): State<Arc<ProxyService>>, body: Bytes) -> Response {
    let descriptor = match parse_descriptor(&body) {
        Ok(descriptor) => descriptor,
        Err(detail) => {
            warn!(error = %detail, "rejected malformed proxy request");
            let body = ErrorBody {
                error: format!("Invalid JSON format: {detail}"),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    debug!(method = %descriptor.method, url = %descriptor.url, "proxy request received");
    Json(service.execute(&descriptor).await).into_response()
}

/// Decodes the first JSON value of `body`; anything after it is ignored.
///
/// A top-level `null` is an empty descriptor.
fn parse_descriptor(body: &[u8]) -> Result<RequestDescriptor, String> {
    match serde_json::Deserializer::from_slice(body)
        .into_iter::<Option<RequestDescriptor>>()
        .next()
    {
        Some(Ok(descriptor)) => Ok(descriptor.unwrap_or_else(|| RequestDescriptor::new("", ""))),
        Some(Err(e)) => Err(e.to_string()),
        None => Err("empty request body".to_string()),
    }
}
