//! HTTP response building module
//!
//! Builders for the status codes the service emits. A builder failure is
//! logged and degrades to a bare response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;

/// Methods accepted on the invoke path
pub const INVOKE_ALLOW: &str = "POST, OPTIONS";

/// Build 200 JSON response from a serializable value
pub fn build_json_response<T: Serialize>(
    value: &T,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(json) => build_json_bytes(StatusCode::OK, Bytes::from(json), http_config),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                http_config,
            )
        }
    }
}

/// Build JSON error object `{"error": message}` with the given status
pub fn build_error_response(
    status: StatusCode,
    message: &str,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message }).to_string();
    build_json_bytes(status, Bytes::from(body), http_config)
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::BAD_REQUEST, message, http_config)
}

/// Build 404 Not Found response
pub fn build_404_response(http_config: &HttpConfig) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "Not Found", http_config)
}

/// Build 413 Payload Too Large response
pub fn build_413_response(http_config: &HttpConfig) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", http_config)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": "Method Not Allowed" }).to_string();
    base_builder(StatusCode::METHOD_NOT_ALLOWED, http_config)
        .header("Content-Type", "application/json")
        .header("Allow", allow)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(allow: &str, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    let mut builder = base_builder(StatusCode::NO_CONTENT, http_config).header("Allow", allow);

    if http_config.enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", allow)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build health check response (200 OK, plain text)
pub fn build_health_response(
    status: &str,
    is_head: bool,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(status.to_string())
    };

    base_builder(StatusCode::OK, http_config)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache, no-store")
        .header("Content-Length", status.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::from(status.to_string())))
        })
}

fn build_json_bytes(
    status: StatusCode,
    body: Bytes,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    base_builder(status, http_config)
        .header("Content-Type", "application/json")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Status plus the headers every response carries
fn base_builder(status: StatusCode, http_config: &HttpConfig) -> hyper::http::response::Builder {
    let mut builder = Response::builder()
        .status(status)
        .header("Server", &http_config.server_name);

    if http_config.enable_cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }

    builder
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
