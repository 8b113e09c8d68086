//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health checks, the action
//! invoke endpoint, method validation and access logging.

use crate::action;
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Methods accepted on health and unknown paths
const DEFAULT_ALLOW: &str = "GET, HEAD, OPTIONS";

/// Outcome of routing, with the action path for the access log
struct Routed {
    response: Response<Full<Bytes>>,
    api_path: Option<String>,
}

impl From<Response<Full<Bytes>>> for Routed {
    fn from(response: Response<Full<Bytes>>) -> Self {
        Self {
            response,
            api_path: None,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.config.logging.access_log;

    let mut entry = access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.http_version = version_label(req.version()).to_string();
        entry.user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry
    });

    let routed = route_request(req, &state).await;

    if let Some(entry) = entry.as_mut() {
        entry.status = routed.response.status().as_u16();
        entry.body_bytes = usize::try_from(routed.response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.api_path = routed.api_path;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(routed.response)
}

/// Route request based on path and method
async fn route_request<B>(req: Request<B>, state: &Arc<AppState>) -> Routed
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let http_config = &state.config.http;
    let health = &state.config.routes.health;
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    // 0. Health check endpoints
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return match method {
            Method::GET | Method::HEAD => {
                http::build_health_response("ok", method == Method::HEAD, http_config).into()
            }
            Method::OPTIONS => http::build_options_response(DEFAULT_ALLOW, http_config).into(),
            _ => http::build_405_response(DEFAULT_ALLOW, http_config).into(),
        };
    }

    // 1. Action invoke endpoint
    if path == state.config.agent.invoke_path {
        return match method {
            Method::POST => invoke_action(req, state).await,
            Method::OPTIONS => http::build_options_response(http::INVOKE_ALLOW, http_config).into(),
            _ => {
                logger::log_warning(&format!("Method not allowed on {path}: {method}"));
                http::build_405_response(http::INVOKE_ALLOW, http_config).into()
            }
        };
    }

    // 2. Preflight on any other path
    if method == Method::OPTIONS {
        return http::build_options_response(DEFAULT_ALLOW, http_config).into();
    }

    http::build_404_response(http_config).into()
}

/// Decode the event body, run the action router and return the envelope
async fn invoke_action<B>(req: Request<B>, state: &Arc<AppState>) -> Routed
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let http_config = &state.config.http;
    let max_body_size = state.config.http.max_body_size;

    if let Some(resp) = check_body_size(&req, max_body_size, http_config) {
        return resp.into();
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!("Request body exceeds {max_body_size} bytes"));
            return http::build_413_response(http_config).into();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_400_response("Failed to read request body", http_config).into();
        }
    };

    let envelope = match action::handle_event(&body, &state.envelope) {
        Ok(envelope) => envelope,
        Err(e) => {
            logger::log_warning(&format!("Rejected malformed action event: {e}"));
            return http::build_400_response(&format!("Invalid JSON: {e}"), http_config).into();
        }
    };

    Routed {
        response: http::build_json_response(&envelope, http_config),
        api_path: Some(envelope.response.api_path),
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(
    req: &Request<B>,
    max_body_size: u64,
    http_config: &crate::config::HttpConfig,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response(http_config))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
