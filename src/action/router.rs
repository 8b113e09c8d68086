//! Action routing
//!
//! Dispatches an action group event on `(apiPath, httpMethod)` and wraps the
//! chosen body in the response envelope. Every input produces an envelope;
//! unmatched routes get an error-shaped body with status 200.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::catalog;
use super::params::ParameterMap;
use super::types::{ActionRequest, ActionResponse, EncodedBody, ResponseBody, ResponseEnvelope};
use crate::logger;

pub const DEFAULT_MESSAGE_VERSION: &str = "1.0";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Status reported in every envelope, including unknown actions
pub const ENVELOPE_STATUS: u16 = 200;

/// Envelope settings the host expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeOptions {
    pub message_version: String,
    pub content_type: String,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            message_version: DEFAULT_MESSAGE_VERSION.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

/// Known actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Menu,
    Stock,
    Unknown,
}

impl Route {
    /// Exact, case-sensitive match on path and method
    pub fn resolve(api_path: &str, http_method: &str) -> Self {
        match (api_path, http_method) {
            ("/menu", "GET") => Self::Menu,
            ("/stock", "GET") => Self::Stock,
            _ => Self::Unknown,
        }
    }
}

/// Pick the response body for a request
pub fn route(request: &ActionRequest, params: &ParameterMap) -> ResponseBody {
    match Route::resolve(&request.api_path, &request.http_method) {
        Route::Menu => catalog::menu(),
        Route::Stock => catalog::stock(params.get_or_default("item")),
        Route::Unknown => catalog::unknown_action(&request.api_path),
    }
}

/// Handle an action event with the default envelope settings
pub fn handle(request: &ActionRequest) -> ResponseEnvelope {
    handle_with(request, &EnvelopeOptions::default())
}

/// Decode a serialized event and handle it
///
/// The event is logged as received, host fields included, before it is
/// narrowed to an `ActionRequest`. Fails only when `raw` is not a JSON event.
pub fn handle_event(
    raw: &[u8],
    options: &EnvelopeOptions,
) -> Result<ResponseEnvelope, serde_json::Error> {
    let event: serde_json::Value = serde_json::from_slice(raw)?;
    logger::log_action_event(&event);

    let request = ActionRequest::deserialize(&event)?;
    Ok(handle_with(&request, options))
}

pub fn handle_with(request: &ActionRequest, options: &EnvelopeOptions) -> ResponseEnvelope {
    let params = ParameterMap::from_parameters(&request.parameters);
    let body = route(request, &params);
    let envelope = wrap(request, &body, options);

    logger::log_action_response(&envelope);
    envelope
}

fn wrap(request: &ActionRequest, body: &ResponseBody, options: &EnvelopeOptions) -> ResponseEnvelope {
    let encoded = serde_json::to_string(body).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to encode response body: {e}"));
        String::from("{}")
    });

    let mut response_body = BTreeMap::new();
    response_body.insert(options.content_type.clone(), EncodedBody { body: encoded });

    ResponseEnvelope {
        message_version: options.message_version.clone(),
        response: ActionResponse {
            action_group: request.action_group.clone(),
            api_path: request.api_path.clone(),
            http_method: request.http_method.clone(),
            http_status_code: ENVELOPE_STATUS,
            response_body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::types::Parameter;

    fn request(api_path: &str, http_method: &str, parameters: Vec<Parameter>) -> ActionRequest {
        ActionRequest {
            action_group: "coffee".to_string(),
            api_path: api_path.to_string(),
            http_method: http_method.to_string(),
            parameters,
        }
    }

    fn decoded_body(envelope: &ResponseEnvelope) -> serde_json::Value {
        serde_json::from_str(envelope.body().unwrap()).unwrap()
    }

    #[test]
    fn test_resolve_routes() {
        assert_eq!(Route::resolve("/menu", "GET"), Route::Menu);
        assert_eq!(Route::resolve("/stock", "GET"), Route::Stock);
        assert_eq!(Route::resolve("/menu", "POST"), Route::Unknown);
        assert_eq!(Route::resolve("/menu", "get"), Route::Unknown);
        assert_eq!(Route::resolve("/MENU", "GET"), Route::Unknown);
        assert_eq!(Route::resolve("", ""), Route::Unknown);
    }

    #[test]
    fn test_menu_envelope() {
        let envelope = handle(&request("/menu", "GET", vec![]));
        assert_eq!(envelope.message_version, "1.0");
        assert_eq!(envelope.response.http_status_code, 200);
        assert_eq!(
            envelope.response.response_body["application/json"].body,
            r#"{"menu":[{"name":"Kopi Susu","price":25000},{"name":"Americano","price":22000},{"name":"Latte","price":28000},{"name":"Matcha Latte","price":30000}],"currency":"IDR"}"#
        );
    }

    #[test]
    fn test_menu_ignores_parameters() {
        let envelope = handle(&request(
            "/menu",
            "GET",
            vec![Parameter::new("item", "Latte"), Parameter::new("limit", "1")],
        ));
        let body = decoded_body(&envelope);
        assert_eq!(body["menu"].as_array().unwrap().len(), 4);
        assert_eq!(body["currency"], "IDR");
    }

    #[test]
    fn test_stock_with_item() {
        let envelope = handle(&request("/stock", "GET", vec![Parameter::new("item", "Latte")]));
        assert_eq!(
            envelope.body(),
            Some(r#"{"item":"Latte","stock":10,"available":true}"#)
        );
    }

    #[test]
    fn test_stock_without_item() {
        let envelope = handle(&request("/stock", "GET", vec![]));
        assert_eq!(
            envelope.body(),
            Some(r#"{"item":"","stock":10,"available":true}"#)
        );
    }

    #[test]
    fn test_stock_duplicate_item_last_wins() {
        let envelope = handle(&request(
            "/stock",
            "GET",
            vec![Parameter::new("item", "Latte"), Parameter::new("item", "Americano")],
        ));
        assert_eq!(decoded_body(&envelope)["item"], "Americano");
    }

    #[test]
    fn test_unknown_action_still_200() {
        for (path, method) in [("/order", "POST"), ("/stock", "POST"), ("/menu", "DELETE"), ("", "")] {
            let envelope = handle(&request(path, method, vec![]));
            assert_eq!(envelope.response.http_status_code, 200);
            assert_eq!(
                decoded_body(&envelope),
                serde_json::json!({ "error": format!("Unknown action: {path}") })
            );
        }
    }

    #[test]
    fn test_passthrough_fields() {
        let req = ActionRequest {
            action_group: "  Warung Kopi ".to_string(),
            api_path: "/Stock/".to_string(),
            http_method: "get".to_string(),
            parameters: vec![],
        };
        let envelope = handle(&req);
        assert_eq!(envelope.response.action_group, req.action_group);
        assert_eq!(envelope.response.api_path, req.api_path);
        assert_eq!(envelope.response.http_method, req.http_method);
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = handle(&request("/stock", "GET", vec![Parameter::new("item", "Latte")]));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "messageVersion": "1.0",
                "response": {
                    "actionGroup": "coffee",
                    "apiPath": "/stock",
                    "httpMethod": "GET",
                    "httpStatusCode": 200,
                    "responseBody": {
                        "application/json": {
                            "body": "{\"item\":\"Latte\",\"stock\":10,\"available\":true}"
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_handle_event_null_value() {
        let raw = br#"{"apiPath":"/stock","httpMethod":"GET","parameters":[{"name":"item","value":null}]}"#;
        let envelope = handle_event(raw, &EnvelopeOptions::default()).unwrap();
        assert_eq!(envelope.response.http_status_code, 200);
        assert_eq!(
            envelope.body(),
            Some(r#"{"item":"","stock":10,"available":true}"#)
        );
    }

    #[test]
    fn test_handle_event_keeps_host_fields_out_of_envelope() {
        let raw = br#"{"sessionId":"s-1","inputText":"menu?","actionGroup":"coffee","apiPath":"/menu","httpMethod":"GET"}"#;
        let envelope = handle_event(raw, &EnvelopeOptions::default()).unwrap();
        assert_eq!(envelope.response.action_group, "coffee");
        assert!(!serde_json::to_string(&envelope).unwrap().contains("sessionId"));
    }

    #[test]
    fn test_handle_event_rejects_malformed_json() {
        assert!(handle_event(b"{not json", &EnvelopeOptions::default()).is_err());
        assert!(handle_event(br#"{"apiPath":42}"#, &EnvelopeOptions::default()).is_err());
    }

    #[test]
    fn test_custom_envelope_options() {
        let options = EnvelopeOptions {
            message_version: "2.0".to_string(),
            content_type: "text/plain".to_string(),
        };
        let envelope = handle_with(&request("/menu", "GET", vec![]), &options);
        assert_eq!(envelope.message_version, "2.0");
        assert!(envelope.response.response_body.contains_key("text/plain"));
        assert!(envelope.body().is_some());
    }
}
