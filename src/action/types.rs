// Action group wire types
// Inbound event from the agent host and the envelope sent back to it

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Inbound action group event
///
/// Every field is optional on the wire; missing or `null` fields resolve to
/// empty values. Extra fields sent by the host (`sessionId`, `agent`, ...)
/// are ignored.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub action_group: String,
    #[serde(deserialize_with = "null_as_default")]
    pub api_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: Vec<Parameter>,
}

/// Single name/value parameter
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Parameter {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Menu entry, price in whole units of the catalog currency
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub price: u32,
}

/// Payload chosen by the router
///
/// Field declaration order is the serialized key order.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResponseBody {
    Menu {
        menu: Vec<MenuItem>,
        currency: String,
    },
    Stock {
        item: String,
        stock: u32,
        available: bool,
    },
    Error {
        error: String,
    },
}

/// Outer wrapper the agent host uses to correlate a response with its request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub message_version: String,
    pub response: ActionResponse,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    /// Keyed by content type, e.g. `application/json`
    pub response_body: BTreeMap<String, EncodedBody>,
}

/// Pre-serialized response body
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub body: String,
}

impl ResponseEnvelope {
    /// Embedded body string, if any content type is present
    pub fn body(&self) -> Option<&str> {
        self.response
            .response_body
            .values()
            .next()
            .map(|encoded| encoded.body.as_str())
    }
}
