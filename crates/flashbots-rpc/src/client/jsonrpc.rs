use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::{to_raw_value, RawValue};
use serde_json::Value;
use thiserror::Error;

use crate::client::RelayError;

/// Every envelope carries the same id, calls are never multiplexed.
pub const REQUEST_ID: u64 = 1;

/// A JSON-RPC 2.0 error
#[derive(Serialize, Deserialize, Debug, Clone, Error)]
pub struct JsonRpcError {
    /// The error code, 0 when the relay omits it
    #[serde(default)]
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {} ({})", self.code, self.message)
    }
}

/// A JSON-RPC request
///
/// Field order is part of the signed bytes, do not reorder.
#[derive(Serialize, Debug)]
pub struct Request<'a, T> {
    id: u64,
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
}

impl<'a, T: Serialize> Request<'a, T> {
    /// Creates a new JSON RPC request
    pub fn new(method: &'a str, params: T) -> Self {
        Self { id: REQUEST_ID, jsonrpc: "2.0", method, params }
    }

    pub fn to_body(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(RelayError::RequestSerdeJson)
    }
}

#[derive(Deserialize, Debug)]
pub struct Response {
    #[serde(default)]
    pub result: Option<Box<RawValue>>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// Bare error object some relays send instead of a JSON-RPC envelope,
/// e.g. `{"error":"block param must be a hex int"}`.
#[derive(Deserialize, Debug, Default)]
pub struct RelayErrorResponse {
    #[serde(default)]
    pub error: String,
}

fn parse_response(text: &str) -> Result<Response, RelayError> {
    serde_json::from_str(text).map_err(|err| RelayError::Protocol { err, text: text.to_string() })
}

fn into_raw(result: Option<Box<RawValue>>, text: &str) -> Result<Box<RawValue>, RelayError> {
    match result {
        Some(raw) => Ok(raw),
        None => to_raw_value(&Value::Null).map_err(|err| RelayError::Protocol { err, text: text.to_string() }),
    }
}

/// Classifies a relay reply to a signed request.
///
/// The flat `{"error": "..."}` shape wins over the JSON-RPC envelope when its
/// message is non-empty.
pub fn decode_signed_response(text: &str) -> Result<Box<RawValue>, RelayError> {
    if let Ok(flat) = serde_json::from_str::<RelayErrorResponse>(text) {
        if !flat.error.is_empty() {
            return Err(RelayError::Relay { message: flat.error });
        }
    }

    let response = parse_response(text)?;
    if let Some(error) = response.error {
        return Err(RelayError::Relay { message: error.message });
    }

    into_raw(response.result, text)
}

/// Classifies a node reply to a plain request.
pub fn decode_response(text: &str) -> Result<Box<RawValue>, RelayError> {
    let response = parse_response(text)?;
    if let Some(error) = response.error {
        return Err(RelayError::JsonRpc(error));
    }

    into_raw(response.result, text)
}
