use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC request ID. Clients are free to choose numbers or strings.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Display, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// An incoming request or notification.
///
/// A message without `id` is a notification and must not be answered.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: method.into(),
            params,
        }
    }

    /// Parses one raw JSON text into a request.
    ///
    /// Batches (JSON arrays) are not supported and yield an "invalid request" error.
    pub fn parse(text: &str) -> Result<Self, JsonRpcError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| JsonRpcError::parse_error(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, JsonRpcError> {
        let object = match &value {
            Value::Object(o) => o,
            Value::Array(_) => {
                return Err(JsonRpcError::invalid_request(
                    "batch requests are not supported",
                ))
            }
            _ => return Err(JsonRpcError::invalid_request("message must be a JSON object")),
        };
        if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err(JsonRpcError::invalid_request("jsonrpc must be \"2.0\""));
        }
        if !object.get("method").map(Value::is_string).unwrap_or(false) {
            return Err(JsonRpcError::invalid_request("method must be a string"));
        }
        serde_json::from_value(value).map_err(|e| JsonRpcError::invalid_request(e.to_string()))
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// An outgoing response. Exactly one of `result` and `error` is set.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// `null` if the request ID couldn't be determined (e.g. on parse errors).
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Display, Serialize, Deserialize)]
#[display(fmt = "{} ({})", message, code)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, format!("Parse error: {}", detail.into()))
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, format!("Invalid request: {}", detail.into()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, detail)
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, detail)
    }
}

impl std::error::Error for JsonRpcError {}
