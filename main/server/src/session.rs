use crate::ToolExecutor;
use scythe_protocol::{
    methods, CallToolParams, Implementation, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, ToolsCapability,
    PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const SERVER_NAME: &str = "scythe";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "Controls the current REAPER project. Tracks, items, FX, sends, \
    envelopes and tempo markers are addressed by zero-based indices, markers and regions by the \
    number REAPER displays. Volumes are given in dB. Most changes can be undone in REAPER.";

/// The server side of one MCP client connection.
#[derive(Debug)]
pub struct Session<E> {
    executor: Arc<E>,
    client: Option<Implementation>,
}

impl<E: ToolExecutor> Session<E> {
    pub fn new(executor: Arc<E>) -> Self {
        Self {
            executor,
            client: None,
        }
    }

    /// The client as it introduced itself in `initialize`.
    pub fn client(&self) -> Option<&Implementation> {
        self.client.as_ref()
    }

    /// Handles one raw message. Returns `None` if nothing should be sent back.
    pub fn handle_message(&mut self, text: &str) -> Option<JsonRpcResponse> {
        match JsonRpcRequest::parse(text) {
            Ok(request) => self.handle_request(request),
            Err(error) => {
                tracing::debug!(msg = "Rejecting malformed message", %error);
                Some(JsonRpcResponse::failure(None, error))
            }
        }
    }

    pub fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = match request.id {
            None => {
                tracing::trace!(msg = "Received notification", method = %request.method);
                return None;
            }
            Some(id) => id,
        };
        let outcome = match request.method.as_str() {
            methods::INITIALIZE => self.initialize(request.params),
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => self.list_tools(),
            methods::TOOLS_CALL => self.call_tool(request.params),
            method => Err(JsonRpcError::method_not_found(method)),
        };
        let response = match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(Some(id), error),
        };
        Some(response)
    }

    fn initialize(&mut self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            None => InitializeParams::default(),
            Some(p) => serde_json::from_value(p)
                .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?,
        };
        tracing::info!(
            msg = "Client initialized session",
            client = ?params.client_info,
            protocol_version = %params.protocol_version
        );
        self.client = params.client_info;
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };
        to_value(result)
    }

    fn list_tools(&self) -> Result<Value, JsonRpcError> {
        to_value(ListToolsResult {
            tools: self.executor.list_tools(),
        })
    }

    fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;
        let tool = params.name.clone();
        let result = self.executor.call_tool(params)?;
        if result.is_error {
            tracing::debug!(msg = "Tool reported error", %tool, error = %result.text());
        }
        to_value(result)
    }
}

fn to_value(value: impl serde::Serialize) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalExecutor;
    use scythe_daw::fake::FakeDaw;
    use scythe_protocol::{INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};

    fn session() -> Session<LocalExecutor<FakeDaw>> {
        Session::new(Arc::new(LocalExecutor::new(FakeDaw::with_tracks(&[
            "Drums", "Bass",
        ]))))
    }

    fn answer(session: &mut Session<LocalExecutor<FakeDaw>>, message: Value) -> Value {
        let response = session.handle_message(&message.to_string()).unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn initialize() {
        let mut session = session();
        let response = answer(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "inspector", "version": "0.9"}
                }
            }),
        );
        assert_eq!(response["id"], json!(1));
        assert_eq!(response["result"]["protocolVersion"], json!("2024-11-05"));
        assert_eq!(response["result"]["serverInfo"]["name"], json!("scythe"));
        assert!(response["result"]["capabilities"]["tools"].is_object());
        assert_eq!(session.client().map(|c| c.name.as_str()), Some("inspector"));
    }

    #[test]
    fn notifications_are_not_answered() {
        let mut session = session();
        let message = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(session.handle_message(&message.to_string()).is_none());
        let message = json!({"jsonrpc": "2.0", "method": "notifications/cancelled"});
        assert!(session.handle_message(&message.to_string()).is_none());
    }

    #[test]
    fn ping() {
        let mut session = session();
        let response = answer(&mut session, json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}));
        assert_eq!(response["id"], json!("p"));
        assert_eq!(response["result"], json!({}));
    }

    #[test]
    fn list_tools() {
        let mut session = session();
        let response = answer(
            &mut session,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        );
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 89);
        assert_eq!(tools[0]["name"], json!("get_project_info"));
        assert_eq!(tools[0]["inputSchema"]["type"], json!("object"));
    }

    #[test]
    fn call_tool() {
        let mut session = session();
        let response = answer(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {"name": "set_track_name", "arguments": {"track_index": 1, "name": "Sub"}}
            }),
        );
        assert_eq!(response["result"]["isError"], json!(false));
        let response = answer(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "set_track_name", "arguments": {"track_index": 5, "name": "X"}}
            }),
        );
        assert_eq!(response["result"]["isError"], json!(true));
        assert!(response.get("error").is_none());
    }

    #[test]
    fn protocol_errors() {
        let mut session = session();
        let response = serde_json::to_value(session.handle_message("{not json").unwrap()).unwrap();
        assert_eq!(response["error"]["code"], json!(PARSE_ERROR));
        assert_eq!(response["id"], Value::Null);
        let response = answer(&mut session, json!({"id": 1, "method": "ping"}));
        assert_eq!(response["error"]["code"], json!(INVALID_REQUEST));
        let response = answer(&mut session, json!([{"jsonrpc": "2.0", "id": 1, "method": "ping"}]));
        assert_eq!(response["error"]["code"], json!(INVALID_REQUEST));
        let response = answer(
            &mut session,
            json!({"jsonrpc": "2.0", "id": 5, "method": "resources/list"}),
        );
        assert_eq!(response["error"]["code"], json!(METHOD_NOT_FOUND));
        assert_eq!(response["id"], json!(5));
        let response = answer(
            &mut session,
            json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call"}),
        );
        assert_eq!(response["error"]["code"], json!(INVALID_PARAMS));
    }
}
