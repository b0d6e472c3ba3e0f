use scythe_daw::Daw;
use scythe_protocol::{CallToolParams, CallToolResult, JsonRpcError, Tool};
use scythe_tools::{ToolError, ToolRegistry, ToolResult};
use serde_json::Value;
use std::sync::Mutex;

/// Knows the available tools and how to get them executed.
pub trait ToolExecutor: Send + Sync {
    fn list_tools(&self) -> Vec<Tool>;

    /// Executes a tool.
    ///
    /// Failures of the tool itself are reported as error result. The `Err` variant is reserved
    /// for protocol-level problems such as an unknown tool name.
    fn call_tool(&self, params: CallToolParams) -> Result<CallToolResult, JsonRpcError>;
}

/// Translates the outcome of a tool invocation into what goes over the wire.
pub fn to_call_result(result: ToolResult<Value>) -> Result<CallToolResult, JsonRpcError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(value)),
        Err(e @ ToolError::UnknownTool { .. }) => Err(JsonRpcError::invalid_params(e.to_string())),
        Err(e) => Ok(CallToolResult::error(e.to_string())),
    }
}

/// Runs tools right on the calling thread, one at a time.
#[derive(Debug)]
pub struct LocalExecutor<D> {
    registry: ToolRegistry,
    daw: Mutex<D>,
}

impl<D: Daw + Send> LocalExecutor<D> {
    pub fn new(daw: D) -> Self {
        Self {
            registry: ToolRegistry::new(),
            daw: Mutex::new(daw),
        }
    }

    /// Gives access to the DAW, e.g. for inspecting it after a call.
    pub fn with_daw<R>(&self, f: impl FnOnce(&mut D) -> R) -> Option<R> {
        let mut daw = self.daw.lock().ok()?;
        Some(f(&mut daw))
    }
}

impl<D: Daw + Send> ToolExecutor for LocalExecutor<D> {
    fn list_tools(&self) -> Vec<Tool> {
        self.registry.descriptors()
    }

    fn call_tool(&self, params: CallToolParams) -> Result<CallToolResult, JsonRpcError> {
        let mut daw = self
            .daw
            .lock()
            .map_err(|_| JsonRpcError::internal_error("DAW lock poisoned"))?;
        to_call_result(self.registry.call(&mut *daw, &params.name, params.arguments))
    }
}
