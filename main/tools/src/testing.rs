use crate::{ToolRegistry, ToolResult};
use once_cell::sync::Lazy;
use scythe_daw::fake::FakeDaw;
use serde_json::Value;

static REGISTRY: Lazy<ToolRegistry> = Lazy::new(ToolRegistry::new);

pub fn call(daw: &mut FakeDaw, name: &str, arguments: Value) -> ToolResult<Value> {
    REGISTRY.call(daw, name, arguments)
}

/// Calls a tool which is expected to fail and returns the message.
pub fn call_err(daw: &mut FakeDaw, name: &str, arguments: Value) -> String {
    match call(daw, name, arguments) {
        Ok(v) => panic!("{} should have failed but returned {}", name, v),
        Err(e) => e.to_string(),
    }
}
