use scythe_reaper::ReaperDaw;
use scythe_tools::ToolRegistry;
use serde_json::Value;
use std::borrow::Cow;

pub type TestStepResult = Result<(), Cow<'static, str>>;

/// What a test step gets to work with.
///
/// Steps talk to REAPER the way MCP clients do: by calling tools with JSON arguments.
pub struct TestStepContext<'a> {
    pub(crate) daw: &'a mut ReaperDaw,
    pub(crate) registry: &'a ToolRegistry,
}

impl<'a> TestStepContext<'a> {
    /// Calls a tool which is expected to succeed.
    pub fn call(&mut self, tool: &str, arguments: Value) -> Result<Value, String> {
        self.registry
            .call(&mut *self.daw, tool, arguments)
            .map_err(|e| format!("Tool `{}` failed: {}", tool, e))
    }

    /// Calls a tool which is expected to fail and returns the error message.
    pub fn call_err(&mut self, tool: &str, arguments: Value) -> Result<String, String> {
        match self.registry.call(&mut *self.daw, tool, arguments) {
            Ok(value) => Err(format!(
                "Tool `{}` was expected to fail but returned {}",
                tool, value
            )),
            Err(e) => Ok(e.to_string()),
        }
    }
}

pub struct TestStep {
    pub name: Cow<'static, str>,
    pub operation: Box<dyn FnOnce(&mut TestStepContext) -> TestStepResult>,
}

pub fn step<Op>(name: impl Into<Cow<'static, str>>, operation: Op) -> TestStep
where
    Op: FnOnce(&mut TestStepContext) -> TestStepResult + 'static,
{
    TestStep {
        name: name.into(),
        operation: Box::new(operation),
    }
}
