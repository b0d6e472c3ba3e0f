use crate::{groups, ToolDef, ToolError, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::Tool;
use serde_json::Value;
use std::collections::HashMap;

/// All tools, mounted group by group.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
    by_name: HashMap<&'static str, usize>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Creates the complete catalogue.
    pub fn new() -> ToolRegistry {
        let mut registry = ToolRegistry {
            tools: vec![],
            by_name: HashMap::new(),
        };
        for (group, tools) in groups::all() {
            tracing::trace!(msg = "Mounting tool group", group, tool_count = tools.len());
            for tool in tools {
                registry.mount(tool);
            }
        }
        registry
    }

    fn mount(&mut self, tool: ToolDef) {
        let index = self.tools.len();
        if self.by_name.insert(tool.name(), index).is_some() {
            tracing::warn!(msg = "Tool registered twice, later one wins", tool = tool.name());
        }
        self.tools.push(tool);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDef> {
        self.by_name.get(name).map(|i| &self.tools[*i])
    }

    /// Descriptors in mounting order.
    pub fn descriptors(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    pub fn call(&self, daw: &mut dyn Daw, name: &str, arguments: Value) -> ToolResult<Value> {
        let tool = self.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;
        tracing::debug!(msg = "Calling tool", tool = name);
        let result = tool.invoke(daw, arguments);
        if let Err(e) = &result {
            tracing::debug!(msg = "Tool failed", tool = name, error = %e);
        }
        result
    }
}
