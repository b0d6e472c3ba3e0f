use crate::{helpers, ToolError, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::{InputSchema, Param, Tool, ToolAnnotations};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

type Handler = Box<dyn Fn(&mut dyn Daw, Value) -> ToolResult<Value> + Send + Sync>;

/// Arguments of tools which don't take any.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NoArgs {}

/// A named operation which can be called with JSON arguments.
pub struct ToolDef {
    name: &'static str,
    description: &'static str,
    failure_context: &'static str,
    annotations: ToolAnnotations,
    schema: InputSchema,
    handler: Handler,
}

impl ToolDef {
    /// Creates a mutating tool without arguments. Use the builder methods to refine it.
    ///
    /// Arguments are deserialized into `A` after they passed the schema check.
    pub fn new<A>(
        name: &'static str,
        handler: fn(&mut dyn Daw, A) -> ToolResult<Value>,
    ) -> ToolDef
    where
        A: DeserializeOwned + 'static,
    {
        let handler: Handler = Box::new(move |daw, arguments| {
            let arguments = match arguments {
                Value::Null => Value::Object(Map::new()),
                a => a,
            };
            let arguments: A = serde_json::from_value(arguments)
                .map_err(|e| ToolError::invalid(format!("Invalid arguments: {}", e)))?;
            handler(daw, arguments)
        });
        ToolDef {
            name,
            description: "",
            failure_context: name,
            annotations: ToolAnnotations::mutator(),
            schema: InputSchema::default(),
            handler,
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// What the tool attempts, used in messages like "Failed to {context}: ...".
    pub fn failure_context(mut self, context: &'static str) -> Self {
        self.failure_context = context;
        self
    }

    pub fn params(mut self, params: Vec<Param>) -> Self {
        self.schema = InputSchema::new(params);
        self
    }

    pub fn annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn read_only(self) -> Self {
        self.annotations(ToolAnnotations::reader())
    }

    pub fn destructive(self) -> Self {
        self.annotations(ToolAnnotations::destructive())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema(&self) -> &InputSchema {
        &self.schema
    }

    pub fn descriptor(&self) -> Tool {
        Tool {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.schema.clone(),
            annotations: self.annotations.clone(),
        }
    }

    /// Checks the arguments, makes sure the DAW is reachable and runs the handler.
    pub fn invoke(&self, daw: &mut dyn Daw, arguments: Value) -> ToolResult<Value> {
        self.schema.check(&arguments).map_err(ToolError::invalid)?;
        helpers::connect(daw)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(daw, arguments)));
        match outcome {
            Ok(result) => result.map_err(|e| e.in_context(self.failure_context)),
            Err(_) => {
                tracing::error!(msg = "Tool panicked", tool = self.name);
                Err(ToolError::Panicked {
                    context: self.failure_context,
                })
            }
        }
    }
}

impl fmt::Debug for ToolDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDef")
            .field("name", &self.name)
            .field("failure_context", &self.failure_context)
            .finish()
    }
}
