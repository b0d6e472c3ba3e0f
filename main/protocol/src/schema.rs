use serde::ser::{Serialize, Serializer};
use serde_json::{json, Map, Value};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ParamType {
    Integer,
    Number,
    Boolean,
    String,
    /// Array of objects described by nested params.
    Array,
}

impl ParamType {
    fn json_name(self) -> &'static str {
        use ParamType::*;
        match self {
            Integer => "integer",
            Number => "number",
            Boolean => "boolean",
            String => "string",
            Array => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        use ParamType::*;
        match self {
            Integer => value.is_i64() || value.is_u64(),
            Number => value.is_number(),
            Boolean => value.is_boolean(),
            String => value.is_string(),
            Array => value.is_array(),
        }
    }

    fn article(self) -> &'static str {
        match self {
            ParamType::Integer | ParamType::Array => "an",
            _ => "a",
        }
    }
}

/// A single tool argument.
///
/// Params are required unless marked optional or given a default.
#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    name: &'static str,
    kind: ParamType,
    description: &'static str,
    required: bool,
    minimum: Option<f64>,
    exclusive_minimum: Option<f64>,
    maximum: Option<f64>,
    default: Option<Value>,
    items: Vec<Param>,
}

impl Param {
    fn new(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            minimum: None,
            exclusive_minimum: None,
            maximum: None,
            default: None,
            items: vec![],
        }
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    /// Array whose elements are objects with the given fields.
    pub fn array_of(name: &'static str, description: &'static str, fields: Vec<Param>) -> Self {
        Self {
            items: fields,
            ..Self::new(name, ParamType::Array, description)
        }
    }

    /// Inclusive lower bound.
    pub fn min(mut self, value: f64) -> Self {
        self.minimum = Some(value);
        self
    }

    /// Exclusive lower bound.
    pub fn above(mut self, value: f64) -> Self {
        self.exclusive_minimum = Some(value);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, value: f64) -> Self {
        self.maximum = Some(value);
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.required = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    fn to_json(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), json!(self.kind.json_name()));
        property.insert("description".into(), json!(self.description));
        if let Some(min) = self.minimum {
            property.insert("minimum".into(), json!(min));
        }
        if let Some(min) = self.exclusive_minimum {
            property.insert("exclusiveMinimum".into(), json!(min));
        }
        if let Some(max) = self.maximum {
            property.insert("maximum".into(), json!(max));
        }
        if let Some(default) = &self.default {
            property.insert("default".into(), default.clone());
        }
        if self.kind == ParamType::Array {
            property.insert("items".into(), object_schema(&self.items));
        }
        Value::Object(property)
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        if !self.kind.matches(value) {
            return Err(format!(
                "Invalid argument '{}': expected {} {}, got {}.",
                self.name,
                self.kind.article(),
                self.kind.json_name(),
                value
            ));
        }
        let number = match value.as_f64() {
            Some(n) => n,
            None => return Ok(()),
        };
        if let Some(min) = self.minimum {
            if number < min {
                return Err(format!(
                    "Invalid argument '{}': must be >= {}, got {}.",
                    self.name, min, value
                ));
            }
        }
        if let Some(min) = self.exclusive_minimum {
            if number <= min {
                return Err(format!(
                    "Invalid argument '{}': must be > {}, got {}.",
                    self.name, min, value
                ));
            }
        }
        if let Some(max) = self.maximum {
            if number > max {
                return Err(format!(
                    "Invalid argument '{}': must be <= {}, got {}.",
                    self.name, max, value
                ));
            }
        }
        Ok(())
    }
}

fn object_schema(params: &[Param]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.to_string(), p.to_json()))
        .collect();
    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name)
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// JSON schema of a tool's arguments object.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct InputSchema {
    params: Vec<Param>,
}

impl InputSchema {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn to_json(&self) -> Value {
        object_schema(&self.params)
    }

    /// Checks presence, JSON type and bounds of each declared argument.
    ///
    /// `null` counts as absent. Undeclared arguments are ignored. Elements of array arguments are
    /// left to the tool itself.
    pub fn check(&self, arguments: &Value) -> Result<(), String> {
        let object = match arguments {
            Value::Null => None,
            Value::Object(o) => Some(o),
            other => return Err(format!("Arguments must be a JSON object, got {}.", other)),
        };
        for param in &self.params {
            match object.and_then(|o| o.get(param.name)) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(format!("Missing required argument '{}'.", param.name));
                    }
                }
                Some(value) => param.check(value)?,
            }
        }
        Ok(())
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
