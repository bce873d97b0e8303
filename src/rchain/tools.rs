use serde::Serialize;
use serde_json::{Map, Value, json};

/// JSON schema primitive types supported for tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolParamType {
    Integer,
    Number,
    String,
    Boolean,
}

/// One function parameter definition.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: String,
    pub description: Option<String>,
    pub kind: ToolParamType,
    pub required: bool,
}

impl ToolParam {
    /// Required string parameter, the common case for single-argument tools.
    pub fn required_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            kind: ToolParamType::String,
            required: true,
        }
    }
}

/// Tool declaration matching the chat-completions function-calling schema.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub params: Vec<ToolParam>,
}

impl ToolDefinition {
    /// Creates a function tool without parameters.
    pub fn function(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Appends one parameter definition.
    pub fn with_param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    fn parameters_schema(&self) -> Value {
        let properties = self
            .params
            .iter()
            .map(|param| {
                let mut def = json!({ "type": param.kind });
                if let Some(description) = &param.description {
                    def["description"] = Value::String(description.clone());
                }
                (param.name.clone(), def)
            })
            .collect::<Map<_, _>>();
        let required = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| Value::String(param.name.clone()))
            .collect::<Vec<_>>();

        let mut schema = json!({ "type": "object", "properties": properties });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }

    /// Serializes the tool declaration to JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_schema(),
            }
        })
    }
}

/// Tool call emitted by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Provider-generated call id.
    pub id: String,
    pub name: String,
    /// Decoded arguments; a raw string when the provider sent non-JSON text.
    pub args: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    /// Decodes a provider `arguments` string, keeping the raw text when it is not JSON.
    pub fn decode_arguments(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    }

    fn args_as_string(&self) -> String {
        match &self.args {
            Value::String(value) => value.clone(),
            other => other.to_string(),
        }
    }

    /// Serializes a tool call payload to provider JSON format.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "type": "function",
            "function": {
                "name": self.name,
                "arguments": self.args_as_string(),
            }
        })
    }
}
