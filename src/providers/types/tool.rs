use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Primitive types a tool parameter can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
}

/// The declaration of a tool as presented to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// Named parameters, in declaration order
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolSpec {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn required<N: Into<String>>(self, name: N, kind: ParamType) -> Self {
        self.with_param(name, kind, None, true)
    }

    pub fn optional<N: Into<String>>(self, name: N, kind: ParamType) -> Self {
        self.with_param(name, kind, None, false)
    }

    /// Attach a description to the most recently added parameter
    pub fn described<D: Into<String>>(mut self, description: D) -> Self {
        if let Some(param) = self.parameters.last_mut() {
            param.description = Some(description.into());
        }
        self
    }

    fn with_param<N: Into<String>>(
        mut self,
        name: N,
        kind: ParamType,
        description: Option<String>,
        required: bool,
    ) -> Self {
        self.parameters.push(ParamSpec {
            name: name.into(),
            kind,
            description,
            required,
        });
        self
    }

    /// JSON schema of the function signature
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut property = json!({ "type": param.kind });
            if let Some(description) = &param.description {
                property["description"] = json!(description);
            }
            properties.insert(param.name.clone(), property);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A decoded tool call request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The arguments for the execution
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
