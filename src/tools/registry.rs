use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::{ToolExecutor, ToolOutput};
use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::{ParamType, ToolCall, ToolSpec};
use crate::providers::utils::is_valid_function_name;

struct RegisteredTool {
    spec: ToolSpec,
    executor: Arc<dyn ToolExecutor>,
}

/// Maps tool names to their declarations and implementations.
///
/// Built once at startup and then only read, so a single registry can be shared
/// by every session.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E>(&mut self, spec: ToolSpec, executor: E) -> AgentResult<()>
    where
        E: ToolExecutor + 'static,
    {
        if !is_valid_function_name(&spec.name) {
            return Err(AgentError::InvalidToolName(spec.name));
        }
        if self.tools.contains_key(&spec.name) {
            return Err(AgentError::DuplicateTool(spec.name));
        }

        let name = spec.name.clone();
        self.tools.insert(
            name.clone(),
            RegisteredTool {
                spec,
                executor: Arc::new(executor),
            },
        );
        self.order.push(name);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> AgentResult<Arc<dyn ToolExecutor>> {
        self.tools
            .get(name)
            .map(|tool| Arc::clone(&tool.executor))
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    pub fn spec(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name).map(|tool| &tool.spec)
    }

    /// The declarations for the named tools, in the order given
    pub fn declare<S: AsRef<str>>(&self, names: &[S]) -> AgentResult<Vec<ToolSpec>> {
        names
            .iter()
            .map(|name| {
                self.spec(name.as_ref())
                    .cloned()
                    .ok_or_else(|| AgentError::UnknownTool(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve, check the arguments against the declaration, then execute
    pub fn invoke(&self, call: &ToolCall) -> AgentResult<ToolOutput> {
        let executor = self.resolve(&call.name)?;
        if let Some(spec) = self.spec(&call.name) {
            validate_arguments(spec, &call.arguments)?;
        }
        executor.execute(&call.arguments)
    }
}

/// Reject arguments that are missing, undeclared, or of the wrong primitive type
pub fn validate_arguments(spec: &ToolSpec, arguments: &Value) -> AgentResult<()> {
    let object = arguments.as_object().ok_or_else(|| {
        AgentError::MalformedArguments(format!("{} expects an object of arguments", spec.name))
    })?;

    if let Some(unknown) = object
        .keys()
        .find(|key| !spec.parameters.iter().any(|p| &p.name == *key))
    {
        return Err(AgentError::MalformedArguments(format!(
            "unknown parameter `{}` for {}",
            unknown, spec.name
        )));
    }

    for param in &spec.parameters {
        match object.get(&param.name) {
            None | Some(Value::Null) if param.required => {
                return Err(AgentError::MalformedArguments(format!(
                    "missing required parameter `{}` for {}",
                    param.name, spec.name
                )));
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                let matches = match param.kind {
                    ParamType::String => value.is_string(),
                    ParamType::Integer => value.is_i64() || value.is_u64(),
                    ParamType::Number => value.is_number(),
                    ParamType::Boolean => value.is_boolean(),
                };
                if !matches {
                    return Err(AgentError::MalformedArguments(format!(
                        "parameter `{}` for {} must be of type {:?}, got {}",
                        param.name, spec.name, param.kind, value
                    )));
                }
            }
        }
    }

    Ok(())
}
