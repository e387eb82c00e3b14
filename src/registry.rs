//! Registry of functions an LLM may call.
//!
//! A [`ToolRegistry`] is built once per session and handed to whatever sets up
//! the model's tool list. Tools declare their parameters with [`ParamType`],
//! which only covers what function-calling protocols can carry: integers,
//! numbers, booleans, strings, and lists or string-keyed maps of those. There
//! is no way to declare a parameter holding a graph or session object.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Declared type of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    Number,
    Boolean,
    String,
    List(Box<ParamType>),
    Map(Box<ParamType>),
}

impl ParamType {
    pub fn list_of(item: ParamType) -> Self {
        Self::List(Box::new(item))
    }

    pub fn map_of(value: ParamType) -> Self {
        Self::Map(Box::new(value))
    }

    /// Whether a JSON argument conforms to this type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::String, Value::String(_)) => true,
            (Self::List(item), Value::Array(items)) => items.iter().all(|v| item.matches(v)),
            (Self::Map(inner), Value::Object(map)) => map.values().all(|v| inner.matches(v)),
            _ => false,
        }
    }

    /// JSON Schema fragment for this type.
    pub fn json_schema(&self) -> Value {
        match self {
            Self::Integer => json!({"type": "integer"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::String => json!({"type": "string"}),
            Self::List(item) => json!({"type": "array", "items": item.json_schema()}),
            Self::Map(inner) => json!({"type": "object", "additionalProperties": inner.json_schema()}),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
}

/// Tool body. Receives arguments already checked against the declaration.
pub type ToolFn = Arc<dyn Fn(&Map<String, Value>) -> anyhow::Result<Value> + Send + Sync>;

/// A named, documented function with typed parameters.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    params: Vec<Param>,
    func: ToolFn,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Tool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            func: Arc::new(func),
        }
    }

    /// Add a required parameter.
    pub fn param(self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.with_param(name, param_type, description, true)
    }

    /// Add an optional parameter.
    pub fn optional(self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.with_param(name, param_type, description, false)
    }

    fn with_param(mut self, name: &str, param_type: ParamType, description: &str, required: bool) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Function declaration in the JSON-schema shape tool-calling APIs expect.
    pub fn declaration(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| {
                let mut schema = p.param_type.json_schema();
                schema["description"] = Value::String(p.description.clone());
                (p.name.clone(), schema)
            })
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }

    /// Check the declaration is expressible to a tool-calling model.
    fn validate_declaration(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidDeclaration {
            name: self.name.clone(),
            reason,
        };

        let mut chars = self.name.chars();
        let valid_name = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(invalid("name must be an identifier".into()));
        }
        if self.description.trim().is_empty() {
            return Err(invalid("description must not be empty".into()));
        }

        let mut seen = std::collections::HashSet::new();
        for p in &self.params {
            if !seen.insert(p.name.as_str()) {
                return Err(invalid(format!("parameter '{}' declared twice", p.name)));
            }
            if p.description.trim().is_empty() {
                return Err(invalid(format!("parameter '{}' has no description", p.name)));
            }
        }
        Ok(())
    }

    /// Check arguments against the declared parameters.
    fn validate_args(&self, args: &Map<String, Value>) -> Result<()> {
        let invalid = |reason: String| Error::InvalidArguments {
            name: self.name.clone(),
            reason,
        };

        for key in args.keys() {
            if !self.params.iter().any(|p| &p.name == key) {
                return Err(invalid(format!("unexpected argument '{key}'")));
            }
        }
        for p in &self.params {
            match args.get(&p.name) {
                None | Some(Value::Null) if p.required => {
                    return Err(invalid(format!("missing argument '{}'", p.name)));
                }
                None | Some(Value::Null) => {}
                Some(value) if !p.param_type.matches(value) => {
                    return Err(invalid(format!(
                        "argument '{}' must be {}",
                        p.name,
                        p.param_type.json_schema()
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Validate `args` and run the tool.
    pub fn call(&self, args: &Map<String, Value>) -> Result<Value> {
        self.validate_args(args)?;
        (self.func)(args).map_err(|source| Error::ToolFailed {
            name: self.name.clone(),
            source,
        })
    }
}

/// Append-only mapping of function name to [`Tool`], in registration order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Tool) -> Result<()> {
        if self.index.contains_key(&tool.name) {
            return Err(Error::DuplicateRegistration(tool.name));
        }
        tool.validate_declaration()?;
        tracing::debug!(name = %tool.name, "tool registered");
        self.index.insert(tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Tool> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))
    }

    pub fn list_all(&self) -> &[Tool] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up `name` and call it with `args`.
    pub fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<Value> {
        let tool = self.lookup(name)?;
        tracing::info!(tool = name, "invoking tool");
        tool.call(args)
    }

    /// Declarations of every registered tool, for the model's tool list.
    pub fn declarations(&self) -> Vec<Value> {
        self.tools.iter().map(Tool::declaration).collect()
    }
}

/// Fetch a string argument. Optional arguments that are absent read as `""`.
pub fn string_arg<'a>(args: &'a Map<String, Value>, name: &str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Fetch a list-of-strings argument. Absent reads as empty.
pub fn string_list_arg(args: &Map<String, Value>, name: &str) -> Vec<String> {
    args.get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Tool {
        Tool::new("echo", "Return the text unchanged.", |args| {
            Ok(Value::String(string_arg(args, "text").to_string()))
        })
        .param("text", ParamType::String, "Text to echo.")
        .optional("times", ParamType::Integer, "Repeat count.")
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn param_types_match_json() {
        assert!(ParamType::Integer.matches(&json!(3)));
        assert!(!ParamType::Integer.matches(&json!(3.5)));
        assert!(ParamType::Number.matches(&json!(3.5)));
        assert!(ParamType::list_of(ParamType::String).matches(&json!(["a", "b"])));
        assert!(!ParamType::list_of(ParamType::String).matches(&json!(["a", 1])));
        assert!(ParamType::map_of(ParamType::list_of(ParamType::Boolean))
            .matches(&json!({"x": [true, false]})));
        assert!(!ParamType::String.matches(&json!(null)));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        for name in ["", "1abc", "has space", "dash-name"] {
            let tool = Tool::new(name, "Some tool.", |_| Ok(Value::Null));
            assert!(matches!(
                registry.register(tool),
                Err(Error::InvalidDeclaration { .. })
            ));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn repeated_parameter_is_rejected() {
        let tool = echo().param("text", ParamType::String, "Again.");
        assert!(matches!(
            ToolRegistry::new().register(tool),
            Err(Error::InvalidDeclaration { reason, .. }) if reason.contains("declared twice")
        ));
    }

    #[test]
    fn arguments_are_validated_before_the_call() {
        let mut registry = ToolRegistry::new();
        registry.register(echo()).unwrap();

        let ok = registry.invoke("echo", &args(json!({"text": "hi"}))).unwrap();
        assert_eq!(ok, json!("hi"));

        for bad in [json!({}), json!({"text": 5}), json!({"text": "hi", "loud": true})] {
            assert!(matches!(
                registry.invoke("echo", &args(bad)),
                Err(Error::InvalidArguments { .. })
            ));
        }
    }

    #[test]
    fn tool_failure_is_wrapped() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Tool::new("boom", "Always fails.", |_| anyhow::bail!("kaput")))
            .unwrap();
        let err = registry.invoke("boom", &Map::new()).unwrap_err();
        assert!(matches!(err, Error::ToolFailed { ref name, .. } if name == "boom"));
        assert!(err.to_string().contains("kaput"));
    }

    #[test]
    fn declaration_shape() {
        let decl = echo().declaration();
        assert_eq!(decl["name"], "echo");
        assert_eq!(decl["parameters"]["properties"]["text"]["type"], "string");
        assert_eq!(decl["parameters"]["properties"]["times"]["type"], "integer");
        assert_eq!(decl["parameters"]["required"], json!(["text"]));
    }
}
