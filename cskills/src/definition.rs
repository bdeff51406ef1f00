//! Skill definitions as stored on disk and offered to the model.
//!
//! ```rust
//! use cskills::SkillDefinition;
//! use serde_json::json;
//!
//! let definition = SkillDefinition::new(
//!     "word count",
//!     "Counts words in a string",
//!     json!({"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]}),
//! );
//!
//! assert!(definition.validate().is_ok());
//! assert_eq!(definition.file_name(), "word_count.json");
//! assert_eq!(definition.to_tool_definition().name, "word count");
//! ```

use std::path::Path;

use cprovider::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::SkillError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub parameters: Value,
    /// Carried through load and save untouched; never used to bind code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

impl SkillDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: None,
        }
    }

    /// A definition whose schema takes no arguments.
    pub fn without_parameters(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, empty_object_schema())
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Parses and validates one skill file body.
    pub fn from_json(body: &str) -> Result<Self, SkillError> {
        let definition: Self = serde_json::from_str(body).map_err(|err| {
            SkillError::invalid_arguments(format!("invalid skill definition JSON: {err}"))
        })?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn to_json_pretty(&self) -> Result<String, SkillError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| SkillError::storage(format!("failed to serialize skill: {err}")))
    }

    pub fn validate(&self) -> Result<(), SkillError> {
        validate_name(&self.name)?;

        let Some(schema) = self.parameters.as_object() else {
            return Err(SkillError::invalid_arguments(format!(
                "parameters for skill '{}' must be a JSON object",
                self.name
            ))
            .with_skill_name(&self.name));
        };

        if let Some(kind) = schema.get("type")
            && kind != "object"
        {
            return Err(SkillError::invalid_arguments(format!(
                "parameters for skill '{}' must describe an object, found type {kind}",
                self.name
            ))
            .with_skill_name(&self.name));
        }

        jsonschema::validator_for(&self.parameters).map_err(|err| {
            SkillError::invalid_arguments(format!(
                "parameters for skill '{}' are not a usable JSON Schema: {err}",
                self.name
            ))
            .with_skill_name(&self.name)
        })?;

        Ok(())
    }

    /// Spaces become underscores; other characters are kept as-is.
    pub fn file_name(&self) -> String {
        file_name_for(&self.name)
    }

    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.parameters.get("properties").and_then(Value::as_object)
    }

    pub fn to_tool_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.parameters.to_string(),
        }
    }
}

/// Names double as file stems, so they must not leave the skills directory.
pub(crate) fn validate_name(name: &str) -> Result<(), SkillError> {
    if name.trim().is_empty() {
        return Err(SkillError::invalid_arguments("skill name must not be empty"));
    }

    if name.contains(['/', '\\']) || name.contains("..") || Path::new(name).is_absolute() {
        return Err(SkillError::invalid_arguments(format!(
            "skill name '{name}' must not contain path separators or '..'"
        ))
        .with_hint("Use letters, digits, spaces, '-' or '_' in skill names.")
        .with_skill_name(name));
    }

    Ok(())
}

pub(crate) fn file_name_for(name: &str) -> String {
    format!("{}.json", name.replace(' ', "_"))
}
