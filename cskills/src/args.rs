//! Decoded skill arguments and schema validation.
//!
//! ```rust
//! use cskills::{ArgumentValidation, SkillArgs};
//! use serde_json::json;
//!
//! let args = SkillArgs::parse(r#"{"text":"hello"}"#);
//! assert_eq!(args.required_str("text").expect("text"), "hello");
//!
//! let schema = json!({"type": "object", "required": ["text", "algorithm"]});
//! assert!(matches!(args.validate(&schema), ArgumentValidation::Invalid { .. }));
//!
//! assert!(SkillArgs::parse("").is_empty());
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::SkillError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillArgs {
    values: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValidation {
    Valid,
    Invalid { errors: Vec<String> },
}

impl ArgumentValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn into_result(self, skill_name: &str) -> Result<(), SkillError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid { errors } => Err(SkillError::invalid_arguments(format!(
                "arguments for '{skill_name}' do not match its parameter schema: {}",
                errors.join("; ")
            ))
            .with_hint("Check the required parameters and their types, then call the skill again.")
            .with_context("validation_errors", errors)
            .with_skill_name(skill_name)),
        }
    }
}

impl SkillArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Lenient decode: blank bodies and malformed JSON both yield an empty mapping.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new();
        }

        match Self::try_parse(raw) {
            Ok(args) => args,
            Err(error) => {
                tracing::warn!(
                    event = "skill_arguments_unparseable",
                    error = %error.message,
                    "substituting empty arguments"
                );
                Self::new()
            }
        }
    }

    pub fn try_parse(raw: &str) -> Result<Self, SkillError> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = serde_json::from_str(raw).map_err(|err| {
            SkillError::invalid_arguments(format!("invalid JSON arguments: {err}"))
        })?;

        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::new()),
            _ => Err(SkillError::invalid_arguments(
                "expected JSON object arguments",
            )),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    /// Present and non-empty string, or an invalid-arguments error naming the field.
    pub fn required_str(&self, key: &str) -> Result<&str, SkillError> {
        self.optional_str(key).ok_or_else(|| {
            SkillError::invalid_arguments(format!("The '{key}' parameter is required"))
                .with_context("field", key)
        })
    }

    pub fn optional_str(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn required_f64(&self, key: &str) -> Result<f64, SkillError> {
        self.optional_f64(key).ok_or_else(|| {
            SkillError::invalid_arguments(format!("The '{key}' parameter must be a number"))
                .with_context("field", key)
        })
    }

    pub fn optional_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    /// Numbers are truncated toward zero.
    pub fn optional_i64(&self, key: &str) -> Option<i64> {
        self.optional_f64(key).map(|value| value.trunc() as i64)
    }

    /// Deserializes the whole mapping into a typed argument struct.
    pub fn decode<T>(&self) -> Result<T, SkillError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|err| SkillError::invalid_arguments(format!("arguments do not decode: {err}")))
    }

    pub fn validate(&self, schema: &Value) -> ArgumentValidation {
        let validator = match jsonschema::validator_for(schema) {
            Ok(validator) => validator,
            Err(err) => {
                return ArgumentValidation::Invalid {
                    errors: vec![format!("parameter schema is not usable: {err}")],
                };
            }
        };

        let instance = Value::Object(self.values.clone());
        let errors = validator
            .iter_errors(&instance)
            .map(|error| error.to_string())
            .collect::<Vec<_>>();

        if errors.is_empty() {
            ArgumentValidation::Valid
        } else {
            ArgumentValidation::Invalid { errors }
        }
    }
}

impl From<Map<String, Value>> for SkillArgs {
    fn from(values: Map<String, Value>) -> Self {
        Self::from_map(values)
    }
}
