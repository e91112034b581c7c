//! Values schema validation.
//!
//! Wraps a compiled JSON Schema (values.schema.json) and checks merged
//! chart values against it, reporting one violation per failing location.

use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unable to parse JSON Schema: {0}")]
    Parse(String),

    #[error("invalid JSON Schema: {0}")]
    Compile(String),

    #[error("values are not representable as JSON: {0}")]
    Convert(String),
}

/// One schema violation with its JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "values don't meet the specifications of the schema(s): {}: {}", self.path, self.message)
    }
}

/// A compiled values schema.
#[derive(Debug)]
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compile a values.schema.json document.
    ///
    /// # Errors
    /// Fails when the document is not JSON or not a valid schema.
    pub fn new(schema_text: &str) -> Result<Self, SchemaError> {
        let schema: JsonValue =
            serde_json::from_str(schema_text).map_err(|e| SchemaError::Parse(e.to_string()))?;

        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;

        Ok(Self { validator })
    }

    /// Validate merged values, returning every violation (empty = valid).
    ///
    /// # Errors
    /// Fails only when the values cannot be represented as JSON
    /// (e.g. non-string mapping keys).
    pub fn validate(&self, values: &serde_yaml::Value) -> Result<Vec<SchemaViolation>, SchemaError> {
        let instance =
            serde_json::to_value(values).map_err(|e| SchemaError::Convert(e.to_string()))?;

        Ok(self
            .validator
            .iter_errors(&instance)
            .map(|error| {
                let path = error.instance_path.to_string();
                SchemaViolation {
                    path: if path.is_empty() {
                        "$".to_string()
                    } else {
                        format!("${path}")
                    },
                    message: error.to_string(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
