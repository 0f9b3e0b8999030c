use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Schema mismatch in the raw desired-state payload.
///
/// Carries the tree of causing failures so the caller sees every violation
/// at once instead of fixing them one resubmission at a time.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,

    /// Pointer into the schema that rejected the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub causes: Vec<ValidationError>,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        ValidationError {
            message: message.into(),
            schema_location: None,
            causes: Vec::new(),
        }
    }

    pub fn with_location<S: Into<String>>(mut self, schema_location: S) -> Self {
        self.schema_location = Some(schema_location.into());
        self
    }

    pub fn with_causes(mut self, causes: Vec<ValidationError>) -> Self {
        self.causes = causes;
        self
    }

    /// Caller-facing message with every cause appended on its own line.
    pub fn full_message(&self) -> String {
        let mut out = if self.message.is_empty() {
            "Model validation failed with unknown cause.".to_string()
        } else {
            format!("Model validation failed ({})", self.message)
        };
        for cause in &self.causes {
            out.push('\n');
            out.push_str(&cause.message);
            out.push_str(&format!(
                " ({})",
                cause.schema_location.as_deref().unwrap_or("#")
            ));
        }
        out
    }
}

/// Schema check applied to the *raw* pre-deserialized desired state of
/// mutating actions.
///
/// Validating the raw value (rather than the deserialized copy) surfaces
/// extraneous fields a lenient deserializer would silently drop.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, raw_model: &Value) -> Result<(), ValidationError>;
}
