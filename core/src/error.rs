//! Error types for template and submission operations

use thiserror::Error;

use crate::types::TemplateId;

/// Main error type for template operations
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template identifier could not be resolved
    #[error("Template not found: {template_id}")]
    SchemaNotFound {
        /// Template that was requested
        template_id: TemplateId,
    },

    /// Uploaded artifact is not a readable spreadsheet
    #[error("Malformed artifact: {message}")]
    MalformedArtifact {
        /// Error message
        message: String,
    },

    /// Declared worksheet is absent from the artifact
    #[error("Worksheet '{sheet}' not found in artifact")]
    WorksheetMissing {
        /// Worksheet that was looked up
        sheet: String,
    },

    /// Template or column definition violates a definition rule
    #[error("Invalid definition: {message}")]
    InvalidDefinition {
        /// Error message
        message: String,
        /// Offending element (template or column name) if available
        element: Option<String>,
    },

    /// Submission identifier could not be resolved
    #[error("Submission not found: {unique_identifier}")]
    SubmissionNotFound {
        /// Identifier that was requested
        unique_identifier: String,
    },

    /// Failure reported by a schema or submission store
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

impl TemplateError {
    /// Create a schema-not-found error
    #[must_use]
    pub fn schema_not_found(template_id: TemplateId) -> Self {
        Self::SchemaNotFound { template_id }
    }

    /// Create a malformed artifact error
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            message: message.into(),
        }
    }

    /// Create a missing worksheet error
    #[must_use]
    pub fn worksheet_missing(sheet: impl Into<String>) -> Self {
        Self::WorksheetMissing {
            sheet: sheet.into(),
        }
    }

    /// Create an invalid definition error
    #[must_use]
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
            element: None,
        }
    }

    /// Create an invalid definition error naming the offending element
    #[must_use]
    pub fn invalid_definition_at(message: impl Into<String>, element: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
            element: Some(element.into()),
        }
    }

    /// Create a submission-not-found error
    #[must_use]
    pub fn submission_not_found(unique_identifier: impl Into<String>) -> Self {
        Self::SubmissionNotFound {
            unique_identifier: unique_identifier.into(),
        }
    }

    /// Create a store error
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether the error means the requested template does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound { .. } | Self::SubmissionNotFound { .. }
        )
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for TemplateError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<regex::Error> for TemplateError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidDefinition {
            message: err.to_string(),
            element: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TemplateError::schema_not_found(42);
        assert!(matches!(err, TemplateError::SchemaNotFound { template_id: 42 }));
        assert!(err.is_not_found());

        let err = TemplateError::invalid_definition_at("duplicate column", "Age");
        match err {
            TemplateError::InvalidDefinition { element, .. } => {
                assert_eq!(element.as_deref(), Some("Age"));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::worksheet_missing("Template");
        assert_eq!(err.to_string(), "Worksheet 'Template' not found in artifact");

        let err = TemplateError::malformed("zip header missing");
        assert!(err.to_string().contains("zip header missing"));
    }

    #[test]
    fn test_error_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: TemplateError = json_err.into();
        assert!(matches!(err, TemplateError::Serialization(_)));

        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: TemplateError = regex_err.into();
        assert!(matches!(err, TemplateError::InvalidDefinition { .. }));
    }
}
