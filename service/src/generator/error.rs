//! Generator error types

use thiserror::Error;
use xltemplate_core::TemplateError;

/// Result type for generator operations
pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur while generating a template workbook
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Template definition cannot be rendered
    #[error("Template validation failed: {0}")]
    Validation(String),

    /// Workbook construction error
    #[error("Workbook generation failed: {0}")]
    Generation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Core error
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<rust_xlsxwriter::XlsxError> for GeneratorError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        GeneratorError::Generation(err.to_string())
    }
}

impl From<GeneratorError> for TemplateError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::Template(inner) => inner,
            GeneratorError::Io(io_err) => TemplateError::Io(io_err),
            GeneratorError::Validation(msg) => TemplateError::invalid_definition(msg),
            GeneratorError::Generation(msg) => TemplateError::other(msg),
        }
    }
}
