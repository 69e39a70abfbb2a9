//! Decoder error types

use thiserror::Error;
use xltemplate_core::TemplateError;

/// Result type for decoder operations
pub type DecoderResult<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while decoding a submitted workbook
///
/// Cell content never produces an error; only the container can.
#[derive(Debug, Error)]
pub enum DecoderError {
    /// The artifact is not a readable workbook
    #[error("Failed to read workbook: {0}")]
    Malformed(String),

    /// The worksheet to decode does not exist
    #[error("Worksheet '{0}' not found")]
    WorksheetMissing(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The template cannot map cells to columns
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<calamine::XlsxError> for DecoderError {
    fn from(err: calamine::XlsxError) -> Self {
        DecoderError::Malformed(err.to_string())
    }
}

impl From<DecoderError> for TemplateError {
    fn from(err: DecoderError) -> Self {
        match err {
            DecoderError::Malformed(message) => TemplateError::malformed(message),
            DecoderError::WorksheetMissing(sheet) => TemplateError::worksheet_missing(sheet),
            DecoderError::Io(io_err) => TemplateError::Io(io_err),
            DecoderError::Template(template_err) => template_err,
        }
    }
}
