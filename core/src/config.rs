//! Configuration types for the template service

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplateError};

/// Longest worksheet name a workbook accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Main configuration for the template service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Workbook generation configuration
    pub generator: GeneratorConfig,

    /// Workbook decoding configuration
    pub decoder: DecoderConfig,

    /// Submission validation configuration
    pub validation: ValidationConfig,
}

impl ServiceConfig {
    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Config` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        self.decoder.validate()?;
        Ok(())
    }
}

/// Column widths per data type category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnWidths {
    /// Number, Currency and Date columns
    pub numeric: f64,
    /// Boolean columns
    pub boolean: f64,
    /// Text columns
    pub text: f64,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            numeric: 15.0,
            boolean: 10.0,
            text: 20.0,
        }
    }
}

/// Workbook generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Name of the single worksheet
    pub sheet_name: String,

    /// Last spreadsheet row (1-based) covered by input constraints
    pub data_row_limit: u32,

    /// Column widths
    pub widths: ColumnWidths,

    /// Freeze the header row
    pub freeze_header: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Template".to_string(),
            data_row_limit: 1000,
            widths: ColumnWidths::default(),
            freeze_header: false,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<()> {
        validate_sheet_name(&self.sheet_name)?;

        if self.data_row_limit < 2 {
            return Err(TemplateError::config(format!(
                "generator.data_row_limit must be at least 2, got {}",
                self.data_row_limit
            )));
        }

        for (label, width) in [
            ("numeric", self.widths.numeric),
            ("boolean", self.widths.boolean),
            ("text", self.widths.text),
        ] {
            if !(width > 0.0 && width <= 255.0) {
                return Err(TemplateError::config(format!(
                    "generator.widths.{label} must be in (0, 255], got {width}"
                )));
            }
        }

        Ok(())
    }
}

/// Workbook decoding configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Worksheet to read; `None` reads the first worksheet
    pub sheet_name: Option<String>,

    /// Maximum number of data rows to read
    pub max_rows: Option<usize>,
}

impl DecoderConfig {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.sheet_name {
            validate_sheet_name(name)?;
        }
        if self.max_rows == Some(0) {
            return Err(TemplateError::config("decoder.max_rows must not be zero"));
        }
        Ok(())
    }
}

/// Submission validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Cell count at which validation switches to the parallel path
    pub parallel_threshold: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 10_000,
        }
    }
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(TemplateError::config(format!(
            "Sheet name '{name}' must be 1 to {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if name.contains(['\\', '/', '?', '*', '[', ']', ':']) {
        return Err(TemplateError::config(format!(
            "Sheet name '{name}' contains a forbidden character"
        )));
    }
    Ok(())
}
