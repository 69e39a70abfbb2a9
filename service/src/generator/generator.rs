use xltemplate_core::config::GeneratorConfig;
use xltemplate_core::types::TemplateDefinition;

use super::cast::usize_to_u16_column;
use super::error::{GeneratorError, GeneratorResult};
use super::features::GeneratorFeatures;
use super::layout::prefill;
use crate::validator::validate_cell;

/// Workbook generator entry point.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    /// Enabled features.
    features: GeneratorFeatures,
    /// Layout settings.
    pub(super) config: GeneratorConfig,
}

impl TemplateGenerator {
    /// Create a generator with the standard features and default layout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            features: GeneratorFeatures::STANDARD,
            config: GeneratorConfig::default(),
        }
    }

    /// Create a generator with custom layout settings.
    ///
    /// `freeze_header` in the configuration enables [`GeneratorFeatures::FREEZE_HEADER`].
    #[must_use]
    pub fn with_config(config: GeneratorConfig) -> Self {
        let freeze = config.freeze_header;
        let mut generator = Self::new();
        generator.config = config;
        generator.with_frozen_header(freeze)
    }

    /// Replace the whole feature set.
    #[must_use]
    pub fn with_features(mut self, features: GeneratorFeatures) -> Self {
        self.features = features;
        self
    }

    fn toggle(mut self, feature: GeneratorFeatures, enabled: bool) -> Self {
        self.features.set(feature, enabled);
        self
    }

    /// Configure native input constraints.
    #[must_use]
    pub fn with_validation(self, enabled: bool) -> Self {
        self.toggle(GeneratorFeatures::ADD_VALIDATION, enabled)
    }

    /// Configure default value pre-fill.
    #[must_use]
    pub fn with_defaults(self, enabled: bool) -> Self {
        self.toggle(GeneratorFeatures::PREFILL_DEFAULTS, enabled)
    }

    /// Configure header freezing.
    #[must_use]
    pub fn with_frozen_header(self, enabled: bool) -> Self {
        self.toggle(GeneratorFeatures::FREEZE_HEADER, enabled)
    }

    /// Configure constraint notes.
    #[must_use]
    pub fn with_notes(self, enabled: bool) -> Self {
        self.toggle(GeneratorFeatures::CONSTRAINT_NOTES, enabled)
    }

    /// Enabled features.
    #[must_use]
    pub fn features(&self) -> GeneratorFeatures {
        self.features
    }

    /// Layout settings.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Check if input constraints are enabled.
    #[must_use]
    pub fn add_validation(&self) -> bool {
        self.features.contains(GeneratorFeatures::ADD_VALIDATION)
    }

    /// Check if default pre-fill is enabled.
    #[must_use]
    pub fn prefill_defaults(&self) -> bool {
        self.features.contains(GeneratorFeatures::PREFILL_DEFAULTS)
    }

    /// Check if header freezing is enabled.
    #[must_use]
    pub fn freeze_header(&self) -> bool {
        self.features.contains(GeneratorFeatures::FREEZE_HEADER)
    }

    /// Check if constraint notes are enabled.
    #[must_use]
    pub fn constraint_notes(&self) -> bool {
        self.features.contains(GeneratorFeatures::CONSTRAINT_NOTES)
    }

    /// Check that a template can be rendered.
    ///
    /// Beyond the definition rules this rejects templates with more columns
    /// than a worksheet holds, and defaults that would fail their own column
    /// validation once submitted back.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::Template` for definition rule violations and
    /// `GeneratorError::Validation` for the rendering checks.
    pub fn validate_template(&self, template: &TemplateDefinition) -> GeneratorResult<()> {
        template.validate()?;

        usize_to_u16_column(template.columns.len().saturating_sub(1))?;

        for column in &template.columns {
            let Some(default) = column.default_value() else {
                continue;
            };
            // Checked in the form a submission will carry it
            let written = prefill(column.data_type, default).decoded_text();
            if let Some(reason) = validate_cell(&written, column).reason() {
                let read_back = if written == default {
                    String::new()
                } else {
                    format!(" (read back as '{written}')")
                };
                return Err(GeneratorError::Validation(format!(
                    "Default value '{default}' of column '{}'{read_back} is rejected: {reason}",
                    column.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xltemplate_core::types::{ColumnDefinition, DataType};

    #[test]
    fn test_feature_toggles() {
        let generator = TemplateGenerator::new();
        assert!(generator.add_validation());
        assert!(generator.prefill_defaults());
        assert!(!generator.freeze_header());

        let generator = generator.with_validation(false).with_frozen_header(true);
        assert!(!generator.add_validation());
        assert!(generator.freeze_header());
    }

    #[test]
    fn test_config_freeze_header_enables_feature() {
        let config = GeneratorConfig {
            freeze_header: true,
            ..GeneratorConfig::default()
        };
        assert!(TemplateGenerator::with_config(config).freeze_header());
    }

    #[test]
    fn test_rejects_default_failing_its_column() {
        let template = TemplateDefinition::new("People").with_column(
            ColumnDefinition::new("Age", DataType::Number)
                .with_range(0.0, 120.0)
                .with_default("200"),
        );
        let err = TemplateGenerator::new()
            .validate_template(&template)
            .unwrap_err();
        assert!(err.to_string().contains("Age must be at most 120"));
    }

    #[test]
    fn test_defaults_are_checked_as_read_back() {
        let padded = TemplateDefinition::new("Codes").with_column(
            ColumnDefinition::new("Code", DataType::Number)
                .with_pattern(r"^\d{3}$")
                .with_default("007"),
        );
        let err = TemplateGenerator::new()
            .validate_template(&padded)
            .unwrap_err();
        assert!(err.to_string().contains("read back as '7'"));
        assert!(err.to_string().contains("Code format is invalid"));

        let grouped = TemplateDefinition::new("Budget").with_column(
            ColumnDefinition::new("Amount", DataType::Currency)
                .with_max_length(6)
                .with_default("1,250.50"),
        );
        assert!(TemplateGenerator::new().validate_template(&grouped).is_ok());

        let stamped = TemplateDefinition::new("Events").with_column(
            ColumnDefinition::new("On", DataType::Date)
                .with_max_length(10)
                .with_default("2024-01-15 08:30:00"),
        );
        assert!(TemplateGenerator::new().validate_template(&stamped).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let template = TemplateDefinition::new("People")
            .with_column(ColumnDefinition::new("Name", DataType::Text))
            .with_column(ColumnDefinition::new("Name", DataType::Text));
        assert!(TemplateGenerator::new().validate_template(&template).is_err());
    }

    #[test]
    fn test_empty_template_is_renderable() {
        let template = TemplateDefinition::new("Empty");
        assert!(TemplateGenerator::new().validate_template(&template).is_ok());
    }
}
