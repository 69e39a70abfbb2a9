use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{
    Color, DataValidation, DataValidationRule, ExcelDateTime, Format, FormatAlign, FormatBorder,
    Formula, Note, Workbook, Worksheet,
};
use std::path::Path;
use xltemplate_core::types::TemplateDefinition;

use super::error::{GeneratorError, GeneratorResult};
use super::generator::TemplateGenerator;
use super::layout::{
    ColumnLayout, Constraint, DECIMAL_INPUT_LIMIT, InputRule, Prefill, SheetLayout,
};

/// Longest error alert message a worksheet validation accepts
const MAX_ALERT_MESSAGE: usize = 255;

/// Longest error alert title a worksheet validation accepts
const MAX_ALERT_TITLE: usize = 32;

const NOTE_AUTHOR: &str = "xltemplate";

impl TemplateGenerator {
    /// Generate the template workbook as a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails [`Self::validate_template`] or
    /// the workbook cannot be assembled.
    pub fn generate(&self, template: &TemplateDefinition) -> GeneratorResult<Vec<u8>> {
        self.validate_template(template)?;
        let layout = self.plan(template)?;
        tracing::debug!(
            template = %template.name,
            columns = layout.columns.len(),
            "rendering template workbook"
        );
        render(&layout)
    }

    /// Generate the template workbook and save it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if workbook generation fails or the file cannot be written.
    pub fn generate_file(
        &self,
        template: &TemplateDefinition,
        path: impl AsRef<Path>,
    ) -> GeneratorResult<()> {
        let path = path.as_ref();
        let content = self.generate(template)?;
        std::fs::write(path, content).map_err(|e| {
            GeneratorError::Generation(format!("Failed to write file {}: {e}", path.display()))
        })?;
        Ok(())
    }
}

/// Render a planned layout into xlsx bytes.
///
/// # Errors
///
/// Returns an error if any worksheet operation is rejected by the writer.
pub fn render(layout: &SheetLayout) -> GeneratorResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x00D3_D3D3))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&layout.sheet_name)?;

    for column in &layout.columns {
        render_column(worksheet, layout, column, &header_format)?;
    }

    if layout.freeze_header {
        worksheet.set_freeze_panes(layout.first_data_row, 0)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| GeneratorError::Generation(format!("Failed to save workbook: {e}")))
}

fn render_column(
    worksheet: &mut Worksheet,
    layout: &SheetLayout,
    column: &ColumnLayout,
    header_format: &Format,
) -> GeneratorResult<()> {
    let col = column.index;
    let first = layout.first_data_row;

    worksheet.write_string_with_format(0, col, &column.header, header_format)?;
    worksheet.set_column_width(col, column.width)?;

    let data_format = column
        .number_format
        .map_or_else(Format::new, |fmt| Format::new().set_num_format(fmt));
    if column.number_format.is_some() {
        worksheet.set_column_format(col, &data_format)?;
    }

    if let Some(rule) = column.native_rule() {
        let validation = data_validation(rule)?;
        worksheet.add_data_validation(first, col, layout.last_data_row, col, &validation)?;
    }

    if !column.notes.is_empty() {
        let note = Note::new(column.notes.join("\n")).set_author(NOTE_AUTHOR);
        worksheet.insert_note(0, col, &note)?;
    }

    match &column.prefill {
        Some(Prefill::Number(value)) => {
            worksheet.write_number_with_format(first, col, *value, &data_format)?;
        }
        Some(Prefill::Date(date)) => match excel_date(*date) {
            Ok(datetime) => {
                worksheet.write_datetime_with_format(first, col, &datetime, &data_format)?;
            }
            Err(_) => {
                worksheet.write_string(first, col, date.format("%Y-%m-%d").to_string())?;
            }
        },
        Some(Prefill::Text(text)) => {
            worksheet.write_string(first, col, text)?;
        }
        None => {}
    }

    Ok(())
}

fn data_validation(rule: &InputRule) -> GeneratorResult<DataValidation> {
    let validation = match &rule.constraint {
        Constraint::DecimalBetween { min, max } => DataValidation::new().allow_decimal_number(
            DataValidationRule::Between(input_decimal(*min), input_decimal(*max)),
        ),
        Constraint::DecimalAtLeast { min } => DataValidation::new()
            .allow_decimal_number(DataValidationRule::GreaterThanOrEqualTo(input_decimal(*min))),
        Constraint::DecimalAtMost { max } => DataValidation::new()
            .allow_decimal_number(DataValidationRule::LessThanOrEqualTo(input_decimal(*max))),
        Constraint::AnyDecimal => DataValidation::new().allow_decimal_number(
            DataValidationRule::Between(-DECIMAL_INPUT_LIMIT, DECIMAL_INPUT_LIMIT),
        ),
        Constraint::DateBetween { start, end } => DataValidation::new().allow_date(
            DataValidationRule::Between(excel_date(*start)?, excel_date(*end)?),
        ),
        Constraint::List { choices } => DataValidation::new()
            .allow_list_strings(&choices.iter().map(String::as_str).collect::<Vec<_>>())?,
        Constraint::TextLength { max } => {
            DataValidation::new().allow_text_length(DataValidationRule::Between(0, *max))
        }
        Constraint::NonBlank { formula } => DataValidation::new()
            .allow_custom(Formula::new(formula))
            .ignore_blank(false),
    };

    Ok(validation
        .set_error_title(&truncate(&rule.error_title, MAX_ALERT_TITLE))?
        .set_error_message(&truncate(&rule.error_message, MAX_ALERT_MESSAGE))?)
}

fn excel_date(date: NaiveDate) -> GeneratorResult<ExcelDateTime> {
    let year = u16::try_from(date.year())
        .map_err(|_| GeneratorError::Generation(format!("Date {date} is out of range")))?;
    let month = u8::try_from(date.month())
        .map_err(|_| GeneratorError::Generation(format!("Date {date} is out of range")))?;
    let day = u8::try_from(date.day())
        .map_err(|_| GeneratorError::Generation(format!("Date {date} is out of range")))?;
    Ok(ExcelDateTime::from_ymd(year, month, day)?)
}

fn input_decimal(value: f64) -> f64 {
    value.clamp(-DECIMAL_INPUT_LIMIT, DECIMAL_INPUT_LIMIT)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use xltemplate_core::types::{ColumnDefinition, DataType};

    #[test]
    fn test_generate_produces_xlsx_bytes() {
        let template = TemplateDefinition::new("People")
            .with_column(ColumnDefinition::new("Name", DataType::Text).required())
            .with_column(ColumnDefinition::new("Age", DataType::Number).with_range(0.0, 120.0))
            .with_column(ColumnDefinition::new("Active", DataType::Boolean).with_default("Yes"));

        let bytes = TemplateGenerator::new().generate(&template).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_decimal_bounds_stay_within_input_range() {
        assert_eq!(input_decimal(f64::MAX), DECIMAL_INPUT_LIMIT);
        assert_eq!(input_decimal(f64::MIN), -DECIMAL_INPUT_LIMIT);
        assert_eq!(input_decimal(120.0), 120.0);

        let unbounded = TemplateDefinition::new("Totals")
            .with_column(ColumnDefinition::new("Total", DataType::Number))
            .with_column(ColumnDefinition::new("Huge", DataType::Number).with_max(f64::MAX));
        assert!(TemplateGenerator::new().generate(&unbounded).is_ok());
    }

    #[test]
    fn test_generate_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");
        let template = TemplateDefinition::new("T")
            .with_column(ColumnDefinition::new("Start", DataType::Date).with_default("2024-01-15"));

        TemplateGenerator::new()
            .with_frozen_header(true)
            .generate_file(&template, &path)
            .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_generate_rejects_invalid_template() {
        let template = TemplateDefinition::new("")
            .with_column(ColumnDefinition::new("Name", DataType::Text));
        assert!(matches!(
            TemplateGenerator::new().generate(&template),
            Err(GeneratorError::Template(_))
        ));
    }

    #[test]
    fn test_excel_date_bounds() {
        assert!(excel_date(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()).is_ok());
        assert!(excel_date(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()).is_err());
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Zürich", 3), "Zür");
        assert_eq!(truncate("short", 32), "short");
    }
}
