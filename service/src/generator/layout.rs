//! Pure sheet layout planning
//!
//! [`TemplateGenerator::plan`] turns a template into a [`SheetLayout`]: every
//! header, width, number format, input rule, note and pre-filled value the
//! renderer will write. Planning performs no I/O, so layouts can be compared
//! directly in tests.

use chrono::NaiveDate;
use serde::Serialize;
use xltemplate_core::types::{ColumnDefinition, ColumnId, DataType, TemplateDefinition};

use super::cast::{column_letter, usize_to_u16_column};
use super::error::GeneratorResult;
use super::generator::TemplateGenerator;
use crate::validator::parse::{format_number, parse_date, parse_decimal};

/// Earliest date accepted by date columns
pub const DATE_RANGE_START: (i32, u32, u32) = (1900, 1, 1);

/// Latest date accepted by date columns
pub const DATE_RANGE_END: (i32, u32, u32) = (2100, 12, 31);

/// Largest magnitude a worksheet accepts as typed numeric input
pub const DECIMAL_INPUT_LIMIT: f64 = 9.999_999_999_999_99e307;

/// Choices offered by boolean columns
pub const BOOLEAN_CHOICES: [&str; 2] = ["Yes", "No"];

/// Number format of currency columns
pub const CURRENCY_FORMAT: &str = "$#,##0.00";

/// Number format of number columns
pub const NUMBER_FORMAT: &str = "0.00";

/// Number format of date columns
pub const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Planned worksheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    /// Worksheet name
    pub sheet_name: String,
    /// First data row (0-based; the header occupies row 0)
    pub first_data_row: u32,
    /// Last row covered by input rules (0-based, inclusive)
    pub last_data_row: u32,
    /// Freeze the header row
    pub freeze_header: bool,
    /// Columns in ordinal order
    pub columns: Vec<ColumnLayout>,
}

impl SheetLayout {
    /// Header labels in column order
    #[must_use]
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }
}

/// Planned column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayout {
    /// 0-based worksheet column
    pub index: u16,
    /// Column letter reference (`A`, `B`, ...)
    pub letter: String,
    /// Source column
    pub column_id: ColumnId,
    /// Header label
    pub header: String,
    /// Column data type
    pub data_type: DataType,
    /// Column width in character units
    pub width: f64,
    /// Number format applied to the data region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<&'static str>,
    /// Type constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_rule: Option<InputRule>,
    /// Non-blank constraint of required columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_rule: Option<InputRule>,
    /// Text of the header note, one line per entry
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Value written into the first data row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefill: Option<Prefill>,
}

impl ColumnLayout {
    /// The rule rendered as the column's native validation
    ///
    /// A cell holds a single validation, so the type rule takes precedence
    /// and a required rule alongside it is surfaced through the notes.
    #[must_use]
    pub fn native_rule(&self) -> Option<&InputRule> {
        self.type_rule.as_ref().or(self.required_rule.as_ref())
    }
}

/// Input constraint with its error alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRule {
    /// Constraint kind and parameters
    pub constraint: Constraint,
    /// Error alert title
    pub error_title: String,
    /// Error alert message
    pub error_message: String,
}

/// Spreadsheet-native constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Decimal within inclusive bounds
    DecimalBetween {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Decimal at or above a bound
    DecimalAtLeast {
        /// Lower bound
        min: f64,
    },
    /// Decimal at or below a bound
    DecimalAtMost {
        /// Upper bound
        max: f64,
    },
    /// Any decimal
    AnyDecimal,
    /// Date within inclusive bounds
    DateBetween {
        /// First accepted date
        start: NaiveDate,
        /// Last accepted date
        end: NaiveDate,
    },
    /// One of a fixed list of strings
    List {
        /// Accepted values
        choices: Vec<String>,
    },
    /// Text no longer than a number of characters
    TextLength {
        /// Maximum length
        max: u32,
    },
    /// Custom formula that rejects blank entries
    NonBlank {
        /// Formula relative to the first data cell
        formula: String,
    },
}

/// Typed value written into the first data row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Prefill {
    /// Numeric cell
    Number(f64),
    /// Date cell
    Date(NaiveDate),
    /// String cell
    Text(String),
}

impl Prefill {
    /// Text the workbook decoder reads back from the written cell
    #[must_use]
    pub fn decoded_text(&self) -> String {
        match self {
            Self::Number(value) => format_number(*value),
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl TemplateGenerator {
    /// Plan the worksheet for a template.
    ///
    /// Identical templates always yield identical layouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the template has more columns than a worksheet holds.
    pub fn plan(&self, template: &TemplateDefinition) -> GeneratorResult<SheetLayout> {
        let first_data_row = 1;
        let columns = template
            .ordered_columns()
            .into_iter()
            .enumerate()
            .map(|(position, column)| {
                let index = usize_to_u16_column(position)?;
                Ok(self.plan_column(index, first_data_row, column))
            })
            .collect::<GeneratorResult<Vec<_>>>()?;

        Ok(SheetLayout {
            sheet_name: self.config.sheet_name.clone(),
            first_data_row,
            last_data_row: self.config.data_row_limit.saturating_sub(1).max(first_data_row),
            freeze_header: self.freeze_header(),
            columns,
        })
    }

    fn plan_column(&self, index: u16, first_data_row: u32, column: &ColumnDefinition) -> ColumnLayout {
        let letter = column_letter(index);
        let widths = &self.config.widths;

        let (width, number_format) = match column.data_type {
            DataType::Number => (widths.numeric, Some(NUMBER_FORMAT)),
            DataType::Currency => (widths.numeric, Some(CURRENCY_FORMAT)),
            DataType::Date => (widths.numeric, Some(DATE_FORMAT)),
            DataType::Boolean => (widths.boolean, None),
            DataType::Text => (widths.text, None),
        };

        let (type_rule, required_rule) = if self.add_validation() {
            (
                type_rule(column),
                column
                    .required
                    .then(|| required_rule(column, &letter, first_data_row)),
            )
        } else {
            (None, None)
        };

        let mut notes = Vec::new();
        if self.constraint_notes() {
            if let (Some(_), Some(required)) = (&type_rule, &required_rule) {
                notes.push(required.error_message.clone());
            }
            if let Some(pattern) = column.validation_pattern() {
                notes.push(format!("Pattern requirement: {pattern}"));
            }
        }

        let prefill = if self.prefill_defaults() {
            column.default_value().map(|value| prefill(column.data_type, value))
        } else {
            None
        };

        ColumnLayout {
            index,
            letter,
            column_id: column.id,
            header: column.name.clone(),
            data_type: column.data_type,
            width,
            number_format,
            type_rule,
            required_rule,
            notes,
            prefill,
        }
    }
}

fn type_rule(column: &ColumnDefinition) -> Option<InputRule> {
    match column.data_type {
        DataType::Number | DataType::Currency => Some(numeric_rule(column)),
        DataType::Date => {
            let (start, end) = date_range()?;
            Some(InputRule {
                constraint: Constraint::DateBetween { start, end },
                error_title: "Invalid Date".to_string(),
                error_message: "Please enter a valid date (YYYY-MM-DD)".to_string(),
            })
        }
        DataType::Boolean => Some(InputRule {
            constraint: Constraint::List {
                choices: BOOLEAN_CHOICES.iter().map(ToString::to_string).collect(),
            },
            error_title: "Invalid Selection".to_string(),
            error_message: "Please select 'Yes' or 'No' from the dropdown".to_string(),
        }),
        DataType::Text => column.max_length.map(|max| InputRule {
            constraint: Constraint::TextLength { max },
            error_title: "Text Too Long".to_string(),
            error_message: format!("Text cannot exceed {max} characters"),
        }),
    }
}

fn numeric_rule(column: &ColumnDefinition) -> InputRule {
    let (constraint, error_message) = match (column.min_value, column.max_value) {
        (Some(min), Some(max)) => (
            Constraint::DecimalBetween { min, max },
            format!("Please enter a valid number between {min} and {max}"),
        ),
        (Some(min), None) => (
            Constraint::DecimalAtLeast { min },
            format!("Please enter a valid number of at least {min}"),
        ),
        (None, Some(max)) => (
            Constraint::DecimalAtMost { max },
            format!("Please enter a valid number of at most {max}"),
        ),
        (None, None) => (
            Constraint::AnyDecimal,
            "Please enter a valid number".to_string(),
        ),
    };

    InputRule {
        constraint,
        error_title: "Invalid Number".to_string(),
        error_message,
    }
}

fn required_rule(column: &ColumnDefinition, letter: &str, first_data_row: u32) -> InputRule {
    InputRule {
        constraint: Constraint::NonBlank {
            formula: format!("LEN(TRIM({letter}{}))>0", first_data_row + 1),
        },
        error_title: "Required Field".to_string(),
        error_message: format!("'{}' is a required field", column.name),
    }
}

fn date_range() -> Option<(NaiveDate, NaiveDate)> {
    let (y, m, d) = DATE_RANGE_START;
    let start = NaiveDate::from_ymd_opt(y, m, d)?;
    let (y, m, d) = DATE_RANGE_END;
    let end = NaiveDate::from_ymd_opt(y, m, d)?;
    Some((start, end))
}

pub(super) fn prefill(data_type: DataType, value: &str) -> Prefill {
    match data_type {
        DataType::Number | DataType::Currency => {
            parse_decimal(value).map_or_else(|| Prefill::Text(value.to_string()), Prefill::Number)
        }
        DataType::Date => {
            parse_date(value).map_or_else(|| Prefill::Text(value.to_string()), Prefill::Date)
        }
        DataType::Boolean | DataType::Text => Prefill::Text(value.to_string()),
    }
}
