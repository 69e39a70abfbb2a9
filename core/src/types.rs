//! Template, column and submission types
//!
//! The schema model is plain data. The only ordering rule lives in
//! [`TemplateDefinition::ordered_columns`], which both the workbook generator
//! and the workbook decoder use to map columns to spreadsheet positions.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TemplateError};

/// Identifier of a template
pub type TemplateId = i64;

/// Identifier of a column definition
pub type ColumnId = i64;

/// Actor recorded for history entries written by the service itself
pub const SYSTEM_ACTOR: &str = "System";

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    /// Free text
    #[default]
    Text,
    /// Decimal number
    Number,
    /// Decimal number displayed as currency
    Currency,
    /// Calendar date
    Date,
    /// True/false choice
    Boolean,
}

impl DataType {
    /// All data types in declaration order
    pub const ALL: [DataType; 5] = [
        DataType::Text,
        DataType::Number,
        DataType::Currency,
        DataType::Date,
        DataType::Boolean,
    ];

    /// Whether values of this type are compared against numeric bounds
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Currency)
    }

    /// Canonical name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Number => "Number",
            Self::Currency => "Currency",
            Self::Date => "Date",
            Self::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TemplateError::invalid_definition(format!("Unknown data type '{s}'")))
    }
}

/// A single column of a template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefinition {
    /// Store-assigned identifier; creation order defines the ordinal position
    pub id: ColumnId,

    /// Owning template
    pub template_id: TemplateId,

    /// Display label and lookup key
    pub name: String,

    /// Data type driving formatting, constraints and parsing
    pub data_type: DataType,

    /// Whether a blank value is rejected
    pub required: bool,

    /// Inclusive lower bound (numeric types only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    /// Inclusive upper bound (numeric types only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    /// Maximum number of characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    /// Value pre-filled into the first data row of generated workbooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Regular expression every non-empty value must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_pattern: Option<String>,
}

impl ColumnDefinition {
    /// Create a new column definition
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            ..Self::default()
        }
    }

    /// Mark the column as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set both numeric bounds
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Set the lower bound
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    /// Set the upper bound
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    /// Set the maximum length
    #[must_use]
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set the default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the validation pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.validation_pattern = Some(pattern.into());
        self
    }

    /// Default value, treating an empty string as absent
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|v| !v.is_empty())
    }

    /// Validation pattern, treating an empty string as absent
    #[must_use]
    pub fn validation_pattern(&self) -> Option<&str> {
        self.validation_pattern.as_deref().filter(|p| !p.is_empty())
    }

    /// Check the definition rules of a single column
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::InvalidDefinition` when the name is blank, the
    /// bounds are inverted, the maximum length is zero or the pattern does
    /// not compile.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::invalid_definition(
                "Column name must not be empty",
            ));
        }

        if let (Some(min), Some(max)) = (self.min_value, self.max_value)
            && min > max
        {
            return Err(TemplateError::invalid_definition_at(
                format!("Minimum value {min} exceeds maximum value {max}"),
                &self.name,
            ));
        }

        if self.max_length == Some(0) {
            return Err(TemplateError::invalid_definition_at(
                "Maximum length must be greater than zero",
                &self.name,
            ));
        }

        if let Some(pattern) = self.validation_pattern() {
            Regex::new(pattern).map_err(|e| {
                TemplateError::invalid_definition_at(
                    format!("Invalid validation pattern '{pattern}': {e}"),
                    &self.name,
                )
            })?;
        }

        if !self.data_type.is_numeric() && (self.min_value.is_some() || self.max_value.is_some())
        {
            tracing::debug!(
                column = %self.name,
                data_type = %self.data_type,
                "numeric bounds on non-numeric column are ignored"
            );
        }

        Ok(())
    }
}

/// A template: named, versioned, ordered set of columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDefinition {
    /// Store-assigned identifier
    pub id: TemplateId,

    /// Template name
    pub name: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-form version label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Creation time
    pub created_date: DateTime<Utc>,

    /// Whether the template accepts new submissions
    pub is_active: bool,

    /// Columns in storage order; use [`Self::ordered_columns`] for layout order
    pub columns: Vec<ColumnDefinition>,
}

impl Default for TemplateDefinition {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: None,
            version: None,
            created_date: Utc::now(),
            is_active: true,
            columns: Vec::new(),
        }
    }
}

impl TemplateDefinition {
    /// Create a new template
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a column
    #[must_use]
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Columns in ordinal order (ascending identifier, stable for ties)
    #[must_use]
    pub fn ordered_columns(&self) -> Vec<&ColumnDefinition> {
        let mut columns: Vec<&ColumnDefinition> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.id);
        columns
    }

    /// Look up a column by identifier
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Give sequential identifiers to columns that have none, keeping list order
    ///
    /// Used for definitions loaded from files, where identifiers are implicit.
    pub fn assign_column_ids(&mut self) {
        let mut next = self.columns.iter().map(|c| c.id).max().unwrap_or(0).max(0) + 1;
        for column in &mut self.columns {
            column.template_id = self.id;
            if column.id == 0 {
                column.id = next;
                next += 1;
            }
        }
    }

    /// Check the definition rules of the template and all its columns
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::InvalidDefinition` for a blank template name,
    /// duplicate column names or any invalid column.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::invalid_definition(
                "Template name must not be empty",
            ));
        }

        let mut seen = HashSet::new();
        let mut ids = HashSet::new();
        for column in &self.columns {
            column.validate()?;
            if !seen.insert(column.name.trim()) {
                return Err(TemplateError::invalid_definition_at(
                    format!("Duplicate column name '{}'", column.name),
                    &column.name,
                ));
            }
            // 0 marks a column the store has not numbered yet
            if column.id < 0 {
                return Err(TemplateError::invalid_definition_at(
                    format!("Column identifier {} must be positive", column.id),
                    &column.name,
                ));
            }
            if column.id > 0 && !ids.insert(column.id) {
                return Err(TemplateError::invalid_definition_at(
                    format!("Duplicate column identifier {}", column.id),
                    &column.name,
                ));
            }
        }

        Ok(())
    }

    /// Check that every column carries its own positive identifier
    ///
    /// Decoded cells refer to columns by identifier, so decoding and
    /// validating a submission require this.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::InvalidDefinition` naming the first column
    /// without an identifier or with one already in use.
    pub fn ensure_column_ids(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for column in &self.columns {
            if column.id <= 0 || !ids.insert(column.id) {
                return Err(TemplateError::invalid_definition_at(
                    format!(
                        "Column '{}' has no unique identifier ({}) in template '{}'",
                        column.name, column.id, self.name
                    ),
                    &column.name,
                ));
            }
        }
        Ok(())
    }
}

/// Submission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Accepted, not (yet) validated clean
    #[default]
    Submitted,
    /// Every cell passed validation
    Validated,
    /// Rejected by an administrator
    Rejected,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "Submitted"),
            Self::Validated => write!(f, "Validated"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Action recorded in a submission history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryAction {
    /// Submission was created
    Created,
    /// Submission passed validation
    Validated,
    /// Submission was rejected
    Rejected,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Validated => write!(f, "Validated"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// One entry of the append-only submission history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// What happened
    pub action: HistoryAction,
    /// Who did it
    pub action_by: String,
    /// When it happened
    pub action_date: DateTime<Utc>,
    /// Free-form note
    pub notes: Option<String>,
}

impl HistoryEntry {
    /// Create a history entry
    #[must_use]
    pub fn new(
        action: HistoryAction,
        action_by: impl Into<String>,
        action_date: DateTime<Utc>,
    ) -> Self {
        Self {
            action,
            action_by: action_by.into(),
            action_date,
            notes: None,
        }
    }

    /// Attach a note
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A decoded raw cell value stored with a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValue {
    /// Column the value belongs to
    pub column_id: ColumnId,
    /// Raw decoded text
    pub value: String,
}

/// Durable record of one accepted upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Template the submission was validated against
    pub template_id: TemplateId,
    /// Opaque, globally unique identifier assigned at creation
    pub unique_identifier: String,
    /// Submitting user
    pub submitted_by: String,
    /// Submission time
    pub submitted_date: DateTime<Utc>,
    /// Lifecycle status
    pub status: SubmissionStatus,
    /// Cell values in row-major scan order
    pub cell_values: Vec<CellValue>,
    /// Append-only history
    pub history: Vec<HistoryEntry>,
}

impl SubmissionRecord {
    /// Create a new record with status `Submitted` and a "Created" history entry
    #[must_use]
    pub fn new(
        template_id: TemplateId,
        submitted_by: impl Into<String>,
        submitted_date: DateTime<Utc>,
    ) -> Self {
        let submitted_by = submitted_by.into();
        let created = HistoryEntry::new(HistoryAction::Created, &submitted_by, submitted_date)
            .with_notes("Document submitted");
        Self {
            template_id,
            unique_identifier: uuid::Uuid::new_v4().to_string(),
            submitted_by,
            submitted_date,
            status: SubmissionStatus::Submitted,
            cell_values: Vec::new(),
            history: vec![created],
        }
    }

    /// Change the status and record the transition
    pub fn transition(&mut self, status: SubmissionStatus, entry: HistoryEntry) {
        self.status = status;
        self.history.push(entry);
    }
}

/// A single failed cell reported back to the submitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Column whose cell failed; absent for document-level failures
    pub column_name: Option<String>,
    /// Spreadsheet row number (1-based) of the failing cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    /// Human-readable reason
    pub error_message: String,
}

impl ValidationError {
    /// Error tied to a specific cell
    #[must_use]
    pub fn cell(column_name: impl Into<String>, row: u32, message: impl Into<String>) -> Self {
        Self {
            column_name: Some(column_name.into()),
            row: Some(row),
            error_message: message.into(),
        }
    }

    /// Error about the whole document
    #[must_use]
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            column_name: None,
            row: None,
            error_message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, &self.column_name) {
            (Some(row), Some(column)) => write!(f, "row {row}, {column}: {}", self.error_message),
            (None, Some(column)) => write!(f, "{column}: {}", self.error_message),
            _ => f.write_str(&self.error_message),
        }
    }
}

/// Outcome of submitting a filled-in workbook
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// True iff the document was processed and no cell failed
    pub is_valid: bool,
    /// Identifier of the persisted record, when one was stored
    pub unique_identifier: Option<String>,
    /// Accumulated errors in scan order
    pub errors: Vec<ValidationError>,
}

impl SubmissionResult {
    /// Result carrying a single document-level error
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            unique_identifier: None,
            errors: vec![ValidationError::document(message)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_data_type_parsing() {
        assert_eq!("number".parse::<DataType>().unwrap(), DataType::Number);
        assert_eq!(" Currency ".parse::<DataType>().unwrap(), DataType::Currency);
        assert!("Decimal".parse::<DataType>().is_err());
        assert!(DataType::Currency.is_numeric());
        assert!(!DataType::Date.is_numeric());
    }

    #[test]
    fn test_ordered_columns_follow_identifiers() {
        let mut template = TemplateDefinition::new("Survey");
        template.columns = vec![
            ColumnDefinition {
                id: 7,
                ..ColumnDefinition::new("Third", DataType::Text)
            },
            ColumnDefinition {
                id: 2,
                ..ColumnDefinition::new("First", DataType::Number)
            },
            ColumnDefinition {
                id: 5,
                ..ColumnDefinition::new("Second", DataType::Date)
            },
        ];

        let names: Vec<&str> = template
            .ordered_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_assign_column_ids_keeps_list_order() {
        let mut template = TemplateDefinition::new("People")
            .with_column(ColumnDefinition::new("Name", DataType::Text))
            .with_column(ColumnDefinition::new("Age", DataType::Number));
        template.id = 3;
        template.assign_column_ids();

        assert_eq!(template.columns[0].id, 1);
        assert_eq!(template.columns[1].id, 2);
        assert!(template.columns.iter().all(|c| c.template_id == 3));
    }

    #[test]
    fn test_template_validation_rules() {
        let duplicate = TemplateDefinition::new("Dup")
            .with_column(ColumnDefinition::new("A", DataType::Text))
            .with_column(ColumnDefinition::new("A", DataType::Number));
        assert!(duplicate.validate().is_err());

        let inverted = TemplateDefinition::new("Inverted")
            .with_column(ColumnDefinition::new("Age", DataType::Number).with_range(10.0, 1.0));
        assert!(inverted.validate().is_err());

        let bad_pattern = TemplateDefinition::new("Pattern")
            .with_column(ColumnDefinition::new("Code", DataType::Text).with_pattern("(["));
        assert!(bad_pattern.validate().is_err());

        let unnamed = TemplateDefinition::new("  ");
        assert!(unnamed.validate().is_err());

        let ok = TemplateDefinition::new("Ok")
            .with_column(ColumnDefinition::new("Age", DataType::Number).with_range(0.0, 120.0));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_column_identifier_rules() {
        let mut template = TemplateDefinition::new("People")
            .with_column(ColumnDefinition::new("Name", DataType::Text))
            .with_column(ColumnDefinition::new("Age", DataType::Number));

        // unnumbered columns are a valid definition but cannot be decoded against
        assert!(template.validate().is_ok());
        assert!(template.ensure_column_ids().is_err());

        template.columns[0].id = 4;
        template.columns[1].id = 4;
        assert!(template.validate().is_err());
        assert!(template.ensure_column_ids().is_err());

        template.columns[1].id = -1;
        assert!(template.validate().is_err());

        // a stored template gaining a new, unnumbered column
        template.columns[1].id = 0;
        assert!(template.validate().is_ok());

        template.assign_column_ids();
        assert!(template.validate().is_ok());
        assert!(template.ensure_column_ids().is_ok());
    }

    #[test]
    fn test_new_submission_has_created_entry() {
        let now = Utc::now();
        let record = SubmissionRecord::new(1, "alice", now);

        assert_eq!(record.status, SubmissionStatus::Submitted);
        assert_eq!(record.history.len(), 1);
        assert_eq!(record.history[0].action, HistoryAction::Created);
        assert_eq!(record.history[0].action_by, "alice");
        assert!(uuid::Uuid::parse_str(&record.unique_identifier).is_ok());
    }

    #[test]
    fn test_empty_default_and_pattern_are_absent() {
        let column = ColumnDefinition::new("Note", DataType::Text)
            .with_default("")
            .with_pattern("");
        assert_eq!(column.default_value(), None);
        assert_eq!(column.validation_pattern(), None);
    }
}
