//! Per-cell validation engine
//!
//! A cell is classified by a fixed sequence of checks; the first failing
//! check determines the reported reason. Aggregation across cells is the
//! caller's job.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use xltemplate_core::types::{ColumnDefinition, ColumnId, DataType};

use super::parse::{compare_to_bound, parse_boolean, parse_date, parse_decimal};

/// Outcome of validating one raw cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellVerdict {
    /// The value satisfies the column definition
    Valid,
    /// The value violates the column definition
    Invalid(String),
}

impl CellVerdict {
    /// Whether the verdict is `Valid`
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Failure reason, if any
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

impl fmt::Display for CellVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid(reason) => write!(f, "invalid: {reason}"),
        }
    }
}

/// State of a column's validation pattern
#[derive(Debug, Clone)]
enum PatternCheck {
    None,
    Compiled(Regex),
    Broken,
}

impl PatternCheck {
    fn compile(column: &ColumnDefinition) -> Self {
        match column.validation_pattern() {
            None => Self::None,
            Some(pattern) => match Regex::new(pattern) {
                Ok(regex) => Self::Compiled(regex),
                Err(e) => {
                    tracing::warn!(
                        column = %column.name,
                        pattern,
                        error = %e,
                        "validation pattern does not compile; non-empty values will be rejected"
                    );
                    Self::Broken
                }
            },
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Self::None => true,
            Self::Compiled(regex) => regex.is_match(value),
            Self::Broken => false,
        }
    }
}

/// Validate a raw value against a column definition
///
/// The pattern, if any, is compiled on every call; use [`CellValidator`]
/// when validating many cells of the same template.
#[must_use]
pub fn validate_cell(value: &str, column: &ColumnDefinition) -> CellVerdict {
    check(value, column, &PatternCheck::compile(column))
}

/// Validator with the patterns of a set of columns compiled once
#[derive(Debug, Clone, Default)]
pub struct CellValidator {
    patterns: HashMap<ColumnId, (Option<String>, PatternCheck)>,
}

impl CellValidator {
    /// Create a validator for the given columns
    #[must_use]
    pub fn new<'a>(columns: impl IntoIterator<Item = &'a ColumnDefinition>) -> Self {
        let patterns = columns
            .into_iter()
            .map(|column| {
                let source = column.validation_pattern().map(str::to_string);
                (column.id, (source, PatternCheck::compile(column)))
            })
            .collect();
        Self { patterns }
    }

    /// Validate a raw value against a column definition
    ///
    /// Columns unknown to this validator, or whose pattern differs from the
    /// one compiled under their identifier, fall back to [`validate_cell`].
    #[must_use]
    pub fn validate(&self, value: &str, column: &ColumnDefinition) -> CellVerdict {
        match self.patterns.get(&column.id) {
            Some((source, pattern)) if source.as_deref() == column.validation_pattern() => {
                check(value, column, pattern)
            }
            _ => validate_cell(value, column),
        }
    }
}

fn check(value: &str, column: &ColumnDefinition, pattern: &PatternCheck) -> CellVerdict {
    let name = &column.name;

    if value.trim().is_empty() {
        return if column.required {
            CellVerdict::Invalid(format!("{name} is required"))
        } else {
            CellVerdict::Valid
        };
    }

    if let Some(reason) = check_type(value, column) {
        return CellVerdict::Invalid(reason);
    }

    if let Some(max_length) = column.max_length
        && value.chars().count() > max_length as usize
    {
        return CellVerdict::Invalid(format!("{name} must be at most {max_length} characters"));
    }

    if !pattern.matches(value) {
        return CellVerdict::Invalid(format!("{name} format is invalid"));
    }

    CellVerdict::Valid
}

fn check_type(value: &str, column: &ColumnDefinition) -> Option<String> {
    let name = &column.name;
    match column.data_type {
        DataType::Number | DataType::Currency => {
            let Some(number) = parse_decimal(value) else {
                return Some(format!("{name} must be a number"));
            };
            if let Some(min) = column.min_value
                && compare_to_bound(value, number, min) == Ordering::Less
            {
                return Some(format!("{name} must be at least {min}"));
            }
            if let Some(max) = column.max_value
                && compare_to_bound(value, number, max) == Ordering::Greater
            {
                return Some(format!("{name} must be at most {max}"));
            }
            None
        }
        DataType::Date => parse_date(value)
            .is_none()
            .then(|| format!("{name} must be a valid date")),
        DataType::Boolean => parse_boolean(value)
            .is_none()
            .then(|| format!("{name} must be true or false")),
        DataType::Text => None,
    }
}
