//! Workbook decoder for submitted templates
//!
//! Reads the filled-in worksheet of a generated template and renders every
//! cell of every used data row as text, column by column in the template's
//! ordinal order.

use calamine::{Data, Range, Reader, Xlsx};
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use xltemplate_core::config::DecoderConfig;
use xltemplate_core::types::{ColumnDefinition, ColumnId, TemplateDefinition};

use super::error::{DecoderError, DecoderResult};
use crate::validator::parse::format_number;

/// One decoded cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCell {
    /// 1-based spreadsheet row
    pub row: u32,
    /// Column the cell belongs to
    pub column_id: ColumnId,
    /// Raw text of the cell, `""` when blank
    pub value: String,
}

/// Decoded worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedSheet {
    /// Worksheet that was read
    pub sheet_name: String,
    /// Header row text, one entry per template column
    pub headers: Vec<String>,
    /// Cells in row-major order
    pub cells: Vec<DecodedCell>,
    /// Number of data rows decoded
    pub row_count: usize,
}

/// Decoder for submitted template workbooks
#[derive(Debug, Clone, Default)]
pub struct WorkbookDecoder {
    config: DecoderConfig,
}

impl WorkbookDecoder {
    /// Create a decoder reading the first worksheet without a row cap
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with custom settings
    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode a workbook held in memory
    ///
    /// Rows after the header that contain at least one non-empty cell are
    /// decoded; each yields one cell per template column.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError::Template` when the template's columns lack
    /// unique identifiers, `DecoderError::Malformed` when the bytes are not a
    /// readable workbook and `DecoderError::WorksheetMissing` when the
    /// worksheet to read does not exist.
    pub fn decode(&self, data: &[u8], template: &TemplateDefinition) -> DecoderResult<DecodedSheet> {
        template.ensure_column_ids()?;
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;

        let sheet_name = match &self.config.sheet_name {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| DecoderError::WorksheetMissing("<first worksheet>".to_string()))?,
        };

        if !workbook.sheet_names().contains(&sheet_name) {
            return Err(DecoderError::WorksheetMissing(sheet_name));
        }

        let range = workbook.worksheet_range(&sheet_name)?;
        let columns = template.ordered_columns();
        let sheet = self.decode_range(&range, &sheet_name, &columns);

        tracing::debug!(
            template = %template.name,
            sheet = %sheet.sheet_name,
            rows = sheet.row_count,
            cells = sheet.cells.len(),
            "decoded workbook"
        );

        Ok(sheet)
    }

    /// Decode a workbook from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoding fails.
    pub fn decode_file(
        &self,
        path: impl AsRef<Path>,
        template: &TemplateDefinition,
    ) -> DecoderResult<DecodedSheet> {
        let data = std::fs::read(path)?;
        self.decode(&data, template)
    }

    fn decode_range(
        &self,
        range: &Range<Data>,
        sheet_name: &str,
        columns: &[&ColumnDefinition],
    ) -> DecodedSheet {
        let headers: Vec<String> = (0..columns.len())
            .map(|position| cell_text(range, 0, position))
            .collect();
        check_headers(&headers, columns);

        let mut sheet = DecodedSheet {
            sheet_name: sheet_name.to_string(),
            headers,
            ..DecodedSheet::default()
        };

        let Some((last_row, last_col)) = range.end() else {
            return sheet;
        };

        for row in 1..=last_row {
            if !row_is_used(range, row, last_col) {
                continue;
            }
            if let Some(limit) = self.config.max_rows
                && sheet.row_count >= limit
            {
                tracing::warn!(limit, "row limit reached; remaining rows are ignored");
                break;
            }

            sheet.row_count += 1;
            sheet.cells.extend(columns.iter().enumerate().map(|(position, column)| {
                DecodedCell {
                    row: row + 1,
                    column_id: column.id,
                    value: cell_text(range, row, position),
                }
            }));
        }

        sheet
    }
}

fn check_headers(headers: &[String], columns: &[&ColumnDefinition]) {
    for (header, column) in headers.iter().zip(columns) {
        if header.trim() != column.name.trim() {
            tracing::warn!(
                expected = %column.name,
                found = %header,
                "header does not match template column"
            );
        }
    }
}

fn row_is_used(range: &Range<Data>, row: u32, last_col: u32) -> bool {
    (0..=last_col).any(|col| {
        range
            .get_value((row, col))
            .is_some_and(|cell| !matches!(cell, Data::Empty) && !is_empty_string(cell))
    })
}

fn is_empty_string(cell: &Data) -> bool {
    matches!(cell, Data::String(s) if s.is_empty())
}

fn cell_text(range: &Range<Data>, row: u32, position: usize) -> String {
    u32::try_from(position)
        .ok()
        .and_then(|col| range.get_value((row, col)))
        .map(render_cell)
        .unwrap_or_default()
}

/// Render a cell as the text the validator sees
#[must_use]
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                datetime.format("%Y-%m-%d").to_string()
            }
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format_number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use xltemplate_core::TemplateError;
    use xltemplate_core::types::DataType;

    #[test]
    fn test_render_scalars() {
        assert_eq!(render_cell(&Data::String("Ada".to_string())), "Ada");
        assert_eq!(render_cell(&Data::Int(42)), "42");
        assert_eq!(render_cell(&Data::Float(42.0)), "42");
        assert_eq!(render_cell(&Data::Float(17.5)), "17.5");
        assert_eq!(render_cell(&Data::Bool(true)), "true");
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(render_cell(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
        assert_eq!(
            render_cell(&Data::DateTimeIso("2024-03-15".to_string())),
            "2024-03-15"
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let template = TemplateDefinition::new("T");
        let result = WorkbookDecoder::new().decode(b"definitely not a zip archive", &template);
        assert!(matches!(result, Err(DecoderError::Malformed(_))));
    }

    #[test]
    fn test_unnumbered_columns_are_rejected() {
        let template = TemplateDefinition::new("T")
            .with_column(ColumnDefinition::new("Name", DataType::Text))
            .with_column(ColumnDefinition::new("Age", DataType::Number));
        let result = WorkbookDecoder::new().decode(b"irrelevant", &template);
        assert!(matches!(
            result,
            Err(DecoderError::Template(TemplateError::InvalidDefinition { .. }))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let template = TemplateDefinition::new("T");
        let result = WorkbookDecoder::new().decode_file("/nonexistent/submission.xlsx", &template);
        assert!(matches!(result, Err(DecoderError::Io(_))));
    }
}
