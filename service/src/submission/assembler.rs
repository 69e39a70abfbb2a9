use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use xltemplate_core::config::{ServiceConfig, ValidationConfig};
use xltemplate_core::types::{
    CellValue, ColumnDefinition, ColumnId, HistoryAction, HistoryEntry, SYSTEM_ACTOR,
    SubmissionRecord, SubmissionResult, SubmissionStatus, TemplateDefinition, TemplateId,
    ValidationError,
};
use xltemplate_core::{Clock, Result, SchemaStore, SubmissionStore, SystemClock, TemplateError};

use crate::loader::{DecodedCell, WorkbookDecoder};
use crate::validator::CellValidator;

const TEMPLATE_NOT_FOUND: &str = "Template not found";

/// Turns uploaded workbooks into validated, persisted submission records
pub struct SubmissionAssembler {
    schemas: Arc<dyn SchemaStore>,
    submissions: Arc<dyn SubmissionStore>,
    clock: Arc<dyn Clock>,
    decoder: WorkbookDecoder,
    validation: ValidationConfig,
}

impl SubmissionAssembler {
    /// Create an assembler over the given stores using wall-clock time
    #[must_use]
    pub fn new(schemas: Arc<dyn SchemaStore>, submissions: Arc<dyn SubmissionStore>) -> Self {
        Self {
            schemas,
            submissions,
            clock: Arc::new(SystemClock),
            decoder: WorkbookDecoder::new(),
            validation: ValidationConfig::default(),
        }
    }

    /// Use a different time source for history entries
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Apply decoder and validation settings
    #[must_use]
    pub fn with_config(mut self, config: &ServiceConfig) -> Self {
        self.decoder = WorkbookDecoder::with_config(config.decoder.clone());
        self.validation = config.validation.clone();
        self
    }

    /// Decode, validate and persist an uploaded workbook
    ///
    /// Never fails: an unknown template yields a single "Template not found"
    /// error without touching the submission store, and any failure while
    /// reading the artifact or persisting the record yields a single
    /// "Error processing document" error.
    pub async fn submit(
        &self,
        template_id: TemplateId,
        data: &[u8],
        submitted_by: &str,
    ) -> SubmissionResult {
        let template = match self.schemas.get_template(template_id).await {
            Ok(Some(template)) => template,
            Ok(None) => {
                tracing::info!(template_id, "submission for unknown template");
                return SubmissionResult::failed(TEMPLATE_NOT_FOUND);
            }
            Err(e) => return processing_failure(&e),
        };

        let outcome = match self.decoder.decode(data, &template) {
            Ok(sheet) => self.assemble(&template, &sheet.cells, submitted_by).await,
            Err(e) => Err(e.into()),
        };

        outcome.unwrap_or_else(|e| processing_failure(&e))
    }

    /// Validate decoded cells and persist the resulting record
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::InvalidDefinition` when the template's columns
    /// lack unique identifiers, or an error if the submission store fails.
    pub async fn assemble(
        &self,
        template: &TemplateDefinition,
        cells: &[DecodedCell],
        submitted_by: &str,
    ) -> Result<SubmissionResult> {
        let errors = self.evaluate(template, cells)?;

        let now = self.clock.now_utc();
        let mut record = SubmissionRecord::new(template.id, submitted_by, now);
        record.cell_values = cells
            .iter()
            .map(|cell| CellValue {
                column_id: cell.column_id,
                value: cell.value.clone(),
            })
            .collect();

        if errors.is_empty() {
            record.transition(
                SubmissionStatus::Validated,
                HistoryEntry::new(HistoryAction::Validated, SYSTEM_ACTOR, now)
                    .with_notes("Document validated successfully"),
            );
        }

        let saved = self.submissions.save(record).await?;
        tracing::info!(
            template_id = template.id,
            unique_identifier = %saved.unique_identifier,
            status = %saved.status,
            errors = errors.len(),
            "submission stored"
        );

        Ok(SubmissionResult {
            is_valid: errors.is_empty(),
            unique_identifier: Some(saved.unique_identifier),
            errors,
        })
    }

    /// Validate decoded cells, one error per failing cell in input order
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::InvalidDefinition` when the template's columns
    /// lack unique identifiers, since cells could not be matched to them.
    pub fn evaluate(
        &self,
        template: &TemplateDefinition,
        cells: &[DecodedCell],
    ) -> Result<Vec<ValidationError>> {
        template.ensure_column_ids()?;

        let columns: HashMap<ColumnId, &ColumnDefinition> =
            template.columns.iter().map(|c| (c.id, c)).collect();
        let validator = CellValidator::new(template.columns.iter());

        let check = |cell: &DecodedCell| {
            let column = columns.get(&cell.column_id)?;
            validator
                .validate(&cell.value, column)
                .reason()
                .map(|reason| ValidationError::cell(&column.name, cell.row, reason))
        };

        let errors = if cells.len() >= self.validation.parallel_threshold {
            cells.par_iter().filter_map(check).collect()
        } else {
            cells.iter().filter_map(check).collect()
        };
        Ok(errors)
    }

    /// Fetch a stored submission
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SubmissionNotFound` for unknown identifiers.
    pub async fn get_submission(&self, unique_identifier: &str) -> Result<SubmissionRecord> {
        self.submissions
            .get(unique_identifier)
            .await?
            .ok_or_else(|| TemplateError::submission_not_found(unique_identifier))
    }

    /// All submissions of a template in submission order
    ///
    /// # Errors
    ///
    /// Returns an error if the submission store fails.
    pub async fn list_submissions(&self, template_id: TemplateId) -> Result<Vec<SubmissionRecord>> {
        self.submissions.list_by_template(template_id).await
    }

    /// Mark a submission as rejected
    ///
    /// Rejecting an already rejected submission returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SubmissionNotFound` for unknown identifiers.
    pub async fn reject(
        &self,
        unique_identifier: &str,
        rejected_by: &str,
        reason: Option<&str>,
    ) -> Result<SubmissionRecord> {
        let current = self.get_submission(unique_identifier).await?;
        if current.status == SubmissionStatus::Rejected {
            tracing::debug!(unique_identifier, "submission already rejected");
            return Ok(current);
        }

        let mut entry = HistoryEntry::new(HistoryAction::Rejected, rejected_by, self.clock.now_utc());
        if let Some(reason) = reason {
            entry = entry.with_notes(reason);
        }

        let updated = self
            .submissions
            .update_status(unique_identifier, SubmissionStatus::Rejected, entry)
            .await?
            .ok_or_else(|| TemplateError::submission_not_found(unique_identifier))?;

        tracing::info!(unique_identifier, rejected_by, "submission rejected");
        Ok(updated)
    }
}

fn processing_failure(error: &TemplateError) -> SubmissionResult {
    tracing::error!(error = %error, "submission processing failed");
    SubmissionResult::failed(format!("Error processing document: {}", detail(error)))
}

fn detail(error: &TemplateError) -> String {
    match error {
        TemplateError::MalformedArtifact { message } => message.clone(),
        other => other.to_string(),
    }
}
