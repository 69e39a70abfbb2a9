//! Collaborator interfaces consumed by the template service
//!
//! All traits are dyn-compatible and are meant to be injected as
//! `Arc<dyn Trait>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    ColumnDefinition, ColumnId, HistoryEntry, SubmissionRecord, SubmissionStatus,
    TemplateDefinition, TemplateId,
};

/// Read access to template definitions
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Fetch a template with its columns, `None` if unknown
    async fn get_template(&self, id: TemplateId) -> Result<Option<TemplateDefinition>>;

    /// Columns of a template in ordinal order (ascending identifier)
    async fn get_columns_ordered(&self, template_id: TemplateId) -> Result<Vec<ColumnDefinition>>;

    /// All templates
    async fn list_templates(&self) -> Result<Vec<TemplateDefinition>>;
}

/// Write access to template definitions
#[async_trait]
pub trait SchemaManagement: SchemaStore {
    /// Persist a new template; identifiers of the template and its columns are assigned
    async fn create_template(&self, template: TemplateDefinition) -> Result<TemplateDefinition>;

    /// Replace name, description, version, activity flag and columns of an existing template
    ///
    /// Returns `None` when the template does not exist.
    async fn update_template(
        &self,
        template: TemplateDefinition,
    ) -> Result<Option<TemplateDefinition>>;

    /// Delete a template, returning whether it existed
    async fn delete_template(&self, id: TemplateId) -> Result<bool>;

    /// Append a column to a template; it receives the next identifier
    async fn add_column(
        &self,
        template_id: TemplateId,
        column: ColumnDefinition,
    ) -> Result<ColumnDefinition>;

    /// Remove a column, returning whether it existed
    async fn remove_column(&self, column_id: ColumnId) -> Result<bool>;
}

/// Persistence of submission records
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new record and return it as stored
    async fn save(&self, record: SubmissionRecord) -> Result<SubmissionRecord>;

    /// Fetch a record by its unique identifier
    async fn get(&self, unique_identifier: &str) -> Result<Option<SubmissionRecord>>;

    /// All records of a template in submission order
    async fn list_by_template(&self, template_id: TemplateId) -> Result<Vec<SubmissionRecord>>;

    /// Set the status of a record and append a history entry
    ///
    /// Cell values are never touched. Returns `None` for unknown identifiers.
    async fn update_status(
        &self,
        unique_identifier: &str,
        status: SubmissionStatus,
        entry: HistoryEntry,
    ) -> Result<Option<SubmissionRecord>>;
}

/// Source of timestamps for history entries
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
