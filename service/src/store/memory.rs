//! In-memory store implementations
//!
//! Both stores are `Send + Sync` and safe to share behind an `Arc`. They
//! assign identifiers the way a relational store would: templates and
//! columns draw from ascending counters, so creation order is identifier
//! order.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use xltemplate_core::types::{
    ColumnDefinition, ColumnId, HistoryEntry, SubmissionRecord, SubmissionStatus,
    TemplateDefinition, TemplateId,
};
use xltemplate_core::{Result, SchemaManagement, SchemaStore, SubmissionStore, TemplateError};

/// Template store held in memory
#[derive(Debug)]
pub struct InMemorySchemaStore {
    templates: DashMap<TemplateId, TemplateDefinition>,
    next_template_id: AtomicI64,
    next_column_id: AtomicI64,
}

impl InMemorySchemaStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
            next_template_id: AtomicI64::new(1),
            next_column_id: AtomicI64::new(1),
        }
    }

    /// Number of stored templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn next_column_id(&self) -> ColumnId {
        self.next_column_id.fetch_add(1, Ordering::SeqCst)
    }

    fn attach_column(&self, template_id: TemplateId, mut column: ColumnDefinition) -> ColumnDefinition {
        column.id = self.next_column_id();
        column.template_id = template_id;
        column
    }
}

impl Default for InMemorySchemaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn get_template(&self, id: TemplateId) -> Result<Option<TemplateDefinition>> {
        Ok(self.templates.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_columns_ordered(&self, template_id: TemplateId) -> Result<Vec<ColumnDefinition>> {
        Ok(self
            .templates
            .get(&template_id)
            .map(|entry| entry.ordered_columns().into_iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_templates(&self) -> Result<Vec<TemplateDefinition>> {
        let mut templates: Vec<TemplateDefinition> =
            self.templates.iter().map(|entry| entry.value().clone()).collect();
        templates.sort_by_key(|t| t.id);
        Ok(templates)
    }
}

#[async_trait]
impl SchemaManagement for InMemorySchemaStore {
    async fn create_template(&self, mut template: TemplateDefinition) -> Result<TemplateDefinition> {
        template.id = self.next_template_id.fetch_add(1, Ordering::SeqCst);
        // Number in ordinal order so the stored layout matches the given one
        template.columns.sort_by_key(|column| column.id);
        template.columns = std::mem::take(&mut template.columns)
            .into_iter()
            .map(|column| self.attach_column(template.id, column))
            .collect();

        self.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn update_template(
        &self,
        mut template: TemplateDefinition,
    ) -> Result<Option<TemplateDefinition>> {
        let Some(mut stored) = self.templates.get_mut(&template.id) else {
            return Ok(None);
        };

        let known: HashSet<ColumnId> = stored.columns.iter().map(|c| c.id).collect();
        let template_id = template.id;
        template.columns = std::mem::take(&mut template.columns)
            .into_iter()
            .map(|mut column| {
                if known.contains(&column.id) {
                    column.template_id = template_id;
                    column
                } else {
                    self.attach_column(template_id, column)
                }
            })
            .collect();
        template.created_date = stored.created_date;

        *stored = template.clone();
        Ok(Some(template))
    }

    async fn delete_template(&self, id: TemplateId) -> Result<bool> {
        Ok(self.templates.remove(&id).is_some())
    }

    async fn add_column(
        &self,
        template_id: TemplateId,
        column: ColumnDefinition,
    ) -> Result<ColumnDefinition> {
        let mut stored = self
            .templates
            .get_mut(&template_id)
            .ok_or_else(|| TemplateError::schema_not_found(template_id))?;

        let column = self.attach_column(template_id, column);
        stored.columns.push(column.clone());
        Ok(column)
    }

    async fn remove_column(&self, column_id: ColumnId) -> Result<bool> {
        for mut entry in self.templates.iter_mut() {
            let before = entry.columns.len();
            entry.columns.retain(|c| c.id != column_id);
            if entry.columns.len() != before {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Submission store held in memory
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    records: DashMap<String, SubmissionRecord>,
    order: Mutex<Vec<String>>,
}

impl InMemorySubmissionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn save(&self, record: SubmissionRecord) -> Result<SubmissionRecord> {
        let mut order = self.order.lock();
        if self.records.contains_key(&record.unique_identifier) {
            return Err(TemplateError::store(format!(
                "Submission {} already exists",
                record.unique_identifier
            )));
        }

        order.push(record.unique_identifier.clone());
        self.records
            .insert(record.unique_identifier.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, unique_identifier: &str) -> Result<Option<SubmissionRecord>> {
        Ok(self
            .records
            .get(unique_identifier)
            .map(|entry| entry.value().clone()))
    }

    async fn list_by_template(&self, template_id: TemplateId) -> Result<Vec<SubmissionRecord>> {
        let order = self.order.lock();
        Ok(order
            .iter()
            .filter_map(|uid| self.records.get(uid))
            .filter(|entry| entry.template_id == template_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn update_status(
        &self,
        unique_identifier: &str,
        status: SubmissionStatus,
        entry: HistoryEntry,
    ) -> Result<Option<SubmissionRecord>> {
        Ok(self.records.get_mut(unique_identifier).map(|mut record| {
            record.transition(status, entry);
            record.clone()
        }))
    }
}
