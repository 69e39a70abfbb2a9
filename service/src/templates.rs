//! Template management
//!
//! Wraps a [`SchemaManagement`] store with definition-time validation and
//! exposes workbook generation by template identifier.

use std::path::Path;
use std::sync::Arc;
use xltemplate_core::types::{ColumnDefinition, ColumnId, TemplateDefinition, TemplateId};
use xltemplate_core::{Result, SchemaManagement, TemplateError};

use crate::generator::TemplateGenerator;

/// Template administration and generation
pub struct TemplateService {
    store: Arc<dyn SchemaManagement>,
    generator: TemplateGenerator,
}

impl TemplateService {
    /// Create a service over a template store with the default generator
    #[must_use]
    pub fn new(store: Arc<dyn SchemaManagement>) -> Self {
        Self {
            store,
            generator: TemplateGenerator::new(),
        }
    }

    /// Use a differently configured generator
    #[must_use]
    pub fn with_generator(mut self, generator: TemplateGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Validate and store a new template
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::InvalidDefinition` when the definition breaks
    /// a definition rule, or a store error.
    pub async fn create_template(&self, template: TemplateDefinition) -> Result<TemplateDefinition> {
        self.generator.validate_template(&template)?;
        let created = self.store.create_template(template).await?;
        tracing::info!(template_id = created.id, name = %created.name, "template created");
        Ok(created)
    }

    /// Validate and replace an existing template
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SchemaNotFound` for unknown templates and
    /// `TemplateError::InvalidDefinition` for invalid definitions.
    pub async fn update_template(&self, template: TemplateDefinition) -> Result<TemplateDefinition> {
        self.generator.validate_template(&template)?;
        let id = template.id;
        let updated = self
            .store
            .update_template(template)
            .await?
            .ok_or_else(|| TemplateError::schema_not_found(id))?;
        tracing::info!(template_id = id, "template updated");
        Ok(updated)
    }

    /// Delete a template
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SchemaNotFound` for unknown templates.
    pub async fn delete_template(&self, id: TemplateId) -> Result<()> {
        if !self.store.delete_template(id).await? {
            return Err(TemplateError::schema_not_found(id));
        }
        tracing::info!(template_id = id, "template deleted");
        Ok(())
    }

    /// Fetch a template
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SchemaNotFound` for unknown templates.
    pub async fn get_template(&self, id: TemplateId) -> Result<TemplateDefinition> {
        self.store
            .get_template(id)
            .await?
            .ok_or_else(|| TemplateError::schema_not_found(id))
    }

    /// Columns of a template in ordinal order
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SchemaNotFound` for unknown templates.
    pub async fn columns(&self, id: TemplateId) -> Result<Vec<ColumnDefinition>> {
        self.get_template(id).await?;
        self.store.get_columns_ordered(id).await
    }

    /// All templates
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_templates(&self) -> Result<Vec<TemplateDefinition>> {
        self.store.list_templates().await
    }

    /// Append a column to a template
    ///
    /// The column is checked together with the existing ones, so duplicate
    /// names are rejected.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SchemaNotFound` for unknown templates and
    /// `TemplateError::InvalidDefinition` for invalid columns.
    pub async fn add_column(
        &self,
        template_id: TemplateId,
        column: ColumnDefinition,
    ) -> Result<ColumnDefinition> {
        let candidate = self.get_template(template_id).await?.with_column(column.clone());
        self.generator.validate_template(&candidate)?;

        let added = self.store.add_column(template_id, column).await?;
        tracing::info!(template_id, column_id = added.id, name = %added.name, "column added");
        Ok(added)
    }

    /// Remove a column, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn remove_column(&self, column_id: ColumnId) -> Result<bool> {
        self.store.remove_column(column_id).await
    }

    /// Generate the workbook of a stored template
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::SchemaNotFound` for unknown templates, or the
    /// generator's error converted into a `TemplateError`.
    pub async fn generate_template(&self, id: TemplateId) -> Result<Vec<u8>> {
        let template = self.get_template(id).await?;
        let bytes = self.generator.generate(&template)?;
        tracing::info!(template_id = id, bytes = bytes.len(), "template workbook generated");
        Ok(bytes)
    }
}

/// Load a template definition from a YAML or JSON file
///
/// Columns without identifiers are numbered after those with one, in file
/// order. The columns are then renumbered `1..=n` in ordinal order, so a
/// store numbering them in list order keeps the same layout.
///
/// # Errors
///
/// Returns `TemplateError::Io` if the file cannot be read and
/// `TemplateError::Serialization` if it cannot be parsed.
pub fn load_template_file(path: &Path) -> Result<TemplateDefinition> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut template: TemplateDefinition = if is_json {
        serde_json::from_str(&contents)?
    } else {
        serde_yaml::from_str(&contents)?
    };
    template.assign_column_ids();
    template.columns.sort_by_key(|column| column.id);
    for (id, column) in (1..).zip(template.columns.iter_mut()) {
        column.id = id;
    }
    Ok(template)
}
