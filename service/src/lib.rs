//! # xltemplate service
//!
//! Schema-driven spreadsheet templates: generate a fillable workbook from a
//! template definition, then decode and validate the filled-in workbook
//! against the same definition.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use xltemplate_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let schemas = Arc::new(InMemorySchemaStore::new());
//!     let submissions = Arc::new(InMemorySubmissionStore::new());
//!
//!     let templates = TemplateService::new(schemas.clone());
//!     let template = templates
//!         .create_template(
//!             TemplateDefinition::new("People")
//!                 .with_column(ColumnDefinition::new("Name", DataType::Text).required())
//!                 .with_column(ColumnDefinition::new("Age", DataType::Number).with_range(0.0, 120.0)),
//!         )
//!         .await?;
//!
//!     // Workbook handed out to be filled in
//!     let workbook = templates.generate_template(template.id).await?;
//!
//!     // An untouched template has no data rows and is trivially valid
//!     let assembler = SubmissionAssembler::new(schemas, submissions);
//!     let result = assembler.submit(template.id, &workbook, "alice").await;
//!     assert!(result.is_valid);
//!     Ok(())
//! }
//! ```
//!
//! ## Components
//!
//! - [`generator`]: template definition to workbook with native input constraints
//! - [`loader`]: submitted workbook to raw cell text in column order
//! - [`validator`]: per-cell validation of raw text against a column definition
//! - [`submission`]: decode, validate and persist submissions
//! - [`templates`]: template administration and generation by identifier
//! - [`store`]: in-memory store implementations

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Command-line interface
pub mod cli;

/// Configuration loading
pub mod config;

/// Workbook generation
pub mod generator;

/// Workbook decoding
pub mod loader;

/// Store implementations
pub mod store;

/// Submission assembly
pub mod submission;

/// Template management
pub mod templates;

/// Cell validation
pub mod validator;

/// Convenient re-exports
pub mod prelude;

pub use generator::{GeneratorFeatures, SheetLayout, TemplateGenerator};
pub use loader::{DecodedCell, DecodedSheet, WorkbookDecoder};
pub use store::{InMemorySchemaStore, InMemorySubmissionStore};
pub use submission::SubmissionAssembler;
pub use templates::TemplateService;
pub use validator::{CellValidator, CellVerdict, validate_cell};
