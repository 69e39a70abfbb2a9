//! Prelude module for the template service
//!
//! This module re-exports commonly used types and functions for convenient import.

pub use xltemplate_core::prelude::*;

pub use crate::generator::{GeneratorFeatures, SheetLayout, TemplateGenerator};
pub use crate::loader::{DecodedCell, DecodedSheet, WorkbookDecoder};
pub use crate::store::{InMemorySchemaStore, InMemorySubmissionStore};
pub use crate::submission::SubmissionAssembler;
pub use crate::templates::{TemplateService, load_template_file};
pub use crate::validator::{CellValidator, CellVerdict, validate_cell};
