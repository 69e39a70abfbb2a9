//! # xltemplate core
//!
//! Core types and traits for spreadsheet templates and their submissions.
//!
//! This crate holds the schema model (templates and ordered columns), the
//! submission record model, the error taxonomy, configuration structures and
//! the interfaces of the external stores. It performs no I/O.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error types for template operations
pub mod error;

/// Collaborator interfaces (stores, clock)
pub mod traits;

/// Template, column and submission types
pub mod types;

/// Configuration types
pub mod config;

pub use config::ServiceConfig;
pub use error::{Result, TemplateError};
pub use traits::{Clock, SchemaManagement, SchemaStore, SubmissionStore, SystemClock};
pub use types::{
    ColumnDefinition, DataType, SubmissionRecord, SubmissionResult, SubmissionStatus,
    TemplateDefinition, ValidationError,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{Result, TemplateError};
    pub use crate::traits::*;
    pub use crate::types::*;
}
