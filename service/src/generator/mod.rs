//! Workbook generation for templates
//!
//! Planning ([`TemplateGenerator::plan`]) and rendering ([`render`]) are kept
//! apart so the layout of a template can be inspected and compared without
//! producing a workbook.

mod cast;
mod error;
mod features;
mod generator;
pub mod layout;
mod workbook;

pub use error::{GeneratorError, GeneratorResult};
pub use features::GeneratorFeatures;
pub use generator::TemplateGenerator;
pub use layout::{ColumnLayout, Constraint, InputRule, Prefill, SheetLayout};
pub use workbook::render;
