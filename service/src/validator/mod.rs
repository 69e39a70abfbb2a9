//! Cell validation
//!
//! [`validate_cell`] is the authoritative check of a decoded cell value
//! against its column definition. It is pure and total.

pub mod engine;
pub mod parse;

pub use engine::{CellValidator, CellVerdict, validate_cell};
