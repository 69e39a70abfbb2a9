//! Submitted workbook decoding

mod error;
pub mod excel;

pub use error::{DecoderError, DecoderResult};
pub use excel::{DecodedCell, DecodedSheet, WorkbookDecoder, render_cell};
