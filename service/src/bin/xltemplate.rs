//! `xltemplate` command-line interface
//!
//! Generates fillable workbooks from template definitions and validates
//! filled-in submissions against them.

use std::process::ExitCode;
use xltemplate_service::cli;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
