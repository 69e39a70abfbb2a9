//! `xltemplate` command-line interface

mod app;
mod types;

pub use app::XlTemplateApp;
pub use types::{OutputFormat, XlTemplateCli, XlTemplateCommand};

/// Main entry point for the CLI
///
/// # Errors
/// Returns error if CLI execution fails or encounters invalid arguments.
pub async fn run() -> xltemplate_core::Result<()> {
    XlTemplateApp::from_args().run().await
}
