//! `xltemplate` CLI application

use super::types::{OutputFormat, XlTemplateCli, XlTemplateCommand};
use crate::config::load_service_config;
use crate::generator::{ColumnLayout, SheetLayout, TemplateGenerator};
use crate::store::{InMemorySchemaStore, InMemorySubmissionStore};
use crate::submission::SubmissionAssembler;
use crate::templates::{TemplateService, load_template_file};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use xltemplate_core::config::ServiceConfig;
use xltemplate_core::types::SubmissionResult;
use xltemplate_core::{Result, TemplateError};

/// Main `xltemplate` CLI application
pub struct XlTemplateApp {
    cli: XlTemplateCli,
}

impl XlTemplateApp {
    /// Create the application from command line arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self {
            cli: XlTemplateCli::parse(),
        }
    }

    /// Create the application with a parsed CLI configuration
    #[must_use]
    pub fn new(cli: XlTemplateCli) -> Self {
        Self { cli }
    }

    /// Run the application
    ///
    /// # Errors
    ///
    /// Returns error if command execution fails or a submission does not validate.
    pub async fn run(self) -> Result<()> {
        self.init_logging();

        match self.execute_command().await {
            Ok(()) => {
                info!("Command completed successfully");
                Ok(())
            }
            Err(err) => {
                error!("Command failed: {}", err);
                if !self.cli.quiet {
                    eprintln!("Error: {err}");
                }
                Err(err)
            }
        }
    }

    /// Configure tracing subscriber based on CLI flags
    fn init_logging(&self) {
        let level = if self.cli.quiet {
            "error"
        } else if self.cli.verbose {
            "debug"
        } else {
            "info"
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        // A subscriber may already be installed when embedded.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    fn service_config(&self) -> Result<ServiceConfig> {
        match &self.cli.config {
            Some(path) => load_service_config(path),
            None => Ok(ServiceConfig::default()),
        }
    }

    async fn execute_command(&self) -> Result<()> {
        let config = self.service_config()?;

        match &self.cli.command {
            XlTemplateCommand::Generate {
                template,
                output,
                no_validation,
                no_defaults,
                freeze_header,
            } => {
                let generator = TemplateGenerator::with_config(config.generator)
                    .with_validation(!no_validation)
                    .with_defaults(!no_defaults);
                let generator = if *freeze_header {
                    generator.with_frozen_header(true)
                } else {
                    generator
                };
                self.generate_command(&generator, template, output)
            }
            XlTemplateCommand::Validate {
                template,
                submission,
                submitted_by,
                max_errors,
            } => {
                self.validate_command(&config, template, submission, submitted_by, *max_errors)
                    .await
            }
            XlTemplateCommand::Inspect { template } => {
                let generator = TemplateGenerator::with_config(config.generator);
                self.inspect_command(&generator, template)
            }
        }
    }

    fn generate_command(
        &self,
        generator: &TemplateGenerator,
        template_path: &Path,
        output: &Path,
    ) -> Result<()> {
        let template = load_template_file(template_path)?;

        if let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        generator.generate_file(&template, output)?;

        info!(template = %template.name, output = %output.display(), "workbook generated");
        if !self.cli.quiet {
            match self.cli.format {
                OutputFormat::Pretty => println!("Generated template: {}", output.display()),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "template": template.name,
                        "output": output.display().to_string(),
                        "columns": template.columns.len(),
                    })
                ),
            }
        }
        Ok(())
    }

    async fn validate_command(
        &self,
        config: &ServiceConfig,
        template_path: &Path,
        submission_path: &Path,
        submitted_by: &str,
        max_errors: usize,
    ) -> Result<()> {
        let definition = load_template_file(template_path)?;
        let data = std::fs::read(submission_path)?;

        let schemas = Arc::new(InMemorySchemaStore::new());
        let submissions = Arc::new(InMemorySubmissionStore::new());
        let templates = TemplateService::new(schemas.clone())
            .with_generator(TemplateGenerator::with_config(config.generator.clone()));
        let template = templates.create_template(definition).await?;

        let assembler = SubmissionAssembler::new(schemas, submissions).with_config(config);
        let result = assembler.submit(template.id, &data, submitted_by).await;

        self.print_result(&result, max_errors)?;

        if result.is_valid {
            Ok(())
        } else {
            Err(TemplateError::other(format!(
                "Submission is invalid ({} error(s))",
                result.errors.len()
            )))
        }
    }

    fn inspect_command(&self, generator: &TemplateGenerator, template_path: &Path) -> Result<()> {
        let template = load_template_file(template_path)?;
        generator.validate_template(&template)?;
        let layout = generator.plan(&template)?;

        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&layout)?),
            OutputFormat::Pretty => print!("{}", render_layout(&layout)),
        }
        Ok(())
    }

    fn print_result(&self, result: &SubmissionResult, max_errors: usize) -> Result<()> {
        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
            OutputFormat::Pretty if !self.cli.quiet => {
                if result.is_valid {
                    println!("✓ Submission is valid");
                } else {
                    println!("✗ Submission has {} error(s)", result.errors.len());
                    for err in result.errors.iter().take(max_errors) {
                        println!("  - {err}");
                    }
                    if result.errors.len() > max_errors {
                        println!("  ... and {} more", result.errors.len() - max_errors);
                    }
                }
                if let Some(uid) = &result.unique_identifier {
                    println!("Submission id: {uid}");
                }
            }
            OutputFormat::Pretty => {}
        }
        Ok(())
    }
}

fn render_layout(layout: &SheetLayout) -> String {
    let mut out = format!(
        "Sheet '{}' (data rows {}..={})\n",
        layout.sheet_name,
        layout.first_data_row + 1,
        layout.last_data_row + 1
    );
    for column in &layout.columns {
        out.push_str(&render_column(column));
    }
    out
}

fn render_column(column: &ColumnLayout) -> String {
    let mut line = format!(
        "  {:<4}{} [{}] width {}",
        column.letter, column.header, column.data_type, column.width
    );
    if let Some(format) = column.number_format {
        line.push_str(&format!(", format {format}"));
    }
    if let Some(rule) = column.native_rule() {
        line.push_str(&format!(", rule '{}'", rule.error_title));
    }
    line.push('\n');
    for note in &column.notes {
        line.push_str(&format!("        note: {note}\n"));
    }
    line
}
