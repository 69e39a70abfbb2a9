//! CLI type definitions and enums

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Spreadsheet template command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "xltemplate",
    version,
    about = "Generate spreadsheet templates and validate filled-in submissions"
)]
pub struct XlTemplateCli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Service configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: XlTemplateCommand,
}

/// Output formats for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// JSON output
    Json,
}

/// `xltemplate` subcommands
#[derive(Subcommand, Debug)]
pub enum XlTemplateCommand {
    /// Generate a fillable workbook from a template definition
    Generate {
        /// Template definition file (YAML or JSON)
        #[arg(short, long)]
        template: PathBuf,
        /// Output workbook path
        #[arg(short, long)]
        output: PathBuf,
        /// Omit native input constraints
        #[arg(long)]
        no_validation: bool,
        /// Omit default value pre-fill
        #[arg(long)]
        no_defaults: bool,
        /// Freeze the header row
        #[arg(long)]
        freeze_header: bool,
    },

    /// Validate a filled-in workbook against a template definition
    Validate {
        /// Template definition file (YAML or JSON)
        #[arg(short, long)]
        template: PathBuf,
        /// Filled-in workbook
        submission: PathBuf,
        /// Submitting user recorded in the history
        #[arg(long, default_value = "cli")]
        submitted_by: String,
        /// Maximum errors to show in pretty output
        #[arg(long, default_value = "50")]
        max_errors: usize,
    },

    /// Show the planned worksheet layout of a template definition
    Inspect {
        /// Template definition file (YAML or JSON)
        #[arg(short, long)]
        template: PathBuf,
    },
}
