//! Configuration loading
//!
//! Configuration files are YAML with `${VAR}` / `${VAR:-default}`
//! environment variable substitution.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::env;
use std::path::Path;
use xltemplate_core::config::ServiceConfig;
use xltemplate_core::{Result, TemplateError};

static ENV_VAR_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").ok());

/// Load configuration from a `YAML` file with environment variable substitution
///
/// # Errors
///
/// Returns `TemplateError::Io` if the file cannot be read and
/// `TemplateError::Config` if the YAML cannot be parsed.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse configuration text with environment variable substitution
///
/// # Errors
///
/// Returns `TemplateError::Config` if the YAML cannot be parsed.
pub fn parse_config<T: for<'de> Deserialize<'de>>(contents: &str) -> Result<T> {
    let substituted = substitute_env_vars(contents);
    serde_yaml::from_str(&substituted)
        .map_err(|e| TemplateError::config(format!("Failed to parse YAML config: {e}")))
}

/// Load and validate the service configuration
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or a value is out of range.
pub fn load_service_config(path: &Path) -> Result<ServiceConfig> {
    let config: ServiceConfig = load_config(path)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded service configuration");
    Ok(config)
}

/// Substitute environment variables in the format `${VAR:-default}`
///
/// Unset variables without a default become empty.
#[must_use]
pub fn substitute_env_vars(content: &str) -> String {
    let Some(re) = ENV_VAR_RE.as_ref() else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        env::var(var_name).unwrap_or_else(|_| default_value.to_string())
    })
    .into_owned()
}
