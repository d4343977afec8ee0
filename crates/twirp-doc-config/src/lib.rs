//! Configuration management for twirp-doc.
//!
//! Parses `twirp-doc.toml` with serde and discovers it in the current
//! directory or any parent. Command-line flags and the protoc plugin
//! parameter are applied on top through [`CliSettings`].
//!
//! ```toml
//! [docs]
//! base_url = "${API_BASE_URL:-https://api.example.com/twirp}"
//! extension = "md"
//! ```
//!
//! `docs.base_url` supports `${VAR}` and `${VAR:-default}` expansion.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.example.com/twirp";

/// Output file extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = "md";

const CONFIG_FILENAME: &str = "twirp-doc.toml";

/// Settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliSettings {
    /// Override the service base URL.
    pub base_url: Option<String>,
    /// Override the output file extension.
    pub extension: Option<String>,
}

impl CliSettings {
    /// Parse a protoc plugin parameter such as `base_url=https://x,extension=md`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for entries without `=` and for unknown keys.
    pub fn from_plugin_parameter(parameter: &str) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for entry in parameter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                ConfigError::Validation(format!(
                    "invalid plugin parameter {entry:?}: expected key=value"
                ))
            })?;
            match key.trim() {
                "base_url" => settings.base_url = Some(value.trim().to_owned()),
                "extension" => settings.extension = Some(value.trim().to_owned()),
                other => {
                    return Err(ConfigError::Validation(format!(
                        "unknown plugin parameter {other:?}"
                    )));
                }
            }
        }
        Ok(settings)
    }

    /// Combine with `overrides`, whose values win.
    #[must_use]
    pub fn merged(self, overrides: Self) -> Self {
        Self {
            base_url: overrides.base_url.or(self.base_url),
            extension: overrides.extension.or(self.extension),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation output configuration.
    pub docs: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Documentation output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Prefix of every service route, without trailing slash.
    pub base_url: String,
    /// Extension of generated files, without leading dot.
    pub extension: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.base_url`").
        field: String,
        /// Error message (e.g., "${`API_BASE_URL`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// Uses `config_path` when given, otherwise searches for
    /// `twirp-doc.toml` in the current directory and its parents, falling
    /// back to defaults. CLI settings take precedence over file values and
    /// the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing
    /// fails or the final values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Name of the document generated for `service_name`.
    pub fn output_file_name(&self, service_name: &str) -> String {
        format!("{service_name}.{}", self.docs.extension)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.docs.base_url, "docs.base_url")?;
        require_http_url(&self.docs.base_url, "docs.base_url")?;
        require_non_empty(&self.docs.extension, "docs.extension")?;
        if self.docs.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "docs.extension must not start with a dot".to_owned(),
            ));
        }
        Ok(())
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.docs.base_url.clone_from(base_url);
        }
        if let Some(extension) = &settings.extension {
            self.docs.extension.clone_from(extension);
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.docs.base_url = expand::expand_env(&self.docs.base_url, "docs.base_url")?;
        Ok(())
    }

    /// Strip the trailing slash from the base URL.
    fn normalize(&mut self) {
        let trimmed = self.docs.base_url.trim_end_matches('/').len();
        self.docs.base_url.truncate(trimmed);
    }
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}
