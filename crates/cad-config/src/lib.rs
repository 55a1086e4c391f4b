//! Configuration management for the Customer Account Data client.
//!
//! Parses `cad.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values in the `[intuit]` section support environment variable
//! expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! ## Example
//!
//! ```toml
//! [intuit]
//! customer_id = "${CAD_CUSTOMER_ID}"
//! consumer_key = "${CAD_CONSUMER_KEY}"
//! consumer_secret = "${CAD_CONSUMER_SECRET}"
//! saml_provider_id = "my-provider.example.com"
//! certificate_path = "keys/saml.pem"
//! ```

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cad.toml";

/// Default Customer Account Data API base URL.
pub const DEFAULT_BASE_URL: &str = "https://financialdatafeed.platform.intuit.com/v1/";

/// Default SAML-to-OAuth token endpoint.
pub const DEFAULT_SAML_TOKEN_URL: &str =
    "https://oauth.intuit.com/oauth/v1/get_access_token_by_saml";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the customer the session is scoped to.
    pub customer_id: Option<String>,
    /// Override the SAML signing key path.
    pub certificate_path: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Aggregation API configuration.
    pub intuit: Option<IntuitConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Credentials and endpoints for the Customer Account Data API.
#[derive(Debug, Clone, Deserialize)]
pub struct IntuitConfig {
    /// Customer the session is scoped to (SAML subject).
    pub customer_id: String,
    /// OAuth consumer key issued for the application.
    pub consumer_key: String,
    /// OAuth consumer secret issued for the application.
    pub consumer_secret: String,
    /// SAML identity provider id (assertion issuer).
    pub saml_provider_id: String,
    /// PEM RSA private key used to sign assertions.
    ///
    /// Relative paths are resolved against the config file directory.
    pub certificate_path: PathBuf,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// SAML token exchange endpoint.
    #[serde(default = "default_saml_token_url")]
    pub saml_token_url: String,
    /// Timeout applied to every HTTP call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_saml_token_url() -> String {
    DEFAULT_SAML_TOKEN_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl IntuitConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.customer_id, "intuit.customer_id")?;
        require_non_empty(&self.consumer_key, "intuit.consumer_key")?;
        require_non_empty(&self.consumer_secret, "intuit.consumer_secret")?;
        require_non_empty(&self.saml_provider_id, "intuit.saml_provider_id")?;
        if self.certificate_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "intuit.certificate_path cannot be empty".to_owned(),
            ));
        }
        require_http_url(&self.base_url, "intuit.base_url")?;
        require_http_url(&self.saml_token_url, "intuit.saml_token_url")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "intuit.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
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
        /// Config field path (e.g., "`intuit.consumer_key`").
        field: String,
        /// Error message (e.g., "${`CAD_CONSUMER_KEY`} is not set").
        message: String,
    },
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

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cad.toml` in current directory and parents.
    /// When nothing is found an empty configuration is returned; commands
    /// that need credentials call [`Config::require_intuit`].
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let Some(intuit) = self.intuit.as_mut() else {
            return;
        };
        if let Some(customer_id) = &settings.customer_id {
            intuit.customer_id.clone_from(customer_id);
        }
        if let Some(path) = &settings.certificate_path {
            intuit.certificate_path.clone_from(path);
        }
    }

    /// Get validated aggregation API configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the `[intuit]` section is missing or invalid.
    pub fn require_intuit(&self) -> Result<&IntuitConfig, ConfigError> {
        let intuit = self.intuit.as_ref().ok_or_else(|| {
            ConfigError::Validation("[intuit] section required in config".into())
        })?;
        intuit.validate()?;
        Ok(intuit)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let Some(intuit) = self.intuit.as_mut() else {
            return Ok(());
        };

        intuit.customer_id = expand::expand_env(&intuit.customer_id, "intuit.customer_id")?;
        intuit.consumer_key = expand::expand_env(&intuit.consumer_key, "intuit.consumer_key")?;
        intuit.consumer_secret =
            expand::expand_env(&intuit.consumer_secret, "intuit.consumer_secret")?;
        intuit.saml_provider_id =
            expand::expand_env(&intuit.saml_provider_id, "intuit.saml_provider_id")?;
        intuit.base_url = expand::expand_env(&intuit.base_url, "intuit.base_url")?;
        intuit.saml_token_url =
            expand::expand_env(&intuit.saml_token_url, "intuit.saml_token_url")?;

        if let Some(path) = intuit.certificate_path.to_str() {
            intuit.certificate_path =
                PathBuf::from(expand::expand_env(path, "intuit.certificate_path")?);
        }

        Ok(())
    }

    /// Resolve the key path against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(intuit) = self.intuit.as_mut()
            && intuit.certificate_path.is_relative()
        {
            intuit.certificate_path = config_dir.join(&intuit.certificate_path);
        }
    }
}
