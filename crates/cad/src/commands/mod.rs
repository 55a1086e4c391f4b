//! CLI command implementations.

pub(crate) mod assertion;
pub(crate) mod token;

pub(crate) use assertion::AssertionArgs;
pub(crate) use token::TokenArgs;

use std::path::PathBuf;

use cad_config::{CliSettings, Config, IntuitConfig};
use clap::Args;

use crate::error::CliError;

/// Configuration flags shared by every command.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover cad.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Customer to scope the session to (default: from config).
    #[arg(long, env = "CAD_CUSTOMER_ID")]
    pub(crate) customer: Option<String>,

    /// PEM private key used to sign assertions (default: from config).
    #[arg(long)]
    pub(crate) certificate: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load and validate the `[intuit]` section with flag overrides applied.
    pub(crate) fn load(&self) -> Result<IntuitConfig, CliError> {
        let settings = CliSettings {
            customer_id: self.customer.clone(),
            certificate_path: self.certificate.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        Ok(config.require_intuit()?.clone())
    }
}
