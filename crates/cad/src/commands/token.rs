//! `cad token` command implementation.

use std::sync::Arc;
use std::time::Duration;

use cad_client::UreqTransport;
use cad_client::saml::{SamlAuthenticator, TokenExchanger};
use clap::Args;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the token command.
#[derive(Args)]
pub(crate) struct TokenArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

impl TokenArgs {
    /// Execute the token command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the exchange fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let intuit = self.config.load()?;

        let transport = Arc::new(UreqTransport::new(Duration::from_secs(
            intuit.timeout_secs,
        )));
        let exchanger = TokenExchanger::new(transport, &intuit.saml_token_url);
        let authenticator = SamlAuthenticator::new(
            &intuit.saml_provider_id,
            &intuit.consumer_key,
            &intuit.certificate_path,
            exchanger,
        );

        output.status(&format!(
            "Requesting OAuth token for customer {}...",
            intuit.customer_id
        ));
        let token = authenticator.acquire_token(&intuit.customer_id)?;
        output.done("OAuth token received");

        output.result(&format!("oauth_token={}", token.token))?;
        output.result(&format!("oauth_token_secret={}", token.secret))?;
        Ok(())
    }
}
