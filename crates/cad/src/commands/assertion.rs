//! `cad assertion` command implementation.

use cad_client::saml::{RsaSha1Signer, build_signed_assertion, encode_assertion};
use clap::Args;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the assertion command.
#[derive(Args)]
pub(crate) struct AssertionArgs {
    #[command(flatten)]
    pub(crate) config: ConfigArgs,

    /// Print the base64url form sent to the token endpoint instead of XML.
    #[arg(long)]
    pub(crate) encoded: bool,
}

impl AssertionArgs {
    /// Execute the assertion command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or signing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let intuit = self.config.load()?;

        let signer = RsaSha1Signer::from_file(&intuit.certificate_path)?;
        let signed =
            build_signed_assertion(&intuit.saml_provider_id, &intuit.customer_id, &signer)?;
        let xml = signed.to_xml()?;

        let assertion = signed.assertion();
        output.detail(&format!(
            "Assertion {} for {} valid until {}",
            assertion.reference_id(),
            assertion.user_id(),
            assertion.time_after()
        ));

        let text = if self.encoded {
            encode_assertion(&xml)
        } else {
            xml
        };
        output.result(&text)?;
        Ok(())
    }
}
