//! SAML bearer assertions and the SAML-to-OAuth token exchange.
//!
//! The pipeline runs in a fixed order:
//!
//! 1. [`Assertion`] is built for the customer with a fresh reference id and
//!    a validity window around the current time.
//! 2. [`SignedInfo`] digests the unsigned assertion (SHA-1, base64).
//! 3. [`Signature`] signs the serialized signed-info with [`RsaSha1Signer`].
//! 4. The signature is spliced into the assertion ([`SignedAssertion`]).
//! 5. [`TokenExchanger`] trades the signed assertion for an [`OAuthToken`].

mod assertion;
mod exchange;
pub(crate) mod key;
mod signature;
mod signed_info;
mod template;

pub use assertion::{Assertion, SignedAssertion};
pub use exchange::{SamlAuthenticator, TokenExchanger, encode_assertion};
pub use key::{RsaSha1Signer, sign};
pub use signature::Signature;
pub use signed_info::SignedInfo;

use crate::error::SamlError;

/// OAuth access credentials obtained from the token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthToken {
    /// Access token.
    pub token: String,
    /// Access token secret.
    pub secret: String,
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Build a signed assertion for `user_id` issued by `issuer_id`.
///
/// # Errors
///
/// Returns [`SamlError`] if a template cannot be rendered or signing fails.
pub fn build_signed_assertion(
    issuer_id: &str,
    user_id: &str,
    signer: &RsaSha1Signer,
) -> Result<SignedAssertion, SamlError> {
    let assertion = Assertion::issued_now(issuer_id, user_id);
    let signed_info = SignedInfo::for_assertion(&assertion)?;
    let signature = Signature::build(&signed_info, signer)?;
    Ok(assertion.into_signed(signature))
}
