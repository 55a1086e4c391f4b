//! `<ds:Signature>` block embedded into the assertion.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use sha1::{Digest, Sha1};

use super::key::RsaSha1Signer;
use super::signed_info::SignedInfo;
use super::template::SAML_SIGNATURE;
use crate::error::SamlError;

/// RSA-SHA1 signature over a serialized signed-info fragment.
///
/// The fragment travels verbatim next to the signature value.
#[derive(Debug, Clone)]
pub struct Signature {
    signature_value: String,
    signed_info: String,
}

impl Signature {
    /// Serialize `signed_info`, digest it, and sign the digest.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Signing`] if the RSA operation fails.
    pub fn build(signed_info: &SignedInfo, signer: &RsaSha1Signer) -> Result<Self, SamlError> {
        let signed_info = signed_info.to_xml()?;
        let digest = Sha1::digest(signed_info.as_bytes());
        let signature = signer.sign_digest(&digest)?;

        Ok(Self {
            signature_value: BASE64_STANDARD.encode(signature),
            signed_info,
        })
    }

    /// Base64 RSA signature value.
    #[must_use]
    pub fn signature_value(&self) -> &str {
        &self.signature_value
    }

    /// Signed-info fragment exactly as it was signed.
    #[must_use]
    pub fn signed_info(&self) -> &str {
        &self.signed_info
    }

    /// Render the `<ds:Signature>` block.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if the template cannot be rendered.
    pub fn to_xml(&self) -> Result<String, SamlError> {
        SAML_SIGNATURE.render(&[
            ("SignedInfo", self.signed_info.as_str()),
            ("SignatureValue", self.signature_value.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use rsa::Pkcs1v15Sign;

    use super::*;
    use crate::saml::assertion::Assertion;
    use crate::saml::key::tests::test_signer;

    #[test]
    fn test_signature_verifies_over_signed_info() {
        let signer = test_signer();
        let assertion = Assertion::issued_now("provider", "customer");
        let signed_info = SignedInfo::for_assertion(&assertion).unwrap();

        let signature = Signature::build(&signed_info, &signer).unwrap();

        assert_eq!(signature.signed_info(), signed_info.to_xml().unwrap());
        let raw = BASE64_STANDARD.decode(signature.signature_value()).unwrap();
        let digest = Sha1::digest(signature.signed_info().as_bytes());
        signer
            .public_key()
            .verify(Pkcs1v15Sign::new::<Sha1>(), &digest, &raw)
            .unwrap();
    }

    #[test]
    fn test_signature_xml_embeds_signed_info_verbatim() {
        let signer = test_signer();
        let assertion = Assertion::issued_now("provider", "customer");
        let signed_info = SignedInfo::for_assertion(&assertion).unwrap();
        let signature = Signature::build(&signed_info, &signer).unwrap();

        let xml = signature.to_xml().unwrap();

        assert!(xml.starts_with("<ds:Signature "));
        assert!(xml.contains(signature.signed_info()));
        assert!(xml.ends_with(&format!(
            "<ds:SignatureValue>{}</ds:SignatureValue></ds:Signature>",
            signature.signature_value()
        )));
    }
}
