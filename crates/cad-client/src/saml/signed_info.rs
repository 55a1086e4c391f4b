//! Signed-info fragment: the digest of an assertion plus its reference id.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use sha1::{Digest, Sha1};

use super::assertion::Assertion;
use super::template::SAML_SIGNED;
use crate::error::SamlError;

/// Digest-bearing fragment the signature is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInfo {
    reference_id: String,
    digest: String,
}

impl SignedInfo {
    /// Digest the unsigned serialization of `assertion`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if the assertion cannot be serialized.
    pub fn for_assertion(assertion: &Assertion) -> Result<Self, SamlError> {
        let xml = assertion.to_xml()?;
        Ok(Self {
            reference_id: assertion.reference_id().to_owned(),
            digest: BASE64_STANDARD.encode(Sha1::digest(xml.as_bytes())),
        })
    }

    /// Reference id of the covered assertion.
    #[must_use]
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    /// Base64 SHA-1 digest of the covered assertion.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Render the `<ds:SignedInfo>` fragment.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if the template cannot be rendered.
    pub fn to_xml(&self) -> Result<String, SamlError> {
        SAML_SIGNED.render(&[
            ("ReferenceId", self.reference_id.as_str()),
            ("Digest", self.digest.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_digest_matches_assertion_serialization() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let assertion = Assertion::new("provider", "customer", now);

        let first = SignedInfo::for_assertion(&assertion).unwrap();
        let second = SignedInfo::for_assertion(&assertion).unwrap();

        let expected = BASE64_STANDARD.encode(Sha1::digest(assertion.to_xml().unwrap()));
        assert_eq!(first.digest(), expected);
        assert_eq!(first, second);
        assert_eq!(first.digest().len(), 28);
    }

    #[test]
    fn test_reference_carried_into_xml() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let assertion = Assertion::new("provider", "customer", now);
        let signed_info = SignedInfo::for_assertion(&assertion).unwrap();

        let xml = signed_info.to_xml().unwrap();

        assert_eq!(signed_info.reference_id(), assertion.reference_id());
        assert!(xml.contains(&format!(r##"URI="#{}""##, assertion.reference_id())));
        assert!(xml.contains(&format!(
            "<ds:DigestValue>{}</ds:DigestValue>",
            signed_info.digest()
        )));
        assert!(xml.contains("xmldsig#rsa-sha1"));
    }
}
