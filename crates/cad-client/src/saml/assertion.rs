//! SAML 2.0 bearer assertion naming the customer the token is issued for.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use super::signature::Signature;
use super::template::{SAML_ASSERTION, escape};
use crate::error::SamlError;

/// Timestamp layout expected by the identity provider.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// How far before issuance the assertion becomes valid.
const SKEW_BEFORE_MINUTES: i64 = 5;

/// How long after issuance the assertion stays valid.
const VALIDITY_MINUTES: i64 = 10;

/// An unsigned assertion.
///
/// Immutable once built. Attaching a signature consumes it and yields a
/// [`SignedAssertion`], so a signature can only be set once.
#[derive(Debug, Clone)]
pub struct Assertion {
    issuer_id: String,
    user_id: String,
    reference_id: String,
    time_now: DateTime<Utc>,
    time_before: DateTime<Utc>,
    time_after: DateTime<Utc>,
}

impl Assertion {
    /// Build an assertion issued at `now`.
    #[must_use]
    pub fn new(issuer_id: &str, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            issuer_id: issuer_id.to_owned(),
            user_id: user_id.to_owned(),
            reference_id: new_reference_id(),
            time_now: now,
            time_before: now - TimeDelta::minutes(SKEW_BEFORE_MINUTES),
            time_after: now + TimeDelta::minutes(VALIDITY_MINUTES),
        }
    }

    /// Build an assertion issued at the current time.
    #[must_use]
    pub fn issued_now(issuer_id: &str, user_id: &str) -> Self {
        Self::new(issuer_id, user_id, Utc::now())
    }

    /// Unique id the signed-info reference points at.
    #[must_use]
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    /// Issuer (SAML identity provider id).
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    /// Subject (customer id).
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Issue instant.
    #[must_use]
    pub fn time_now(&self) -> DateTime<Utc> {
        self.time_now
    }

    /// Start of the validity window.
    #[must_use]
    pub fn time_before(&self) -> DateTime<Utc> {
        self.time_before
    }

    /// End of the validity window.
    #[must_use]
    pub fn time_after(&self) -> DateTime<Utc> {
        self.time_after
    }

    /// Serialize without a signature block.
    ///
    /// This is the form the digest is computed over.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if the template cannot be rendered.
    pub fn to_xml(&self) -> Result<String, SamlError> {
        self.render("")
    }

    /// Attach a signature.
    #[must_use]
    pub fn into_signed(self, signature: Signature) -> SignedAssertion {
        SignedAssertion {
            assertion: self,
            signature,
        }
    }

    fn render(&self, signature_xml: &str) -> Result<String, SamlError> {
        let issuer_id = escape(&self.issuer_id);
        let user_id = escape(&self.user_id);
        let time_now = format_time(self.time_now);
        let time_before = format_time(self.time_before);
        let time_after = format_time(self.time_after);

        SAML_ASSERTION.render(&[
            ("IssuerId", issuer_id.as_str()),
            ("UserId", user_id.as_str()),
            ("ReferenceId", self.reference_id.as_str()),
            ("TimeNow", time_now.as_str()),
            ("TimeBefore", time_before.as_str()),
            ("TimeAfter", time_after.as_str()),
            ("Signature", signature_xml),
        ])
    }
}

/// An assertion with its enveloped signature, ready for transmission.
#[derive(Debug, Clone)]
pub struct SignedAssertion {
    assertion: Assertion,
    signature: Signature,
}

impl SignedAssertion {
    /// The assertion that was signed.
    #[must_use]
    pub fn assertion(&self) -> &Assertion {
        &self.assertion
    }

    /// The attached signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Serialize with the signature block spliced in after the issuer.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if a template cannot be rendered.
    pub fn to_xml(&self) -> Result<String, SamlError> {
        let signature_xml = self.signature.to_xml()?;
        self.assertion.render(&signature_xml)
    }
}

/// `_` followed by a hyphen-less UUIDv4; XML ids cannot start with a digit.
fn new_reference_id() -> String {
    format!("_{}", Uuid::new_v4().simple())
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}
