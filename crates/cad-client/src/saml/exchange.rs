//! SAML-to-OAuth token exchange.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::{debug, info, warn};
use ureq::http::{Method, StatusCode};

use super::assertion::SignedAssertion;
use super::key::RsaSha1Signer;
use super::{OAuthToken, build_signed_assertion};
use crate::error::SamlError;
use crate::transport::{HttpRequest, Transport};

/// Characters left unescaped in form values: A-Z a-z 0-9 - . _ *
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

/// Marker used as the status of an exchange that never got a response.
const TRANSPORT_FAILURE: &str = "transport failure";

/// Posts signed assertions to the token endpoint.
pub struct TokenExchanger {
    transport: Arc<dyn Transport>,
    token_url: String,
}

impl TokenExchanger {
    /// Create an exchanger for the endpoint at `token_url`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, token_url: &str) -> Self {
        Self {
            transport,
            token_url: token_url.to_owned(),
        }
    }

    /// Exchange a signed assertion for an OAuth token.
    ///
    /// Never retries: a rejected assertion has to be rebuilt by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::AssertionRejected`] on any non-200 status or
    /// transport failure, and [`SamlError::TokenResponseMalformed`] if the
    /// 200 body lacks either token field.
    pub fn exchange(
        &self,
        assertion: &SignedAssertion,
        consumer_key: &str,
    ) -> Result<OAuthToken, SamlError> {
        let encoded = encode_assertion(&assertion.to_xml()?);
        let body = encode_form(&[
            ("saml_assertion", encoded.as_str()),
            ("oauth_consumer_key", consumer_key),
        ]);

        let request = HttpRequest::new(Method::POST, self.token_url.as_str())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body);

        debug!("Posting SAML assertion to {}", self.token_url);
        let response = self
            .transport
            .execute(request)
            .map_err(|e| SamlError::AssertionRejected {
                status: TRANSPORT_FAILURE.to_owned(),
                detail: e.to_string(),
            })?;

        if response.status != StatusCode::OK {
            let detail = response
                .header("www-authenticate")
                .map(decode_form_component)
                .unwrap_or_default();
            return Err(SamlError::AssertionRejected {
                status: response.status_line(),
                detail,
            });
        }

        parse_token_response(&response.body)
    }
}

/// Builds, signs, and exchanges assertions for one identity provider.
///
/// The signing key is loaded on first use and cached afterwards.
pub struct SamlAuthenticator {
    issuer_id: String,
    consumer_key: String,
    key_path: PathBuf,
    signer: Mutex<Option<Arc<RsaSha1Signer>>>,
    exchanger: TokenExchanger,
}

impl SamlAuthenticator {
    /// Create an authenticator.
    ///
    /// # Arguments
    /// * `issuer_id` - SAML provider id placed in the assertion issuer
    /// * `consumer_key` - OAuth consumer key sent with the assertion
    /// * `key_path` - PEM RSA private key used for signing
    /// * `exchanger` - token endpoint client
    #[must_use]
    pub fn new(
        issuer_id: &str,
        consumer_key: &str,
        key_path: &Path,
        exchanger: TokenExchanger,
    ) -> Self {
        Self {
            issuer_id: issuer_id.to_owned(),
            consumer_key: consumer_key.to_owned(),
            key_path: key_path.to_path_buf(),
            signer: Mutex::new(None),
            exchanger,
        }
    }

    /// Build and sign a fresh assertion for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns key loading, template, or signing errors.
    pub fn signed_assertion(&self, user_id: &str) -> Result<SignedAssertion, SamlError> {
        let signer = self.signer()?;
        build_signed_assertion(&self.issuer_id, user_id, &signer)
    }

    /// Obtain an OAuth token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns any error from building, signing, or exchanging the assertion.
    pub fn acquire_token(&self, user_id: &str) -> Result<OAuthToken, SamlError> {
        info!("Requesting OAuth token for customer {user_id}");
        let assertion = self.signed_assertion(user_id)?;

        match self.exchanger.exchange(&assertion, &self.consumer_key) {
            Ok(token) => {
                info!("OAuth token obtained for customer {user_id}");
                Ok(token)
            }
            Err(err) => {
                warn!("SAML token exchange failed: {err}");
                Err(err)
            }
        }
    }

    fn signer(&self) -> Result<Arc<RsaSha1Signer>, SamlError> {
        let mut cached = self.signer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(signer) = cached.as_ref() {
            return Ok(Arc::clone(signer));
        }

        debug!("Loading SAML signing key from {}", self.key_path.display());
        let signer = Arc::new(RsaSha1Signer::from_file(&self.key_path)?);
        *cached = Some(Arc::clone(&signer));
        Ok(signer)
    }
}

/// Base64url (padded) encoding of the assertion XML.
pub fn encode_assertion(xml: &str) -> String {
    URL_SAFE.encode(xml.as_bytes())
}

/// Encode pairs as an `application/x-www-form-urlencoded` body.
fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, FORM_ENCODE_SET),
                utf8_percent_encode(value, FORM_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode one form component (`+` is a space).
fn decode_form_component(value: &str) -> String {
    let value = value.replace('+', " ");
    percent_decode_str(&value).decode_utf8_lossy().into_owned()
}

/// Parse a url-encoded token response body.
fn parse_token_response(body: &str) -> Result<OAuthToken, SamlError> {
    let params: HashMap<String, String> = body
        .trim()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (decode_form_component(key), decode_form_component(value)))
        .collect();

    let required = |key: &'static str| {
        params
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or(SamlError::TokenResponseMalformed(key))
    };

    Ok(OAuthToken {
        token: required("oauth_token")?,
        secret: required("oauth_token_secret")?,
    })
}
