//! Error types for the Customer Account Data client.

use std::path::PathBuf;
use std::str::Utf8Error;

use ureq::http::HeaderMap;

/// Error while building, signing, or exchanging a SAML assertion.
#[derive(Debug, thiserror::Error)]
pub enum SamlError {
    /// Private key file could not be read.
    #[error("failed to read private key {}", .path.display())]
    KeyLoad {
        /// Key file path from configuration.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Key file content is not a usable RSA private key.
    #[error("invalid private key")]
    KeyFormat(#[from] KeyFormatError),

    /// RSA signing operation failed.
    #[error("RSA signing failed")]
    Signing(#[from] rsa::Error),

    /// XML template could not be rendered.
    #[error("template {template}: {message}")]
    Template {
        /// Template name.
        template: &'static str,
        /// What went wrong.
        message: String,
    },

    /// Identity provider refused the assertion.
    #[error("assertion rejected: {status} {detail}")]
    AssertionRejected {
        /// HTTP status line, or a transport failure marker.
        status: String,
        /// URL-decoded `WWW-Authenticate` content or transport error text.
        detail: String,
    },

    /// Token endpoint answered 200 without the expected fields.
    #[error("malformed token response: missing {0}")]
    TokenResponseMalformed(&'static str),
}

/// RSA key parsing error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum KeyFormatError {
    /// Invalid UTF-8 in key file.
    #[error("invalid UTF-8 in key")]
    InvalidUtf8(#[from] Utf8Error),

    /// PKCS#1 key parsing error.
    #[error("PKCS#1 key error")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// PKCS#8 key parsing error (returned when both formats fail).
    #[error("PKCS#8 key error")]
    Pkcs8(#[from] rsa::pkcs8::Error),
}

/// The request never produced an HTTP response.
#[derive(Debug, thiserror::Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        Self(err.to_string())
    }
}

/// Error from Customer Account Data API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Token acquisition failed.
    #[error(transparent)]
    Saml(#[from] SamlError),

    /// HTTP request failed (network error, timeout, etc).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response headers (challenge correlation ids live here).
        headers: HeaderMap,
        /// Raw response body.
        body: String,
    },

    /// JSON deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// MFA payload did not have the expected shape.
    #[error("malformed challenge: {0}")]
    ChallengeFormat(String),

    /// Success body lacked an expected member.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Answer list does not line up with the challenge list.
    #[error("expected {expected} challenge answers, got {got}")]
    AnswerCount {
        /// Number of challenges in the session.
        expected: usize,
        /// Number of answers supplied.
        got: usize,
    },
}

impl ClientError {
    /// HTTP status of an API error response, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
