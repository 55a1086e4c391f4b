//! Customer Account Data REST API client.
//!
//! Provides a sync client that lazily obtains an OAuth token through the
//! SAML exchange and signs every API request with a [`RequestSigner`].

mod accounts;
mod institutions;
mod logins;

pub use logins::LoginOutcome;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cad_config::IntuitConfig;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::{debug, info};
use ureq::http::{Method, StatusCode};

use crate::error::ClientError;
use crate::saml::{OAuthToken, SamlAuthenticator, TokenExchanger};
use crate::transport::{HttpRequest, HttpResponse, Transport, UreqTransport};

/// Query string characters left unescaped: A-Z a-z 0-9 - . _ ~
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Produces the `Authorization` header for an API request.
///
/// OAuth 1.0a request signing (nonce, timestamp, signature base string)
/// lives outside this crate; implementations receive everything needed to
/// sign with the consumer credentials and the session token.
pub trait RequestSigner: Send + Sync {
    /// Authorization header value for `method` on `url` with `params`.
    fn authorize(
        &self,
        method: &Method,
        url: &str,
        params: &[(String, String)],
        token: &OAuthToken,
    ) -> String;
}

/// API request before signing.
struct ApiRequest<'a> {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    headers: Vec<(&'a str, &'a str)>,
    body: Option<String>,
}

impl ApiRequest<'_> {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Customer Account Data API client.
///
/// Safe to share between threads: the session token sits behind a mutex and
/// only one thread performs the SAML exchange at a time.
pub struct AggregationClient {
    transport: Arc<dyn Transport>,
    signer: Box<dyn RequestSigner>,
    authenticator: SamlAuthenticator,
    base_url: String,
    customer_id: Mutex<String>,
    token: Mutex<Option<OAuthToken>>,
}

impl AggregationClient {
    /// Create a client from validated configuration.
    ///
    /// # Arguments
    /// * `config` - credentials, key path, and endpoints
    /// * `transport` - HTTP transport shared by API calls and token exchange
    /// * `signer` - OAuth request signer
    #[must_use]
    pub fn from_config(
        config: &IntuitConfig,
        transport: Arc<dyn Transport>,
        signer: Box<dyn RequestSigner>,
    ) -> Self {
        let exchanger = TokenExchanger::new(Arc::clone(&transport), &config.saml_token_url);
        let authenticator = SamlAuthenticator::new(
            &config.saml_provider_id,
            &config.consumer_key,
            &config.certificate_path,
            exchanger,
        );

        Self {
            transport,
            signer,
            authenticator,
            base_url: config.base_url.clone(),
            customer_id: Mutex::new(config.customer_id.clone()),
            token: Mutex::new(None),
        }
    }

    /// Create a client that talks HTTP through ureq.
    #[must_use]
    pub fn with_ureq(config: &IntuitConfig, signer: Box<dyn RequestSigner>) -> Self {
        let transport = Arc::new(UreqTransport::new(Duration::from_secs(config.timeout_secs)));
        Self::from_config(config, transport, signer)
    }

    /// Customer the session is scoped to.
    pub fn customer_id(&self) -> String {
        self.customer_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Scope the session to another customer.
    ///
    /// The cached token was issued for the previous customer and is dropped.
    pub fn scope(&self, customer_id: &str) {
        *self.customer_id.lock().unwrap_or_else(PoisonError::into_inner) = customer_id.to_owned();
        self.reset_token();
    }

    /// Forget the cached token so the next call runs a new exchange.
    pub fn reset_token(&self) {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Whether a token is currently cached.
    pub fn has_token(&self) -> bool {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Return the cached token, running the SAML exchange if there is none.
    ///
    /// A failed exchange leaves the cache empty.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Saml`] if the token cannot be obtained.
    pub fn token(&self) -> Result<OAuthToken, ClientError> {
        let mut cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = self.authenticator.acquire_token(&self.customer_id())?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Send a request and decode the JSON body of a successful response.
    fn request(&self, request: ApiRequest<'_>) -> Result<Value, ClientError> {
        let response = self.send(request)?;
        decode_json(&response.body)
    }

    /// Send a request and return the raw response on success.
    ///
    /// Non-2xx responses become [`ClientError::Http`]. A plain 401 also
    /// drops the cached token, since it usually means the token expired.
    fn send(&self, request: ApiRequest<'_>) -> Result<HttpResponse, ClientError> {
        let token = self.token()?;

        let base = format!("{}{}", self.base_url, request.path);
        let url = if request.params.is_empty() {
            base.clone()
        } else {
            format!("{base}?{}", encode_query(&request.params))
        };
        let authorization = self
            .signer
            .authorize(&request.method, &base, &request.params, &token);

        let mut http = HttpRequest::new(request.method.clone(), url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/xml")
            .header("Authorization", authorization);
        for (name, value) in request.headers {
            http = http.header(name, value);
        }
        if let Some(body) = request.body {
            http = http.body(body);
        }

        debug!("{} {}", request.method, base);
        let response = self.transport.execute(http)?;

        if !response.status.is_success() {
            if response.status == StatusCode::UNAUTHORIZED && !is_challenge_body(&response.body)
            {
                info!("API returned 401, dropping cached OAuth token");
                self.reset_token();
            }
            return Err(ClientError::Http {
                status: response.status.as_u16(),
                headers: response.headers,
                body: response.body,
            });
        }

        Ok(response)
    }
}

/// Decode a JSON body; an empty body is `null`.
fn decode_json(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

fn is_challenge_body(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .map(|value| crate::challenge::is_challenge(&value))
        .unwrap_or(false)
}

fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_ENCODE_SET),
                utf8_percent_encode(value, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Take member `key` out of an object body.
fn take_member(mut body: Value, key: &str) -> Result<Value, ClientError> {
    body.get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ClientError::UnexpectedResponse(format!("missing `{key}` member")))
}

/// Take array member `key` out of an object body.
fn take_array(body: Value, key: &str) -> Result<Vec<Value>, ClientError> {
    match take_member(body, key)? {
        Value::Array(items) => Ok(items),
        _ => Err(ClientError::UnexpectedResponse(format!(
            "`{key}` is not an array"
        ))),
    }
}
