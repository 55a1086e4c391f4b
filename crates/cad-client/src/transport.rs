//! Blocking HTTP transport.
//!
//! The client and the token exchanger talk to the network only through
//! [`Transport`], so tests can script responses with `MockTransport`.

use std::time::Duration;

use ureq::Agent;
use ureq::http::{HeaderMap, Method, StatusCode};

use crate::error::TransportError;

/// Outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    /// Request body (empty for GET and DELETE).
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a request without headers or body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of the header `name` (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// HTTP response with the body fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Status line in the form `401 Unauthorized`.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", self.status.as_u16()),
            None => self.status.as_u16().to_string(),
        }
    }

    /// Value of the header `name`, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Executes HTTP requests.
pub trait Transport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response was received.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a ureq agent.
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Create a transport whose calls time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let response = match method {
            Method::GET | Method::DELETE => {
                let mut builder = if method == Method::GET {
                    self.agent.get(&url)
                } else {
                    self.agent.delete(&url)
                };
                for (name, value) in &headers {
                    builder = builder.header(name, value);
                }
                builder.call()?
            }
            Method::POST | Method::PUT => {
                let mut builder = if method == Method::POST {
                    self.agent.post(&url)
                } else {
                    self.agent.put(&url)
                };
                for (name, value) in &headers {
                    builder = builder.header(name, value);
                }
                builder.send(&body[..])?
            }
            other => {
                return Err(TransportError(format!("unsupported method {other}")));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    use ureq::http::header::{HeaderName, HeaderValue};
    use ureq::http::{HeaderMap, StatusCode};

    use super::{HttpRequest, HttpResponse, Transport};
    use crate::error::TransportError;

    /// Scripted transport for testing.
    ///
    /// Responses are returned in the order they were queued. Every request
    /// is recorded and can be inspected with [`MockTransport::requests`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// let transport = MockTransport::new()
    ///     .with_response(200, &[], "oauth_token=t&oauth_token_secret=s");
    /// ```
    #[derive(Debug, Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockTransport {
        /// Create a mock with no queued responses.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response.
        ///
        /// # Panics
        ///
        /// Panics if `status` or a header is invalid.
        #[must_use]
        pub fn with_response(self, status: u16, headers: &[(&str, &str)], body: &str) -> Self {
            let mut map = HeaderMap::new();
            for (name, value) in headers {
                map.append(
                    HeaderName::from_bytes(name.as_bytes()).expect("valid header name"),
                    HeaderValue::from_str(value).expect("valid header value"),
                );
            }
            let response = HttpResponse {
                status: StatusCode::from_u16(status).expect("valid status"),
                headers: map,
                body: body.to_owned(),
            };
            self.push(Ok(response));
            self
        }

        /// Queue a transport failure.
        #[must_use]
        pub fn with_failure(self, message: &str) -> Self {
            self.push(Err(TransportError(message.to_owned())));
            self
        }

        /// Requests received so far.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn push(&self, response: Result<HttpResponse, TransportError>) {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(response);
        }
    }

    impl Transport for MockTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let description = format!("{} {}", request.method, request.url);
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Err(TransportError(format!("no response queued for {description}"))))
        }
    }
}
