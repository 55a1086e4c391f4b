//! Institution lookups.

use serde_json::Value;
use tracing::info;
use ureq::http::Method;

use super::{AggregationClient, ApiRequest, take_array};
use crate::error::ClientError;

impl AggregationClient {
    /// List every supported institution.
    ///
    /// The list is large; callers usually cache it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body has no
    /// `institution` array.
    pub fn institutions(&self) -> Result<Vec<Value>, ClientError> {
        info!("Fetching institution list");
        let body = self.request(ApiRequest::new(Method::GET, "institutions"))?;
        take_array(body, "institution")
    }

    /// Fetch details of one institution, including its login field keys.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    pub fn institution(&self, institution_id: &str) -> Result<Value, ClientError> {
        self.request(ApiRequest::new(
            Method::GET,
            format!("institutions/{institution_id}"),
        ))
    }
}
