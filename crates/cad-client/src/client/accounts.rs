//! Account, transaction, and customer operations for the scoped customer.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;
use ureq::http::Method;

use super::{AggregationClient, ApiRequest, take_array};
use crate::error::ClientError;

/// Date layout of the transaction range parameters.
const DATE_FORMAT: &str = "%Y-%m-%d";

impl AggregationClient {
    /// List all accounts of the scoped customer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body has no
    /// `accounts` array.
    pub fn accounts(&self) -> Result<Vec<Value>, ClientError> {
        let body = self.request(ApiRequest::new(Method::GET, "accounts"))?;
        take_array(body, "accounts")
    }

    /// Fetch one account of the scoped customer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedResponse`] if the response carries
    /// no account.
    pub fn account(&self, account_id: &str) -> Result<Value, ClientError> {
        let body = self.request(ApiRequest::new(
            Method::GET,
            format!("accounts/{account_id}"),
        ))?;
        take_array(body, "accounts")?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ClientError::UnexpectedResponse(format!("account {account_id} not in response"))
            })
    }

    /// Fetch transactions of an account posted between `start` and `end`.
    ///
    /// Returns the whole response object, which groups transactions by type.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    pub fn transactions(
        &self,
        account_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value, ClientError> {
        let mut request = ApiRequest::new(Method::GET, format!("accounts/{account_id}/transactions"));
        request.params = vec![
            ("txnStartDate".to_owned(), start.format(DATE_FORMAT).to_string()),
            ("txnEndDate".to_owned(), end.format(DATE_FORMAT).to_string()),
        ];
        self.request(request)
    }

    /// Delete the scoped customer and every account attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    pub fn delete_customer(&self) -> Result<(), ClientError> {
        info!("Deleting customer {}", self.customer_id());
        self.send(ApiRequest::new(Method::DELETE, "customers"))?;
        Ok(())
    }

    /// Delete one account of the scoped customer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    pub fn delete_account(&self, account_id: &str) -> Result<(), ClientError> {
        info!("Deleting account {account_id}");
        self.send(ApiRequest::new(
            Method::DELETE,
            format!("accounts/{account_id}"),
        ))?;
        Ok(())
    }
}
