//! Institution logins and MFA challenge resubmission.

use serde_json::Value;
use tracing::info;
use ureq::http::Method;

use super::{AggregationClient, ApiRequest, decode_json, is_challenge_body, take_array};
use crate::challenge::{ChallengeSession, LoginTarget};
use crate::error::ClientError;
use crate::payload::{Credential, challenge_responses_xml, credentials_xml};

/// Result of a login call that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Login finished; the institution's accounts.
    Accounts(Vec<Value>),
    /// The institution wants MFA answers before continuing.
    Challenged(ChallengeSession),
}

impl AggregationClient {
    /// Log in to an institution for the first time and discover its accounts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for non-MFA failures or a malformed challenge.
    pub fn discover_and_add_accounts(
        &self,
        institution_id: &str,
        credentials: &[Credential],
    ) -> Result<LoginOutcome, ClientError> {
        info!("Discovering accounts at institution {institution_id}");
        let target = LoginTarget::Institution(institution_id.to_owned());
        self.login(target, credentials_xml(credentials), &[])
    }

    /// Refresh the credentials of an existing institution login.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for non-MFA failures or a malformed challenge.
    pub fn update_login(
        &self,
        login_id: &str,
        credentials: &[Credential],
    ) -> Result<LoginOutcome, ClientError> {
        info!("Updating institution login {login_id}");
        let target = LoginTarget::Login(login_id.to_owned());
        self.login(target, credentials_xml(credentials), &[])
    }

    /// Submit the answers of a challenge session.
    ///
    /// The session's context type picks the endpoint it came from. Wrong
    /// answers can lead to a fresh [`LoginOutcome::Challenged`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AnswerCount`] if the answers do not match the
    /// challenges one-to-one, or any request error.
    pub fn respond_to_challenge(
        &self,
        session: &ChallengeSession,
    ) -> Result<LoginOutcome, ClientError> {
        if session.answers.len() != session.challenges.len() {
            return Err(ClientError::AnswerCount {
                expected: session.challenges.len(),
                got: session.answers.len(),
            });
        }

        info!(
            "Answering {} challenge(s) for session {}",
            session.answers.len(),
            session.session_id
        );
        let headers = [
            ("challengeNodeId", session.node_id.as_str()),
            ("challengeSessionId", session.session_id.as_str()),
        ];
        self.login(
            session.target.clone(),
            challenge_responses_xml(&session.answers),
            &headers,
        )
    }

    fn login(
        &self,
        target: LoginTarget,
        body: String,
        headers: &[(&str, &str)],
    ) -> Result<LoginOutcome, ClientError> {
        let mut request = match &target {
            LoginTarget::Institution(id) => {
                ApiRequest::new(Method::POST, format!("institutions/{id}/logins"))
            }
            LoginTarget::Login(id) => {
                let mut request = ApiRequest::new(Method::PUT, format!("logins/{id}"));
                request
                    .params
                    .push(("refresh".to_owned(), "true".to_owned()));
                request
            }
        };
        request.headers.extend_from_slice(headers);
        request.body = Some(body);

        match self.send(request) {
            Ok(response) => {
                let body = decode_json(&response.body)?;
                if body.is_null() {
                    return Ok(LoginOutcome::Accounts(Vec::new()));
                }
                Ok(LoginOutcome::Accounts(take_array(body, "accounts")?))
            }
            Err(ClientError::Http { headers, body, .. }) if is_challenge_body(&body) => {
                let body: Value = serde_json::from_str(&body)?;
                let session = ChallengeSession::parse(target, &body, &headers)?;
                info!(
                    "Login requires MFA: {} challenge(s)",
                    session.challenges.len()
                );
                Ok(LoginOutcome::Challenged(session))
            }
            Err(err) => Err(err),
        }
    }
}
