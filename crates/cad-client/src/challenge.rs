//! Multi-factor authentication challenge sessions.
//!
//! When an institution login needs extra verification, the API rejects the
//! call with a body like:
//!
//! ```json
//! {
//!   "challenge": [
//!     { "question": ["What is your favorite color?",
//!                    { "val": "1", "text": "Red" },
//!                    { "val": "2", "text": "Blue" }] }
//!   ]
//! }
//! ```
//!
//! plus `Challengesessionid` and `Challengenodeid` headers. The session
//! keeps challenges in wire order because answers are matched by position.

use serde_json::Value;
use ureq::http::HeaderMap;

use crate::error::ClientError;

/// Header carrying the challenge session id.
const SESSION_ID_HEADER: &str = "challengesessionid";

/// Header carrying the challenge node id.
const NODE_ID_HEADER: &str = "challengenodeid";

/// Which login call produced the challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    /// First login to an institution (`POST institutions/{id}/logins`).
    DiscoverAndAdd,
    /// Credential refresh of an existing login (`PUT logins/{id}`).
    UpdateLogin,
}

/// Resource the answers are resubmitted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginTarget {
    /// Institution being added.
    Institution(String),
    /// Existing institution login being updated.
    Login(String),
}

impl LoginTarget {
    /// Context type implied by the target.
    #[must_use]
    pub fn context(&self) -> ContextType {
        match self {
            Self::Institution(_) => ContextType::DiscoverAndAdd,
            Self::Login(_) => ContextType::UpdateLogin,
        }
    }
}

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Value to submit when this choice is picked.
    pub value: String,
    /// Display text.
    pub text: String,
}

/// One MFA question. No choices means a free-text answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Question text.
    pub question: String,
    /// Choices in wire order.
    pub choices: Vec<Choice>,
}

/// A paused login waiting for challenge answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeSession {
    /// Resubmission target.
    pub target: LoginTarget,
    /// Value of the `Challengesessionid` header.
    pub session_id: String,
    /// Value of the `Challengenodeid` header.
    pub node_id: String,
    /// Challenges in wire order.
    pub challenges: Vec<Challenge>,
    /// Caller answers, one per challenge, by position.
    pub answers: Vec<String>,
}

impl ChallengeSession {
    /// Rebuild a challenge session from a rejected login response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ChallengeFormat`] if a correlation header is
    /// missing or the `challenge` member has an unexpected shape.
    pub fn parse(
        target: LoginTarget,
        body: &Value,
        headers: &HeaderMap,
    ) -> Result<Self, ClientError> {
        let session_id = required_header(headers, SESSION_ID_HEADER)?;
        let node_id = required_header(headers, NODE_ID_HEADER)?;

        let groups = body
            .get("challenge")
            .and_then(Value::as_array)
            .ok_or_else(|| format_error("`challenge` must be an array"))?;

        let mut challenges = Vec::new();
        for (index, group) in groups.iter().enumerate() {
            let entries = group
                .as_object()
                .ok_or_else(|| format_error(format!("challenge group {index} must be an object")))?;
            if entries.is_empty() {
                return Err(format_error(format!("challenge group {index} is empty")));
            }
            for (key, entry) in entries {
                challenges.push(parse_challenge(key, entry)?);
            }
        }
        if challenges.is_empty() {
            return Err(format_error("`challenge` holds no questions"));
        }

        Ok(Self {
            target,
            session_id,
            node_id,
            challenges,
            answers: Vec::new(),
        })
    }

    /// Context type of the login that produced this session.
    #[must_use]
    pub fn context(&self) -> ContextType {
        self.target.context()
    }

    /// Set answers, one per challenge in order.
    pub fn answer<I, S>(&mut self, answers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers = answers.into_iter().map(Into::into).collect();
    }
}

/// Whether a rejected login body asks for MFA.
#[must_use]
pub fn is_challenge(body: &Value) -> bool {
    body.get("challenge").is_some()
}

/// Parse one `[question, {val, text}, ...]` entry.
fn parse_challenge(key: &str, entry: &Value) -> Result<Challenge, ClientError> {
    let items = entry
        .as_array()
        .ok_or_else(|| format_error(format!("challenge `{key}` must be an array")))?;

    let (question, choices) = items
        .split_first()
        .ok_or_else(|| format_error(format!("challenge `{key}` has no question")))?;

    let question = question
        .as_str()
        .ok_or_else(|| format_error(format!("challenge `{key}` question must be a string")))?
        .to_owned();

    let choices = choices
        .iter()
        .enumerate()
        .map(|(index, choice)| parse_choice(key, index, choice))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Challenge { question, choices })
}

fn parse_choice(key: &str, index: usize, choice: &Value) -> Result<Choice, ClientError> {
    let field = |name: &str| {
        choice
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                format_error(format!(
                    "choice {index} of challenge `{key}` needs a string `{name}`"
                ))
            })
    };

    Ok(Choice {
        value: field("val")?,
        text: field("text")?,
    })
}

fn required_header(headers: &HeaderMap, name: &str) -> Result<String, ClientError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| format_error(format!("missing `{name}` header")))
}

fn format_error(message: impl Into<String>) -> ClientError {
    ClientError::ChallengeFormat(message.into())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use ureq::http::header::{HeaderName, HeaderValue};

    use super::*;

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"Challengesessionid").unwrap(),
            HeaderValue::from_static("session-1"),
        );
        headers.insert(
            HeaderName::from_bytes(b"Challengenodeid").unwrap(),
            HeaderValue::from_static("node-9"),
        );
        headers
    }

    fn choice(value: &str, text: &str) -> Choice {
        Choice {
            value: value.to_owned(),
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_parse_two_groups_in_order() {
        let body = json!({
            "challenge": [
                {"question": ["Favorite color?", {"val": "1", "text": "Red"}, {"val": "2", "text": "Blue"}]},
                {"question": ["First pet?", {"val": "a", "text": "Cat"}, {"val": "b", "text": "Dog"}]}
            ]
        });

        let session = ChallengeSession::parse(
            LoginTarget::Institution("100000".to_owned()),
            &body,
            &headers(),
        )
        .unwrap();

        assert_eq!(session.session_id, "session-1");
        assert_eq!(session.node_id, "node-9");
        assert_eq!(session.context(), ContextType::DiscoverAndAdd);
        assert_eq!(
            session.challenges,
            vec![
                Challenge {
                    question: "Favorite color?".to_owned(),
                    choices: vec![choice("1", "Red"), choice("2", "Blue")],
                },
                Challenge {
                    question: "First pet?".to_owned(),
                    choices: vec![choice("a", "Cat"), choice("b", "Dog")],
                },
            ]
        );
        assert!(session.answers.is_empty());
    }

    #[test]
    fn test_group_entries_keep_document_order() {
        let body = json!({
            "challenge": [
                {"zeta": ["Second letter?"], "alpha": ["Third letter?"]}
            ]
        });

        let session =
            ChallengeSession::parse(LoginTarget::Login("777".to_owned()), &body, &headers())
                .unwrap();

        let questions: Vec<_> = session
            .challenges
            .iter()
            .map(|c| c.question.as_str())
            .collect();
        assert_eq!(questions, vec!["Second letter?", "Third letter?"]);
        assert_eq!(session.context(), ContextType::UpdateLogin);
    }

    #[test]
    fn test_free_text_challenge_has_no_choices() {
        let body = json!({"challenge": [{"question": ["Enter the code we sent"]}]});

        let session = ChallengeSession::parse(
            LoginTarget::Institution("1".to_owned()),
            &body,
            &headers(),
        )
        .unwrap();

        assert_eq!(session.challenges.len(), 1);
        assert!(session.challenges[0].choices.is_empty());
    }

    #[test]
    fn test_missing_val_is_format_error() {
        let body = json!({
            "challenge": [{"question": ["Favorite color?", {"text": "Red"}]}]
        });

        let err = ChallengeSession::parse(
            LoginTarget::Institution("1".to_owned()),
            &body,
            &headers(),
        )
        .unwrap_err();

        assert!(matches!(err, ClientError::ChallengeFormat(_)));
        assert!(err.to_string().contains("`val`"));
    }

    #[test]
    fn test_wrong_shapes_are_format_errors() {
        let bodies = [
            json!({}),
            json!({"challenge": []}),
            json!({"challenge": [{}]}),
            json!({"challenge": [{"question": ["Q?"]}, {}]}),
            json!({"challenge": {"question": []}}),
            json!({"challenge": ["not an object"]}),
            json!({"challenge": [{"question": "not an array"}]}),
            json!({"challenge": [{"question": []}]}),
            json!({"challenge": [{"question": [42]}]}),
            json!({"challenge": [{"question": ["Q?", {"val": 1, "text": "One"}]}]}),
            json!({"challenge": [{"question": ["Q?", "bare string"]}]}),
        ];

        for body in &bodies {
            let result =
                ChallengeSession::parse(LoginTarget::Institution("1".to_owned()), body, &headers());
            assert!(
                matches!(result, Err(ClientError::ChallengeFormat(_))),
                "expected format error for {body}"
            );
        }
    }

    #[test]
    fn test_missing_header_is_format_error() {
        let body = json!({"challenge": [{"question": ["Q?"]}]});
        let mut headers = headers();
        headers.remove(NODE_ID_HEADER);

        let err = ChallengeSession::parse(LoginTarget::Institution("1".to_owned()), &body, &headers)
            .unwrap_err();

        assert!(err.to_string().contains("challengenodeid"));
    }

    #[test]
    fn test_answer_sets_positional_answers() {
        let body = json!({"challenge": [{"q": ["A?"]}, {"q": ["B?"]}]});
        let mut session =
            ChallengeSession::parse(LoginTarget::Institution("1".to_owned()), &body, &headers())
                .unwrap();

        session.answer(["first", "second"]);

        assert_eq!(session.answers, vec!["first".to_owned(), "second".to_owned()]);
    }

    #[test]
    fn test_is_challenge() {
        assert!(is_challenge(&json!({"challenge": []})));
        assert!(!is_challenge(&json!({"status": "FAILED"})));
        assert!(!is_challenge(&Value::Null));
    }
}
