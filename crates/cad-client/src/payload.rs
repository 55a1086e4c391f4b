//! XML request bodies for institution logins.

use std::fmt::Write;

use quick_xml::escape::escape;

/// Namespace of the `InstitutionLogin` document.
pub const INSTITUTION_LOGIN_XMLNS: &str =
    "http://schema.intuit.com/platform/fdatafeed/institutionlogin/v1";

/// Namespace of challenge responses.
pub const CHALLENGE_XMLNS: &str = "http://schema.intuit.com/platform/fdatafeed/challenge/v1";

/// One login field, keyed by the institution's credential name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Field key from the institution details (e.g. `Banking Userid`).
    pub name: String,
    /// Field value.
    pub value: String,
}

impl Credential {
    /// Create a credential.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Username/password pair for institutions with the usual two fields.
#[must_use]
pub fn username_password(
    username_key: &str,
    username: &str,
    password_key: &str,
    password: &str,
) -> Vec<Credential> {
    vec![
        Credential::new(username_key, username),
        Credential::new(password_key, password),
    ]
}

/// `InstitutionLogin` document carrying credentials.
#[must_use]
pub fn credentials_xml(credentials: &[Credential]) -> String {
    let mut xml = format!(r#"<InstitutionLogin xmlns="{INSTITUTION_LOGIN_XMLNS}"><credentials>"#);
    for credential in credentials {
        let _ = write!(
            xml,
            "<credential><name>{}</name><value>{}</value></credential>",
            escape(credential.name.as_str()),
            escape(credential.value.as_str())
        );
    }
    xml.push_str("</credentials></InstitutionLogin>");
    xml
}

/// `InstitutionLogin` document carrying challenge answers in order.
#[must_use]
pub fn challenge_responses_xml(answers: &[String]) -> String {
    let mut xml =
        format!(r#"<InstitutionLogin xmlns="{INSTITUTION_LOGIN_XMLNS}"><challengeResponses>"#);
    for answer in answers {
        let _ = write!(
            xml,
            r#"<v11:response xmlns:v11="{CHALLENGE_XMLNS}">{}</v11:response>"#,
            escape(answer.as_str())
        );
    }
    xml.push_str("</challengeResponses></InstitutionLogin>");
    xml
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_credentials_xml() {
        let xml = credentials_xml(&username_password(
            "Banking Userid",
            "direct",
            "Banking Password",
            "a<b&c",
        ));

        assert_eq!(
            xml,
            concat!(
                r#"<InstitutionLogin xmlns="http://schema.intuit.com/platform/fdatafeed/institutionlogin/v1">"#,
                "<credentials>",
                "<credential><name>Banking Userid</name><value>direct</value></credential>",
                "<credential><name>Banking Password</name><value>a&lt;b&amp;c</value></credential>",
                "</credentials></InstitutionLogin>"
            )
        );
    }

    #[test]
    fn test_challenge_responses_xml() {
        let xml = challenge_responses_xml(&["Blue".to_owned(), "12345".to_owned()]);

        assert_eq!(
            xml,
            concat!(
                r#"<InstitutionLogin xmlns="http://schema.intuit.com/platform/fdatafeed/institutionlogin/v1">"#,
                "<challengeResponses>",
                r#"<v11:response xmlns:v11="http://schema.intuit.com/platform/fdatafeed/challenge/v1">Blue</v11:response>"#,
                r#"<v11:response xmlns:v11="http://schema.intuit.com/platform/fdatafeed/challenge/v1">12345</v11:response>"#,
                "</challengeResponses></InstitutionLogin>"
            )
        );
    }
}
