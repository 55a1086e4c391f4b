//! XML templates for the assertion, signed-info, and signature documents.
//!
//! Placeholders have the form `{{FieldName}}`. The identity provider checks
//! the digest over the exact rendered bytes, so rendering is a plain
//! substitution with no whitespace handling beyond trimming the file's
//! trailing newline.

use crate::error::SamlError;

/// A named template with `{{Field}}` placeholders.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Template {
    name: &'static str,
    source: &'static str,
}

pub(crate) const SAML_ASSERTION: Template = Template {
    name: "saml_assertion",
    source: include_str!("../../templates/saml_assertion.xml"),
};

pub(crate) const SAML_SIGNED: Template = Template {
    name: "saml_signed",
    source: include_str!("../../templates/saml_signed.xml"),
};

pub(crate) const SAML_SIGNATURE: Template = Template {
    name: "saml_signature",
    source: include_str!("../../templates/saml_signature.xml"),
};

impl Template {
    /// Substitute every placeholder with its field value.
    ///
    /// Values are inserted verbatim; callers escape untrusted text first.
    pub(crate) fn render(&self, fields: &[(&str, &str)]) -> Result<String, SamlError> {
        let source = self.source.trim_end();
        let mut out = String::with_capacity(source.len() + 256);
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                return Err(self.error("unterminated placeholder".to_owned()));
            };
            let field = &after[..end];
            let value = fields
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, value)| *value)
                .ok_or_else(|| self.error(format!("no value for field {field}")))?;
            out.push_str(value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);

        Ok(out)
    }

    fn error(&self, message: String) -> SamlError {
        SamlError::Template {
            template: self.name,
            message,
        }
    }
}

/// Escape element text the way exclusive canonicalization writes it.
///
/// Only `&`, `<` and `>` are replaced; quotes stay literal in canonical text
/// nodes. Not suitable for attribute values.
pub(crate) fn escape(text: &str) -> String {
    quick_xml::escape::partial_escape(text).into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_signature_template() {
        let xml = SAML_SIGNATURE
            .render(&[("SignedInfo", "<ds:SignedInfo/>"), ("SignatureValue", "c2ln")])
            .unwrap();

        assert_eq!(
            xml,
            r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:SignedInfo/><ds:SignatureValue>c2ln</ds:SignatureValue></ds:Signature>"#
        );
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let xml = SAML_ASSERTION
            .render(&[
                ("IssuerId", "issuer"),
                ("UserId", "user"),
                ("ReferenceId", "_ref"),
                ("TimeNow", "now"),
                ("TimeBefore", "before"),
                ("TimeAfter", "after"),
                ("Signature", ""),
            ])
            .unwrap();

        assert_eq!(xml.matches("issuer").count(), 2);
        assert_eq!(xml.matches(r#""_ref""#).count(), 2);
        assert!(!xml.contains("{{"));
        assert!(!xml.ends_with('\n'));
    }

    #[test]
    fn test_render_missing_field() {
        let err = SAML_SIGNED.render(&[("ReferenceId", "_ref")]).unwrap_err();
        assert!(matches!(err, SamlError::Template { template: "saml_signed", .. }));
        assert!(err.to_string().contains("Digest"));
    }

    #[test]
    fn test_render_unterminated_placeholder() {
        let template = Template {
            name: "broken",
            source: "<a>{{Value</a>",
        };
        let err = template.render(&[("Value", "x")]).unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a<b>&"c""#), r#"a&lt;b&gt;&amp;"c""#);
        assert_eq!(escape("o'brien"), "o'brien");
        assert_eq!(escape("provider.example.com"), "provider.example.com");
    }
}
