//! Registration form validation.

use crate::auth::password::Password;
use crate::error::{DomainError, Result};
use crate::identity::email::EmailAddress;

pub const KIND_MOBILE: &str = "mobile";
pub const KIND_EMAIL: &str = "email";

/// Local login key chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalIdentifier {
    Mobile(String),
    Email(EmailAddress),
}

impl LocalIdentifier {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mobile(mobile) => mobile,
            Self::Email(email) => email.as_str(),
        }
    }

    /// Registration kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mobile(_) => KIND_MOBILE,
            Self::Email(_) => KIND_EMAIL,
        }
    }
}

/// Raw registration fields, as received.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationForm<'a> {
    pub id: &'a str,
    pub kind: &'a str,
    pub password: &'a str,
    pub code: &'a str,
    pub token: &'a str,
}

/// A registration that passed validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub identifier: LocalIdentifier,
    pub password: Password,
    pub code: String,
    pub token: String,
}

impl RegistrationForm<'_> {
    /// Validates fields in a fixed order and reports the first failure:
    /// `id`, `pwd`, `code`, `token`, then the kind-specific check.
    pub fn validate(self) -> Result<Registration> {
        if self.id.is_empty() {
            return Err(DomainError::validation("id", "id is required"));
        }

        if self.password.is_empty() {
            return Err(DomainError::validation("pwd", "password is required"));
        }

        if self.code.is_empty() {
            return Err(DomainError::validation("code", "code is required"));
        }

        if self.token.is_empty() {
            return Err(DomainError::validation("token", "token is required"));
        }

        let identifier = match self.kind {
            KIND_MOBILE => LocalIdentifier::Mobile(self.id.to_owned()),
            KIND_EMAIL => EmailAddress::parse(self.id)
                .map(LocalIdentifier::Email)
                .map_err(|_| {
                    DomainError::validation("id", "email format is invalid")
                })?,
            other => {
                return Err(DomainError::validation(
                    "type",
                    format!("unknown registration type `{other}`"),
                ));
            },
        };

        Ok(Registration {
            identifier,
            password: Password::new(self.password)?,
            code: self.code.to_owned(),
            token: self.token.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form<'a>() -> RegistrationForm<'a> {
        RegistrationForm {
            id: "u1@example.com",
            kind: "email",
            password: "secret",
            code: "123456",
            token: "verify-tok",
        }
    }

    fn failing_field(form: RegistrationForm<'_>) -> String {
        form.validate().unwrap_err().field().unwrap().to_owned()
    }

    #[test]
    fn test_valid_email_registration() {
        let registration = form().validate().unwrap();
        assert_eq!(registration.identifier.as_str(), "u1@example.com");
        assert_eq!(registration.identifier.kind(), KIND_EMAIL);
        assert_eq!(registration.password.as_str(), "secret");
    }

    #[test]
    fn test_mobile_has_no_format_check() {
        let registration = RegistrationForm {
            id: "not a number",
            kind: "mobile",
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(
            registration.identifier,
            LocalIdentifier::Mobile("not a number".into())
        );
    }

    #[test]
    fn test_first_failing_field_is_reported() {
        let empty = RegistrationForm {
            id: "",
            kind: "fax",
            password: "",
            code: "",
            token: "",
        };
        assert_eq!(failing_field(empty), "id");
        assert_eq!(failing_field(RegistrationForm { id: "x", ..empty }), "pwd");
        assert_eq!(
            failing_field(RegistrationForm { id: "x", password: "p", ..empty }),
            "code"
        );
        assert_eq!(
            failing_field(RegistrationForm {
                id: "x",
                password: "p",
                code: "1",
                ..empty
            }),
            "token"
        );
        assert_eq!(
            failing_field(RegistrationForm {
                id: "x",
                password: "p",
                code: "1",
                token: "t",
                ..empty
            }),
            "type"
        );
    }

    #[test]
    fn test_malformed_email() {
        let err = RegistrationForm { id: "u1@example", ..form() }
            .validate()
            .unwrap_err();
        assert_eq!(err.field(), Some("id"));
    }
}
