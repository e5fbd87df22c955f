//! Email logic management.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DomainError, Result};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([-+.]\w+)*@\w+([-.]\w+)*\.\w+([-.]\w+)*$").unwrap()
});

/// Value object of a valid email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Converts a [`String`] into a valid [`EmailAddress`].
    ///
    /// The address is kept as typed: login matches identifiers exactly.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the whole string does not have the
    /// `local@domain.tld` shape.
    pub fn parse(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        if EMAIL_RE.is_match(&email) {
            Ok(Self(email))
        } else {
            Err(DomainError::InvalidEmailFormat)
        }
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the address.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
