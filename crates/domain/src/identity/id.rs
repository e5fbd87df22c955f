//! ID logic management.

use std::fmt;

use crate::error::{DomainError, Result};

/// Maximum length of a stored identifier.
pub const MAX_ID_LENGTH: usize = 32;

/// Value object of a valid identifier.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Converts a [`String`] into a valid [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is empty, longer than 32 characters or
    /// contains anything but ASCII alphanumerics.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_ID_LENGTH {
            return Err(DomainError::InvalidIdFormat);
        }

        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidIdFormat);
        }

        Ok(Self(id))
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generated_id() {
        let id = UserId::parse("9f86d081884c7d659a2feaa0c55ad015").unwrap();
        assert_eq!(id.as_str().len(), MAX_ID_LENGTH);
    }

    #[test]
    fn test_reject_invalid_id() {
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("a".repeat(33)).is_err());
        assert!(UserId::parse("abc' or '1'='1").is_err());
    }
}
