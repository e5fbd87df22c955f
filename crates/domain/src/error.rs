//! Custom error handler for domain (core).

pub type Result<T> = std::result::Result<T, DomainError>;

/// Enum representing custom domain errors.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("invalid email formatting")]
    InvalidEmailFormat,
    #[error("id must be between 1 and 32 alphanumeric characters")]
    InvalidIdFormat,
    #[error("password hash must be a PHC string")]
    InvalidPasswordHash,

    #[error("unsupported provider `{0}`")]
    UnsupportedProvider(String),
}

impl DomainError {
    /// Shortcut for [`DomainError::ValidationFailed`].
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    /// Field name carried by a validation failure.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { field, .. } => Some(field),
            _ => None,
        }
    }
}
