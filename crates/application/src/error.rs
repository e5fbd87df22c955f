//! Application-level errors.

use domain::error::DomainError;

pub type Result<T> = std::result::Result<T, ApplicationError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of an [`ApplicationError`], stable across layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DuplicateUser,
    NotFound,
    UnsupportedProvider,
    Resolution,
    Persistence,
    Signing,
}

impl ErrorKind {
    /// Whether the caller caused the failure.
    pub fn is_client_fault(self) -> bool {
        !matches!(self, Self::Persistence | Self::Signing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::DuplicateUser => "duplicate_user",
            Self::NotFound => "not_found",
            Self::UnsupportedProvider => "unsupported_provider",
            Self::Resolution => "resolution",
            Self::Persistence => "persistence",
            Self::Signing => "signing",
        }
    }
}

/// Errors that can occur in the application layer.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("identifier is already registered")]
    DuplicateUser,
    /// Returned for an unknown identifier and for a wrong password alike.
    #[error("no account matches these credentials")]
    NotFound,

    #[error("identity provider exchange failed: {0}")]
    Resolution(BoxError),
    #[error("storage operation failed")]
    Persistence(#[source] BoxError),
    #[error("token signing failed")]
    Signing(#[source] BoxError),
}

impl ApplicationError {
    pub fn resolution(err: impl Into<BoxError>) -> Self {
        Self::Resolution(err.into())
    }

    pub fn persistence(err: impl Into<BoxError>) -> Self {
        Self::Persistence(err.into())
    }

    pub fn signing(err: impl Into<BoxError>) -> Self {
        Self::Signing(err.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(DomainError::UnsupportedProvider(_)) => {
                ErrorKind::UnsupportedProvider
            },
            Self::Domain(_) => ErrorKind::Validation,
            Self::DuplicateUser => ErrorKind::DuplicateUser,
            Self::NotFound => ErrorKind::NotFound,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::Signing(_) => ErrorKind::Signing,
        }
    }

    /// Offending field, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Domain(err) => err.field(),
            _ => None,
        }
    }
}

/// Tags foreign errors with the application error they stand for.
pub trait ResultExt<T> {
    fn persistence(self) -> Result<T>;
    fn resolution(self) -> Result<T>;
    fn signing(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn persistence(self) -> Result<T> {
        self.map_err(ApplicationError::persistence)
    }

    fn resolution(self) -> Result<T> {
        self.map_err(ApplicationError::resolution)
    }

    fn signing(self) -> Result<T> {
        self.map_err(ApplicationError::signing)
    }
}
