//! Data Transfer Objects for the application layer.

use domain::identity::user::User;

/// Request DTO for authentication.
#[derive(Debug, Clone, Default)]
pub struct AuthRequestDto {
    /// Provider tag: `normal` or a federated provider tag.
    pub provider: String,
    /// Mobile number, national id or email (`normal` only).
    pub id: String,
    /// Password (`normal` only).
    pub password: String,
    /// Provider-specific fields (federated only).
    pub federated: FederatedPayload,
}

/// Authorization payload forwarded to an identity provider.
#[derive(Debug, Clone, Default)]
pub struct FederatedPayload {
    /// Authorization code (`js_code` for mini programs, `auth_code` for
    /// Alipay).
    pub code: String,
    /// Encrypted profile, mini programs only.
    pub encrypted_data: Option<String>,
    /// Initialization vector of `encrypted_data`.
    pub iv: Option<String>,
}

/// Request DTO for registration.
#[derive(Debug, Clone, Default)]
pub struct RegisterRequestDto {
    /// Mobile number or email.
    pub id: String,
    /// `mobile` or `email`.
    pub kind: String,
    pub password: String,
    /// Verification code sent to the identifier.
    pub code: String,
    /// Token binding the verification code to its request.
    pub token: String,
}

/// An authenticated user and its session token.
///
/// `user.password` is always `None`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}
