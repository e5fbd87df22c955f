use application::dto::AuthenticatedUser;
use domain::credential::Credential;
use domain::identity::role::Role;
use domain::identity::user::UserStatus;
use serde::{Deserialize, Serialize};

/// Public view of an account, with its session token. Never carries the
/// password hash.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub gender: i32,
    pub location: String,
    pub avatar: String,
    pub mobile: Option<String>,
    pub idc: Option<String>,
    pub email: Option<String>,
    pub status: UserStatus,
    pub role: Role,
    pub credential: Credential,
    pub token: String,
}

impl From<AuthenticatedUser> for UserResponse {
    fn from(AuthenticatedUser { user, token }: AuthenticatedUser) -> Self {
        Self {
            id: user.id.as_str().to_owned(),
            name: user.name,
            gender: user.gender,
            location: user.location,
            avatar: user.avatar,
            mobile: user.mobile,
            idc: user.idc,
            email: user.email,
            status: user.status,
            role: user.role,
            credential: user.credential,
            token,
        }
    }
}
