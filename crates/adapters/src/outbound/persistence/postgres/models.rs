//! Database models for PostgreSQL.

use application::error::{Result, ResultExt};
use chrono::{DateTime, Utc};
use domain::auth::password::PasswordHash;
use domain::credential::{Credential, OAuthCredential};
use domain::identity::id::UserId;
use domain::identity::role::Role;
use domain::identity::user::{User, UserStatus};
use sqlx::FromRow;
use sqlx::types::Json;

/// Joined projection of `users`, `roles` and `credentials`.
pub const SELECT_USER: &str = r#"
    SELECT
        u.id, u.name, u.password, u.gender, u.location, u.avatar,
        u.mobile, u.idc, u.email, u.status, u.created_at,
        r.id AS role_id, r.name AS role_name,
        c.id AS credential_id, c.wechat, c.wechat_miniprogram, c.alipay
    FROM users u
    JOIN roles r ON r.id = u.role_id
    JOIN credentials c ON c.id = u.credential_id
"#;

/// User record as read from the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub password: Option<String>,
    pub gender: i32,
    pub location: String,
    pub avatar: String,
    pub mobile: Option<String>,
    pub idc: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub role_id: String,
    pub role_name: String,
    pub credential_id: String,
    pub wechat: Option<Json<OAuthCredential>>,
    pub wechat_miniprogram: Option<Json<OAuthCredential>>,
    pub alipay: Option<Json<OAuthCredential>>,
}

/// Credential record, without its owner.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRecord {
    pub id: String,
    pub wechat: Option<Json<OAuthCredential>>,
    pub wechat_miniprogram: Option<Json<OAuthCredential>>,
    pub alipay: Option<Json<OAuthCredential>>,
}

impl From<CredentialRecord> for Credential {
    fn from(record: CredentialRecord) -> Self {
        Credential {
            id: record.id,
            wechat: record.wechat.map(|Json(blob)| blob),
            wechat_miniprogram: record.wechat_miniprogram.map(|Json(blob)| blob),
            alipay: record.alipay.map(|Json(blob)| blob),
        }
    }
}

/// Role record.
#[derive(Debug, Clone, FromRow)]
pub struct RoleRecord {
    pub id: String,
    pub name: String,
}

impl From<RoleRecord> for Role {
    fn from(record: RoleRecord) -> Self {
        Role::new(record.id, record.name)
    }
}

impl UserRecord {
    /// Convert to [`User`]. Rows that break domain rules are persistence
    /// errors.
    pub fn try_into_user(self) -> Result<User> {
        Ok(User {
            id: UserId::parse(self.id).persistence()?,
            name: self.name,
            password: self
                .password
                .map(PasswordHash::parse)
                .transpose()
                .persistence()?,
            gender: self.gender,
            location: self.location,
            avatar: self.avatar,
            mobile: self.mobile,
            idc: self.idc,
            email: self.email,
            status: self.status.parse::<UserStatus>().persistence()?,
            created_at: self.created_at.timestamp().max(0) as u64,
            role: Role::new(self.role_id, self.role_name),
            credential: Credential {
                id: self.credential_id,
                wechat: self.wechat.map(|Json(blob)| blob),
                wechat_miniprogram: self.wechat_miniprogram.map(|Json(blob)| blob),
                alipay: self.alipay.map(|Json(blob)| blob),
            },
        })
    }
}

/// Creation timestamp of `user` as stored.
pub fn created_at(user: &User) -> DateTime<Utc> {
    i64::try_from(user.created_at)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}
