//! Typed builder for `User`.

use crate::auth::password::PasswordHash;
use crate::auth::registration::LocalIdentifier;
use crate::credential::{Credential, ExternalProfile};
use crate::identity::id::UserId;
use crate::identity::role::Role;
use crate::identity::user::{User, UserStatus};

/// Marker type for missing value.
#[derive(Debug)]
pub struct Missing;

/// Marker type for present value.
#[derive(Debug)]
pub struct Present<T>(pub T);

/// A builder to track presence of the `Role` and `Credential` every account
/// must reference.
#[derive(Debug)]
pub struct UserBuilder<R, C> {
    id: UserId,
    name: String,
    password: Option<PasswordHash>,
    gender: i32,
    mobile: Option<String>,
    email: Option<String>,
    created_at: u64,
    role: R,
    credential: C,
}

impl UserBuilder<Missing, Missing> {
    /// Creates a new [`UserBuilder`] with role and credential initialized as
    /// [`Missing`].
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: String::new(),
            password: None,
            gender: 0,
            mobile: None,
            email: None,
            created_at: 0,
            role: Missing,
            credential: Missing,
        }
    }
}

impl<C> UserBuilder<Missing, C> {
    /// Sets the role the account belongs to.
    pub fn role(self, role: Role) -> UserBuilder<Present<Role>, C> {
        UserBuilder {
            id: self.id,
            name: self.name,
            password: self.password,
            gender: self.gender,
            mobile: self.mobile,
            email: self.email,
            created_at: self.created_at,
            role: Present(role),
            credential: self.credential,
        }
    }
}

impl<R> UserBuilder<R, Missing> {
    /// Sets the credential record owned by the account.
    pub fn credential(
        self,
        credential: Credential,
    ) -> UserBuilder<R, Present<Credential>> {
        UserBuilder {
            id: self.id,
            name: self.name,
            password: self.password,
            gender: self.gender,
            mobile: self.mobile,
            email: self.email,
            created_at: self.created_at,
            role: self.role,
            credential: Present(credential),
        }
    }
}

impl<R, C> UserBuilder<R, C> {
    /// Sets the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the hashed password.
    pub fn password(mut self, password: PasswordHash) -> Self {
        self.password = Some(password);
        self
    }

    /// Sets the mobile number login key.
    pub fn mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    /// Sets the email login key.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Stores the registration identifier in the matching column. The
    /// identifier doubles as the initial display name.
    pub fn identifier(self, identifier: &LocalIdentifier) -> Self {
        let builder = self.name(identifier.as_str());
        match identifier {
            LocalIdentifier::Mobile(mobile) => builder.mobile(mobile.as_str()),
            LocalIdentifier::Email(email) => builder.email(email.as_str()),
        }
    }

    /// Copies display name and gender from a federated profile.
    pub fn profile(mut self, profile: &ExternalProfile) -> Self {
        self.name = profile.name.clone();
        self.gender = profile.gender;
        self
    }

    /// Sets the creation timestamp, in seconds.
    pub fn created_at(mut self, timestamp: u64) -> Self {
        self.created_at = timestamp;
        self
    }
}

impl UserBuilder<Present<Role>, Present<Credential>> {
    /// Finalizes build once both associations are known.
    pub fn build(self) -> User {
        let UserBuilder {
            id,
            name,
            password,
            gender,
            mobile,
            email,
            created_at,
            role: Present(role),
            credential: Present(credential),
        } = self;

        User {
            id,
            name,
            password,
            gender,
            location: String::new(),
            avatar: String::new(),
            mobile,
            idc: None,
            email,
            status: UserStatus::Normal,
            created_at,
            role,
            credential,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::OAuthCredential;
    use crate::identity::email::EmailAddress;
    use crate::auth::provider::FederatedProvider;

    #[test]
    fn test_build_from_registration() {
        let identifier =
            LocalIdentifier::Email(EmailAddress::parse("u1@example.com").unwrap());
        let user = UserBuilder::new(UserId::parse("abc").unwrap())
            .identifier(&identifier)
            .credential(Credential::empty("c1"))
            .role(Role::new("r1", "User"))
            .created_at(42)
            .build();

        assert_eq!(user.email.as_deref(), Some("u1@example.com"));
        assert_eq!(user.mobile, None);
        assert_eq!(user.name, "u1@example.com");
        assert_eq!(user.status, UserStatus::Normal);
        assert_eq!(user.created_at, 42);
        assert!(user.password.is_none());
    }

    #[test]
    fn test_build_from_profile() {
        let profile = ExternalProfile {
            provider: FederatedProvider::WeChat,
            open_id: "o-1".into(),
            union_id: None,
            name: "Li".into(),
            gender: 2,
        };
        let credential = Credential::for_provider(
            "c1",
            FederatedProvider::WeChat,
            OAuthCredential::from(&profile),
        );
        let user = UserBuilder::new(UserId::parse("abc").unwrap())
            .role(Role::new("r1", "User"))
            .credential(credential)
            .profile(&profile)
            .build();

        assert_eq!(user.name, "Li");
        assert_eq!(user.gender, 2);
        assert!(user.identifiers().next().is_none());
        assert!(user.credential.wechat.is_some());
    }
}
