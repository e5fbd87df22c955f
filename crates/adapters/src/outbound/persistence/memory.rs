//! In-memory storage, used by tests and when no database is configured.
//!
//! Applies the same uniqueness rules as the PostgreSQL schema.

use std::collections::HashMap;
use std::sync::Arc;

use application::error::{ApplicationError, Result};
use application::ports::outbound::{CredentialStore, RoleRepository, UserRepository};
use async_trait::async_trait;
use domain::credential::{Credential, FederatedIdentity, IdentityKey};
use domain::identity::role::Role;
use domain::identity::user::User;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    users: Vec<User>,
    credentials: HashMap<String, Credential>,
    identities: HashMap<IdentityKey, String>,
    roles: Vec<Role>,
}

/// Shared in-memory store implementing every repository port.
#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored users.
    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    /// Snapshot of stored roles.
    pub async fn roles(&self) -> Vec<Role> {
        self.state.read().await.roles.clone()
    }

    /// Number of stored credentials.
    pub async fn credential_count(&self) -> usize {
        self.state.read().await.credentials.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_local_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let state = self.state.read().await;
        let mut matches = state
            .users
            .iter()
            .filter(|user| user.matches_identifier(identifier));

        match (matches.next(), matches.next()) {
            (Some(_), Some(_)) => {
                Err(ApplicationError::persistence("identifier is ambiguous"))
            },
            (user, _) => Ok(user.cloned()),
        }
    }

    async fn find_by_federated_identity(
        &self,
        identity: &FederatedIdentity,
    ) -> Result<Option<User>> {
        let state = self.state.read().await;

        Ok(identity
            .keys()
            .iter()
            .filter_map(|key| state.identities.get(key))
            .find_map(|credential_id| {
                state
                    .users
                    .iter()
                    .find(|user| &user.credential.id == credential_id)
            })
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.credentials.contains_key(&user.credential.id) {
            return Err(ApplicationError::persistence(format!(
                "credential `{}` does not exist",
                user.credential.id
            )));
        }
        if !state.roles.iter().any(|role| role.id == user.role.id) {
            return Err(ApplicationError::persistence(format!(
                "role `{}` does not exist",
                user.role.id
            )));
        }

        // Login keys share one namespace: a mobile may not equal another
        // account's email.
        let taken = state.users.iter().any(|existing| {
            existing.id == user.id ||
                existing.credential.id == user.credential.id ||
                user.identifiers().any(|key| existing.matches_identifier(key))
        });
        if taken {
            return Err(ApplicationError::DuplicateUser);
        }

        state.users.push(user.clone());
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create(&self, credential: &Credential) -> Result<()> {
        let mut state = self.state.write().await;
        let keys = credential.identity_keys();

        if state.credentials.contains_key(&credential.id) ||
            keys.iter().any(|key| state.identities.contains_key(key))
        {
            return Err(ApplicationError::DuplicateUser);
        }

        for key in keys {
            state.identities.insert(key, credential.id.clone());
        }
        state
            .credentials
            .insert(credential.id.clone(), credential.clone());

        Ok(())
    }

    async fn find_unclaimed(
        &self,
        identity: &FederatedIdentity,
    ) -> Result<Option<Credential>> {
        let state = self.state.read().await;

        Ok(identity
            .keys()
            .iter()
            .filter_map(|key| state.identities.get(key))
            .filter(|id| !state.users.iter().any(|user| &user.credential.id == *id))
            .find_map(|id| state.credentials.get(id))
            .cloned())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let state = self.state.read().await;
        Ok(state.roles.iter().find(|role| role.name == name).cloned())
    }

    async fn insert_if_absent(&self, role: &Role) -> Result<Role> {
        let mut state = self.state.write().await;

        if let Some(existing) = state.roles.iter().find(|r| r.name == role.name) {
            return Ok(existing.clone());
        }

        state.roles.push(role.clone());
        Ok(role.clone())
    }
}

#[cfg(test)]
mod tests {
    use application::error::ErrorKind;
    use domain::auth::provider::FederatedProvider;
    use domain::credential::OAuthCredential;
    use domain::identity::id::UserId;

    use super::*;

    async fn user_with(
        store: &MemoryStore,
        id: &str,
        credential: Credential,
    ) -> User {
        let role = store.insert_if_absent(&Role::new("r1", "User")).await.unwrap();
        CredentialStore::create(store, &credential).await.unwrap();
        User::builder(UserId::parse(id).unwrap())
            .role(role)
            .credential(credential)
            .build()
    }

    fn wechat(open_id: &str, union_id: Option<&str>) -> OAuthCredential {
        OAuthCredential {
            open_id: open_id.into(),
            union_id: union_id.map(Into::into),
        }
    }

    #[tokio::test]
    async fn test_identifiers_are_unique() {
        let store = MemoryStore::new();
        let first = user_with(&store, "u1", Credential::empty("c1")).await;
        let first = User {
            mobile: Some("13800000000".into()),
            ..first
        };
        UserRepository::create(&store, &first).await.unwrap();

        let second = user_with(&store, "u2", Credential::empty("c2")).await;
        let second = User {
            mobile: Some("13800000000".into()),
            ..second
        };
        let err = UserRepository::create(&store, &second).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateUser);

        let third = user_with(&store, "u3", Credential::empty("c3")).await;
        let third = User {
            mobile: Some("13900000000".into()),
            ..third
        };
        UserRepository::create(&store, &third).await.unwrap();
        assert_eq!(store.users().await.len(), 2);
    }

    #[tokio::test]
    async fn test_identifier_is_unique_across_kinds() {
        let store = MemoryStore::new();
        let first = user_with(&store, "u1", Credential::empty("c1")).await;
        let first = User {
            mobile: Some("x@y.co".into()),
            ..first
        };
        UserRepository::create(&store, &first).await.unwrap();

        let second = user_with(&store, "u2", Credential::empty("c2")).await;
        let second = User {
            email: Some("x@y.co".into()),
            ..second
        };
        let err = UserRepository::create(&store, &second).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateUser);

        let found = store.find_by_local_identifier("x@y.co").await.unwrap();
        assert_eq!(found.map(|user| user.id), Some(first.id));
    }

    #[tokio::test]
    async fn test_unclaimed_credential() {
        let store = MemoryStore::new();
        let identity =
            FederatedIdentity::new(FederatedProvider::Alipay, "2088", None);
        let user = user_with(
            &store,
            "u1",
            Credential::for_provider("c1", FederatedProvider::Alipay, wechat("2088", None)),
        )
        .await;

        let unclaimed = store.find_unclaimed(&identity).await.unwrap();
        assert_eq!(unclaimed.map(|c| c.id).as_deref(), Some("c1"));

        UserRepository::create(&store, &user).await.unwrap();
        assert!(store.find_unclaimed(&identity).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_local_lookup_is_exact() {
        let store = MemoryStore::new();
        let user = user_with(&store, "u1", Credential::empty("c1")).await;
        let user = User {
            email: Some("a@b.co".into()),
            ..user
        };
        UserRepository::create(&store, &user).await.unwrap();

        assert!(store.find_by_local_identifier("a@b.co").await.unwrap().is_some());
        assert!(store.find_by_local_identifier("a@b").await.unwrap().is_none());
        assert!(store.find_by_local_identifier("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_union_id_spans_wechat_family() {
        let store = MemoryStore::new();
        let credential = Credential::for_provider(
            "c1",
            FederatedProvider::WeChat,
            wechat("web-open", Some("union")),
        );
        let user = user_with(&store, "u1", credential).await;
        UserRepository::create(&store, &user).await.unwrap();

        let from_mini = FederatedIdentity::new(
            FederatedProvider::WeChatMiniProgram,
            "mini-open",
            Some("union".into()),
        );
        let found = store.find_by_federated_identity(&from_mini).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let alipay =
            FederatedIdentity::new(FederatedProvider::Alipay, "web-open", None);
        assert!(store.find_by_federated_identity(&alipay).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_key_is_claimed_once() {
        let store = MemoryStore::new();
        let blob = wechat("open", None);

        CredentialStore::create(
            &store,
            &Credential::for_provider("c1", FederatedProvider::WeChat, blob.clone()),
        )
        .await
        .unwrap();
        let err = CredentialStore::create(
            &store,
            &Credential::for_provider("c2", FederatedProvider::WeChat, blob),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateUser);
        assert_eq!(store.credential_count().await, 1);
    }

    #[tokio::test]
    async fn test_role_insert_is_idempotent() {
        let store = MemoryStore::new();
        store.insert_if_absent(&Role::new("r1", "User")).await.unwrap();
        let role = store.insert_if_absent(&Role::new("r2", "User")).await.unwrap();

        assert_eq!(role.id, "r1");
        assert_eq!(store.roles().await.len(), 1);
    }
}
