//! PostgreSQL implementation for user repository.

use application::error::{ApplicationError, Result};
use application::ports::outbound::UserRepository;
use async_trait::async_trait;
use domain::credential::FederatedIdentity;
use domain::identity::user::User;
use sqlx::PgPool;

use super::models::{SELECT_USER, UserRecord, created_at};
use crate::outbound::persistence::map_sqlx;

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_local_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let mut records = sqlx::query_as::<_, UserRecord>(&format!(
            "{SELECT_USER}
            JOIN login_identifiers l ON l.user_id = u.id
            WHERE l.identifier = $1
            LIMIT 2"
        ))
        .bind(identifier)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if records.len() > 1 {
            return Err(ApplicationError::persistence("identifier is ambiguous"));
        }

        records.pop().map(UserRecord::try_into_user).transpose()
    }

    async fn find_by_federated_identity(
        &self,
        identity: &FederatedIdentity,
    ) -> Result<Option<User>> {
        let query = format!(
            "{SELECT_USER}
            JOIN federated_identities f ON f.credential_id = c.id
            WHERE f.namespace = $1 AND f.kind = $2 AND f.external_id = $3"
        );

        for key in identity.keys() {
            let record = sqlx::query_as::<_, UserRecord>(&query)
                .bind(key.namespace)
                .bind(key.kind.as_str())
                .bind(&key.external_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;

            if let Some(record) = record {
                return record.try_into_user().map(Some);
            }
        }

        Ok(None)
    }

    /// Inserts the row and claims its login keys in `login_identifiers` in
    /// one transaction.
    async fn create(&self, user: &User) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, password, gender, location, avatar,
                mobile, idc, email, status, created_at,
                role_id, credential_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(user.password.as_ref().map(|hash| hash.as_str()))
        .bind(user.gender)
        .bind(&user.location)
        .bind(&user.avatar)
        .bind(&user.mobile)
        .bind(&user.idc)
        .bind(&user.email)
        .bind(user.status.as_str())
        .bind(created_at(user))
        .bind(&user.role.id)
        .bind(&user.credential.id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        for identifier in user.identifiers() {
            sqlx::query(
                "INSERT INTO login_identifiers (identifier, user_id) VALUES ($1, $2)",
            )
            .bind(identifier)
            .bind(user.id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)
    }
}
