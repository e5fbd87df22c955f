//! PostgreSQL implementation for credential store.

use application::error::Result;
use application::ports::outbound::CredentialStore;
use async_trait::async_trait;
use domain::credential::{Credential, FederatedIdentity};
use sqlx::PgPool;
use sqlx::types::Json;

use super::models::CredentialRecord;
use crate::outbound::persistence::map_sqlx;

/// PostgreSQL credential store.
///
/// Blobs and their `federated_identities` rows are written in one
/// transaction.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new [`PgCredentialStore`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(&self, credential: &Credential) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query(
            r#"
            INSERT INTO credentials (id, wechat, wechat_miniprogram, alipay)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&credential.id)
        .bind(credential.wechat.as_ref().map(Json))
        .bind(credential.wechat_miniprogram.as_ref().map(Json))
        .bind(credential.alipay.as_ref().map(Json))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        for key in credential.identity_keys() {
            sqlx::query(
                r#"
                INSERT INTO federated_identities (
                    namespace, kind, external_id, credential_id
                )
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(key.namespace)
            .bind(key.kind.as_str())
            .bind(&key.external_id)
            .bind(&credential.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)
    }

    async fn find_unclaimed(
        &self,
        identity: &FederatedIdentity,
    ) -> Result<Option<Credential>> {
        for key in identity.keys() {
            let record = sqlx::query_as::<_, CredentialRecord>(
                r#"
                SELECT c.id, c.wechat, c.wechat_miniprogram, c.alipay
                FROM credentials c
                JOIN federated_identities f ON f.credential_id = c.id
                WHERE f.namespace = $1 AND f.kind = $2 AND f.external_id = $3
                    AND NOT EXISTS (
                        SELECT 1 FROM users u WHERE u.credential_id = c.id
                    )
                "#,
            )
            .bind(key.namespace)
            .bind(key.kind.as_str())
            .bind(&key.external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

            if let Some(record) = record {
                return Ok(Some(record.into()));
            }
        }

        Ok(None)
    }
}
