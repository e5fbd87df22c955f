//! PostgreSQL implementation for role repository.

use application::error::Result;
use application::ports::outbound::RoleRepository;
use async_trait::async_trait;
use domain::identity::role::Role;
use sqlx::PgPool;

use super::models::RoleRecord;
use crate::outbound::persistence::map_sqlx;

/// PostgreSQL role repository.
#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    /// Create a new [`PgRoleRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let record = sqlx::query_as::<_, RoleRecord>(
            "SELECT id, name FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(record.map(Role::from))
    }

    async fn insert_if_absent(&self, role: &Role) -> Result<Role> {
        sqlx::query(
            "INSERT INTO roles (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&role.id)
        .bind(&role.name)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let record = sqlx::query_as::<_, RoleRecord>(
            "SELECT id, name FROM roles WHERE name = $1",
        )
        .bind(&role.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_insert_if_absent_keeps_first(pool: PgPool) {
        let repo = PgRoleRepository::new(pool);

        let first = repo.insert_if_absent(&Role::new("r1", "User")).await.unwrap();
        let second = repo.insert_if_absent(&Role::new("r2", "User")).await.unwrap();

        assert_eq!(first.id, "r1");
        assert_eq!(second.id, "r1");
        assert_eq!(repo.find_by_name("User").await.unwrap(), Some(first));
    }
}
