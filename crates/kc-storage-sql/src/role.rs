//! `PostgreSQL` implementation of the role repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kc_model::role::generate_id;
use kc_model::Role;
use kc_storage::error::StorageResult;
use kc_storage::role::validate;
use kc_storage::RoleRepository;
use sqlx::PgPool;

use crate::convert::like_pattern;
use crate::entities::RoleRow;
use crate::error::{from_sqlx_error, from_transaction_error, from_write_error};

const SELECT_ROLE: &str =
    "SELECT id, name, description, realm_id, client_id, created_at, updated_at FROM custom_roles";

/// `PostgreSQL` role repository over the `custom_roles` table.
#[derive(Debug, Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    /// Creates a new `PostgreSQL` role repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Role>> {
        let row: Option<RoleRow> = sqlx::query_as(&format!("{SELECT_ROLE} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        Ok(row.map(Role::from))
    }

    async fn find_by_realm(&self, realm_id: &str) -> StorageResult<Vec<Role>> {
        let rows: Vec<RoleRow> = sqlx::query_as(&format!(
            "{SELECT_ROLE} WHERE realm_id = $1 AND client_id IS NULL ORDER BY id"
        ))
        .bind(realm_id)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn find_by_realm_and_client(
        &self,
        realm_id: &str,
        client_id: &str,
    ) -> StorageResult<Vec<Role>> {
        let rows: Vec<RoleRow> = sqlx::query_as(&format!(
            "{SELECT_ROLE} WHERE realm_id = $1 AND client_id = $2 ORDER BY id"
        ))
        .bind(realm_id)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn find_by_name_in_realm(
        &self,
        name: &str,
        realm_id: &str,
    ) -> StorageResult<Option<Role>> {
        let row: Option<RoleRow> = sqlx::query_as(&format!(
            "{SELECT_ROLE} WHERE realm_id = $1 AND client_id IS NULL AND name = $2"
        ))
        .bind(realm_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(row.map(Role::from))
    }

    async fn find_by_name_in_realm_client(
        &self,
        name: &str,
        realm_id: &str,
        client_id: &str,
    ) -> StorageResult<Option<Role>> {
        let row: Option<RoleRow> = sqlx::query_as(&format!(
            "{SELECT_ROLE} WHERE realm_id = $1 AND client_id = $2 AND name = $3"
        ))
        .bind(realm_id)
        .bind(client_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(row.map(Role::from))
    }

    async fn search(&self, realm_id: &str, pattern: &str) -> StorageResult<Vec<Role>> {
        let rows: Vec<RoleRow> = sqlx::query_as(&format!(
            r"{SELECT_ROLE} WHERE realm_id = $1
                AND (name ILIKE $2 ESCAPE '\' OR description ILIKE $2 ESCAPE '\')
                ORDER BY id"
        ))
        .bind(realm_id)
        .bind(like_pattern(pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn count_by_realm(&self, realm_id: &str) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM custom_roles WHERE realm_id = $1")
            .bind(realm_id)
            .fetch_one(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn save(&self, mut role: Role) -> StorageResult<Role> {
        validate(&role)?;
        if !role.has_id() {
            role.id = generate_id();
        }

        let mut tx = self.pool.begin().await.map_err(from_transaction_error)?;

        let existing: Option<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            "SELECT created_at, updated_at FROM custom_roles WHERE id = $1 FOR UPDATE",
        )
        .bind(&role.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(from_sqlx_error)?;

        if let Some((created_at, updated_at)) = existing {
            role.created_at = created_at;
            if role.updated_at < updated_at {
                role.updated_at = updated_at;
            }
            role.touch();

            sqlx::query(
                r"UPDATE custom_roles SET
                    name = $2, description = $3, realm_id = $4, client_id = $5, updated_at = $6
                WHERE id = $1",
            )
            .bind(&role.id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(&role.realm_id)
            .bind(&role.client_id)
            .bind(role.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| from_write_error(e, &role.name))?;
        } else {
            role.touch();

            sqlx::query(
                r"INSERT INTO custom_roles (
                    id, name, description, realm_id, client_id, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&role.id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(&role.realm_id)
            .bind(&role.client_id)
            .bind(role.created_at)
            .bind(role.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| from_write_error(e, &role.name))?;
        }

        tx.commit().await.map_err(from_transaction_error)?;

        tracing::info!(
            role_id = %role.id,
            role = %role.name,
            realm = %role.realm_id,
            client = ?role.client_id,
            updated = existing.is_some(),
            "Saved role"
        );
        Ok(role)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let mut tx = self.pool.begin().await.map_err(from_transaction_error)?;

        let result = sqlx::query("DELETE FROM custom_roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(from_sqlx_error)?;

        tx.commit().await.map_err(from_transaction_error)?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!(role_id = %id, "Deleted role");
        }
        Ok(removed)
    }
}
