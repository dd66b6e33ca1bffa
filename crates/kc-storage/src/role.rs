//! Role repository trait.

use async_trait::async_trait;
use kc_model::Role;

use crate::error::{StorageError, StorageResult};

/// Persistence gateway for role records.
///
/// Implementations must be thread-safe and support concurrent access.
/// Every mutating operation runs in its own transaction and either
/// applies completely or not at all. Listing operations return rows
/// ordered by identifier so that offset pagination is reproducible.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Gets a role by its external ID.
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Role>>;

    /// Lists the realm-scoped roles of a realm.
    async fn find_by_realm(&self, realm_id: &str) -> StorageResult<Vec<Role>>;

    /// Lists the roles owned by a client.
    async fn find_by_realm_and_client(
        &self,
        realm_id: &str,
        client_id: &str,
    ) -> StorageResult<Vec<Role>>;

    /// Gets a realm-scoped role by name.
    async fn find_by_name_in_realm(&self, name: &str, realm_id: &str)
        -> StorageResult<Option<Role>>;

    /// Gets a client-scoped role by name.
    async fn find_by_name_in_realm_client(
        &self,
        name: &str,
        realm_id: &str,
        client_id: &str,
    ) -> StorageResult<Option<Role>>;

    /// Case-insensitive substring search over name and description.
    ///
    /// Returns realm- and client-scoped roles alike; callers filter by
    /// scope. An empty pattern matches every role in the realm.
    async fn search(&self, realm_id: &str, pattern: &str) -> StorageResult<Vec<Role>>;

    /// Counts every role (both scopes) in a realm.
    async fn count_by_realm(&self, realm_id: &str) -> StorageResult<u64>;

    /// Inserts or updates a role and returns the stored record.
    ///
    /// A role whose identifier is empty, or unknown to the store, is
    /// inserted (an empty identifier is replaced by a generated one).
    /// Otherwise the existing row is updated; `created_at` is preserved
    /// and `updated_at` advanced.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if another role already holds
    /// the same `(realm_id, client_id, name)`, and
    /// `StorageError::InvalidData` if the name or realm is empty.
    async fn save(&self, role: Role) -> StorageResult<Role>;

    /// Deletes a role by ID. Returns whether a row was removed.
    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Gets a role by name in the given scope.
    async fn find_by_name(
        &self,
        name: &str,
        realm_id: &str,
        client_id: Option<&str>,
    ) -> StorageResult<Option<Role>> {
        match client_id {
            Some(client_id) => {
                self.find_by_name_in_realm_client(name, realm_id, client_id)
                    .await
            }
            None => self.find_by_name_in_realm(name, realm_id).await,
        }
    }
}

/// Checks the invariants every stored role must satisfy.
///
/// ## Errors
///
/// Returns `StorageError::InvalidData` for an empty name, realm, or
/// client identifier.
pub fn validate(role: &Role) -> StorageResult<()> {
    if role.name.trim().is_empty() {
        return Err(StorageError::InvalidData(
            "role name must not be empty".to_string(),
        ));
    }
    if role.realm_id.is_empty() {
        return Err(StorageError::InvalidData(
            "role realm must not be empty".to_string(),
        ));
    }
    if role.client_id.as_deref().is_some_and(str::is_empty) {
        return Err(StorageError::InvalidData(
            "role client must be absent or non-empty".to_string(),
        ));
    }
    Ok(())
}

/// Returns whether a role matches a search pattern.
///
/// Matching is a case-insensitive substring test over the name and the
/// description.
#[must_use]
pub fn matches_search(role: &Role, pattern: &str) -> bool {
    let needle = pattern.to_lowercase();
    role.name.to_lowercase().contains(&needle)
        || role
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}
