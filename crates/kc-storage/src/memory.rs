//! In-memory role repository.
//!
//! Enforces the same invariants as the SQL gateway (unique
//! `(realm_id, client_id, name)`, identifier ordering, monotonic
//! `updated_at`) and is used by tests and embedded deployments.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use kc_model::role::generate_id;
use kc_model::Role;
use parking_lot::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::role::{matches_search, validate, RoleRepository};

/// In-memory role repository.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: RwLock<BTreeMap<String, Role>>,
    unavailable: AtomicBool,
}

impl InMemoryRoleRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with a connection error
    /// (or succeed again when `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of stored roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.read().len()
    }

    /// Returns whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.read().is_empty()
    }

    /// Returns a snapshot of every stored role, ordered by identifier.
    #[must_use]
    pub fn all(&self) -> Vec<Role> {
        self.roles.read().values().cloned().collect()
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Connection(
                "role store unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn collect(&self, predicate: impl Fn(&Role) -> bool) -> StorageResult<Vec<Role>> {
        self.check_available()?;
        Ok(self
            .roles
            .read()
            .values()
            .filter(|role| predicate(role))
            .cloned()
            .collect())
    }

    fn first(&self, predicate: impl Fn(&Role) -> bool) -> StorageResult<Option<Role>> {
        self.check_available()?;
        Ok(self.roles.read().values().find(|role| predicate(role)).cloned())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Role>> {
        self.check_available()?;
        Ok(self.roles.read().get(id).cloned())
    }

    async fn find_by_realm(&self, realm_id: &str) -> StorageResult<Vec<Role>> {
        self.collect(|role| role.matches_scope(realm_id, None))
    }

    async fn find_by_realm_and_client(
        &self,
        realm_id: &str,
        client_id: &str,
    ) -> StorageResult<Vec<Role>> {
        self.collect(|role| role.matches_scope(realm_id, Some(client_id)))
    }

    async fn find_by_name_in_realm(
        &self,
        name: &str,
        realm_id: &str,
    ) -> StorageResult<Option<Role>> {
        self.first(|role| role.name == name && role.matches_scope(realm_id, None))
    }

    async fn find_by_name_in_realm_client(
        &self,
        name: &str,
        realm_id: &str,
        client_id: &str,
    ) -> StorageResult<Option<Role>> {
        self.first(|role| role.name == name && role.matches_scope(realm_id, Some(client_id)))
    }

    async fn search(&self, realm_id: &str, pattern: &str) -> StorageResult<Vec<Role>> {
        self.collect(|role| role.realm_id == realm_id && matches_search(role, pattern))
    }

    async fn count_by_realm(&self, realm_id: &str) -> StorageResult<u64> {
        self.check_available()?;
        let count = self
            .roles
            .read()
            .values()
            .filter(|role| role.realm_id == realm_id)
            .count();
        Ok(count as u64)
    }

    async fn save(&self, mut role: Role) -> StorageResult<Role> {
        self.check_available()?;
        validate(&role)?;
        if !role.has_id() {
            role.id = generate_id();
        }

        // One write lock covers the uniqueness check and the write.
        let mut roles = self.roles.write();
        let conflict = roles.values().any(|other| {
            other.id != role.id
                && other.name == role.name
                && other.matches_scope(&role.realm_id, role.client_id.as_deref())
        });
        if conflict {
            return Err(StorageError::duplicate("Role", "name", role.name));
        }

        if let Some(existing) = roles.get(&role.id) {
            role.created_at = existing.created_at;
            if role.updated_at < existing.updated_at {
                role.updated_at = existing.updated_at;
            }
            role.touch();
            tracing::debug!(role_id = %role.id, role = %role.name, "Updated role");
        } else {
            role.touch();
            tracing::debug!(role_id = %role.id, role = %role.name, "Inserted role");
        }

        roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        self.check_available()?;
        Ok(self.roles.write().remove(id).is_some())
    }
}
