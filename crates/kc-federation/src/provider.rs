//! Role storage provider.
//!
//! Answers the host's role lookups and searches from the external store.
//! Read paths favour availability: a failing store yields `None` or an
//! empty list (logged at warn level), never an error.

use std::sync::Arc;

use kc_model::{Client, Realm, Role};
use kc_storage::{RoleRepository, StorageResult};

use crate::config::ProviderConfig;
use crate::host::HostModel;
use crate::model::FederatedRole;
use crate::storage_id;

/// Search term that lists every role.
pub const MATCH_ALL: &str = "*";

/// A normalized search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPattern {
    /// No filtering.
    MatchAll,
    /// Case-insensitive substring over name and description.
    Term(String),
}

impl SearchPattern {
    /// Normalizes a raw search term.
    ///
    /// A missing or blank term, and [`MATCH_ALL`], list everything.
    #[must_use]
    pub fn parse(search: Option<&str>) -> Self {
        match search.map(str::trim) {
            None | Some("" | MATCH_ALL) => Self::MatchAll,
            Some(term) => Self::Term(term.to_string()),
        }
    }

    fn as_term(&self) -> &str {
        match self {
            Self::MatchAll => "",
            Self::Term(term) => term,
        }
    }
}

/// Applies offset pagination.
///
/// A missing or non-positive `first` skips nothing; a missing or
/// non-positive `max` takes everything.
#[must_use]
pub fn paginate<T>(items: Vec<T>, first: Option<i32>, max: Option<i32>) -> Vec<T> {
    let skip = first
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or_default();
    let take = max
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n > 0)
        .unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}

/// Role storage provider backed by a [`RoleRepository`].
pub struct RoleStorageProvider {
    config: ProviderConfig,
    component_id: Arc<str>,
    repository: Arc<dyn RoleRepository>,
    host: Arc<dyn HostModel>,
}

impl RoleStorageProvider {
    /// Creates a provider for one component instance.
    #[must_use]
    pub fn new(
        config: ProviderConfig,
        repository: Arc<dyn RoleRepository>,
        host: Arc<dyn HostModel>,
    ) -> Self {
        tracing::debug!(component_id = %config.component_id, "Created role storage provider");
        Self {
            component_id: Arc::from(config.component_id.as_str()),
            config,
            repository,
            host,
        }
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the component id that namespaces this provider's roles.
    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Looks up a role by its namespaced id.
    ///
    /// Ids owned by another component, and malformed ids, are not found.
    pub async fn get_role_by_id(&self, realm: &Realm, id: &str) -> Option<FederatedRole> {
        let Some(external_id) = storage_id::external_id_for(id, &self.component_id) else {
            tracing::debug!(role_id = %id, component_id = %self.component_id, "Role id not owned by this provider");
            return None;
        };

        let role =
            self.degrade_one(self.repository.find_by_id(&external_id).await, "find role by id")?;
        if role.is_none() {
            tracing::debug!(realm_id = %realm.id, role_id = %external_id, "Role not found by id");
        }
        role.map(|role| self.project(role))
    }

    /// Looks up a realm role by exact name.
    pub async fn get_realm_role(&self, realm: &Realm, name: &str) -> Option<FederatedRole> {
        let role = self.degrade_one(
            self.repository.find_by_name_in_realm(name, &realm.id).await,
            "find realm role",
        )?;
        tracing::debug!(realm_id = %realm.id, role = %name, found = role.is_some(), "Realm role lookup");
        role.map(|role| self.project(role))
    }

    /// Looks up a client role by exact name.
    pub async fn get_client_role(&self, client: &Client, name: &str) -> Option<FederatedRole> {
        let role = self.degrade_one(
            self.repository
                .find_by_name_in_realm_client(name, &client.realm_id, &client.id)
                .await,
            "find client role",
        )?;
        tracing::debug!(client_id = %client.client_id, role = %name, found = role.is_some(), "Client role lookup");
        role.map(|role| self.project(role))
    }

    /// Searches realm roles.
    ///
    /// A match-all pattern lists the realm's realm roles. A search term
    /// matches client roles of the realm too, unless strict realm search
    /// is enabled.
    pub async fn search_for_roles(
        &self,
        realm: &Realm,
        search: Option<&str>,
        first: Option<i32>,
        max: Option<i32>,
    ) -> Vec<FederatedRole> {
        let pattern = SearchPattern::parse(search);
        let roles = match &pattern {
            SearchPattern::MatchAll => self.degrade_many(
                self.repository.find_by_realm(&realm.id).await,
                "list realm roles",
            ),
            SearchPattern::Term(term) => {
                let mut roles = self.degrade_many(
                    self.repository.search(&realm.id, term).await,
                    "search realm roles",
                );
                if self.config.strict_realm_search {
                    roles.retain(Role::is_realm_role);
                }
                roles
            }
        };

        tracing::debug!(
            realm_id = %realm.id,
            pattern = ?pattern,
            matched = roles.len(),
            first = ?first,
            max = ?max,
            "Realm role search"
        );
        self.project_page(roles, first, max)
    }

    /// Searches the roles of one client.
    pub async fn search_for_client_roles(
        &self,
        client: &Client,
        search: Option<&str>,
        first: Option<i32>,
        max: Option<i32>,
    ) -> Vec<FederatedRole> {
        let pattern = SearchPattern::parse(search);
        let mut roles = match &pattern {
            SearchPattern::MatchAll => self.degrade_many(
                self.repository
                    .find_by_realm_and_client(&client.realm_id, &client.id)
                    .await,
                "list client roles",
            ),
            SearchPattern::Term(term) => self.degrade_many(
                self.repository.search(&client.realm_id, term).await,
                "search client roles",
            ),
        };
        roles.retain(|role| role.client_id.as_deref() == Some(client.id.as_str()));

        tracing::debug!(
            client_id = %client.client_id,
            pattern = ?pattern,
            matched = roles.len(),
            "Client role search"
        );
        self.project_page(roles, first, max)
    }

    /// Searches client roles across the clients of a realm.
    ///
    /// With a non-empty `client_ids` filter only roles of those clients
    /// are returned; otherwise every client role of the realm matches.
    pub async fn search_for_client_roles_across(
        &self,
        realm: &Realm,
        search: Option<&str>,
        client_ids: Option<&[String]>,
        first: Option<i32>,
        max: Option<i32>,
    ) -> Vec<FederatedRole> {
        let pattern = SearchPattern::parse(search);
        let mut roles = self.degrade_many(
            self.repository.search(&realm.id, pattern.as_term()).await,
            "search client roles",
        );

        match client_ids.filter(|ids| !ids.is_empty()) {
            Some(ids) => roles.retain(|role| {
                role.client_id
                    .as_ref()
                    .is_some_and(|client_id| ids.contains(client_id))
            }),
            None => roles.retain(Role::is_client_role),
        }

        tracing::debug!(
            realm_id = %realm.id,
            pattern = ?pattern,
            clients = client_ids.map_or(0, <[String]>::len),
            matched = roles.len(),
            "Cross-client role search"
        );
        self.project_page(roles, first, max)
    }

    /// Counts the stored roles of a realm (both scopes).
    pub async fn count_roles(&self, realm: &Realm) -> u64 {
        match self.repository.count_by_realm(&realm.id).await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(realm_id = %realm.id, error = %err, "Role count failed");
                0
            }
        }
    }

    fn project(&self, role: Role) -> FederatedRole {
        FederatedRole::new(
            role,
            self.component_id.clone(),
            self.repository.clone(),
            self.host.clone(),
        )
    }

    fn project_page(&self, roles: Vec<Role>, first: Option<i32>, max: Option<i32>) -> Vec<FederatedRole> {
        paginate(roles, first, max)
            .into_iter()
            .map(|role| self.project(role))
            .collect()
    }

    fn degrade_one(&self, result: StorageResult<Option<Role>>, operation: &str) -> Option<Option<Role>> {
        match result {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::warn!(component_id = %self.component_id, error = %err, "{operation} failed");
                None
            }
        }
    }

    fn degrade_many(&self, result: StorageResult<Vec<Role>>, operation: &str) -> Vec<Role> {
        result.unwrap_or_else(|err| {
            tracing::warn!(component_id = %self.component_id, error = %err, "{operation} failed");
            Vec::new()
        })
    }
}
