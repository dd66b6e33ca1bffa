//! Admin event listener.
//!
//! Mirrors role lifecycle events from the host into the role store.
//! Each event is handled on its own: the role's definition is read from
//! the host model, then one create, update, or delete is applied to the
//! store. Failures are logged and reported in the [`SyncOutcome`], never
//! propagated, so one bad event cannot stop the events behind it.

use std::sync::Arc;

use chrono::Utc;
use kc_core::event::{AdminEvent, OperationType};
use kc_model::{Realm, Role};
use kc_storage::RoleRepository;
use tracing::Instrument;

use crate::error::FederationResult;
use crate::host::{HostModel, HostRole};
use crate::path::{parse_role_path, RolePath};
use crate::sync::{SkipReason, SyncOutcome, SyncReport};

/// Applies role admin events to the role store.
pub struct RoleEventListener {
    repository: Arc<dyn RoleRepository>,
    host: Arc<dyn HostModel>,
}

impl RoleEventListener {
    /// Creates a listener.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>, host: Arc<dyn HostModel>) -> Self {
        Self { repository, host }
    }

    /// Processes one admin event.
    pub async fn process(&self, event: &AdminEvent) -> SyncOutcome {
        let span = tracing::info_span!(
            "role_event",
            event_id = %event.id,
            realm_id = %event.realm_id,
            operation = ?event.operation_type,
            resource_type = ?event.resource_type,
            resource_path = %event.resource_path,
            outcome = tracing::field::Empty,
        );

        async {
            let outcome = match self.dispatch(event).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(error = %err, "Failed to synchronize role event");
                    SyncOutcome::Failed {
                        message: err.to_string(),
                    }
                }
            };
            tracing::Span::current().record("outcome", outcome.label());
            outcome
        }
        .instrument(span)
        .await
    }

    /// Processes a batch of events in order.
    pub async fn process_all<'a, I>(&self, events: I) -> SyncReport
    where
        I: IntoIterator<Item = &'a AdminEvent>,
    {
        let mut report = SyncReport::new(Utc::now());
        for event in events {
            let outcome = self.process(event).await;
            report.record(&event.resource_path, &outcome);
        }
        let report = report.complete();
        tracing::info!(status = %report.status, "Processed role events");
        report
    }

    async fn dispatch(&self, event: &AdminEvent) -> FederationResult<SyncOutcome> {
        if !event.resource_type.is_role() {
            return Ok(SyncOutcome::skipped(SkipReason::NotRoleEvent));
        }
        if !matches!(
            event.operation_type,
            OperationType::Create | OperationType::Update | OperationType::Delete
        ) {
            tracing::debug!("Ignoring role event operation");
            return Ok(SyncOutcome::skipped(SkipReason::UnsupportedOperation));
        }

        let Some(realm) = self.host.realm(&event.realm_id).await? else {
            tracing::warn!("Realm not found");
            return Ok(SyncOutcome::skipped(SkipReason::RealmNotFound));
        };

        let Some(path) = parse_role_path(&event.resource_path) else {
            tracing::warn!("Could not extract role name from resource path");
            return Ok(SyncOutcome::skipped(SkipReason::UnparseablePath));
        };

        match event.operation_type {
            OperationType::Delete => self.handle_delete(&realm, &path).await,
            operation => {
                let Some(role) = self.resolve_host_role(&realm, &path).await? else {
                    tracing::warn!(role = %path.role_name, "Role not found in host model");
                    return Ok(SyncOutcome::skipped(SkipReason::RoleNotFound));
                };
                if operation == OperationType::Create {
                    self.handle_create(&realm, &role).await
                } else {
                    self.handle_update(&realm, &role).await
                }
            }
        }
    }

    /// Finds the role in the host model: realm scope first, then the
    /// client named in the path.
    async fn resolve_host_role(
        &self,
        realm: &Realm,
        path: &RolePath,
    ) -> FederationResult<Option<HostRole>> {
        if let Some(role) = self.host.realm_role(&realm.id, &path.role_name).await? {
            return Ok(Some(role));
        }
        let Some(client_id) = &path.client_id else {
            return Ok(None);
        };
        let Some(client) = self.host.client_by_id(&realm.id, client_id).await? else {
            tracing::debug!(client_id = %client_id, "Client not found in host model");
            return Ok(None);
        };
        self.host
            .client_role(&realm.id, &client.id, &path.role_name)
            .await
    }

    async fn handle_create(&self, realm: &Realm, role: &HostRole) -> FederationResult<SyncOutcome> {
        let existing = self
            .repository
            .find_by_name(&role.name, &realm.id, role.client_id.as_deref())
            .await?;
        if existing.is_some() {
            tracing::info!(role = %role.name, "Role already exists in role store");
            return Ok(SyncOutcome::skipped(SkipReason::AlreadySynchronized));
        }

        let mut record = match &role.client_id {
            Some(client_id) => Role::new_client_role(&realm.id, client_id, &role.name),
            None => Role::new_realm_role(&realm.id, &role.name),
        };
        record.description.clone_from(&role.description);

        match self.repository.save(record).await {
            Ok(saved) => {
                tracing::info!(role = %saved.name, role_id = %saved.id, "Created role in role store");
                Ok(SyncOutcome::Created { role_id: saved.id })
            }
            // A concurrent create won the race.
            Err(err) if err.is_duplicate() => {
                tracing::info!(role = %role.name, "Role created concurrently, treating as synchronized");
                Ok(SyncOutcome::skipped(SkipReason::AlreadySynchronized))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn handle_update(&self, realm: &Realm, role: &HostRole) -> FederationResult<SyncOutcome> {
        let existing = self
            .repository
            .find_by_name(&role.name, &realm.id, role.client_id.as_deref())
            .await?;
        let Some(mut record) = existing else {
            tracing::warn!(role = %role.name, "Role not found in role store, creating it");
            return self.handle_create(realm, role).await;
        };

        record.name.clone_from(&role.name);
        record.description.clone_from(&role.description);
        record.realm_id.clone_from(&realm.id);
        record.client_id.clone_from(&role.client_id);

        let saved = self.repository.save(record).await?;
        tracing::info!(role = %saved.name, role_id = %saved.id, "Updated role in role store");
        Ok(SyncOutcome::Updated { role_id: saved.id })
    }

    async fn handle_delete(&self, realm: &Realm, path: &RolePath) -> FederationResult<SyncOutcome> {
        let name = &path.role_name;

        if let Some(record) = self.repository.find_by_name_in_realm(name, &realm.id).await? {
            return self.delete_record(record).await;
        }

        // The client named in the path owns the role if anyone does.
        if let Some(client_id) = &path.client_id {
            if let Some(record) = self
                .repository
                .find_by_name_in_realm_client(name, &realm.id, client_id)
                .await?
            {
                return self.delete_record(record).await;
            }
        }

        for client in self.host.clients(&realm.id).await? {
            if path.client_id.as_deref() == Some(client.id.as_str()) {
                continue;
            }
            if let Some(record) = self
                .repository
                .find_by_name_in_realm_client(name, &realm.id, &client.id)
                .await?
            {
                tracing::debug!(client_id = %client.client_id, "Found client role to delete");
                return self.delete_record(record).await;
            }
        }

        tracing::warn!(role = %name, "Role not found in role store for deletion");
        Ok(SyncOutcome::skipped(SkipReason::NotInStore))
    }

    async fn delete_record(&self, record: Role) -> FederationResult<SyncOutcome> {
        if self.repository.delete(&record.id).await? {
            tracing::info!(role = %record.name, role_id = %record.id, "Deleted role from role store");
            Ok(SyncOutcome::Deleted { role_id: record.id })
        } else {
            // Removed between lookup and delete.
            Ok(SyncOutcome::skipped(SkipReason::NotInStore))
        }
    }
}
