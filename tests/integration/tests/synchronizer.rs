//! Admin event synchronization tests.

use kc_core::event::{OperationType, ResourceType};
use kc_federation::{SkipReason, SyncOutcome};
use kc_model::Role;
use kc_storage::RoleRepository;

use crate::common::{role_event, Fixture, CLIENT_ID, REALM_ID};

#[tokio::test]
async fn create_inserts_one_realm_role() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.define_realm_role("billing-admin", Some("Manages billing"));
    let create = role_event(OperationType::Create, ResourceType::RealmRole, "roles/billing-admin");

    let outcome = fx.listener.process(&create).await;
    assert!(matches!(outcome, SyncOutcome::Created { .. }));

    let stored = fx.repository.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "billing-admin");
    assert_eq!(stored[0].realm_id, REALM_ID);
    assert_eq!(stored[0].client_id, None);
    assert_eq!(stored[0].description.as_deref(), Some("Manages billing"));
    Ok(())
}

#[tokio::test]
async fn duplicate_create_is_a_no_op() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.define_realm_role("billing-admin", None);
    let create = role_event(OperationType::Create, ResourceType::RealmRole, "roles/billing-admin");

    fx.listener.process(&create).await;
    let outcome = fx.listener.process(&create).await;

    assert_eq!(outcome, SyncOutcome::skipped(SkipReason::AlreadySynchronized));
    assert_eq!(fx.repository.len(), 1);
    Ok(())
}

#[tokio::test]
async fn update_without_record_creates_it() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.define_realm_role("billing-admin", None);
    let update = role_event(OperationType::Update, ResourceType::RealmRole, "roles/billing-admin");

    let outcome = fx.listener.process(&update).await;
    assert!(matches!(outcome, SyncOutcome::Created { .. }));
    assert_eq!(fx.repository.len(), 1);
    Ok(())
}

#[tokio::test]
async fn update_overwrites_description() -> anyhow::Result<()> {
    let fx = Fixture::new();
    let stored = fx
        .repository
        .save(Role::new_realm_role(REALM_ID, "billing-admin"))
        .await?;
    fx.define_realm_role("billing-admin", Some("Now with a description"));

    let outcome = fx
        .listener
        .process(&role_event(
            OperationType::Update,
            ResourceType::RealmRole,
            "roles/billing-admin",
        ))
        .await;
    assert_eq!(
        outcome,
        SyncOutcome::Updated {
            role_id: stored.id.clone()
        }
    );

    let updated = fx.repository.find_by_id(&stored.id).await?.expect("record");
    assert_eq!(updated.description.as_deref(), Some("Now with a description"));
    assert_eq!(updated.created_at, stored.created_at);
    assert!(updated.updated_at >= stored.updated_at);
    Ok(())
}

#[tokio::test]
async fn delete_twice_is_a_no_op() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.repository
        .save(Role::new_realm_role(REALM_ID, "billing-admin"))
        .await?;
    let delete = role_event(OperationType::Delete, ResourceType::RealmRole, "roles/billing-admin");

    assert!(matches!(
        fx.listener.process(&delete).await,
        SyncOutcome::Deleted { .. }
    ));
    assert_eq!(
        fx.listener.process(&delete).await,
        SyncOutcome::skipped(SkipReason::NotInStore)
    );
    assert!(fx.repository.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_prefers_realm_role() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.repository
        .save(Role::new_realm_role(REALM_ID, "viewer"))
        .await?;
    fx.repository
        .save(Role::new_client_role(REALM_ID, CLIENT_ID, "viewer"))
        .await?;

    fx.listener
        .process(&role_event(
            OperationType::Delete,
            ResourceType::RealmRole,
            "roles/viewer",
        ))
        .await;

    let remaining = fx.repository.all();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].client_id.as_deref(), Some(CLIENT_ID));
    Ok(())
}

#[tokio::test]
async fn client_role_lifecycle() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.define_client_role("invoice-reader");
    let path = format!("clients/{CLIENT_ID}/roles/invoice-reader");

    let created = fx
        .listener
        .process(&role_event(OperationType::Create, ResourceType::ClientRole, &path))
        .await;
    assert!(matches!(created, SyncOutcome::Created { .. }));
    let stored = fx
        .repository
        .find_by_name_in_realm_client("invoice-reader", REALM_ID, CLIENT_ID)
        .await?;
    assert!(stored.is_some());

    fx.host
        .remove_role(REALM_ID, Some(CLIENT_ID), "invoice-reader");
    let deleted = fx
        .listener
        .process(&role_event(OperationType::Delete, ResourceType::ClientRole, &path))
        .await;
    assert!(matches!(deleted, SyncOutcome::Deleted { .. }));
    assert!(fx.repository.is_empty());
    Ok(())
}

#[tokio::test]
async fn unresolvable_events_are_dropped() -> anyhow::Result<()> {
    let fx = Fixture::new();

    let cases = [
        (
            role_event(OperationType::Create, ResourceType::RealmRole, "roles-by-id/42"),
            SkipReason::UnparseablePath,
        ),
        (
            role_event(OperationType::Create, ResourceType::RealmRole, "roles/ghost"),
            SkipReason::RoleNotFound,
        ),
        (
            role_event(OperationType::Action, ResourceType::RealmRole, "roles/ghost"),
            SkipReason::UnsupportedOperation,
        ),
        (
            role_event(OperationType::Create, ResourceType::Group, "groups/42"),
            SkipReason::NotRoleEvent,
        ),
    ];

    for (event, reason) in cases {
        assert_eq!(fx.listener.process(&event).await, SyncOutcome::skipped(reason));
    }
    assert!(fx.repository.is_empty());
    Ok(())
}

#[tokio::test]
async fn batch_report_counts_outcomes_and_isolates_failures() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.define_realm_role("a", None);
    fx.define_realm_role("b", None);

    let events = vec![
        role_event(OperationType::Create, ResourceType::RealmRole, "roles/a"),
        role_event(OperationType::Create, ResourceType::RealmRole, "roles/a"),
        role_event(OperationType::Update, ResourceType::RealmRole, "roles/b"),
        role_event(OperationType::Create, ResourceType::RealmRole, "roles/missing"),
        role_event(OperationType::Delete, ResourceType::RealmRole, "roles/a"),
    ];
    let report = fx.listener.process_all(&events).await;

    assert_eq!(report.created, 2);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.total(), events.len());
    assert_eq!(fx.repository.len(), 1);

    // A failing store fails only the events processed while it is down.
    fx.repository.set_unavailable(true);
    let failed = fx.listener.process(&events[2]).await;
    assert!(failed.is_failure());
    fx.repository.set_unavailable(false);

    let report = fx.listener.process_all(&events[..1]).await;
    assert_eq!(report.created, 1);
    assert!(!report.has_errors());
    Ok(())
}
