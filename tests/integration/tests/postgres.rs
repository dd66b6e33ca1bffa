//! PostgreSQL gateway tests.
//!
//! These need a Docker daemon and are ignored by default.

use std::sync::Arc;

use kc_core::event::{OperationType, ResourceType};
use kc_federation::{InMemoryHostModel, RoleEventListener, SyncOutcome};
use kc_model::{Client, Realm, Role};
use kc_storage::StorageError;

use crate::common::{role_event, PostgresEnv, CLIENT_ID, REALM_ID};

#[tokio::test]
#[ignore = "requires Docker"]
async fn crud_round_trip() -> anyhow::Result<()> {
    let env = PostgresEnv::start().await?;
    let repo = env.repository();

    let saved = repo
        .save(Role::new_realm_role(REALM_ID, "billing-admin").with_description("Billing"))
        .await?;
    let found = repo.find_by_id(&saved.id).await?.expect("stored role");
    assert_eq!(found.name, "billing-admin");
    assert_eq!(found.description.as_deref(), Some("Billing"));
    assert_eq!(found.client_id, None);

    let mut changed = found.clone();
    changed.description = None;
    let updated = repo.save(changed).await?;
    assert_eq!(updated.created_at, found.created_at);
    assert!(updated.updated_at >= found.updated_at);
    assert_eq!(
        repo.find_by_name_in_realm("billing-admin", REALM_ID)
            .await?
            .and_then(|r| r.description),
        None
    );

    assert!(repo.delete(&saved.id).await?);
    assert!(!repo.delete(&saved.id).await?);
    assert!(repo.find_by_id(&saved.id).await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn unique_triple_is_enforced() -> anyhow::Result<()> {
    let env = PostgresEnv::start().await?;
    let repo = env.repository();

    repo.save(Role::new_realm_role(REALM_ID, "admin")).await?;
    let err = repo
        .save(Role::new_realm_role(REALM_ID, "admin"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Duplicate { .. }));

    let err = repo.save(Role::new_realm_role(REALM_ID, "")).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));

    // Same name in another scope.
    repo.save(Role::new_client_role(REALM_ID, CLIENT_ID, "admin"))
        .await?;
    repo.save(Role::new_realm_role("other", "admin")).await?;
    assert_eq!(repo.count_by_realm(REALM_ID).await?, 2);
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn listings_are_scoped_and_ordered() -> anyhow::Result<()> {
    let env = PostgresEnv::start().await?;
    let repo = env.repository();

    for i in 0..5 {
        repo.save(Role::new_realm_role(REALM_ID, format!("role-{i}")))
            .await?;
    }
    repo.save(Role::new_client_role(REALM_ID, CLIENT_ID, "role-client"))
        .await?;

    let realm_roles = repo.find_by_realm(REALM_ID).await?;
    assert_eq!(realm_roles.len(), 5);
    let ids: Vec<&str> = realm_roles.iter().map(|r| r.id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    let client_roles = repo.find_by_realm_and_client(REALM_ID, CLIENT_ID).await?;
    assert_eq!(client_roles.len(), 1);
    assert!(repo
        .find_by_name_in_realm_client("role-client", REALM_ID, CLIENT_ID)
        .await?
        .is_some());
    assert!(repo.find_by_name_in_realm("role-client", REALM_ID).await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn search_matches_literally_and_case_insensitively() -> anyhow::Result<()> {
    let env = PostgresEnv::start().await?;
    let repo = env.repository();

    repo.save(Role::new_realm_role(REALM_ID, "Billing-Admin")).await?;
    repo.save(Role::new_realm_role(REALM_ID, "auditor").with_description("reads BILLING"))
        .await?;
    repo.save(Role::new_realm_role(REALM_ID, "100%_off")).await?;
    repo.save(Role::new_realm_role(REALM_ID, "1000-off")).await?;

    assert_eq!(repo.search(REALM_ID, "billing").await?.len(), 2);
    let literal = repo.search(REALM_ID, "%_").await?;
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].name, "100%_off");
    assert_eq!(repo.search(REALM_ID, "").await?.len(), 4);
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn listener_synchronizes_into_postgres() -> anyhow::Result<()> {
    let env = PostgresEnv::start().await?;
    let repo = env.repository();

    let host = Arc::new(InMemoryHostModel::new());
    host.add_realm(Realm::new(REALM_ID, "Acme"));
    host.add_client(Client::new(CLIENT_ID, REALM_ID, "billing-app"));
    host.add_role(
        REALM_ID,
        kc_federation::HostRole::realm("host-1", "billing-admin"),
    );
    let listener = RoleEventListener::new(repo.clone(), host);

    let create = role_event(OperationType::Create, ResourceType::RealmRole, "roles/billing-admin");
    assert!(matches!(
        listener.process(&create).await,
        SyncOutcome::Created { .. }
    ));
    assert!(!listener.process(&create).await.is_change());
    assert_eq!(repo.count_by_realm(REALM_ID).await?, 1);

    let delete = role_event(OperationType::Delete, ResourceType::RealmRole, "roles/billing-admin");
    assert!(listener.process(&delete).await.is_change());
    assert_eq!(repo.count_by_realm(REALM_ID).await?, 0);

    env.service.close().await;
    env.service.close().await;
    assert!(env.service.is_closed());
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn closed_pool_reports_connection_errors() -> anyhow::Result<()> {
    let env = PostgresEnv::start().await?;
    let repo = env.repository();
    assert!(env.config.connection_url().starts_with("postgresql://"));

    env.service.close().await;
    let err = repo.find_by_realm(REALM_ID).await.unwrap_err();
    assert!(err.is_transient());
    Ok(())
}
