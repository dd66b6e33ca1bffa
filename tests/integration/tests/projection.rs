//! Role projection tests.

use kc_federation::RoleContainer;
use kc_model::Role;
use kc_storage::RoleRepository;

use crate::common::{Fixture, CLIENT_ID, REALM_ID};

#[tokio::test]
async fn opaque_id_round_trips_through_provider() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["admin"]).await?;

    let role = fx
        .provider
        .get_realm_role(&fx.realm, "admin")
        .await
        .expect("role");
    let again = fx
        .provider
        .get_role_by_id(&fx.realm, &role.id())
        .await
        .expect("role by id");

    assert_eq!(role, again);
    assert_eq!(again.name(), "admin");
    Ok(())
}

#[tokio::test]
async fn writes_are_visible_to_later_lookups() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["admin"]).await?;

    let mut role = fx
        .provider
        .get_realm_role(&fx.realm, "admin")
        .await
        .expect("role");
    role.set_name("administrator").await?;
    role.set_description(Some("Full access".to_string())).await?;

    assert!(fx.provider.get_realm_role(&fx.realm, "admin").await.is_none());
    let renamed = fx
        .provider
        .get_realm_role(&fx.realm, "administrator")
        .await
        .expect("renamed role");
    assert_eq!(renamed.description(), Some("Full access"));
    assert_eq!(renamed, role);

    let stored = fx.repository.find_by_id(role.external_id()).await?.expect("stored");
    assert!(stored.updated_at >= stored.created_at);
    Ok(())
}

#[tokio::test]
async fn composite_and_attribute_writes_fail() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["admin", "viewer"]).await?;
    let admin = fx.provider.get_realm_role(&fx.realm, "admin").await.expect("admin");
    let viewer = fx.provider.get_realm_role(&fx.realm, "viewer").await.expect("viewer");

    assert!(!admin.is_composite());
    assert!(admin.composites(Some("view"), None, None).is_empty());
    assert!(admin.add_composite_role(&viewer).unwrap_err().is_unsupported());
    assert!(admin.remove_composite_role(&viewer).unwrap_err().is_unsupported());
    assert!(!admin.has_role(&viewer));
    assert!(admin.has_role(&admin));

    assert!(admin.set_single_attribute("team", "ops").unwrap_err().is_unsupported());
    assert!(admin.remove_attribute("team").unwrap_err().is_unsupported());
    assert!(admin.attribute("team").is_empty());
    assert!(admin.attributes().is_empty());

    // Nothing was written.
    assert_eq!(fx.repository.len(), 2);
    Ok(())
}

#[tokio::test]
async fn container_of_deleted_client_is_reported_missing() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.repository
        .save(Role::new_client_role(REALM_ID, CLIENT_ID, "viewer"))
        .await?;
    let role = fx
        .provider
        .get_client_role(&fx.client, "viewer")
        .await
        .expect("role");

    match role.container().await? {
        Some(RoleContainer::Client(client)) => assert_eq!(client.client_id, "billing-app"),
        other => panic!("unexpected container {other:?}"),
    }

    fx.host.remove_client(CLIENT_ID);
    assert!(role.container().await?.is_none());
    assert_eq!(role.name(), "viewer");
    Ok(())
}
