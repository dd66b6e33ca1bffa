//! Role lookup and search tests.

use kc_federation::storage_id;
use kc_model::Role;
use kc_storage::RoleRepository;

use crate::common::{Fixture, CLIENT_ID, COMPONENT_ID, REALM_ID};

fn names(roles: &[kc_federation::FederatedRole]) -> Vec<String> {
    let mut names: Vec<String> = roles.iter().map(|r| r.name().to_string()).collect();
    names.sort();
    names
}

#[tokio::test]
async fn match_all_lists_realm_roles() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["A", "B", "C"]).await?;
    fx.seed_client_role("client-only").await?;

    for search in [None, Some(""), Some("   "), Some("*"), Some(" * ")] {
        let roles = fx.provider.search_for_roles(&fx.realm, search, None, None).await;
        assert_eq!(names(&roles), vec!["A", "B", "C"], "search {search:?}");
    }
    Ok(())
}

#[tokio::test]
async fn search_is_case_insensitive_over_name_and_description() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.repository
        .save(Role::new_realm_role(REALM_ID, "Billing-Admin"))
        .await?;
    fx.repository
        .save(Role::new_realm_role(REALM_ID, "auditor").with_description("Reads BILLING reports"))
        .await?;
    fx.repository
        .save(Role::new_realm_role(REALM_ID, "viewer"))
        .await?;

    let roles = fx
        .provider
        .search_for_roles(&fx.realm, Some("billing"), None, None)
        .await;
    assert_eq!(names(&roles), vec!["Billing-Admin", "auditor"]);
    Ok(())
}

#[tokio::test]
async fn realm_search_includes_client_roles_by_default() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["report-reader"]).await?;
    fx.seed_client_role("report-writer").await?;

    let roles = fx
        .provider
        .search_for_roles(&fx.realm, Some("report"), None, None)
        .await;
    assert_eq!(names(&roles), vec!["report-reader", "report-writer"]);
    Ok(())
}

#[tokio::test]
async fn strict_realm_search_drops_client_roles() -> anyhow::Result<()> {
    let fx = Fixture::strict();
    fx.seed_realm_roles(&["report-reader"]).await?;
    fx.seed_client_role("report-writer").await?;

    let roles = fx
        .provider
        .search_for_roles(&fx.realm, Some("report"), None, None)
        .await;
    assert_eq!(names(&roles), vec!["report-reader"]);
    Ok(())
}

#[tokio::test]
async fn pagination_follows_store_order() -> anyhow::Result<()> {
    let fx = Fixture::new();
    let seeded: Vec<String> = (0..10).map(|i| format!("role-{i}")).collect();
    let refs: Vec<&str> = seeded.iter().map(String::as_str).collect();
    fx.seed_realm_roles(&refs).await?;

    let all = fx.provider.search_for_roles(&fx.realm, None, None, None).await;
    assert_eq!(all.len(), 10);

    let page = fx
        .provider
        .search_for_roles(&fx.realm, None, Some(3), Some(4))
        .await;
    assert_eq!(page, all[3..7].to_vec());

    let again = fx
        .provider
        .search_for_roles(&fx.realm, None, Some(3), Some(4))
        .await;
    assert_eq!(page, again);

    // Unset and non-positive bounds are ignored.
    let unbounded = fx
        .provider
        .search_for_roles(&fx.realm, None, Some(0), Some(-1))
        .await;
    assert_eq!(unbounded.len(), 10);
    Ok(())
}

#[tokio::test]
async fn lookup_by_id_requires_matching_component() -> anyhow::Result<()> {
    let fx = Fixture::new();
    let stored = fx.seed_realm_roles(&["admin"]).await?.remove(0);

    let own_id = storage_id::encode(COMPONENT_ID, &stored.id);
    let found = fx.provider.get_role_by_id(&fx.realm, &own_id).await;
    assert_eq!(found.map(|r| r.id()), Some(own_id));

    let foreign_id = storage_id::encode("another-component", &stored.id);
    assert!(fx.provider.get_role_by_id(&fx.realm, &foreign_id).await.is_none());
    assert!(fx.provider.get_role_by_id(&fx.realm, &stored.id).await.is_none());
    assert!(fx.provider.get_role_by_id(&fx.realm, "f:").await.is_none());

    let unknown = storage_id::encode(COMPONENT_ID, "no-such-role");
    assert!(fx.provider.get_role_by_id(&fx.realm, &unknown).await.is_none());
    Ok(())
}

#[tokio::test]
async fn name_lookups_respect_scope() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_client_role("viewer").await?;

    assert!(fx.provider.get_realm_role(&fx.realm, "viewer").await.is_none());
    let role = fx
        .provider
        .get_client_role(&fx.client, "viewer")
        .await
        .expect("client role");
    assert!(role.is_client_role());
    assert_eq!(role.container_id(), CLIENT_ID);

    fx.seed_realm_roles(&["viewer"]).await?;
    let role = fx
        .provider
        .get_realm_role(&fx.realm, "viewer")
        .await
        .expect("realm role");
    assert!(!role.is_client_role());
    Ok(())
}

#[tokio::test]
async fn client_search_keeps_only_that_client() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["reader"]).await?;
    fx.seed_client_role("reader-app").await?;
    fx.repository
        .save(Role::new_client_role(REALM_ID, "7a1c-portal", "reader-portal"))
        .await?;

    let roles = fx
        .provider
        .search_for_client_roles(&fx.client, Some("reader"), None, None)
        .await;
    assert_eq!(names(&roles), vec!["reader-app"]);

    let roles = fx
        .provider
        .search_for_client_roles(&fx.client, Some("*"), None, None)
        .await;
    assert_eq!(names(&roles), vec!["reader-app"]);
    Ok(())
}

#[tokio::test]
async fn cross_client_search_filters() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["reader"]).await?;
    fx.seed_client_role("reader-app").await?;
    fx.repository
        .save(Role::new_client_role(REALM_ID, "7a1c-portal", "reader-portal"))
        .await?;

    let all_clients = fx
        .provider
        .search_for_client_roles_across(&fx.realm, Some("reader"), None, None, None)
        .await;
    assert_eq!(names(&all_clients), vec!["reader-app", "reader-portal"]);

    let empty_filter: Vec<String> = Vec::new();
    let same = fx
        .provider
        .search_for_client_roles_across(&fx.realm, Some("reader"), Some(&empty_filter), None, None)
        .await;
    assert_eq!(names(&same), names(&all_clients));

    let filter = vec!["7a1c-portal".to_string()];
    let portal_only = fx
        .provider
        .search_for_client_roles_across(&fx.realm, None, Some(&filter), None, None)
        .await;
    assert_eq!(names(&portal_only), vec!["reader-portal"]);

    let paged = fx
        .provider
        .search_for_client_roles_across(&fx.realm, Some("reader"), None, Some(1), Some(1))
        .await;
    assert_eq!(paged.len(), 1);
    Ok(())
}

#[tokio::test]
async fn count_includes_both_scopes() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["a", "b"]).await?;
    fx.seed_client_role("c").await?;

    assert_eq!(fx.provider.count_roles(&fx.realm).await, 3);
    Ok(())
}

#[tokio::test]
async fn store_outage_degrades_reads() -> anyhow::Result<()> {
    let fx = Fixture::new();
    let stored = fx.seed_realm_roles(&["admin"]).await?.remove(0);
    fx.repository.set_unavailable(true);

    assert!(fx
        .provider
        .search_for_roles(&fx.realm, None, None, None)
        .await
        .is_empty());
    assert!(fx.provider.get_realm_role(&fx.realm, "admin").await.is_none());
    let id = storage_id::encode(COMPONENT_ID, &stored.id);
    assert!(fx.provider.get_role_by_id(&fx.realm, &id).await.is_none());
    assert_eq!(fx.provider.count_roles(&fx.realm).await, 0);

    fx.repository.set_unavailable(false);
    assert!(fx.provider.get_realm_role(&fx.realm, "admin").await.is_some());
    Ok(())
}

#[tokio::test]
async fn results_are_projections() -> anyhow::Result<()> {
    let fx = Fixture::new();
    fx.seed_realm_roles(&["admin"]).await?;

    let roles = fx.provider.search_for_roles(&fx.realm, None, None, None).await;
    let role = &roles[0];
    assert!(role.id().starts_with("f:c0ffee:"));
    assert_eq!(
        fx.repository.find_by_id(role.external_id()).await?.map(|r| r.name),
        Some("admin".to_string())
    );
    Ok(())
}
