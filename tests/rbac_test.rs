mod helpers;

use gatekeeper::rbac::errors::RbacError;
use gatekeeper::rbac::types::{DenialReason, Target, Verdict};
use gatekeeper::rbac::{evaluator, grants, graph};
use helpers::builders::ensure_resource_type;
use helpers::{PermissionBuilder, PrincipalBuilder, RoleBuilder, TestDb};
use sea_orm::DatabaseConnection;

/// bob holds `editor`, which carries `edit-doc` on `doc-42`.
/// `read-report` is scoped to the `report` type and carried by `analyst`.
async fn seed_documents(db: &DatabaseConnection) {
    ensure_resource_type(db, "document").await;
    PermissionBuilder::new("edit-doc")
        .with_resource("doc-42")
        .with_resource("doc-7")
        .create(db)
        .await;
    PermissionBuilder::new("read-report")
        .with_resource_type("report")
        .create(db)
        .await;
    PermissionBuilder::new("delete-doc")
        .with_resource("doc-99")
        .create(db)
        .await;

    RoleBuilder::new("editor")
        .with_permission("edit-doc")
        .create(db)
        .await;
    RoleBuilder::new("analyst")
        .with_permission("read-report")
        .create(db)
        .await;
    RoleBuilder::new("auditor").create(db).await;

    PrincipalBuilder::new("bob").create(db).await;
    grants::grant(db, "editor", "bob").await.unwrap();
}

#[tokio::test]
async fn test_principal_without_roles_is_denied() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;
    PrincipalBuilder::new("nobody").create(db).await;

    assert!(!evaluator::authorize_by_resource(db, "nobody", "edit-doc", "doc-42").await);

    let explanation = evaluator::explain_by_resource(db, "nobody", "edit-doc", "doc-42").await;
    assert!(!explanation.allowed);
    assert_eq!(explanation.reason, Some(DenialReason::NoRoles));
    assert!(explanation.roles.is_empty());
}

#[tokio::test]
async fn test_grant_then_revoke_round_trip() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;

    assert!(evaluator::authorize_by_resource(db, "bob", "edit-doc", "doc-42").await);
    assert!(evaluator::authorize_by_resource(db, "bob", "edit-doc", "doc-7").await);
    // Exists, but edit-doc is not bound to it
    assert!(!evaluator::authorize_by_resource(db, "bob", "edit-doc", "doc-99").await);

    grants::revoke(db, "editor", "bob").await.unwrap();
    assert!(!evaluator::authorize_by_resource(db, "bob", "edit-doc", "doc-42").await);
    assert!(grants::roles_of(db, "bob").await.unwrap().is_empty());

    grants::grant(db, "editor", "bob").await.unwrap();
    assert!(evaluator::authorize_by_resource(db, "bob", "edit-doc", "doc-42").await);
}

#[tokio::test]
async fn test_grant_and_revoke_are_idempotent() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;

    grants::grant(db, "editor", "bob").await.unwrap();
    grants::grant(db, "editor", "bob").await.unwrap();
    let roles = grants::roles_of(db, "bob").await.unwrap();
    assert_eq!(roles.into_iter().collect::<Vec<_>>(), vec!["editor"]);

    grants::revoke(db, "analyst", "bob").await.unwrap();
    grants::revoke(db, "editor", "bob").await.unwrap();
    grants::revoke(db, "editor", "bob").await.unwrap();
    assert!(grants::roles_of(db, "bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_grant_rejects_unknown_role_and_principal() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;

    let err = grants::grant(db, "ghost", "bob").await.unwrap_err();
    assert!(matches!(err, RbacError::RoleNotFound(ref r) if r == "ghost"));

    let err = grants::grant(db, "editor", "mallory").await.unwrap_err();
    assert!(matches!(err, RbacError::PrincipalNotFound(ref p) if p == "mallory"));

    let err = grants::revoke(db, "ghost", "bob").await.unwrap_err();
    assert!(matches!(err, RbacError::RoleNotFound(_)));

    let err = grants::roles_of(db, "mallory").await.unwrap_err();
    assert!(matches!(err, RbacError::PrincipalNotFound(_)));
}

#[tokio::test]
async fn test_type_scoped_checks() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;
    PrincipalBuilder::new("ana").create(db).await;
    grants::grant(db, "analyst", "ana").await.unwrap();

    assert!(evaluator::authorize_by_resource_type(db, "ana", "read-report", "report").await);

    let mismatch = evaluator::explain_by_resource_type(db, "ana", "read-report", "document").await;
    assert_eq!(mismatch.reason, Some(DenialReason::TargetMismatch));

    let unknown = evaluator::explain_by_resource_type(db, "ana", "read-report", "spreadsheet").await;
    assert_eq!(unknown.reason, Some(DenialReason::UnknownTarget));

    // edit-doc is bound to resources, not to a type
    let unscoped = evaluator::explain_by_resource_type(db, "bob", "edit-doc", "document").await;
    assert_eq!(unscoped.reason, Some(DenialReason::PermissionUnscoped));
}

#[tokio::test]
async fn test_explain_reasons() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;

    let granted = evaluator::explain_by_resource(db, "bob", "edit-doc", "doc-42").await;
    assert!(granted.allowed);
    assert_eq!(granted.reason, None);
    assert_eq!(granted.granted_by.as_deref(), Some("editor"));
    assert_eq!(granted.roles, vec!["editor".to_string()]);

    let unknown_principal = evaluator::explain_by_resource(db, "mallory", "edit-doc", "doc-42").await;
    assert_eq!(unknown_principal.reason, Some(DenialReason::UnknownPrincipal));

    let unknown_permission = evaluator::explain_by_resource(db, "bob", "fly", "doc-42").await;
    assert_eq!(unknown_permission.reason, Some(DenialReason::UnknownPermission));

    let unknown_resource = evaluator::explain_by_resource(db, "bob", "edit-doc", "doc-1000").await;
    assert_eq!(unknown_resource.reason, Some(DenialReason::UnknownTarget));

    let not_bound = evaluator::explain_by_resource(db, "bob", "edit-doc", "doc-99").await;
    assert_eq!(not_bound.reason, Some(DenialReason::TargetMismatch));

    let not_carried = evaluator::explain_by_resource(db, "bob", "delete-doc", "doc-99").await;
    assert_eq!(not_carried.reason, Some(DenialReason::NoRoleCarriesPermission));
}

#[tokio::test]
async fn test_any_held_role_is_sufficient() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;
    PrincipalBuilder::new("carol").create(db).await;
    // auditor sorts first and carries nothing
    grants::grant(db, "auditor", "carol").await.unwrap();
    grants::grant(db, "editor", "carol").await.unwrap();

    let explanation = evaluator::explain_by_resource(db, "carol", "edit-doc", "doc-42").await;
    assert!(explanation.allowed);
    assert_eq!(explanation.granted_by.as_deref(), Some("editor"));
    assert_eq!(
        explanation.roles,
        vec!["auditor".to_string(), "editor".to_string()]
    );
}

#[tokio::test]
async fn test_inactive_principal_is_denied() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;
    PrincipalBuilder::new("eve").inactive().create(db).await;
    grants::grant(db, "editor", "eve").await.unwrap();

    assert!(!evaluator::authorize_by_resource(db, "eve", "edit-doc", "doc-42").await);
    let explanation = evaluator::explain_by_resource(db, "eve", "edit-doc", "doc-42").await;
    assert_eq!(explanation.reason, Some(DenialReason::InactivePrincipal));
    assert_eq!(explanation.roles, vec!["editor".to_string()]);
}

#[tokio::test]
async fn test_role_level_checks() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;

    let target = Target::Resource("doc-42".into());
    assert!(graph::permits(db, "editor", "edit-doc", &target).await);
    assert!(!graph::permits(db, "auditor", "edit-doc", &target).await);
    assert!(!graph::permits(db, "ghost", "edit-doc", &target).await);

    assert_eq!(
        graph::check(db, "ghost", "edit-doc", &target).await.unwrap(),
        Verdict::Deny(DenialReason::UnknownRole)
    );
    assert_eq!(
        graph::check(db, "auditor", "edit-doc", &target).await.unwrap(),
        Verdict::Deny(DenialReason::RoleLacksPermission)
    );

    let report = Target::ResourceType("report".into());
    assert!(graph::permits(db, "analyst", "read-report", &report).await);
    assert!(!graph::permits(db, "editor", "read-report", &report).await);
}

#[tokio::test]
async fn test_listings_only_cover_held_permissions() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;
    PrincipalBuilder::new("ana").create(db).await;
    grants::grant(db, "analyst", "ana").await.unwrap();

    let mut resources = grants::list_granted_resources(db, "bob", "edit-doc").await.unwrap();
    resources.sort();
    assert_eq!(resources, vec!["doc-42".to_string(), "doc-7".to_string()]);

    assert!(grants::list_granted_resources(db, "ana", "edit-doc")
        .await
        .unwrap()
        .is_empty());
    assert!(grants::list_granted_resources(db, "bob", "delete-doc")
        .await
        .unwrap()
        .is_empty());

    assert_eq!(
        grants::list_granted_resource_types(db, "ana", "read-report")
            .await
            .unwrap(),
        vec!["report".to_string()]
    );
    // Held, but not type-scoped
    assert!(grants::list_granted_resource_types(db, "bob", "edit-doc")
        .await
        .unwrap()
        .is_empty());

    let err = grants::list_granted_resources(db, "bob", "fly").await.unwrap_err();
    assert!(matches!(err, RbacError::PermissionNotFound(_)));
    let err = grants::list_granted_resources(db, "mallory", "edit-doc")
        .await
        .unwrap_err();
    assert!(matches!(err, RbacError::PrincipalNotFound(_)));
}

#[tokio::test]
async fn test_deleting_a_role_drops_its_grants() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    seed_documents(db).await;

    assert!(gatekeeper::storage::delete_role(db, "editor").await.unwrap());
    assert!(grants::roles_of(db, "bob").await.unwrap().is_empty());
    assert!(!evaluator::authorize_by_resource(db, "bob", "edit-doc", "doc-42").await);
}
