//! The principal-to-role relation, plus the per-principal listings built on it.

use crate::rbac::errors::RbacError;
use crate::storage;
use sea_orm::DatabaseConnection;
use std::collections::BTreeSet;

/// Grant `role` to `principal`. Granting a role already held is a no-op.
pub async fn grant(db: &DatabaseConnection, role: &str, principal: &str) -> Result<(), RbacError> {
    require_role(db, role).await?;
    require_principal(db, principal).await?;

    storage::insert_role_grant(db, role, principal).await?;
    tracing::info!(role, principal, "role granted");
    Ok(())
}

/// Revoke `role` from `principal`. Revoking a role not held is a no-op.
pub async fn revoke(db: &DatabaseConnection, role: &str, principal: &str) -> Result<(), RbacError> {
    require_role(db, role).await?;
    require_principal(db, principal).await?;

    if storage::delete_role_grant(db, role, principal).await? {
        tracing::info!(role, principal, "role revoked");
    }
    Ok(())
}

/// Roles held by `principal`. An unknown principal is an error, not an empty set.
pub async fn roles_of(
    db: &DatabaseConnection,
    principal: &str,
) -> Result<BTreeSet<String>, RbacError> {
    require_principal(db, principal).await?;
    Ok(storage::roles_for_principal(db, principal)
        .await?
        .into_iter()
        .collect())
}

/// Resource identifiers the principal may act on through `permission`.
///
/// Empty when none of the principal's roles carries the permission.
pub async fn list_granted_resources(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
) -> Result<Vec<String>, RbacError> {
    if !holds_permission(db, principal, permission).await? {
        return Ok(Vec::new());
    }
    Ok(storage::permission_resources(db, permission).await?)
}

/// The resource type `permission` is scoped to, if the principal holds it.
pub async fn list_granted_resource_types(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
) -> Result<Vec<String>, RbacError> {
    if !holds_permission(db, principal, permission).await? {
        return Ok(Vec::new());
    }
    let perm = storage::get_permission(db, permission)
        .await?
        .ok_or_else(|| RbacError::PermissionNotFound(permission.to_string()))?;
    Ok(perm.resource_type.into_iter().collect())
}

async fn holds_permission(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
) -> Result<bool, RbacError> {
    let roles: Vec<String> = roles_of(db, principal).await?.into_iter().collect();
    if storage::get_permission(db, permission).await?.is_none() {
        return Err(RbacError::PermissionNotFound(permission.to_string()));
    }
    let carried = storage::permissions_for_roles(db, &roles).await?;
    Ok(carried.iter().any(|p| p.identifier == permission))
}

async fn require_role(db: &DatabaseConnection, role: &str) -> Result<(), RbacError> {
    if storage::get_role(db, role).await?.is_none() {
        return Err(RbacError::RoleNotFound(role.to_string()));
    }
    Ok(())
}

async fn require_principal(db: &DatabaseConnection, principal: &str) -> Result<(), RbacError> {
    if storage::get_principal(db, principal).await?.is_none() {
        return Err(RbacError::PrincipalNotFound(principal.to_string()));
    }
    Ok(())
}
