//! Role-level checks: does one role carry a permission for a given target.

use crate::errors::GatekeeperError;
use crate::rbac::types::{DenialReason, Target, Verdict};
use crate::storage;
use sea_orm::DatabaseConnection;

/// Does `role` carry `permission` for `target`?
///
/// Unknown role, permission, resource type or resource identifier all deny,
/// as does a store failure. Use [`check`] to see why.
pub async fn permits(
    db: &DatabaseConnection,
    role: &str,
    permission: &str,
    target: &Target,
) -> bool {
    match check(db, role, permission, target).await {
        Ok(verdict) => verdict == Verdict::Permit,
        Err(e) => {
            tracing::error!(error = %e, role, permission, "rbac graph lookup failed");
            false
        }
    }
}

/// Same decision as [`permits`] with the denial reason kept.
///
/// Target checks run before the role membership check so that a denial that
/// would hold for every role is reported as such.
pub async fn check(
    db: &DatabaseConnection,
    role: &str,
    permission: &str,
    target: &Target,
) -> Result<Verdict, GatekeeperError> {
    if storage::get_role(db, role).await?.is_none() {
        return Ok(Verdict::Deny(DenialReason::UnknownRole));
    }
    if let Verdict::Deny(reason) = check_target(db, permission, target).await? {
        return Ok(Verdict::Deny(reason));
    }
    if !storage::role_has_permission(db, role, permission).await? {
        return Ok(Verdict::Deny(DenialReason::RoleLacksPermission));
    }
    Ok(Verdict::Permit)
}

/// The role-independent half of [`check`]: is `permission` scoped to `target` at all?
pub async fn check_target(
    db: &DatabaseConnection,
    permission: &str,
    target: &Target,
) -> Result<Verdict, GatekeeperError> {
    let Some(perm) = storage::get_permission(db, permission).await? else {
        return Ok(Verdict::Deny(DenialReason::UnknownPermission));
    };

    match target {
        Target::ResourceType(resource_type) => {
            if storage::get_resource_type(db, resource_type).await?.is_none() {
                return Ok(Verdict::Deny(DenialReason::UnknownTarget));
            }
            match perm.resource_type.as_deref() {
                None => Ok(Verdict::Deny(DenialReason::PermissionUnscoped)),
                Some(bound) if bound == resource_type => Ok(Verdict::Permit),
                Some(_) => Ok(Verdict::Deny(DenialReason::TargetMismatch)),
            }
        }
        Target::Resource(resource) => {
            if storage::get_resource(db, resource).await?.is_none() {
                return Ok(Verdict::Deny(DenialReason::UnknownTarget));
            }
            if storage::permission_has_resource(db, permission, resource).await? {
                Ok(Verdict::Permit)
            } else {
                Ok(Verdict::Deny(DenialReason::TargetMismatch))
            }
        }
    }
}
