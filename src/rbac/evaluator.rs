//! The single decision point for principal-level authorization.
//!
//! `authorize_*` answer with a bare boolean and never say why; every failure,
//! including a store error, denies. `explain_*` run the same evaluation and
//! keep the reason for administrators.

use crate::rbac::graph;
use crate::rbac::types::{DenialReason, Explanation, Target, Verdict};
use crate::storage;
use sea_orm::DatabaseConnection;

pub async fn authorize_by_resource(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
    resource: &str,
) -> bool {
    decide(db, principal, permission, &Target::Resource(resource.to_string())).await
}

pub async fn authorize_by_resource_type(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
    resource_type: &str,
) -> bool {
    decide(
        db,
        principal,
        permission,
        &Target::ResourceType(resource_type.to_string()),
    )
    .await
}

pub async fn explain_by_resource(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
    resource: &str,
) -> Explanation {
    explain(db, principal, permission, &Target::Resource(resource.to_string())).await
}

pub async fn explain_by_resource_type(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
    resource_type: &str,
) -> Explanation {
    explain(
        db,
        principal,
        permission,
        &Target::ResourceType(resource_type.to_string()),
    )
    .await
}

async fn decide(db: &DatabaseConnection, principal: &str, permission: &str, target: &Target) -> bool {
    let explanation = explain(db, principal, permission, target).await;
    match explanation.reason {
        Some(reason) => {
            tracing::debug!(principal, permission, %target, %reason, "authorization denied");
        }
        None => {
            tracing::debug!(
                principal,
                permission,
                %target,
                granted_by = explanation.granted_by.as_deref().unwrap_or_default(),
                "authorization granted"
            );
        }
    }
    explanation.allowed
}

/// Evaluate every held role against `target`; any one sufficient role grants.
pub async fn explain(
    db: &DatabaseConnection,
    principal: &str,
    permission: &str,
    target: &Target,
) -> Explanation {
    let found = match storage::get_principal(db, principal).await {
        Ok(found) => found,
        Err(e) => {
            tracing::error!(error = %e, principal, "principal lookup failed");
            return Explanation::deny(DenialReason::StoreUnavailable, Vec::new());
        }
    };
    let Some(found) = found else {
        return Explanation::deny(DenialReason::UnknownPrincipal, Vec::new());
    };

    let roles = match storage::roles_for_principal(db, principal).await {
        Ok(roles) => roles,
        Err(e) => {
            tracing::error!(error = %e, principal, "role lookup failed");
            return Explanation::deny(DenialReason::StoreUnavailable, Vec::new());
        }
    };
    if !found.active {
        return Explanation::deny(DenialReason::InactivePrincipal, roles);
    }
    if roles.is_empty() {
        return Explanation::deny(DenialReason::NoRoles, roles);
    }

    for role in &roles {
        match graph::check(db, role, permission, target).await {
            Ok(Verdict::Permit) => return Explanation::allow(role.clone(), roles.clone()),
            Ok(Verdict::Deny(reason)) if reason.is_role_independent() => {
                return Explanation::deny(reason, roles);
            }
            Ok(Verdict::Deny(_)) => continue,
            Err(e) => {
                tracing::error!(error = %e, principal, role = %role, "rbac graph lookup failed");
                return Explanation::deny(DenialReason::StoreUnavailable, roles);
            }
        }
    }

    Explanation::deny(DenialReason::NoRoleCarriesPermission, roles)
}
