use serde::{Deserialize, Serialize};

/// What an authorization question is asked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Any resource of the given type.
    ResourceType(String),
    /// One concrete resource instance.
    Resource(String),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::ResourceType(id) => write!(f, "type:{id}"),
            Target::Resource(id) => write!(f, "resource:{id}"),
        }
    }
}

/// Internal reason behind a denial. Only ever shown to administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    UnknownPrincipal,
    InactivePrincipal,
    NoRoles,
    UnknownRole,
    UnknownPermission,
    UnknownTarget,
    /// Type-scoped check against a permission bound to no resource type.
    PermissionUnscoped,
    TargetMismatch,
    RoleLacksPermission,
    NoRoleCarriesPermission,
    StoreUnavailable,
}

impl DenialReason {
    /// Reasons that hold for every role, so evaluating further roles is pointless.
    pub fn is_role_independent(self) -> bool {
        matches!(
            self,
            DenialReason::UnknownPermission
                | DenialReason::UnknownTarget
                | DenialReason::PermissionUnscoped
                | DenialReason::TargetMismatch
                | DenialReason::StoreUnavailable
        )
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DenialReason::UnknownPrincipal => "unknown principal",
            DenialReason::InactivePrincipal => "principal is inactive",
            DenialReason::NoRoles => "principal holds no roles",
            DenialReason::UnknownRole => "unknown role",
            DenialReason::UnknownPermission => "unknown permission",
            DenialReason::UnknownTarget => "unknown resource or resource type",
            DenialReason::PermissionUnscoped => "permission has no resource type",
            DenialReason::TargetMismatch => "permission is not scoped to the target",
            DenialReason::RoleLacksPermission => "role does not carry the permission",
            DenialReason::NoRoleCarriesPermission => "no held role carries the permission",
            DenialReason::StoreUnavailable => "entity store unavailable",
        };
        f.write_str(s)
    }
}

/// Outcome of checking a single role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Permit,
    Deny(DenialReason),
}

/// Diagnostic view of a principal-level decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
    /// Roles the principal held when the decision was made.
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
}

impl Explanation {
    pub fn deny(reason: DenialReason, roles: Vec<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            roles,
            granted_by: None,
        }
    }

    pub fn allow(role: String, roles: Vec<String>) -> Self {
        Self {
            allowed: true,
            reason: None,
            roles,
            granted_by: Some(role),
        }
    }
}

// Wire types for the HTTP surface.

#[derive(Debug, Deserialize)]
pub struct AuthorizeResourceRequest {
    /// Defaults to the bearer's principal.
    pub principal: Option<String>,
    pub permission: String,
    pub resource: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeResourceTypeRequest {
    pub principal: Option<String>,
    pub permission: String,
    pub resource_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleGrantRequest {
    pub role: String,
    pub principal: String,
}

#[derive(Debug, Deserialize)]
pub struct PermissionQuery {
    pub permission: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RolesResponse {
    pub principal: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourcesResponse {
    pub principal: String,
    pub permission: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceTypesResponse {
    pub principal: String,
    pub permission: String,
    pub resource_types: Vec<String>,
}
