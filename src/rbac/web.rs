use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use crate::credentials::Authenticated;
use crate::rbac::errors::RbacError;
use crate::rbac::types::{
    AuthorizeResourceRequest, AuthorizeResourceTypeRequest, AuthorizeResponse, Explanation,
    PermissionQuery, ResourceTypesResponse, ResourcesResponse, RoleGrantRequest, RolesResponse,
};
use crate::rbac::{evaluator, grants};
use crate::storage;
use crate::web::AppState;

/// RBAC routes. Every handler expects the bearer middleware in front of it.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authz/rbac/authorize/resource", post(authorize_resource))
        .route(
            "/authz/rbac/authorize/resourcetype",
            post(authorize_resource_type),
        )
        .route("/authz/rbac/role/grant", post(grant_role))
        .route("/authz/rbac/role/revoke", post(revoke_role))
        .route("/authz/rbac/principal/{identifier}/roles", get(list_roles))
        .route(
            "/authz/rbac/principal/{identifier}/resources",
            get(list_resources),
        )
        .route(
            "/authz/rbac/principal/{identifier}/resourcetypes",
            get(list_resource_types),
        )
        .route("/authz/rbac/explain/resource", post(explain_resource))
        .route(
            "/authz/rbac/explain/resourcetype",
            post(explain_resource_type),
        )
}

// Decisions answer 200 either way; the reason never leaves the server.

async fn authorize_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Json(req): Json<AuthorizeResourceRequest>,
) -> Json<AuthorizeResponse> {
    let principal = req.principal.unwrap_or(auth.principal);
    let allowed =
        evaluator::authorize_by_resource(&state.db, &principal, &req.permission, &req.resource)
            .await;
    Json(AuthorizeResponse { allowed })
}

async fn authorize_resource_type(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Json(req): Json<AuthorizeResourceTypeRequest>,
) -> Json<AuthorizeResponse> {
    let principal = req.principal.unwrap_or(auth.principal);
    let allowed = evaluator::authorize_by_resource_type(
        &state.db,
        &principal,
        &req.permission,
        &req.resource_type,
    )
    .await;
    Json(AuthorizeResponse { allowed })
}

async fn grant_role(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Json(req): Json<RoleGrantRequest>,
) -> Result<Json<RolesResponse>, RbacError> {
    require_admin(&state, &auth).await?;
    grants::grant(&state.db, &req.role, &req.principal).await?;
    roles_response(&state, req.principal).await
}

async fn revoke_role(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Json(req): Json<RoleGrantRequest>,
) -> Result<Json<RolesResponse>, RbacError> {
    require_admin(&state, &auth).await?;
    grants::revoke(&state.db, &req.role, &req.principal).await?;
    roles_response(&state, req.principal).await
}

async fn list_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Path(identifier): Path<String>,
) -> Result<Json<RolesResponse>, RbacError> {
    require_self_or_admin(&state, &auth, &identifier).await?;
    roles_response(&state, identifier).await
}

async fn list_resources(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Path(identifier): Path<String>,
    Query(q): Query<PermissionQuery>,
) -> Result<Json<ResourcesResponse>, RbacError> {
    require_self_or_admin(&state, &auth, &identifier).await?;
    let resources = grants::list_granted_resources(&state.db, &identifier, &q.permission).await?;
    Ok(Json(ResourcesResponse {
        principal: identifier,
        permission: q.permission,
        resources,
    }))
}

async fn list_resource_types(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Path(identifier): Path<String>,
    Query(q): Query<PermissionQuery>,
) -> Result<Json<ResourceTypesResponse>, RbacError> {
    require_self_or_admin(&state, &auth, &identifier).await?;
    let resource_types =
        grants::list_granted_resource_types(&state.db, &identifier, &q.permission).await?;
    Ok(Json(ResourceTypesResponse {
        principal: identifier,
        permission: q.permission,
        resource_types,
    }))
}

async fn explain_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Json(req): Json<AuthorizeResourceRequest>,
) -> Result<Json<Explanation>, RbacError> {
    require_admin(&state, &auth).await?;
    let principal = req.principal.unwrap_or(auth.principal);
    Ok(Json(
        evaluator::explain_by_resource(&state.db, &principal, &req.permission, &req.resource)
            .await,
    ))
}

async fn explain_resource_type(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Json(req): Json<AuthorizeResourceTypeRequest>,
) -> Result<Json<Explanation>, RbacError> {
    require_admin(&state, &auth).await?;
    let principal = req.principal.unwrap_or(auth.principal);
    Ok(Json(
        evaluator::explain_by_resource_type(
            &state.db,
            &principal,
            &req.permission,
            &req.resource_type,
        )
        .await,
    ))
}

async fn roles_response(state: &AppState, principal: String) -> Result<Json<RolesResponse>, RbacError> {
    let roles = grants::roles_of(&state.db, &principal).await?;
    Ok(Json(RolesResponse {
        principal,
        roles: roles.into_iter().collect(),
    }))
}

async fn require_admin(state: &AppState, auth: &Authenticated) -> Result<(), RbacError> {
    match storage::get_principal(&state.db, &auth.principal).await? {
        Some(p) if p.active && p.is_admin => Ok(()),
        _ => {
            tracing::info!(principal = %auth.principal, "admin-only rbac route refused");
            Err(RbacError::Denied("administrator privileges required".into()))
        }
    }
}

async fn require_self_or_admin(
    state: &AppState,
    auth: &Authenticated,
    principal: &str,
) -> Result<(), RbacError> {
    if auth.principal == principal {
        return Ok(());
    }
    require_admin(state, auth).await
}
