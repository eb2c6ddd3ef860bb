use crate::errors::GatekeeperError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RbacError {
    #[error("Unknown principal `{0}`")]
    #[diagnostic(code(gatekeeper::rbac::principal_not_found))]
    PrincipalNotFound(String),

    #[error("Unknown role `{0}`")]
    #[diagnostic(
        code(gatekeeper::rbac::role_not_found),
        help("Roles are defined in the seed file passed with `--seed`")
    )]
    RoleNotFound(String),

    #[error("Unknown permission `{0}`")]
    #[diagnostic(code(gatekeeper::rbac::permission_not_found))]
    PermissionNotFound(String),

    #[error("Not allowed: {0}")]
    #[diagnostic(code(gatekeeper::rbac::denied))]
    Denied(String),

    #[error(transparent)]
    #[diagnostic(code(gatekeeper::rbac::store))]
    Store(#[from] GatekeeperError),
}

impl IntoResponse for RbacError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            RbacError::PrincipalNotFound(_)
            | RbacError::RoleNotFound(_)
            | RbacError::PermissionNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            RbacError::Denied(_) => (StatusCode::FORBIDDEN, "access_denied"),
            RbacError::Store(e) => {
                tracing::error!(error = %e, "rbac store failure");
                let body = json!({ "error": "server_error" });
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };
        let body = json!({ "error": error, "error_description": self.to_string() });
        (status, Json(body)).into_response()
    }
}
