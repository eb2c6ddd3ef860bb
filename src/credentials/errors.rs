use crate::errors::GatekeeperError;
use crate::web::json_with_headers;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CredentialError {
    #[error("client authentication failed")]
    #[diagnostic(code(gatekeeper::credentials::invalid_client))]
    InvalidClient,

    #[error("client is not allowed to use the `{0}` grant")]
    #[diagnostic(
        code(gatekeeper::credentials::unsupported_grant),
        help("Only clients registered with grant kind `password` may exchange passwords")
    )]
    UnsupportedGrant(String),

    #[error("invalid principal credentials")]
    #[diagnostic(code(gatekeeper::credentials::invalid_principal))]
    InvalidPrincipal,

    #[error("malformed token")]
    #[diagnostic(code(gatekeeper::credentials::malformed))]
    Malformed,

    #[error("token not found")]
    #[diagnostic(code(gatekeeper::credentials::not_found))]
    NotFound,

    #[error("token expired")]
    #[diagnostic(
        code(gatekeeper::credentials::expired),
        help("Obtain a new token with the password grant")
    )]
    Expired,

    #[error("token value collided with an existing token")]
    #[diagnostic(code(gatekeeper::credentials::conflict))]
    Conflict,

    #[error("failed to sign access token: {0}")]
    #[diagnostic(code(gatekeeper::credentials::signing))]
    Signing(String),

    #[error(transparent)]
    #[diagnostic(code(gatekeeper::credentials::store))]
    Store(#[from] GatekeeperError),
}

impl CredentialError {
    /// Response for the refresh grant, where a dead refresh value is an
    /// `invalid_grant` rather than a bearer failure.
    pub fn into_grant_response(self) -> Response {
        match self {
            CredentialError::Malformed | CredentialError::NotFound | CredentialError::Expired => {
                json_with_headers(
                    StatusCode::BAD_REQUEST,
                    json!({"error": "invalid_grant", "error_description": self.to_string()}),
                    &[("cache-control", "no-store".to_string())],
                )
            }
            other => other.into_response(),
        }
    }
}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        let description = self.to_string();
        match self {
            CredentialError::InvalidClient => json_with_headers(
                StatusCode::UNAUTHORIZED,
                json!({"error": "invalid_client", "error_description": description}),
                &[(
                    "www-authenticate",
                    "Basic realm=\"token\", error=\"invalid_client\"".to_string(),
                )],
            ),
            CredentialError::UnsupportedGrant(_) => json_with_headers(
                StatusCode::BAD_REQUEST,
                json!({"error": "unauthorized_client", "error_description": description}),
                &[],
            ),
            CredentialError::InvalidPrincipal => json_with_headers(
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid_grant", "error_description": description}),
                &[],
            ),
            CredentialError::Malformed | CredentialError::NotFound | CredentialError::Expired => {
                json_with_headers(
                    StatusCode::UNAUTHORIZED,
                    json!({"error": "invalid_token", "error_description": description}),
                    &[(
                        "www-authenticate",
                        format!(
                            "Bearer realm=\"gatekeeper\", error=\"invalid_token\", error_description=\"{description}\""
                        ),
                    )],
                )
            }
            CredentialError::Conflict => json_with_headers(
                StatusCode::CONFLICT,
                json!({"error": "conflict", "error_description": description}),
                &[],
            ),
            CredentialError::Signing(_) | CredentialError::Store(_) => {
                tracing::error!(error = %description, "credential backend failure");
                json_with_headers(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "server_error"}),
                    &[],
                )
            }
        }
    }
}
