use crate::credentials::errors::CredentialError;
use crate::credentials::Authenticated;
use crate::storage::Token;
use crate::web::{json_with_headers, AppState};
use axum::extract::{Form, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::Router;
use base64ct::{Base64, Encoding};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Token endpoints. Nothing under `/o` requires a bearer token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/o/token", post(token))
        .route("/o/token/refresh", post(refresh))
        .route("/o/token/authorize", post(introspect))
        .route("/o/token/{access_token}", delete(revoke))
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    grant_type: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    username: Option<String>,
    password: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    token_type: &'static str,
    expires_at: i64,
    expires_in: i64,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        let expires_in = (token.expires_at - Utc::now().timestamp()).max(0);
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_type: "bearer",
            expires_at: token.expires_at,
            expires_in,
        }
    }
}

fn token_response(token: Token) -> Response {
    let body = serde_json::to_value(TokenResponse::from(token)).unwrap_or_default();
    json_with_headers(
        StatusCode::OK,
        body,
        &[
            ("cache-control", "no-store".to_string()),
            ("pragma", "no-cache".to_string()),
        ],
    )
}

async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(req): Form<TokenRequest>,
) -> Response {
    match req.grant_type.as_str() {
        "password" => handle_password_grant(state, headers, req).await,
        "refresh_token" => match req.refresh_token.as_deref() {
            Some(value) => match state.issuer.refresh(value).await {
                Ok(token) => token_response(token),
                Err(e) => e.into_grant_response(),
            },
            None => invalid_request("missing refresh_token"),
        },
        _ => json_with_headers(
            StatusCode::BAD_REQUEST,
            json!({"error": "unsupported_grant_type"}),
            &[],
        ),
    }
}

async fn handle_password_grant(state: AppState, headers: HeaderMap, req: TokenRequest) -> Response {
    let (client_id, client_secret) = match authenticate_client(&headers, &req) {
        Some(pair) => pair,
        None => return CredentialError::InvalidClient.into_response(),
    };
    let (Some(username), Some(password)) = (req.username.as_deref(), req.password.as_deref())
    else {
        return invalid_request("username and password are required");
    };

    match state
        .issuer
        .issue_password_grant(&client_id, &client_secret, username, password)
        .await
    {
        Ok(token) => token_response(token),
        Err(e) => e.into_response(),
    }
}

async fn refresh(State(state): State<AppState>, Form(req): Form<RefreshRequest>) -> Response {
    match state.issuer.refresh(&req.refresh_token).await {
        Ok(token) => token_response(token),
        Err(e) => e.into_grant_response(),
    }
}

async fn revoke(State(state): State<AppState>, Path(access_token): Path<String>) -> Response {
    match state.issuer.revoke(&access_token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn introspect(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(bearer) = extract_bearer(&headers) else {
        return CredentialError::Malformed.into_response();
    };
    match state.validator.validate(bearer).await {
        Ok(auth) => json_with_headers(
            StatusCode::OK,
            json!({
                "active": true,
                "principal": auth.principal,
                "client": auth.client,
                "expires_at": auth.expires_at,
            }),
            &[("cache-control", "no-store".to_string())],
        ),
        Err(e) => e.into_response(),
    }
}

/// Bearer gate for everything outside `/o`. On success the request carries an
/// [`Authenticated`] extension.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = match extract_bearer(request.headers()) {
        Some(bearer) => state.validator.validate(bearer).await,
        None => Err(CredentialError::Malformed),
    };
    match result {
        Ok(auth) => {
            request.extensions_mut().insert::<Authenticated>(auth);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, path = %request.uri().path(), "bearer rejected");
            e.into_response()
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Client credentials from HTTP Basic, falling back to the form body.
fn authenticate_client(headers: &HeaderMap, req: &TokenRequest) -> Option<(String, String)> {
    if let Some(b64) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
    {
        let decoded = Base64::decode_vec(b64.trim()).ok()?;
        let s = String::from_utf8(decoded).ok()?;
        let (id, secret) = s.split_once(':')?;
        return Some((id.to_string(), secret.to_string()));
    }
    match (req.client_id.clone(), req.client_secret.clone()) {
        (Some(id), Some(secret)) => Some((id, secret)),
        _ => None,
    }
}

fn invalid_request(description: &str) -> Response {
    json_with_headers(
        StatusCode::BAD_REQUEST,
        json!({"error": "invalid_request", "error_description": description}),
        &[],
    )
}
