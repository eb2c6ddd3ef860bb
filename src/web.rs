//! Router assembly and the HTTP server.
//!
//! Token endpoints live under `/o` and are reachable without a bearer token;
//! everything else goes through the bearer middleware.
use crate::credentials::{self, Issuer, Validator};
use crate::errors::GatekeeperError;
use crate::rbac;
use crate::settings::Settings;
use crate::signer::TokenSigner;
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
    pub issuer: Issuer,
    pub validator: Validator,
}

impl AppState {
    /// The signing secret is read here, once, and handed to both halves of the
    /// credential lifecycle.
    pub fn new(settings: Settings, db: DatabaseConnection) -> Result<Self, GatekeeperError> {
        let signer = TokenSigner::new(&settings.tokens.secret, settings.tokens.lifetime_secs)?;
        let issuer = Issuer::new(db.clone(), signer.clone(), settings.tokens.refresh_token_bytes);
        let validator = Validator::new(db.clone(), signer);
        Ok(Self {
            settings: Arc::new(settings),
            db,
            issuer,
            validator,
        })
    }
}

// Security headers middleware
async fn security_headers(request: Request<Body>, next: Next) -> impl IntoResponse {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    // JSON only; nothing here should ever be rendered as a document
    headers.insert(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("no-referrer"),
    );

    response
}

pub(crate) fn json_with_headers(
    status: StatusCode,
    value: Value,
    headers: &[(&str, String)],
) -> Response {
    let mut resp = (status, Json(value)).into_response();
    let h = resp.headers_mut();
    for (name, val) in headers {
        if let (Ok(n), Ok(v)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(val),
        ) {
            h.insert(n, v);
        }
    }
    resp
}

pub fn router(state: AppState) -> Router {
    let protected = rbac::web::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        credentials::web::require_bearer,
    ));

    Router::new()
        .merge(credentials::web::router())
        .merge(protected)
        .route("/healthz", get(health))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: Settings, db: DatabaseConnection) -> miette::Result<()> {
    let addr: SocketAddr = settings
        .bind_addr()
        .parse()
        .map_err(|e| miette::miette!("bad listen addr: {e}"))?;
    let state = AppState::new(settings, db)?;
    let app = router(state);

    tracing::info!(%addr, "gatekeeper listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
