//!
//! storefront HTTP server
//! -----------------------
//! This module defines the Axum-based HTTP API of the storefront backend.
//!
//! Responsibilities:
//! - Session cookie exchange: identity token in, HTTP-only `session` cookie out.
//! - Logout by expiring the `session` cookie.
//! - Pass-through of GraphQL requests to the storefront API with the server-held token.
//!
//! Every request is handled independently; the only shared state is read-only
//! (the issuer with its provider client, and the storefront client).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header::SET_COOKIE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::identity::{CookiePolicy, HttpTokenMinter, SessionCookie, SessionIssuer, TokenMinter};
use crate::storefront::StorefrontClient;

pub const SESSION_ROUTE: &str = "/api/auth/session";
pub const STOREFRONT_ROUTE: &str = "/api/storefront/graphql";

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<SessionIssuer>,
    /// None when no storefront endpoint is configured.
    pub storefront: Option<StorefrontClient>,
}

impl AppState {
    pub fn new(issuer: SessionIssuer, storefront: Option<StorefrontClient>) -> Self {
        Self { issuer: Arc::new(issuer), storefront }
    }

    /// Build application-scoped state from startup configuration.
    ///
    /// The provider client created here lives for the rest of the process.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let minter: Arc<dyn TokenMinter> = Arc::new(
            HttpTokenMinter::new(&cfg.identity.base_url, cfg.identity.credentials.clone(), cfg.identity.timeout)
                .context("While initialising identity provider client")?,
        );
        let issuer = SessionIssuer::new(minter, CookiePolicy::for_deployment(cfg.deployment));
        let storefront = match &cfg.storefront {
            Some(sf) => Some(StorefrontClient::new(sf).context("While initialising storefront client")?),
            None => None,
        };
        Ok(Self::new(issuer, storefront))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "storefront ok" }))
        .route(SESSION_ROUTE, post(create_session).delete(delete_session))
        .route(STOREFRONT_ROUTE, post(storefront_graphql))
        .with_state(state)
}

/// Start the storefront HTTP server with an already-validated configuration.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    info!(
        target: "startup",
        "storefront starting: bind={}, http_port={}, deployment={:?}, idp_project={}, storefront_proxy={}",
        cfg.bind,
        cfg.http_port,
        cfg.deployment,
        cfg.identity.credentials.project_id,
        cfg.storefront.is_some()
    );
    let state = AppState::from_config(&cfg)?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.bind, cfg.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", cfg.bind, cfg.http_port))?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Pull `idToken` out of a session request body.
///
/// Only a JSON object with a string `idToken` carries a token; anything else is "no token".
fn token_from_body(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map.get("idToken").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn with_cookie(cookie: &SessionCookie) -> Response {
    match cookie.header_value() {
        Ok(v) => {
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, v);
            (StatusCode::OK, headers, Json(json!({"success": true}))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn create_session(State(state): State<AppState>, body: Bytes) -> Response {
    match state.issuer.issue(token_from_body(&body)).await {
        Ok(cookie) => with_cookie(&cookie),
        Err(e) => e.into_response(),
    }
}

async fn delete_session(State(state): State<AppState>) -> Response {
    info!(target: "session", "session cleared");
    with_cookie(&state.issuer.logout_cookie())
}

async fn storefront_graphql(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> Response {
    let Some(client) = state.storefront.as_ref() else {
        return AppError::unavailable("storefront_disabled", "Storefront not configured").into_response();
    };
    let body = match body {
        Ok(Json(v)) => v,
        Err(rejection) => {
            tracing::debug!(target: "storefront", error = %rejection, "rejected storefront request body");
            return AppError::user("invalid_body", "Invalid request body").into_response();
        }
    };
    match client.execute(&body).await {
        Ok((status, value)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(value)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
