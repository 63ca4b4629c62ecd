#![allow(dead_code)]

//! Shared fixtures for the HTTP-level tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use storefront::identity::{CookiePolicy, IdToken, MintError, SessionArtifact, SessionIssuer, TokenMinter};
use storefront::server::{router, AppState, SESSION_ROUTE};
use storefront::storefront::StorefrontClient;
use tower::ServiceExt;

/// What the fake provider does with the next token.
#[derive(Clone)]
pub enum Behaviour {
    /// Accept any token, answering `artifact-for-<token>`.
    Accept,
    Reject(&'static str),
    Unreachable,
}

pub struct FakeMinter {
    pub behaviour: Behaviour,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<(String, Duration)>>,
}

impl FakeMinter {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self { behaviour, calls: AtomicUsize::new(0), seen: Mutex::new(Vec::new()) })
    }

    pub fn call_count(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl TokenMinter for FakeMinter {
    async fn mint(&self, token: &IdToken, ttl: Duration) -> Result<SessionArtifact, MintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((token.as_str().to_string(), ttl));
        match &self.behaviour {
            Behaviour::Accept => Ok(SessionArtifact::new(format!("artifact-for-{}", token.as_str()))),
            Behaviour::Reject(reason) => Err(MintError::Rejected { status: 400, reason: reason.to_string() }),
            Behaviour::Unreachable => Err(MintError::Transport("connection refused".into())),
        }
    }
}

pub fn create_test_app(minter: Arc<FakeMinter>, secure: bool, storefront: Option<StorefrontClient>) -> axum::Router {
    let issuer = SessionIssuer::new(minter, CookiePolicy { secure });
    router(AppState::new(issuer, storefront))
}

pub async fn post_session(app: &axum::Router, body: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(SESSION_ROUTE)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
