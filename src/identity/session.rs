use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tracing::{error, info};

use crate::config::Deployment;
use crate::error::{AppError, AppResult};
use crate::tprintln;

use super::minter::TokenMinter;
use super::token::{IdToken, SessionArtifact};

pub const SESSION_COOKIE: &str = "session";

/// Validity of a minted session artifact and of the cookie carrying it: 5 days.
pub const SESSION_TTL: Duration = Duration::from_secs(5 * 24 * 60 * 60);

pub const NO_TOKEN_MESSAGE: &str = "No token provided";

/// Attributes applied to every `session` cookie this process emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn for_deployment(deployment: Deployment) -> Self {
        Self { secure: deployment.is_production() }
    }
}

/// A rendered `Set-Cookie` value for the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    value: String,
    max_age_secs: u64,
    policy: CookiePolicy,
}

impl SessionCookie {
    pub fn issued(artifact: SessionArtifact, policy: CookiePolicy) -> Self {
        Self { value: artifact.into_inner(), max_age_secs: SESSION_TTL.as_secs(), policy }
    }

    /// Expiring variant used on logout. Carries the same scope attributes so the browser
    /// replaces the issued cookie.
    pub fn cleared(policy: CookiePolicy) -> Self {
        Self { value: String::new(), max_age_secs: 0, policy }
    }

    pub fn max_age_secs(&self) -> u64 { self.max_age_secs }

    pub fn render(&self) -> String {
        // HttpOnly is unconditional; Secure follows the deployment
        let secure = if self.policy.secure { "; Secure" } else { "" };
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax{}",
            SESSION_COOKIE, self.value, self.max_age_secs, secure
        )
    }

    pub fn header_value(&self) -> AppResult<HeaderValue> {
        HeaderValue::from_str(&self.render())
            .map_err(|e| AppError::provider("invalid_artifact", format!("artifact not valid in a cookie header: {e}").as_str()))
    }
}

/// Trades identity tokens for session cookies.
///
/// Holds no per-request state; one instance is shared across all requests.
pub struct SessionIssuer {
    minter: Arc<dyn TokenMinter>,
    policy: CookiePolicy,
}

impl SessionIssuer {
    pub fn new(minter: Arc<dyn TokenMinter>, policy: CookiePolicy) -> Self {
        Self { minter, policy }
    }

    pub fn policy(&self) -> CookiePolicy { self.policy }

    /// Validate the raw token, mint an artifact, and build the cookie.
    ///
    /// The cookie only exists once the mint succeeded, so a failed call leaves the client
    /// exactly as it was.
    pub async fn issue(&self, raw_token: Option<String>) -> AppResult<SessionCookie> {
        let Some(token) = IdToken::parse(raw_token) else {
            tprintln!("session.issue rejected: no token");
            return Err(AppError::unauthenticated("no_token", NO_TOKEN_MESSAGE));
        };

        let artifact = match self.minter.mint(&token, SESSION_TTL).await {
            Ok(a) => a,
            Err(e) => {
                error!(target: "session", error = %e, "session mint failed");
                return Err(AppError::provider("mint_failed", e.to_string().as_str()));
            }
        };

        let cookie = SessionCookie::issued(artifact, self.policy);
        // Validate header encoding before reporting success
        cookie.header_value()?;
        info!(target: "session", ttl_secs = SESSION_TTL.as_secs(), secure = self.policy.secure, "session issued");
        Ok(cookie)
    }

    pub fn logout_cookie(&self) -> SessionCookie {
        SessionCookie::cleared(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MintError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        calls: AtomicUsize,
        result: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl TokenMinter for Fixed {
        async fn mint(&self, _token: &IdToken, ttl: Duration) -> Result<SessionArtifact, MintError> {
            assert_eq!(ttl, SESSION_TTL);
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Ok(v) => Ok(SessionArtifact::new(v)),
                Err(r) => Err(MintError::Rejected { status: 400, reason: r.into() }),
            }
        }
    }

    fn issuer(result: Result<&'static str, &'static str>, secure: bool) -> (Arc<Fixed>, SessionIssuer) {
        let m = Arc::new(Fixed { calls: AtomicUsize::new(0), result });
        let iss = SessionIssuer::new(m.clone(), CookiePolicy { secure });
        (m, iss)
    }

    #[test]
    fn ttl_is_five_days() {
        assert_eq!(SESSION_TTL.as_secs(), 432_000);
        assert_eq!(SESSION_TTL.as_millis(), 432_000_000);
    }

    #[test]
    fn renders_dev_cookie_without_secure() {
        let c = SessionCookie::issued(SessionArtifact::new("abc"), CookiePolicy { secure: false });
        assert_eq!(c.render(), "session=abc; Max-Age=432000; Path=/; HttpOnly; SameSite=Lax");
    }

    #[test]
    fn renders_production_cookie_with_secure() {
        let c = SessionCookie::issued(SessionArtifact::new("abc"), CookiePolicy::for_deployment(Deployment::Production));
        assert!(c.render().ends_with("; Secure"));
        assert!(c.render().contains("HttpOnly"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let c = SessionCookie::cleared(CookiePolicy { secure: true });
        assert_eq!(c.max_age_secs(), 0);
        assert_eq!(c.render(), "session=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax; Secure");
    }

    #[tokio::test]
    async fn missing_token_skips_the_provider() {
        let (m, iss) = issuer(Ok("art"), false);
        let err = iss.issue(None).await.unwrap_err();
        assert_eq!(err.http_status(), 401);
        assert_eq!(err.public_message(), NO_TOKEN_MESSAGE);
        let err = iss.issue(Some(String::new())).await.unwrap_err();
        assert_eq!(err.http_status(), 401);
        assert_eq!(m.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_token_is_a_provider_failure() {
        let (m, iss) = issuer(Err("INVALID_ID_TOKEN"), false);
        let err = iss.issue(Some("tok".into())).await.unwrap_err();
        assert_eq!(err.http_status(), 500);
        assert!(err.message().contains("INVALID_ID_TOKEN"));
        assert!(!err.public_message().contains("INVALID_ID_TOKEN"));
        assert_eq!(m.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn artifact_with_control_characters_is_refused() {
        let (_m, iss) = issuer(Ok("bad\nvalue"), false);
        let err = iss.issue(Some("tok".into())).await.unwrap_err();
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn valid_token_yields_cookie() {
        let (m, iss) = issuer(Ok("artifact-1"), true);
        let c = iss.issue(Some("tok".into())).await.unwrap();
        assert!(c.render().starts_with("session=artifact-1;"));
        assert_eq!(m.calls.load(Ordering::SeqCst), 1);
    }
}
