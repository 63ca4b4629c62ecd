use std::fmt;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::minter::{MintError, TokenMinter};
use super::token::{IdToken, SessionArtifact};

pub const DEFAULT_IDP_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Admin credentials for the identity provider, read once at startup.
#[derive(Clone)]
pub struct ProviderCredentials {
    pub project_id: String,
    pub admin_token: String,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("project_id", &self.project_id)
            .field("admin_token", &"<redacted>")
            .finish()
    }
}

// Wire shapes of the admin createSessionCookie call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest<'a> {
    id_token: &'a str,
    /// Seconds, encoded as a decimal string.
    valid_duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    #[serde(default)]
    session_cookie: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// `TokenMinter` backed by the identity provider's REST admin API.
///
/// Created once at startup and shared for the process lifetime. Request timeouts are
/// enforced by the underlying reqwest client.
pub struct HttpTokenMinter {
    client: reqwest::Client,
    endpoint: Url,
    credentials: ProviderCredentials,
}

impl HttpTokenMinter {
    pub fn new(base_url: &str, credentials: ProviderCredentials, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("While building identity provider HTTP client")?;
        Self::with_client(client, base_url, credentials)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, credentials: ProviderCredentials) -> anyhow::Result<Self> {
        let raw = format!(
            "{}/v1/projects/{}:createSessionCookie",
            base_url.trim_end_matches('/'),
            credentials.project_id
        );
        let endpoint = Url::parse(&raw).with_context(|| format!("Invalid identity provider base url: {}", base_url))?;
        Ok(Self { client, endpoint, credentials })
    }

    pub fn endpoint(&self) -> &Url { &self.endpoint }
}

#[async_trait]
impl TokenMinter for HttpTokenMinter {
    async fn mint(&self, token: &IdToken, ttl: Duration) -> Result<SessionArtifact, MintError> {
        let req = CreateSessionRequest {
            id_token: token.as_str(),
            valid_duration: ttl.as_secs().to_string(),
        };
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.credentials.admin_token)
            .json(&req)
            .send()
            .await
            .map_err(|e| MintError::Transport(e.to_string()))?;

        let status = resp.status();
        debug!(target: "identity", status = status.as_u16(), "createSessionCookie response");
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ProviderErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .and_then(|d| d.message)
                .unwrap_or(text);
            return Err(MintError::Rejected { status: status.as_u16(), reason });
        }

        let body: CreateSessionResponse = resp
            .json()
            .await
            .map_err(|e| MintError::MalformedResponse(e.to_string()))?;
        match body.session_cookie {
            Some(cookie) if !cookie.is_empty() => Ok(SessionArtifact::new(cookie)),
            _ => Err(MintError::MalformedResponse("missing sessionCookie".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> ProviderCredentials {
        ProviderCredentials { project_id: "shop-prod".into(), admin_token: "admin-secret".into() }
    }

    #[test]
    fn endpoint_is_built_from_base_and_project() {
        let m = HttpTokenMinter::with_client(reqwest::Client::new(), "https://idp.example.com/", creds()).unwrap();
        assert_eq!(m.endpoint().as_str(), "https://idp.example.com/v1/projects/shop-prod:createSessionCookie");
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        assert!(HttpTokenMinter::with_client(reqwest::Client::new(), "not a url", creds()).is_err());
    }

    #[test]
    fn credentials_debug_redacts_admin_token() {
        let s = format!("{:?}", creds());
        assert!(s.contains("shop-prod"));
        assert!(!s.contains("admin-secret"));
    }

    #[test]
    fn request_serializes_duration_in_seconds() {
        let req = CreateSessionRequest { id_token: "tok", valid_duration: Duration::from_secs(432_000).as_secs().to_string() };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, serde_json::json!({"idToken": "tok", "validDuration": "432000"}));
    }
}
