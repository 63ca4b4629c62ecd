//! Pass-through client for the commerce platform's storefront GraphQL API.
//! The server holds the access token; browsers only ever talk to our proxy route.

use anyhow::Context;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::StorefrontApiConfig;
use crate::error::{AppError, AppResult};

pub const STOREFRONT_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

#[derive(Clone)]
pub struct StorefrontClient {
    client: reqwest::Client,
    endpoint: Url,
    access_token: String,
}

impl StorefrontClient {
    pub fn new(cfg: &StorefrontApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("While building storefront HTTP client")?;
        Self::with_client(client, cfg)
    }

    pub fn with_client(client: reqwest::Client, cfg: &StorefrontApiConfig) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&cfg.endpoint)
            .with_context(|| format!("Invalid storefront endpoint: {}", cfg.endpoint))?;
        Ok(Self { client, endpoint, access_token: cfg.access_token.clone() })
    }

    /// Forward one GraphQL request body and return the upstream status with its JSON body.
    pub async fn execute(&self, body: &Value) -> AppResult<(u16, Value)> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(STOREFRONT_TOKEN_HEADER, &self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "storefront", error = %e, "storefront request failed");
                AppError::upstream("upstream_unreachable", "Upstream error")
            })?;
        let status = resp.status().as_u16();
        debug!(target: "storefront", status, "storefront response");
        let value: Value = resp.json().await.map_err(|e| {
            warn!(target: "storefront", error = %e, status, "storefront returned a non-JSON body");
            AppError::upstream("upstream_invalid_body", "Upstream error")
        })?;
        Ok((status, value))
    }
}
