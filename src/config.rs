//!
//! storefront configuration
//! -------------------------
//! Startup configuration read once from environment variables and overridden by
//! command-line flags. Identity-provider credentials are mandatory: a missing value
//! fails at startup rather than at the first session request.

use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::identity::{ProviderCredentials, DEFAULT_IDP_BASE_URL};

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_IDP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STOREFRONT_TIMEOUT_SECS: u64 = 10;

/// Where the process is deployed. Only production gets `Secure` cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Production,
    Development,
}

impl Deployment {
    pub fn is_production(self) -> bool { matches!(self, Deployment::Production) }

    fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Deployment::Production,
            _ => Deployment::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    pub base_url: String,
    pub credentials: ProviderCredentials,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct StorefrontApiConfig {
    pub endpoint: String,
    pub access_token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for StorefrontApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontApiConfig")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub http_port: u16,
    pub deployment: Deployment,
    pub identity: IdentityProviderConfig,
    /// None disables the GraphQL pass-through.
    pub storefront: Option<StorefrontApiConfig>,
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    non_empty(lookup, name)
        .ok_or_else(|| AppError::config("missing_env", format!("{} is not set", name).as_str()))
}

fn parse_port_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<Option<u16>> {
    match non_empty(lookup, name) {
        Some(val) => val
            .parse::<u16>()
            .map(Some)
            .map_err(|_| AppError::config("invalid_env", format!("{} must be a port number, got '{}'", name, val).as_str())),
        None => Ok(None),
    }
}

fn parse_timeout_env(lookup: &impl Fn(&str) -> Option<String>, name: &str, default_secs: u64) -> AppResult<Duration> {
    let secs = match non_empty(lookup, name) {
        Some(v) => v
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| AppError::config("invalid_env", format!("{} must be a positive integer, got '{}'", name, v).as_str()))?,
        None => default_secs,
    };
    Ok(Duration::from_secs(secs))
}

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return args[i + 1].parse::<u16>().ok();
        }
        i += 1;
    }
    None
}

fn parse_production_arg(args: &[String]) -> Option<bool> {
    // Last flag wins
    args.iter().rev().find_map(|a| match a.as_str() {
        "--production" => Some(true),
        "--no-production" => Some(false),
        _ => None,
    })
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

pub const USAGE: &str = "storefront Server\n\nUSAGE:\n  storefront_server [--http-port N] [--production|--no-production]\n\nOPTIONS:\n  --http-port N       HTTP port (env: STOREFRONT_HTTP_PORT, default 3000)\n  --production        Emit Secure cookies (env: STOREFRONT_ENV=production)\n  --no-production     Development mode, cookies without Secure\n\nREQUIRED ENVIRONMENT:\n  IDP_PROJECT_ID      Identity provider project id\n  IDP_ADMIN_TOKEN     Identity provider admin credential\n\nOPTIONAL ENVIRONMENT:\n  IDP_BASE_URL              default https://identitytoolkit.googleapis.com\n  IDP_TIMEOUT_SECS          default 10\n  STOREFRONT_BIND           default 0.0.0.0\n  STOREFRONT_GRAPHQL_URL    storefront API endpoint (enables /api/storefront/graphql)\n  STOREFRONT_ACCESS_TOKEN   storefront API access token\n  STOREFRONT_TIMEOUT_SECS   default 10\n";

impl AppConfig {
    /// Load from the process environment and command line.
    pub fn from_env_and_args(args: &[String]) -> AppResult<Self> {
        Self::load(|name| std::env::var(name).ok(), args)
    }

    /// Load from an arbitrary variable lookup. CLI flags override environment values.
    pub fn load(lookup: impl Fn(&str) -> Option<String>, args: &[String]) -> AppResult<Self> {
        let env_port = parse_port_env(&lookup, "STOREFRONT_HTTP_PORT")?;
        let http_port = parse_port_arg(args, "--http-port").or(env_port).unwrap_or(DEFAULT_HTTP_PORT);
        let bind = non_empty(&lookup, "STOREFRONT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());

        let env_deployment = non_empty(&lookup, "STOREFRONT_ENV")
            .or_else(|| non_empty(&lookup, "APP_ENV"))
            .map(|n| Deployment::from_name(&n))
            .unwrap_or(Deployment::Development);
        let deployment = match parse_production_arg(args) {
            Some(true) => Deployment::Production,
            Some(false) => Deployment::Development,
            None => env_deployment,
        };

        let project_id = required(&lookup, "IDP_PROJECT_ID")?;
        let admin_token = required(&lookup, "IDP_ADMIN_TOKEN")?;
        let base_url = non_empty(&lookup, "IDP_BASE_URL").unwrap_or_else(|| DEFAULT_IDP_BASE_URL.to_string());
        let idp_timeout = parse_timeout_env(&lookup, "IDP_TIMEOUT_SECS", DEFAULT_IDP_TIMEOUT_SECS)?;

        let storefront = match (non_empty(&lookup, "STOREFRONT_GRAPHQL_URL"), non_empty(&lookup, "STOREFRONT_ACCESS_TOKEN")) {
            (Some(endpoint), Some(access_token)) => Some(StorefrontApiConfig {
                endpoint,
                access_token,
                timeout: parse_timeout_env(&lookup, "STOREFRONT_TIMEOUT_SECS", DEFAULT_STOREFRONT_TIMEOUT_SECS)?,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(AppError::config("missing_env", "STOREFRONT_ACCESS_TOKEN is not set")),
            (None, Some(_)) => return Err(AppError::config("missing_env", "STOREFRONT_GRAPHQL_URL is not set")),
        };

        Ok(AppConfig {
            bind,
            http_port,
            deployment,
            identity: IdentityProviderConfig {
                base_url,
                credentials: ProviderCredentials { project_id, admin_token },
                timeout: idp_timeout,
            },
            storefront,
        })
    }
}
