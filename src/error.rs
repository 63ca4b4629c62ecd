//! Unified application error model and mapping helpers.
//! One enum is shared by the session issuer, the storefront pass-through and startup
//! configuration, with helpers mapping each kind to an HTTP status and a client-safe body.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Body returned for every server-side failure. Provider and upstream detail stays in the logs.
pub const INTERNAL_ERROR_BODY: &str = "Internal error";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    Unauthenticated { code: String, message: String },
    ProviderFailure { code: String, message: String },
    UserInput { code: String, message: String },
    Upstream { code: String, message: String },
    Unavailable { code: String, message: String },
    Config { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Unauthenticated { code, .. }
            | AppError::ProviderFailure { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Upstream { code, .. }
            | AppError::Unavailable { code, .. }
            | AppError::Config { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthenticated { message, .. }
            | AppError::ProviderFailure { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Upstream { message, .. }
            | AppError::Unavailable { message, .. }
            | AppError::Config { message, .. } => message.as_str(),
        }
    }

    pub fn unauthenticated<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unauthenticated { code: code.into(), message: msg.into() } }
    pub fn provider<S: Into<String>>(code: S, msg: S) -> Self { AppError::ProviderFailure { code: code.into(), message: msg.into() } }
    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn upstream<S: Into<String>>(code: S, msg: S) -> Self { AppError::Upstream { code: code.into(), message: msg.into() } }
    pub fn unavailable<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unavailable { code: code.into(), message: msg.into() } }
    pub fn config<S: Into<String>>(code: S, msg: S) -> Self { AppError::Config { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Unauthenticated { .. } => 401,
            AppError::ProviderFailure { .. } => 500,
            AppError::UserInput { .. } => 400,
            AppError::Upstream { .. } => 502,
            AppError::Unavailable { .. } => 503,
            AppError::Config { .. } => 500,
        }
    }

    /// Text that may be shown to the client.
    ///
    /// Client-facing kinds carry their own message; every server-side kind collapses to
    /// [`INTERNAL_ERROR_BODY`] so provider reasons never reach the response.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Unauthenticated { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Upstream { message, .. }
            | AppError::Unavailable { message, .. } => message.as_str(),
            AppError::ProviderFailure { .. } | AppError::Config { .. } => INTERNAL_ERROR_BODY,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.public_message().to_string(),
        )
            .into_response()
    }
}
