// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the gateway and their HTTP mapping.

use crate::auth::AuthError;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Request-terminating errors. None of these are fatal to the process.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Rate limit exceeded: {limit}")]
    RateLimited { limit: String, retry_after: Duration },

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Whole seconds, rounded up so clients never retry early.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        match self {
            Self::RateLimited { limit, retry_after } => {
                let retry_secs = retry_after_secs(retry_after);
                (
                    status,
                    [(header::RETRY_AFTER, retry_secs.to_string())],
                    Json(ErrorResponse {
                        error: format!("Rate limit exceeded: {limit}"),
                        code,
                        retry_after_secs: Some(retry_secs),
                        field: None,
                    }),
                )
                    .into_response()
            }
            // Same body for missing and invalid signatures
            Self::Unauthorized(_) => (
                status,
                Json(ErrorResponse {
                    error: "Invalid webhook signature".to_string(),
                    code,
                    retry_after_secs: None,
                    field: None,
                }),
            )
                .into_response(),
            Self::Validation(err) => (
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                    code,
                    retry_after_secs: None,
                    field: Some(err.field()),
                }),
            )
                .into_response(),
            Self::MalformedPayload(reason) => (
                status,
                Json(ErrorResponse {
                    error: format!("Malformed payload: {reason}"),
                    code,
                    retry_after_secs: None,
                    field: None,
                }),
            )
                .into_response(),
            Self::Internal(_) => (
                status,
                Json(ErrorResponse {
                    error: "Internal error".to_string(),
                    code,
                    retry_after_secs: None,
                    field: None,
                }),
            )
                .into_response(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;
