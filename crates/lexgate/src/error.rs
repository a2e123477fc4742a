// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for the lexgate HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Unauthorized,
    BadRequest,
    InsufficientCredits,
    UpstreamError,
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::BadRequest => 400,
            Self::InsufficientCredits => 402,
            // Upstream failures are deliberately indistinguishable from internal ones.
            Self::UpstreamError => 500,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest => "BAD_REQUEST",
            Self::InsufficientCredits => "INSUFFICIENT_CREDITS",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorResponse {
        ErrorResponse { error: message.into(), code: self.as_str().to_owned() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_error_body(message)))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error envelope returned for every non-402 failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message. Never carries internal detail.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}

/// Body of a 402 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsufficientCreditsResponse {
    pub error: String,
    pub message: String,
    pub credits_remaining: u32,
    pub credits_required: u32,
    pub upgrade_required: bool,
}

impl InsufficientCreditsResponse {
    pub fn new(available: u32, required: u32) -> Self {
        Self {
            error: "Insufficient credits".to_owned(),
            message: "Credits exhausted. Please upgrade to continue.".to_owned(),
            credits_remaining: available,
            credits_required: required,
            upgrade_required: true,
        }
    }

    pub fn into_http_response(self) -> (StatusCode, Json<Self>) {
        (StatusCode::PAYMENT_REQUIRED, Json(self))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
