// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health and account handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::identity::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::ledger::{
    Account, AccountId, NewAccount, PlanTier, StoreError, UsageRecord, UPGRADE_CREDITS,
    USAGE_HISTORY_LIMIT,
};
use crate::state::AppState;
use crate::transport::auth::AuthedAccount;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Account as shown after register, login, and upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: AccountId,
    pub email: String,
    pub credits_remaining: u32,
    pub plan_type: PlanTier,
}

impl From<Account> for UserSummary {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            credits_remaining: a.credits_remaining,
            plan_type: a.plan_tier,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Account,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpgradeResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsageHistoryResponse {
    pub logs: Vec<UsageRecord>,
}

fn internal(message: &str) -> Response {
    ErrorCode::Internal.to_http_response(message).into_response()
}

fn bad_request(message: &str) -> Response {
    ErrorCode::BadRequest.to_http_response(message).into_response()
}

/// Pull non-empty email and password out of a credentials body.
fn credentials(body: Result<Json<Credentials>, JsonRejection>) -> Option<(String, String)> {
    let Json(c) = body.ok()?;
    let email = c.email.map(|e| e.trim().to_owned()).filter(|e| !e.is_empty())?;
    let password = c.password.filter(|p| !p.is_empty())?;
    Some((email, password))
}

fn issue_session(
    s: &AppState,
    account: Account,
    status: StatusCode,
    message: &str,
    failure: &str,
) -> Response {
    match s.tokens.issue(&account.id) {
        Ok(token) => (
            status,
            Json(SessionResponse {
                message: message.to_owned(),
                token,
                user: UserSummary::from(account),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(account = %account.id, err = %e, "token issue failed");
            internal(failure)
        }
    }
}

// -- Handlers -----------------------------------------------------------------

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_owned(),
        message: "Legal Intelligence API is running".to_owned(),
    })
}

/// `POST /api/auth/register`
pub async fn register(
    State(s): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let Some((email, password)) = credentials(body) else {
        return bad_request("Email and password are required");
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        return bad_request("Password must be at least 6 characters");
    }

    let password_hash = match hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(err = %e, "password hashing failed");
            return internal("Registration failed");
        }
    };

    match s.ledger.create_account(NewAccount { email, password_hash }).await {
        Ok(account) => {
            tracing::info!(account = %account.id, "account registered");
            issue_session(
                &s,
                account,
                StatusCode::CREATED,
                "Registration successful",
                "Registration failed",
            )
        }
        Err(StoreError::EmailTaken) => bad_request("Email already registered"),
        Err(e) => {
            tracing::error!(err = %e, "account creation failed");
            internal("Registration failed")
        }
    }
}

/// `POST /api/auth/login`
pub async fn login(
    State(s): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let Some((email, password)) = credentials(body) else {
        return bad_request("Email and password are required");
    };

    let account = match s.ledger.find_by_email(&email).await {
        Ok(Some(a)) if verify_password(&password, &a.password_hash) => a,
        Ok(_) => {
            return ErrorCode::Unauthorized
                .to_http_response("Invalid email or password")
                .into_response();
        }
        Err(e) => {
            tracing::error!(err = %e, "account lookup failed");
            return internal("Login failed");
        }
    };

    issue_session(&s, account, StatusCode::OK, "Login successful", "Login failed")
}

/// `GET /api/auth/me`
pub async fn me(Extension(AuthedAccount(account)): Extension<AuthedAccount>) -> impl IntoResponse {
    Json(MeResponse { user: account })
}

/// `POST /api/auth/upgrade`: simulated payment. Adds credits and moves the
/// account to the pro tier.
pub async fn upgrade(
    State(s): State<Arc<AppState>>,
    Extension(AuthedAccount(account)): Extension<AuthedAccount>,
) -> Response {
    match s.ledger.upgrade(&account.id, UPGRADE_CREDITS, PlanTier::Pro).await {
        Ok(updated) => {
            tracing::info!(
                account = %updated.id,
                credits = updated.credits_remaining,
                "account upgraded"
            );
            Json(UpgradeResponse {
                message: format!("Upgrade successful! {UPGRADE_CREDITS} credits added."),
                user: UserSummary::from(updated),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(account = %account.id, err = %e, "upgrade failed");
            internal("Upgrade failed")
        }
    }
}

/// `GET /api/auth/usage-history`: newest records first.
pub async fn usage_history(
    State(s): State<Arc<AppState>>,
    Extension(AuthedAccount(account)): Extension<AuthedAccount>,
) -> Response {
    match s.ledger.recent_usage(&account.id, USAGE_HISTORY_LIMIT).await {
        Ok(logs) => Json(UsageHistoryResponse { logs }).into_response(),
        Err(e) => {
            tracing::error!(account = %account.id, err = %e, "usage history read failed");
            internal("Failed to get usage history")
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
