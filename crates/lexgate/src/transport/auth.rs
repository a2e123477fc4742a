// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ErrorCode;
use crate::ledger::{Account, AccountId};
use crate::state::AppState;

/// The caller's account, loaded by [`auth_layer`] and attached as a request
/// extension.
#[derive(Debug, Clone)]
pub struct AuthedAccount(pub Account);

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify the bearer token and resolve it to a stored account.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Account, Response> {
    let token = bearer_token(headers).ok_or_else(|| {
        ErrorCode::Unauthorized.to_http_response("Access token required").into_response()
    })?;

    let id: AccountId = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(err = %e, "rejected bearer token");
        ErrorCode::Unauthorized.to_http_response("Invalid or expired token").into_response()
    })?;

    match state.ledger.find_account(&id).await {
        Ok(Some(account)) => Ok(account),
        Ok(None) => {
            Err(ErrorCode::Unauthorized.to_http_response("User not found").into_response())
        }
        Err(e) => {
            tracing::error!(account = %id, err = %e, "account lookup failed");
            Err(ErrorCode::Internal.to_http_response("Authentication failed").into_response())
        }
    }
}

/// Axum middleware that enforces bearer token authentication. Applied as a
/// route layer, so it only sees requests for protected routes.
pub async fn auth_layer(
    state: State<Arc<AppState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(account) => {
            req.extensions_mut().insert(AuthedAccount(account));
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
