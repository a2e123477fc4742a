// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport: account routes, metered feature routes, and auth.

pub mod auth;
pub mod http;
pub mod http_feature;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the axum `Router` with all routes.
///
/// Bearer auth is a route layer on the protected routes only, so unknown
/// paths fall through to 404 without a token.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        // Accounts
        .route("/api/auth/me", get(http::me))
        .route("/api/auth/upgrade", post(http::upgrade))
        .route("/api/auth/usage-history", get(http::usage_history))
        // Metered features
        .route("/api/legal-chat", post(http_feature::legal_chat))
        .route("/api/describe-problem", post(http_feature::describe_problem))
        .route("/api/risk-radar", post(http_feature::risk_radar))
        .route("/api/strategy", post(http_feature::strategy))
        .route("/api/rights", post(http_feature::rights))
        .route("/api/constitution", post(http_feature::constitution))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer));

    Router::new()
        // No auth
        .route("/health", get(http::health))
        .route("/api/auth/register", post(http::register))
        .route("/api/auth/login", post(http::login))
        .merge(protected)
        // Middleware
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
