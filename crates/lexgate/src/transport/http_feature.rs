// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metered feature handlers.
//!
//! Every handler follows the same path: validate the input field, pass the
//! credit pre-check, call the completion API, settle billing, and return the
//! report with the disclaimer and new balance attached.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::Value;

use crate::error::{ErrorCode, InsufficientCreditsResponse};
use crate::feature::reports::{
    ChatReply, Classification, ConstitutionExplainer, RightsExposure, RiskReport, StrategyPlan,
};
use crate::feature::{self, Feature, FeatureResponse, Report};
use crate::gate::{GateError, MeteredError};
use crate::state::AppState;
use crate::transport::auth::AuthedAccount;

type Body = Result<Json<Value>, JsonRejection>;

/// The feature's input text, if present and not blank.
fn input_text(feature: Feature, body: Body) -> Option<String> {
    let Json(value) = body.ok()?;
    let text = value.get(feature.input_field())?.as_str()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(text.to_owned())
}

async fn run_metered<R: Report>(
    s: &AppState,
    AuthedAccount(account): AuthedAccount,
    feature: Feature,
    body: Body,
) -> Response {
    let Some(input) = input_text(feature, body) else {
        return ErrorCode::BadRequest.to_http_response(feature.missing_input_message()).into_response();
    };

    let result = s
        .gate
        .metered(&account.id, feature.as_str(), || {
            feature::invoke::<R>(s.completer.as_ref(), feature, &input)
        })
        .await;

    match result {
        Ok(metered) => {
            let report = metered.value.into_inner();
            Json(FeatureResponse::new(report, metered.settlement.credits_remaining()))
                .into_response()
        }
        Err(MeteredError::Gate(GateError::InsufficientCredits { required, available })) => {
            InsufficientCreditsResponse::new(available, required).into_http_response().into_response()
        }
        Err(MeteredError::Gate(GateError::Store(e))) => {
            tracing::error!(account = %account.id, feature = %feature, err = %e, "credit check failed");
            ErrorCode::Internal.to_http_response(feature.failure_message()).into_response()
        }
        Err(MeteredError::Invocation(e)) => {
            tracing::warn!(account = %account.id, feature = %feature, err = %e, "upstream call failed");
            ErrorCode::UpstreamError.to_http_response(feature.failure_message()).into_response()
        }
    }
}

/// `POST /api/legal-chat`
pub async fn legal_chat(
    State(s): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedAccount>,
    body: Body,
) -> Response {
    run_metered::<ChatReply>(&s, authed, Feature::Chat, body).await
}

/// `POST /api/describe-problem`
pub async fn describe_problem(
    State(s): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedAccount>,
    body: Body,
) -> Response {
    run_metered::<Classification>(&s, authed, Feature::DescribeProblem, body).await
}

/// `POST /api/risk-radar`
pub async fn risk_radar(
    State(s): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedAccount>,
    body: Body,
) -> Response {
    run_metered::<RiskReport>(&s, authed, Feature::RiskRadar, body).await
}

/// `POST /api/strategy`
pub async fn strategy(
    State(s): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedAccount>,
    body: Body,
) -> Response {
    run_metered::<StrategyPlan>(&s, authed, Feature::Strategy, body).await
}

/// `POST /api/rights`
pub async fn rights(
    State(s): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedAccount>,
    body: Body,
) -> Response {
    run_metered::<RightsExposure>(&s, authed, Feature::Rights, body).await
}

/// `POST /api/constitution`
pub async fn constitution(
    State(s): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedAccount>,
    body: Body,
) -> Response {
    run_metered::<ConstitutionExplainer>(&s, authed, Feature::Constitution, body).await
}

#[cfg(test)]
#[path = "http_feature_tests.rs"]
mod tests;
