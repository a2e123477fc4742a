// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metered features: identifiers, costs, prompts, and reply shapes.

pub mod outcome;
pub mod prompts;
pub mod reports;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::upstream::{Completer, CompletionRequest, UpstreamError};

pub use outcome::Outcome;
pub use reports::Report;

/// Appended to every feature response.
pub const DISCLAIMER: &str =
    "This information is for educational purposes only and does not constitute legal advice.";

/// Cost charged for a feature missing from the cost table.
pub const DEFAULT_COST: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Chat,
    DescribeProblem,
    RiskRadar,
    Strategy,
    Rights,
    Constitution,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Self::Chat,
        Self::DescribeProblem,
        Self::RiskRadar,
        Self::Strategy,
        Self::Rights,
        Self::Constitution,
    ];

    /// Identifier used for pricing and usage records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::DescribeProblem => "describe-problem",
            Self::RiskRadar => "risk-radar",
            Self::Strategy => "strategy",
            Self::Rights => "rights",
            Self::Constitution => "constitution",
        }
    }

    /// Name of the request body field carrying the user's text.
    pub fn input_field(&self) -> &'static str {
        match self {
            Self::Chat => "message",
            Self::DescribeProblem => "problem",
            Self::RiskRadar => "document",
            Self::Strategy => "situation",
            Self::Rights => "scenario",
            Self::Constitution => "query",
        }
    }

    /// Message returned when the input field is absent or blank.
    pub fn missing_input_message(&self) -> &'static str {
        match self {
            Self::Chat => "Message is required",
            Self::DescribeProblem => "Problem description is required",
            Self::RiskRadar => "Document text is required",
            Self::Strategy => "Situation description is required",
            Self::Rights => "Scenario description is required",
            Self::Constitution => "Query is required",
        }
    }

    /// Generic message returned when the upstream call fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Chat => "Failed to process chat message",
            Self::DescribeProblem => "Failed to classify problem",
            Self::RiskRadar => "Failed to analyze document risk",
            Self::Strategy => "Failed to generate strategies",
            Self::Rights => "Failed to analyze rights exposure",
            Self::Constitution => "Failed to explain constitutional provision",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown feature: {s}"))
    }
}

/// Feature identifier to credit cost. Built once at startup and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct CostTable {
    costs: HashMap<&'static str, u32>,
}

impl CostTable {
    pub fn standard() -> Self {
        let costs = Feature::ALL
            .into_iter()
            .map(|f| {
                let cost = match f {
                    Feature::RiskRadar => 3,
                    Feature::Strategy => 2,
                    Feature::Chat
                    | Feature::DescribeProblem
                    | Feature::Rights
                    | Feature::Constitution => 1,
                };
                (f.as_str(), cost)
            })
            .collect();
        Self { costs }
    }

    /// Cost of `feature`, or [`DEFAULT_COST`] if it is not listed.
    pub fn cost_of(&self, feature: &str) -> u32 {
        self.costs.get(feature).copied().unwrap_or(DEFAULT_COST)
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A feature result as sent to the client.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureResponse<T> {
    #[serde(flatten)]
    pub report: T,
    pub disclaimer: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_remaining: Option<u32>,
}

impl<T> FeatureResponse<T> {
    pub fn new(report: T, credits_remaining: Option<u32>) -> Self {
        Self { report, disclaimer: DISCLAIMER, credits_remaining }
    }
}

/// Run `feature` on `input` and shape the reply as `R`.
///
/// A reply that is not a JSON object is not an error: the result is
/// [`Outcome::Default`] carrying the feature's fixed fallback. Fields an
/// object reply omits or mistypes are taken from that fallback.
pub async fn invoke<R: Report>(
    completer: &dyn Completer,
    feature: Feature,
    input: &str,
) -> Result<Outcome<R>, UpstreamError> {
    let request = CompletionRequest {
        system: prompts::system_message(feature).to_owned(),
        prompt: prompts::user_prompt(feature, input),
    };
    let raw = completer.complete(request).await?;
    let outcome = R::from_reply(&raw);
    if outcome.is_default() {
        tracing::debug!(feature = %feature, "upstream reply did not parse; using default payload");
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
