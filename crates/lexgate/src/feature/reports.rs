// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reply shapes for each feature and their fixed fallbacks.
//!
//! Field names are camelCase on the wire to match what the prompts ask the
//! model to produce.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::feature::outcome::{parse_json_reply, Outcome};

/// A feature payload parsed from a model reply.
pub trait Report: Serialize + DeserializeOwned + Send + 'static {
    /// Payload substituted when the reply does not parse, and the source of
    /// any field the reply leaves out.
    fn fallback() -> Self;

    fn from_reply(raw: &str) -> Outcome<Self> {
        parse_json_reply(raw, Self::fallback)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// Free-form chat answer. The reply text is used verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

impl Report for ChatReply {
    fn fallback() -> Self {
        Self { response: String::new() }
    }

    fn from_reply(raw: &str) -> Outcome<Self> {
        Outcome::Parsed(Self { response: raw.to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: String,
    pub sections: Vec<String>,
    pub next_steps: Vec<String>,
}

impl Report for Classification {
    fn fallback() -> Self {
        Self {
            category: "General Legal Matter".to_owned(),
            sections: strings(&["Unable to determine specific sections"]),
            next_steps: strings(&[
                "Consult with a qualified attorney",
                "Gather relevant documents",
                "Document timeline of events",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub summary: String,
    pub risk_severity: String,
    /// Whatever number the model gave, integer or not.
    pub fairness_score: serde_json::Number,
    pub flagged_clauses: Vec<String>,
    pub improvements: Vec<String>,
    pub actions: Vec<String>,
}

impl Report for RiskReport {
    fn fallback() -> Self {
        Self {
            summary: "Document analysis completed".to_owned(),
            risk_severity: "Medium".to_owned(),
            fairness_score: serde_json::Number::from(50u32),
            flagged_clauses: strings(&["Unable to parse specific clauses"]),
            improvements: strings(&["Review document with legal counsel"]),
            actions: strings(&["Seek professional legal review"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOption {
    pub description: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPlan {
    pub conservative: StrategyOption,
    pub balanced: StrategyOption,
    pub aggressive: StrategyOption,
}

impl Report for StrategyPlan {
    fn fallback() -> Self {
        Self {
            conservative: StrategyOption {
                description: "Seek mediation and negotiate settlement".to_owned(),
                pros: strings(&["Lower cost", "Faster resolution", "Less adversarial"]),
                cons: strings(&["May not get full desired outcome"]),
                timeline: "2-4 months".to_owned(),
            },
            balanced: StrategyOption {
                description: "Prepare for litigation while pursuing settlement".to_owned(),
                pros: strings(&["Flexible approach", "Multiple options"]),
                cons: strings(&["Moderate cost and time"]),
                timeline: "4-8 months".to_owned(),
            },
            aggressive: StrategyOption {
                description: "Immediate litigation with full legal action".to_owned(),
                pros: strings(&["Strong position", "Maximum leverage"]),
                cons: strings(&["High cost", "Time-consuming", "Relationship damage"]),
                timeline: "8-18 months".to_owned(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightsExposure {
    pub affected_rights: Vec<String>,
    pub articles: Vec<String>,
    pub severity_level: String,
    pub explanation: String,
}

impl Report for RightsExposure {
    fn fallback() -> Self {
        Self {
            affected_rights: strings(&["Unable to determine specific rights"]),
            articles: strings(&["Consult constitutional expert"]),
            severity_level: "Medium".to_owned(),
            explanation: "A detailed analysis requires professional legal review.".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstitutionExplainer {
    pub explanation: String,
    pub key_points: Vec<String>,
    pub examples: Vec<String>,
    pub related_provisions: Vec<String>,
}

impl Report for ConstitutionExplainer {
    fn fallback() -> Self {
        Self {
            explanation: "Constitutional provisions require careful interpretation.".to_owned(),
            key_points: strings(&["Consult legal resources", "Seek expert guidance"]),
            examples: strings(&["Context-dependent applications"]),
            related_provisions: strings(&["Multiple provisions may apply"]),
        }
    }
}
