// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A feature payload and where it came from.
///
/// Both variants carry the same type and serialize identically, so a
/// degraded reply flows through billing and the HTTP layer exactly like a
/// genuine one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The upstream reply parsed into `T`.
    Parsed(T),
    /// The reply was unusable; `T` is the fixed fallback.
    Default(T),
}

impl<T> Outcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Parsed(v) | Self::Default(v) => v,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(_))
    }
}

/// Parse a model reply as JSON `T`, falling back to `fallback()`.
///
/// Surrounding whitespace and a single Markdown code fence are tolerated.
/// Only a reply that is not a JSON object yields [`Outcome::Default`]. An
/// object is laid over the fallback key by key: keys that are missing, or
/// whose value does not fit `T`, keep the fallback's value.
pub fn parse_json_reply<T>(raw: &str, fallback: impl FnOnce() -> T) -> Outcome<T>
where
    T: Serialize + DeserializeOwned,
{
    let base = fallback();
    let Ok(Value::Object(reply)) = serde_json::from_str::<Value>(strip_code_fence(raw)) else {
        return Outcome::Default(base);
    };
    let Ok(mut merged) = serde_json::to_value(&base) else {
        return Outcome::Default(base);
    };

    for (key, value) in reply {
        let mut candidate = merged.clone();
        let mut patch = Map::new();
        patch.insert(key, value);
        overlay(&mut candidate, Value::Object(patch));
        if serde_json::from_value::<T>(candidate.clone()).is_ok() {
            merged = candidate;
        }
    }

    match serde_json::from_value(merged) {
        Ok(v) => Outcome::Parsed(v),
        Err(_) => Outcome::Default(base),
    }
}

/// Merge `patch` into `target`, recursing into objects present in both.
fn overlay(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as "json" up to the first newline.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
