// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credit gate: balance pre-check, invocation, and post-deduction.
//!
//! The pre-check reads the balance and performs no mutation; it only keeps
//! obviously unaffordable requests away from the upstream API. The
//! authority is the conditional debit in [`CreditGate::settle`]: when two
//! requests race past the pre-check, the one whose debit is refused fails
//! with [`GateError::InsufficientCredits`] and its result is withheld.
//!
//! Storage failures during settlement are logged and swallowed. The
//! upstream call has already happened, so the caller still gets the result.

use std::future::Future;
use std::sync::Arc;

use crate::feature::CostTable;
use crate::ledger::{AccountId, Debit, Ledger, StoreError, UsageRecord};

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: u32, available: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of a metered call.
#[derive(Debug, thiserror::Error)]
pub enum MeteredError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("feature invocation failed: {0}")]
    Invocation(#[source] E),
}

/// Outcome of post-deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Debited; carries the new balance.
    Billed { remaining: u32 },
    /// Billing could not be written. The result is still delivered.
    Unbilled,
}

impl Settlement {
    pub fn credits_remaining(&self) -> Option<u32> {
        match self {
            Self::Billed { remaining } => Some(*remaining),
            Self::Unbilled => None,
        }
    }
}

/// A successful metered call.
#[derive(Debug, Clone)]
pub struct Metered<T> {
    pub value: T,
    pub settlement: Settlement,
}

pub struct CreditGate {
    ledger: Arc<dyn Ledger>,
    costs: CostTable,
}

impl CreditGate {
    pub fn new(ledger: Arc<dyn Ledger>, costs: CostTable) -> Self {
        Self { ledger, costs }
    }

    pub fn cost_of(&self, feature: &str) -> u32 {
        self.costs.cost_of(feature)
    }

    /// Check that `account` can afford `feature`. Returns the resolved cost.
    pub async fn precheck(&self, account: &AccountId, feature: &str) -> Result<u32, GateError> {
        let cost = self.cost_of(feature);
        let available = self.ledger.balance(account).await?;
        if available < cost {
            tracing::info!(account = %account, feature, cost, available, "insufficient credits");
            return Err(GateError::InsufficientCredits { required: cost, available });
        }
        Ok(cost)
    }

    /// Debit `cost` and append the usage record. Call only after the
    /// feature succeeded.
    pub async fn settle(
        &self,
        account: &AccountId,
        feature: &str,
        cost: u32,
    ) -> Result<Settlement, GateError> {
        let remaining = match self.ledger.try_debit(account, cost).await {
            Ok(Debit::Applied { remaining }) => remaining,
            Ok(Debit::Refused { available }) => {
                tracing::info!(
                    account = %account,
                    feature,
                    cost,
                    available,
                    "debit refused after concurrent spend"
                );
                return Err(GateError::InsufficientCredits { required: cost, available });
            }
            Err(e) => {
                tracing::warn!(account = %account, feature, cost, err = %e, "billing write failed; delivering unbilled");
                return Ok(Settlement::Unbilled);
            }
        };

        let record = UsageRecord::new(account.clone(), feature, cost);
        if let Err(e) = self.ledger.append_usage(record).await {
            tracing::warn!(account = %account, feature, cost, err = %e, "usage log append failed");
        }
        tracing::debug!(account = %account, feature, cost, remaining, "credits deducted");
        Ok(Settlement::Billed { remaining })
    }

    /// Pre-check, run `invoke`, and settle on success.
    pub async fn metered<T, E, F, Fut>(
        &self,
        account: &AccountId,
        feature: &str,
        invoke: F,
    ) -> Result<Metered<T>, MeteredError<E>>
    where
        E: std::error::Error + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cost = self.precheck(account, feature).await?;
        let value = invoke().await.map_err(MeteredError::Invocation)?;
        let settlement = self.settle(account, feature, cost).await?;
        Ok(Metered { value, settlement })
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
