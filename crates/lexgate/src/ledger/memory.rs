// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process ledger. State is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ledger::{
    Account, AccountId, Debit, Ledger, NewAccount, PlanTier, StoreError, UsageRecord,
};

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
    /// Per account, append-only in chronological order.
    usage: HashMap<AccountId, Vec<UsageRecord>>,
}

/// Ledger backed by a single write lock. Holding the lock across the
/// balance check and the decrement is what makes `try_debit` atomic.
#[derive(Default)]
pub struct MemoryLedger {
    tables: RwLock<Tables>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(&new.email) {
            return Err(StoreError::EmailTaken);
        }
        let account = new.into_account();
        tables.by_email.insert(account.email.clone(), account.id.clone());
        tables.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.tables.read().await.accounts.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.by_email.get(email).and_then(|id| tables.accounts.get(id)).cloned())
    }

    async fn balance(&self, id: &AccountId) -> Result<u32, StoreError> {
        let tables = self.tables.read().await;
        tables
            .accounts
            .get(id)
            .map(|a| a.credits_remaining)
            .ok_or_else(|| StoreError::AccountNotFound(id.clone()))
    }

    async fn try_debit(&self, id: &AccountId, amount: u32) -> Result<Debit, StoreError> {
        let mut tables = self.tables.write().await;
        let account =
            tables.accounts.get_mut(id).ok_or_else(|| StoreError::AccountNotFound(id.clone()))?;
        match account.credits_remaining.checked_sub(amount) {
            Some(remaining) => {
                account.credits_remaining = remaining;
                Ok(Debit::Applied { remaining })
            }
            None => Ok(Debit::Refused { available: account.credits_remaining }),
        }
    }

    async fn upgrade(
        &self,
        id: &AccountId,
        credits: u32,
        tier: PlanTier,
    ) -> Result<Account, StoreError> {
        let mut tables = self.tables.write().await;
        let account =
            tables.accounts.get_mut(id).ok_or_else(|| StoreError::AccountNotFound(id.clone()))?;
        account.credits_remaining = account.credits_remaining.saturating_add(credits);
        account.plan_tier = tier;
        Ok(account.clone())
    }

    async fn append_usage(&self, record: UsageRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.usage.entry(record.account_id.clone()).or_default().push(record);
        Ok(())
    }

    async fn recent_usage(
        &self,
        id: &AccountId,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .usage
            .get(id)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
