// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account ledger and usage log.
//!
//! The [`Ledger`] trait is the only path to account balances. Every
//! implementation must make [`Ledger::try_debit`] a single atomic
//! check-and-decrement: two concurrent debits against the same account
//! serialize, and a debit that would take the balance below zero is refused
//! rather than applied.

pub mod memory;
pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Balance granted at registration.
pub const STARTING_CREDITS: u32 = 20;

/// Credits added by each upgrade.
pub const UPGRADE_CREDITS: u32 = 100;

/// Number of records returned by usage history.
pub const USAGE_HISTORY_LIMIT: usize = 50;

/// Opaque account identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => anyhow::bail!("invalid plan tier: {other}"),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub credits_remaining: u32,
    #[serde(rename = "plan_type")]
    pub plan_tier: PlanTier,
    /// Creation time as epoch millis.
    pub created_at: u64,
}

/// Fields supplied at registration. The ledger assigns everything else.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

impl NewAccount {
    pub(crate) fn into_account(self) -> Account {
        Account {
            id: AccountId::generate(),
            email: self.email,
            password_hash: self.password_hash,
            credits_remaining: STARTING_CREDITS,
            plan_tier: PlanTier::Free,
            created_at: epoch_ms(),
        }
    }
}

/// One billed feature invocation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique per record; doubles as an idempotency key.
    pub id: String,
    #[serde(rename = "user_id")]
    pub account_id: AccountId,
    #[serde(rename = "feature_used")]
    pub feature: String,
    pub credits_deducted: u32,
    /// Epoch millis.
    pub timestamp: u64,
}

impl UsageRecord {
    pub fn new(account_id: AccountId, feature: impl Into<String>, credits_deducted: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id,
            feature: feature.into(),
            credits_deducted,
            timestamp: epoch_ms(),
        }
    }
}

/// Result of a conditional decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debit {
    /// Balance was decremented; carries the new balance.
    Applied { remaining: u32 },
    /// Balance was too low; nothing changed.
    Refused { available: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),
    #[error("email already registered")]
    EmailTaken,
    #[error("ledger storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent store for accounts and the usage log.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError>;

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Current balance. Fails with [`StoreError::AccountNotFound`] for unknown ids.
    async fn balance(&self, id: &AccountId) -> Result<u32, StoreError>;

    /// Decrement the balance by `amount` only if it would stay non-negative.
    async fn try_debit(&self, id: &AccountId, amount: u32) -> Result<Debit, StoreError>;

    /// Add `credits` and set the plan tier in one update.
    async fn upgrade(
        &self,
        id: &AccountId,
        credits: u32,
        tier: PlanTier,
    ) -> Result<Account, StoreError>;

    async fn append_usage(&self, record: UsageRecord) -> Result<(), StoreError>;

    /// Most recent records for an account, newest first.
    async fn recent_usage(
        &self,
        id: &AccountId,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, StoreError>;
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
