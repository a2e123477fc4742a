// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed ledger.
//!
//! Statements run on the blocking pool. The balance check and the decrement
//! are one conditional `UPDATE`, so concurrent debits serialize in SQLite
//! itself regardless of how many connections or processes share the file.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::ledger::{
    Account, AccountId, Debit, Ledger, NewAccount, PlanTier, StoreError, UsageRecord,
};

const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id                TEXT PRIMARY KEY,
    email             TEXT NOT NULL UNIQUE,
    password_hash     TEXT NOT NULL,
    credits_remaining INTEGER NOT NULL CHECK (credits_remaining >= 0),
    plan_type         TEXT NOT NULL,
    created_at        INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS usage_logs (
    id               TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL REFERENCES accounts(id),
    feature_used     TEXT NOT NULL,
    credits_deducted INTEGER NOT NULL CHECK (credits_deducted > 0),
    timestamp        INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS usage_logs_user_time ON usage_logs (user_id, timestamp DESC);
";

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, credits_remaining, plan_type, created_at";

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Ledger persisted to a SQLite database file.
pub struct SqliteLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(conn)
    }

    /// Private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let tx = conn.transaction()?;
        tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
        let version: Option<i64> = tx
            .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
            .optional()?;
        match version {
            None => {
                tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
                tx.execute_batch(SCHEMA)?;
            }
            Some(SCHEMA_VERSION) => {}
            Some(other) => {
                return Err(StoreError::Unavailable(format!(
                    "unsupported ledger schema version {other}"
                )));
            }
        }
        tx.commit()?;

        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("ledger connection poisoned".to_owned()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let plan: String = row.get(4)?;
    let plan_tier = plan.parse::<PlanTier>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Account {
        id: AccountId::from(row.get::<_, String>(0)?),
        email: row.get(1)?,
        password_hash: row.get(2)?,
        credits_remaining: row.get(3)?,
        plan_tier,
        created_at: row.get::<_, i64>(5)? as u64,
    })
}

fn usage_from_row(row: &Row<'_>) -> rusqlite::Result<UsageRecord> {
    Ok(UsageRecord {
        id: row.get(0)?,
        account_id: AccountId::from(row.get::<_, String>(1)?),
        feature: row.get(2)?,
        credits_deducted: row.get(3)?,
        timestamp: row.get::<_, i64>(4)? as u64,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let account = new.into_account();
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO accounts (id, email, password_hash, credits_remaining, plan_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    account.id.as_str(),
                    account.email,
                    account.password_hash,
                    account.credits_remaining,
                    account.plan_tier.as_str(),
                    account.created_at as i64,
                ],
            );
            match inserted {
                Ok(_) => Ok(account),
                Err(e) if is_unique_violation(&e) => Err(StoreError::EmailTaken),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1");
            Ok(conn.query_row(&sql, params![id.as_str()], account_from_row).optional()?)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let email = email.to_owned();
        self.with_conn(move |conn| {
            let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1");
            Ok(conn.query_row(&sql, params![email], account_from_row).optional()?)
        })
        .await
    }

    async fn balance(&self, id: &AccountId) -> Result<u32, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let balance: Option<u32> = conn
                .query_row(
                    "SELECT credits_remaining FROM accounts WHERE id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            balance.ok_or(StoreError::AccountNotFound(id))
        })
        .await
    }

    async fn try_debit(&self, id: &AccountId, amount: u32) -> Result<Debit, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let remaining: Option<u32> = conn
                .query_row(
                    "UPDATE accounts SET credits_remaining = credits_remaining - ?2
                     WHERE id = ?1 AND credits_remaining >= ?2
                     RETURNING credits_remaining",
                    params![id.as_str(), amount],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(remaining) = remaining {
                return Ok(Debit::Applied { remaining });
            }
            // Refused or missing: tell them apart for the caller.
            let available: Option<u32> = conn
                .query_row(
                    "SELECT credits_remaining FROM accounts WHERE id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            match available {
                Some(available) => Ok(Debit::Refused { available }),
                None => Err(StoreError::AccountNotFound(id)),
            }
        })
        .await
    }

    async fn upgrade(
        &self,
        id: &AccountId,
        credits: u32,
        tier: PlanTier,
    ) -> Result<Account, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let sql = format!(
                "UPDATE accounts
                 SET credits_remaining = MIN(credits_remaining + ?2, {max}), plan_type = ?3
                 WHERE id = ?1
                 RETURNING {ACCOUNT_COLUMNS}",
                max = u32::MAX
            );
            let account = conn
                .query_row(&sql, params![id.as_str(), credits, tier.as_str()], account_from_row)
                .optional()?;
            account.ok_or(StoreError::AccountNotFound(id))
        })
        .await
    }

    async fn append_usage(&self, record: UsageRecord) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO usage_logs (id, user_id, feature_used, credits_deducted, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.account_id.as_str(),
                    record.feature,
                    record.credits_deducted,
                    record.timestamp as i64,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_usage(
        &self,
        id: &AccountId,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, feature_used, credits_deducted, timestamp
                 FROM usage_logs WHERE user_id = ?1
                 ORDER BY timestamp DESC, rowid DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![id.as_str(), limit as i64], usage_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
