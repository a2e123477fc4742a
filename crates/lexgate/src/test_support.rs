// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode};

use crate::identity::TokenSigner;
use crate::ledger::memory::MemoryLedger;
use crate::ledger::{
    Account, AccountId, Debit, Ledger, NewAccount, PlanTier, StoreError, UsageRecord,
};
use crate::state::AppState;
use crate::upstream::{Completer, CompletionRequest, UpstreamError};

/// Map any displayable error into `anyhow`.
pub trait AnyhowExt<T> {
    fn anyhow(self) -> anyhow::Result<T>;
}

impl<T, E: std::fmt::Display> AnyhowExt<T> for Result<T, E> {
    fn anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}"))
    }
}

/// Register an account with a placeholder password hash.
pub async fn new_account(ledger: &dyn Ledger, email: &str) -> anyhow::Result<Account> {
    Ok(ledger
        .create_account(NewAccount {
            email: email.to_owned(),
            password_hash: format!("test-hash-for-{email}"),
        })
        .await?)
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> anyhow::Result<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {token}")).anyhow()
}

/// Register `email` through the HTTP API and return its bearer token.
pub async fn register(server: &axum_test::TestServer, email: &str) -> anyhow::Result<String> {
    let resp = server
        .post("/api/auth/register")
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = serde_json::from_str(&resp.text())?;
    body["token"].as_str().map(str::to_owned).ok_or_else(|| anyhow::anyhow!("no token in {body}"))
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve_stub(router: axum::Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

/// Completer returning a fixed reply (or failure) and recording requests.
pub struct StubCompleter {
    reply: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubCompleter {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_owned()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self { reply: None, ..Self::replying("") }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

#[async_trait]
impl Completer for StubCompleter {
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.reply.clone().ok_or(UpstreamError::Status { status: 503 })
    }
}

/// Ledger wrapper whose writes can be switched to fail.
pub struct FlakyLedger {
    inner: MemoryLedger,
    fail_debit: AtomicBool,
    fail_append: AtomicBool,
}

impl FlakyLedger {
    pub fn new() -> Self {
        Self {
            inner: MemoryLedger::new(),
            fail_debit: AtomicBool::new(false),
            fail_append: AtomicBool::new(false),
        }
    }

    pub fn fail_debits(&self, on: bool) {
        self.fail_debit.store(on, Ordering::SeqCst);
    }

    pub fn fail_appends(&self, on: bool) {
        self.fail_append.store(on, Ordering::SeqCst);
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("injected failure".to_owned())
    }
}

#[async_trait]
impl Ledger for FlakyLedger {
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        self.inner.create_account(new).await
    }

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        self.inner.find_account(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.inner.find_by_email(email).await
    }

    async fn balance(&self, id: &AccountId) -> Result<u32, StoreError> {
        self.inner.balance(id).await
    }

    async fn try_debit(&self, id: &AccountId, amount: u32) -> Result<Debit, StoreError> {
        if self.fail_debit.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.try_debit(id, amount).await
    }

    async fn upgrade(
        &self,
        id: &AccountId,
        credits: u32,
        tier: PlanTier,
    ) -> Result<Account, StoreError> {
        self.inner.upgrade(id, credits, tier).await
    }

    async fn append_usage(&self, record: UsageRecord) -> Result<(), StoreError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.append_usage(record).await
    }

    async fn recent_usage(
        &self,
        id: &AccountId,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        self.inner.recent_usage(id, limit).await
    }
}

/// Builder for [`AppState`] with in-memory defaults.
pub struct AppStateBuilder {
    ledger: Arc<dyn Ledger>,
    completer: Arc<dyn Completer>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(MemoryLedger::new()),
            completer: Arc::new(StubCompleter::replying("stub reply")),
        }
    }

    pub fn ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn completer(mut self, completer: Arc<dyn Completer>) -> Self {
        self.completer = completer;
        self
    }

    pub fn build(self) -> Arc<AppState> {
        let tokens = TokenSigner::new(b"test-secret", Duration::from_secs(3600));
        Arc::new(AppState::new(self.ledger, self.completer, tokens))
    }
}
