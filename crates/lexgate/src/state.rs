// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::feature::CostTable;
use crate::gate::CreditGate;
use crate::identity::TokenSigner;
use crate::ledger::Ledger;
use crate::upstream::Completer;

/// Shared server state, handed to every handler behind an `Arc`.
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub gate: CreditGate,
    pub completer: Arc<dyn Completer>,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        completer: Arc<dyn Completer>,
        tokens: TokenSigner,
    ) -> Self {
        let gate = CreditGate::new(Arc::clone(&ledger), CostTable::standard());
        Self { ledger, gate, completer, tokens }
    }
}
