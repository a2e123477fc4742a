// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lexgate: credit-metered API server for AI legal-assistance features.

pub mod config;
pub mod error;
pub mod feature;
pub mod gate;
pub mod identity;
pub mod ledger;
pub mod state;
pub mod transport;
pub mod upstream;

#[cfg(test)]
mod test_support;

use std::sync::{Arc, Once};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::identity::TokenSigner;
use crate::ledger::memory::MemoryLedger;
use crate::ledger::sqlite::SqliteLedger;
use crate::ledger::Ledger;
use crate::state::AppState;
use crate::transport::build_router;
use crate::upstream::client::{CompletionClient, CompletionSettings};

/// Install the process-wide rustls crypto provider. Idempotent.
pub fn ensure_crypto() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build shared state from `config`, opening the ledger it names.
pub fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let ledger: Arc<dyn Ledger> = match config.database {
        Some(ref path) => {
            tracing::info!(path = %path.display(), "opening sqlite ledger");
            Arc::new(SqliteLedger::open(path)?)
        }
        None => {
            tracing::warn!("no --database given; accounts will not survive a restart");
            Arc::new(MemoryLedger::new())
        }
    };
    let completer = Arc::new(CompletionClient::new(CompletionSettings::from(config)));
    let tokens = TokenSigner::new(config.token_secret.as_bytes(), config.token_ttl());
    Ok(Arc::new(AppState::new(ledger, completer, tokens)))
}

/// Run the server until `shutdown` is cancelled.
pub async fn serve(
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("lexgate listening on {addr}");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    tracing::info!("lexgate stopped");
    Ok(())
}

/// Run the server until SIGINT or SIGTERM.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&config)?;
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());
    serve(config, state, shutdown).await
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT");
            }
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                tracing::info!("received SIGTERM");
            }
        }
        shutdown.cancel();
    });
}
