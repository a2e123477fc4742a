// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream completion API: the collaborator every metered feature calls.

pub mod client;

use async_trait::async_trait;

/// A single system + user exchange sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("completion request timed out")]
    Timeout,
    #[error("completion transport error: {0}")]
    Transport(String),
    #[error("completion API returned HTTP {status}")]
    Status { status: u16 },
    #[error("completion API returned no message content")]
    EmptyReply,
}

/// Produces raw model text for a prompt.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError>;
}
