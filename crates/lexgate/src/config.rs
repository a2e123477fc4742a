// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Longest accepted bearer token lifetime: one year.
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Metered legal-assistant API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "lexgate", version, about)]
pub struct ServerConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "LEXGATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5000, env = "LEXGATE_PORT")]
    pub port: u16,

    /// Path to the SQLite ledger database. If unset, accounts live in memory.
    #[arg(long, env = "LEXGATE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Secret used to sign bearer tokens.
    #[arg(long, env = "LEXGATE_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: String,

    /// Bearer token lifetime in seconds.
    #[arg(long, default_value_t = 7 * 24 * 60 * 60, env = "LEXGATE_TOKEN_TTL_SECS")]
    pub token_ttl_secs: u64,

    /// Base URL of the OpenAI-compatible completion API.
    #[arg(long, default_value = "https://openrouter.ai/api/v1", env = "LEXGATE_COMPLETION_URL")]
    pub completion_url: String,

    /// API key for the completion API.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub completion_api_key: Option<String>,

    /// Model identifier sent with each completion request.
    #[arg(long, default_value = "openai/gpt-3.5-turbo", env = "LEXGATE_COMPLETION_MODEL")]
    pub completion_model: String,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.7, env = "LEXGATE_COMPLETION_TEMPERATURE")]
    pub completion_temperature: f32,

    /// Maximum tokens per completion.
    #[arg(long, default_value_t = 2000, env = "LEXGATE_COMPLETION_MAX_TOKENS")]
    pub completion_max_tokens: u32,

    /// Completion request timeout in seconds.
    #[arg(long, default_value_t = 60, env = "LEXGATE_COMPLETION_TIMEOUT_SECS")]
    pub completion_timeout_secs: u64,

    /// Site URL advertised to the completion API as `HTTP-Referer`.
    #[arg(long, default_value = "http://localhost:3000", env = "YOUR_SITE_URL")]
    pub site_url: String,

    /// Log filter (e.g. "info", "lexgate=debug").
    #[arg(long, default_value = "info", env = "LEXGATE_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[arg(long, default_value = "text", env = "LEXGATE_LOG_FORMAT")]
    pub log_format: String,
}

impl ServerConfig {
    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token_secret.trim().is_empty() {
            anyhow::bail!("--token-secret must not be empty");
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            anyhow::bail!("--token-ttl-secs must be between 1 and {MAX_TOKEN_TTL_SECS}");
        }
        if self.completion_timeout_secs == 0 {
            anyhow::bail!("--completion-timeout-secs must be greater than zero");
        }
        match self.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
