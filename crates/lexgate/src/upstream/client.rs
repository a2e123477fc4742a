// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for an OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::upstream::{Completer, CompletionRequest, UpstreamError};

const APP_TITLE: &str = "AI Legal Intelligence System";

/// Settings for [`CompletionClient`].
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: std::time::Duration,
    pub site_url: String,
}

impl From<&ServerConfig> for CompletionSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            base_url: config.completion_url.trim_end_matches('/').to_owned(),
            api_key: config.completion_api_key.clone(),
            model: config.completion_model.clone(),
            temperature: config.completion_temperature,
            max_tokens: config.completion_max_tokens,
            timeout: config.completion_timeout(),
            site_url: config.site_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client. One instance is shared by all requests.
pub struct CompletionClient {
    settings: CompletionSettings,
    client: Client,
}

impl CompletionClient {
    pub fn new(settings: CompletionSettings) -> Self {
        crate::ensure_crypto();
        let client = Client::builder().timeout(settings.timeout).build().unwrap_or_default();
        if settings.api_key.is_none() {
            tracing::warn!("no completion API key configured; upstream calls will be rejected");
        }
        Self { settings, client }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url)
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

#[async_trait]
impl Completer for CompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let mut req = self
            .client
            .post(self.url())
            .header("HTTP-Referer", &self.settings.site_url)
            .header("X-Title", APP_TITLE)
            .json(&body);
        if let Some(ref key) = self.settings.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16() });
        }
        let parsed: ChatResponse = resp.json().await.map_err(transport_error)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(UpstreamError::EmptyReply)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
