// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `lexgate` binary as a subprocess, pointed at an
//! in-process stub of the chat completions API, and exercises it over HTTP.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `lexgate` binary.
pub fn lexgate_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("lexgate")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// In-process chat completions endpoint answering every request with a
/// fixed message.
#[derive(Clone)]
pub struct StubCompletions {
    reply: Arc<Mutex<String>>,
    calls: Arc<Mutex<usize>>,
}

impl StubCompletions {
    /// Start serving on an ephemeral port. Returns the stub and its base URL.
    pub async fn start(reply: &str) -> anyhow::Result<(Self, String)> {
        let stub =
            Self { reply: Arc::new(Mutex::new(reply.to_owned())), calls: Arc::new(Mutex::new(0)) };
        let router = Router::new()
            .route("/chat/completions", post(Self::handle))
            .with_state(stub.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok((stub, format!("http://{addr}")))
    }

    pub fn set_reply(&self, reply: &str) {
        if let Ok(mut r) = self.reply.lock() {
            *r = reply.to_owned();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }

    async fn handle(State(stub): State<Self>, Json(_body): Json<Value>) -> Json<Value> {
        if let Ok(mut c) = stub.calls.lock() {
            *c += 1;
        }
        let content = stub.reply.lock().map(|r| r.clone()).unwrap_or_default();
        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
    }
}

/// A running `lexgate` process that is killed on drop.
pub struct LexgateProcess {
    child: Child,
    port: u16,
    _db_dir: Option<tempfile::TempDir>,
}

/// Builder for a [`LexgateProcess`].
#[derive(Default)]
pub struct LexgateBuilder {
    completion_url: Option<String>,
    sqlite: bool,
}

impl LexgateBuilder {
    /// Point the server at a completion API (`--completion-url`).
    pub fn completion_url(mut self, url: &str) -> Self {
        self.completion_url = Some(url.to_owned());
        self
    }

    /// Use a fresh SQLite ledger in a temp dir (`--database`).
    pub fn sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub fn spawn(self) -> anyhow::Result<LexgateProcess> {
        ensure_crypto();
        let binary = lexgate_binary();
        anyhow::ensure!(binary.exists(), "lexgate binary not found at {}", binary.display());

        let port = free_port()?;
        let mut args: Vec<String> = vec![
            "--host".into(),
            "127.0.0.1".into(),
            "--port".into(),
            port.to_string(),
            "--token-secret".into(),
            "spec-secret".into(),
            "--completion-api-key".into(),
            "sk-spec".into(),
            "--log-format".into(),
            "text".into(),
            "--log-level".into(),
            "warn".into(),
        ];
        if let Some(url) = self.completion_url {
            args.extend(["--completion-url".into(), url]);
        }

        let db_dir = if self.sqlite {
            let dir = tempfile::tempdir()?;
            let path = dir.path().join("lexgate.db");
            args.extend(["--database".into(), path.to_string_lossy().into_owned()]);
            Some(dir)
        } else {
            None
        };

        let child = Command::new(&binary)
            .args(&args)
            .env_remove("OPENROUTER_API_KEY")
            .env_remove("LEXGATE_DATABASE")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(LexgateProcess { child, port, _db_dir: db_dir })
    }
}

impl LexgateProcess {
    pub fn build() -> LexgateBuilder {
        LexgateBuilder::default()
    }

    /// Spawn lexgate against `completion_url` with an in-memory ledger.
    pub fn start(completion_url: &str) -> anyhow::Result<Self> {
        Self::build().completion_url(completion_url).spawn()
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Poll `/health` until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("lexgate did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Wait for the process to exit within `timeout`.
    pub async fn wait_exit(
        &mut self,
        timeout: Duration,
    ) -> anyhow::Result<std::process::ExitStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("lexgate did not exit within {timeout:?}");
            }
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for LexgateProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Thin JSON client holding an optional bearer token.
pub struct ApiClient {
    base: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: String) -> Self {
        Self { base, token: None, http: reqwest::Client::new() }
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_owned());
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// POST `body` to `path`; returns the status code and parsed body.
    pub async fn post(&self, path: &str, body: Value) -> anyhow::Result<(u16, Value)> {
        let resp =
            self.authed(self.http.post(format!("{}{path}", self.base))).json(&body).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    /// GET `path`; returns the status code and parsed body.
    pub async fn get(&self, path: &str) -> anyhow::Result<(u16, Value)> {
        let resp = self.authed(self.http.get(format!("{}{path}", self.base))).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }
}
