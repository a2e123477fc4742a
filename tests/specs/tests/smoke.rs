// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `lexgate` binary.

use std::time::Duration;

use serde_json::json;

use lexgate_specs::{ApiClient, LexgateProcess, StubCompletions};

const TIMEOUT: Duration = Duration::from_secs(10);

async fn signed_up(lexgate: &LexgateProcess, email: &str) -> anyhow::Result<ApiClient> {
    let mut api = ApiClient::new(lexgate.base_url());
    let (status, body) =
        api.post("/api/auth/register", json!({ "email": email, "password": "hunter22" })).await?;
    assert_eq!(status, 201, "register failed: {body}");
    let token = body["token"].as_str().ok_or_else(|| anyhow::anyhow!("no token: {body}"))?;
    api.set_token(token);
    Ok(api)
}

#[tokio::test]
async fn health_needs_no_token() -> anyhow::Result<()> {
    let (_stub, url) = StubCompletions::start("unused").await?;
    let lexgate = LexgateProcess::start(&url)?;
    lexgate.wait_healthy(TIMEOUT).await?;

    let (status, body) = ApiClient::new(lexgate.base_url()).get("/health").await?;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn credits_count_down_to_payment_required() -> anyhow::Result<()> {
    let (stub, url) = StubCompletions::start("You may have a claim.").await?;
    let lexgate = LexgateProcess::start(&url)?;
    lexgate.wait_healthy(TIMEOUT).await?;
    let api = signed_up(&lexgate, "journey@example.com").await?;

    for expected in (11..=19).rev() {
        let (status, body) =
            api.post("/api/legal-chat", json!({ "message": "Is this legal?" })).await?;
        assert_eq!(status, 200);
        assert_eq!(body["response"], "You may have a claim.");
        assert_eq!(body["credits_remaining"], expected);
    }

    stub.set_reply("not json at all");
    let (status, body) = api.post("/api/risk-radar", json!({ "document": "NDA" })).await?;
    assert_eq!(status, 200);
    assert_eq!(body["credits_remaining"], 8);
    assert!(body["flaggedClauses"].is_array());

    // 8 -> 2, then risk-radar no longer fits.
    for _ in 0..2 {
        let (status, _) = api.post("/api/risk-radar", json!({ "document": "NDA" })).await?;
        assert_eq!(status, 200);
    }
    let calls_before = stub.calls();
    let (status, body) = api.post("/api/risk-radar", json!({ "document": "NDA" })).await?;
    assert_eq!(status, 402);
    assert_eq!(body["credits_remaining"], 2);
    assert_eq!(body["credits_required"], 3);
    assert_eq!(body["upgrade_required"], true);
    assert_eq!(stub.calls(), calls_before);

    let (status, body) = api.post("/api/auth/upgrade", json!({})).await?;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["credits_remaining"], 102);
    assert_eq!(body["user"]["plan_type"], "pro");

    let (status, body) = api.get("/api/auth/usage-history").await?;
    assert_eq!(status, 200);
    assert_eq!(body["logs"].as_array().map(Vec::len), Some(12));
    assert_eq!(body["logs"][0]["feature_used"], "risk-radar");
    Ok(())
}

#[tokio::test]
async fn concurrent_requests_never_overdraw() -> anyhow::Result<()> {
    let (_stub, url) = StubCompletions::start(r#"{"conservative":{},"balanced":{},"aggressive":{}}"#).await?;
    let lexgate = LexgateProcess::build().completion_url(&url).sqlite().spawn()?;
    lexgate.wait_healthy(TIMEOUT).await?;
    let api = std::sync::Arc::new(signed_up(&lexgate, "race@example.com").await?);

    // 20 credits; strategy costs 2, so at most 10 of 16 can succeed.
    let mut handles = Vec::new();
    for _ in 0..16 {
        let api = std::sync::Arc::clone(&api);
        handles.push(tokio::spawn(async move {
            api.post("/api/strategy", json!({ "situation": "dispute" })).await
        }));
    }
    let mut ok = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await??.0 {
            200 => ok += 1,
            402 => refused += 1,
            other => anyhow::bail!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 10);
    assert_eq!(refused, 6);

    let (_, me) = api.get("/api/auth/me").await?;
    assert_eq!(me["user"]["credits_remaining"], 0);
    Ok(())
}

#[tokio::test]
async fn sigterm_shuts_down_cleanly() -> anyhow::Result<()> {
    let (_stub, url) = StubCompletions::start("unused").await?;
    let mut lexgate = LexgateProcess::start(&url)?;
    lexgate.wait_healthy(TIMEOUT).await?;

    let status = std::process::Command::new("kill")
        .args(["-TERM", &lexgate.pid().to_string()])
        .status()?;
    assert!(status.success());

    let exit = lexgate.wait_exit(TIMEOUT).await?;
    assert!(exit.success(), "exit status: {exit:?}");
    Ok(())
}
