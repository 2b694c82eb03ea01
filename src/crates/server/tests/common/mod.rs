//! Common test setup for the HTTP surface integration tests.
//!
//! Tests spin up a real `axum::serve` listener on an ephemeral port rather
//! than driving the router in-process, because gear forwarding
//! (`forwardOutputToGears`) issues genuine outbound `reqwest` calls — a gear
//! configured with `outputUrls: ["/gears/b"]` must resolve against a public
//! origin that actually answers.

use std::sync::Arc;

use llm::null::NullAdapter;
use serde_json::Value;
use server::api::routes::create_router;
use server::config::Config;

/// Spawns the full HTTP surface on an ephemeral localhost port and returns
/// its base URL (`http://127.0.0.1:<port>`), which doubles as the gear
/// processor's configured public origin for resolving relative `outputUrls`.
pub async fn spawn_app() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let mut config = Config::for_tests();
    config.public_origin = Some(base_url.clone());

    let state = server::build_state_with_llm(config, Arc::new(NullAdapter));
    let app = create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    base_url
}

pub struct TestResponse {
    pub status: reqwest::StatusCode,
    pub body: Value,
    pub raw: String,
}

pub async fn post(base_url: &str, path: &str, body: Value) -> TestResponse {
    send(reqwest::Client::new().post(format!("{base_url}{path}")).json(&body)).await
}

pub async fn post_query(base_url: &str, path: &str, query: &str, body: Value) -> TestResponse {
    send(reqwest::Client::new().post(format!("{base_url}{path}?{query}")).json(&body)).await
}

pub async fn put(base_url: &str, path: &str, body: Value) -> TestResponse {
    send(reqwest::Client::new().put(format!("{base_url}{path}")).json(&body)).await
}

pub async fn get(base_url: &str, path: &str) -> TestResponse {
    send(reqwest::Client::new().get(format!("{base_url}{path}"))).await
}

pub async fn delete(base_url: &str, path: &str) -> TestResponse {
    send(reqwest::Client::new().delete(format!("{base_url}{path}"))).await
}

async fn send(builder: reqwest::RequestBuilder) -> TestResponse {
    let response = builder.send().await.unwrap();
    let status = response.status();
    let raw = response.text().await.unwrap();
    let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
    TestResponse { status, body, raw }
}

/// Parses the `data: ...` payloads out of a collected SSE response body, in
/// order, skipping keepalive comment lines.
pub fn sse_data_frames(raw: &str) -> Vec<Value> {
    raw.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|json| serde_json::from_str(json).unwrap())
        .collect()
}
