//! The Inlet Endpoint: triggers a patch run and streams its event sequence
//! back as SSE. Covers the end-to-end scenarios (echo chain, two-node
//! pipeline, cycle rejection) plus the boundary behaviors (empty patch,
//! disallowed host, bad id/body).

mod common;

use common::{post, sse_data_frames, spawn_app};
use reqwest::StatusCode;
use serde_json::json;

fn patch_with_nodes(id: &str, nodes: serde_json::Value, edges: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Test Patch",
        "nodes": nodes,
        "edges": edges,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z",
    })
}

/// Echo chain: a single `echoGear` node returns `{echo: <input>}`.
#[tokio::test]
async fn echo_chain_scenario() {
    let base = spawn_app().await;
    let nodes = json!([{"id": "a", "kind": "local", "fn": "echoGear"}]);
    post(&base, "/patches", patch_with_nodes("p1", nodes, json!([]))).await;

    let resp = post(&base, "/inlet/p1", json!({"msg": "hi"})).await;
    assert_eq!(resp.status, StatusCode::OK);

    let frames = sse_data_frames(&resp.raw);
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[0]["type"], "RunStart");
    assert_eq!(frames[1]["type"], "NodeStart");
    assert_eq!(frames[1]["nodeId"], "a");
    assert_eq!(frames[1]["input"], json!({"msg": "hi"}));
    assert_eq!(frames[2]["type"], "NodeSuccess");
    assert_eq!(frames[2]["output"], json!({"echo": "hi"}));
    assert_eq!(frames[3]["type"], "RunComplete");
}

/// Two-node pipeline: `b`'s input must be `a`'s output, independent of
/// what `b` itself produces.
#[tokio::test]
async fn two_node_pipeline_scenario() {
    let base = spawn_app().await;
    let nodes = json!([
        {"id": "a", "kind": "local", "fn": "echoGear"},
        {"id": "b", "kind": "local", "fn": "echoGear"},
    ]);
    let edges = json!([{"source": "a", "target": "b"}]);
    post(&base, "/patches", patch_with_nodes("p1", nodes, edges)).await;

    let resp = post(&base, "/inlet/p1", json!({"msg": "x"})).await;
    let frames = sse_data_frames(&resp.raw);

    let b_start = frames
        .iter()
        .find(|f| f["type"] == "NodeStart" && f["nodeId"] == "b")
        .expect("node b should have started");
    assert_eq!(b_start["input"], json!({"echo": "x"}));
}

/// A cyclic patch is rejected at startup with a single `error` SSE frame,
/// never a `NodeError`.
#[tokio::test]
async fn cycle_rejection_scenario() {
    let base = spawn_app().await;
    let nodes = json!([
        {"id": "a", "kind": "local", "fn": "echoGear"},
        {"id": "b", "kind": "local", "fn": "echoGear"},
    ]);
    let edges = json!([{"source": "a", "target": "b"}, {"source": "b", "target": "a"}]);
    post(&base, "/patches", patch_with_nodes("p1", nodes, edges)).await;

    let resp = post(&base, "/inlet/p1", json!({})).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.raw.contains("event: error"));

    let frames = sse_data_frames(&resp.raw);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["code"], "CycleDetected");
}

#[tokio::test]
async fn empty_patch_is_just_start_and_complete() {
    let base = spawn_app().await;
    post(&base, "/patches", patch_with_nodes("p1", json!([]), json!([]))).await;

    let resp = post(&base, "/inlet/p1", json!(null)).await;
    let frames = sse_data_frames(&resp.raw);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["type"], "RunStart");
    assert_eq!(frames[1]["type"], "RunComplete");
}

/// An HTTP node with a disallowed URL emits `NodeError` with
/// `DisallowedHost`, which — unlike a startup failure — happens mid-run, so
/// the stream still opens with `RunStart`.
#[tokio::test]
async fn disallowed_host_node_emits_node_error_mid_run() {
    let base = spawn_app().await;
    let nodes = json!([{"id": "a", "kind": "http", "url": "http://127.0.0.1:1/hook"}]);
    post(&base, "/patches", patch_with_nodes("p1", nodes, json!([]))).await;

    let resp = post(&base, "/inlet/p1", json!({})).await;
    let frames = sse_data_frames(&resp.raw);
    assert_eq!(frames[0]["type"], "RunStart");
    assert_eq!(frames[1]["type"], "NodeStart");
    assert_eq!(frames[2]["type"], "NodeError");
    assert!(frames[2]["error"]["message"].as_str().unwrap().contains("disallowed"));
    assert_eq!(frames[3]["type"], "RunComplete");
    assert_eq!(frames.len(), 4);
}

#[tokio::test]
async fn missing_patch_id_is_bad_request() {
    let base = spawn_app().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/inlet/%20"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_json_body_is_bad_request() {
    let base = spawn_app().await;
    post(&base, "/patches", patch_with_nodes("p1", json!([]), json!([]))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/inlet/p1"))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_patch_id_returns_a_single_error_frame_not_a_4xx() {
    let base = spawn_app().await;
    let resp = post(&base, "/inlet/does-not-exist", json!({})).await;
    assert_eq!(resp.status, StatusCode::OK);
    let frames = sse_data_frames(&resp.raw);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["code"], "NotFound");
}

/// Multi-parent fan-in: input is the ordered list of parents' outputs in
/// edge-list order.
#[tokio::test]
async fn fan_in_scenario() {
    let base = spawn_app().await;
    let nodes = json!([
        {"id": "a", "kind": "local", "fn": "identity"},
        {"id": "b", "kind": "local", "fn": "identity"},
        {"id": "c", "kind": "local", "fn": "identity"},
    ]);
    let edges = json!([{"source": "a", "target": "c"}, {"source": "b", "target": "c"}]);
    post(&base, "/patches", patch_with_nodes("p1", nodes, edges)).await;

    let resp = post(&base, "/inlet/p1", json!("seed")).await;
    let frames = sse_data_frames(&resp.raw);
    let c_start = frames.iter().find(|f| f["type"] == "NodeStart" && f["nodeId"] == "c").unwrap();
    assert_eq!(c_start["input"], json!(["seed", "seed"]));
}
