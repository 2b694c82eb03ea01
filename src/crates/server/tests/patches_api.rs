//! Patch CRUD and cascade-delete integration tests.

mod common;

use common::{delete, get, post, put, spawn_app};
use reqwest::StatusCode;
use serde_json::json;

fn patch_body(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Test Patch",
        "nodes": [{"id": "a", "kind": "local", "fn": "echoGear"}],
        "edges": [],
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z",
    })
}

#[tokio::test]
async fn create_then_get_patch_round_trips() {
    let base = spawn_app().await;
    let created = post(&base, "/patches", patch_body("p1")).await;
    assert_eq!(created.status, StatusCode::CREATED);

    let fetched = get(&base, "/patches/p1").await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["id"], "p1");
    assert_eq!(fetched.body["nodes"][0]["fn"], "echoGear");
}

#[tokio::test]
async fn create_duplicate_patch_id_conflicts() {
    let base = spawn_app().await;
    post(&base, "/patches", patch_body("dup")).await;
    let second = post(&base, "/patches", patch_body("dup")).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_patches_returns_summaries_not_full_bodies() {
    let base = spawn_app().await;
    post(&base, "/patches", patch_body("p1")).await;

    let listed = get(&base, "/patches").await;
    assert_eq!(listed.status, StatusCode::OK);
    let summaries = listed.body.as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["id"], "p1");
    assert_eq!(summaries[0]["nodeCount"], 1);
    assert_eq!(summaries[0]["edgeCount"], 0);
    assert!(summaries[0].get("nodes").is_none());
}

#[tokio::test]
async fn update_patch_replaces_name_and_nodes() {
    let base = spawn_app().await;
    post(&base, "/patches", patch_body("p1")).await;

    let updated = put(&base, "/patches/p1", json!({"name": "Renamed"})).await;
    assert_eq!(updated.status, StatusCode::OK);

    let fetched = get(&base, "/patches/p1").await;
    assert_eq!(fetched.body["name"], "Renamed");
}

#[tokio::test]
async fn get_missing_patch_is_404() {
    let base = spawn_app().await;
    let resp = get(&base, "/patches/nope").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

/// Deleting a patch cascades into deleting the gears its nodes link to;
/// per-gear cascade failures are logged but never abort the patch deletion
/// itself.
#[tokio::test]
async fn delete_patch_cascades_to_linked_gears() {
    let base = spawn_app().await;
    post(&base, "/gears", json!({"id": "g1"})).await;

    let body = json!({
        "id": "p1",
        "name": "Test Patch",
        "nodes": [{"id": "a", "kind": "http", "url": "http://8.8.8.8/hook", "gearId": "g1"}],
        "edges": [],
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z",
    });
    post(&base, "/patches", body).await;

    let deleted = delete(&base, "/patches/p1").await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["deleted"], true);

    assert_eq!(get(&base, "/patches/p1").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&base, "/gears/g1").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_patch_with_missing_cascade_gear_still_succeeds() {
    let base = spawn_app().await;

    let body = json!({
        "id": "p1",
        "name": "Test Patch",
        "nodes": [{"id": "a", "kind": "http", "url": "http://8.8.8.8/hook", "gearId": "never-created"}],
        "edges": [],
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z",
    });
    post(&base, "/patches", body).await;

    let deleted = delete(&base, "/patches/p1").await;
    assert_eq!(deleted.status, StatusCode::OK);
}
