//! Acknowledgment endpoint behavior.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use bookstore_sync::MutationEngine;

use crate::support::seeded_server;

async fn pending_ids(base: &str) -> Vec<i64> {
    let resp = reqwest::get(format!("{base}/books/changed?mode=pending"))
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    body["changed_books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn mark_synced_drains_pending() {
    let (base, _state, _csv) = seeded_server().await;
    let client = reqwest::Client::new();

    let ids = pending_ids(&base).await;
    assert_eq!(ids.len(), 5);

    let resp = client
        .post(format!("{base}/books/mark-synced"))
        .json(&json!({ "book_ids": ids[..2].to_vec() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["synced_count"], 2);

    let remaining = pending_ids(&base).await;
    assert_eq!(remaining.len(), 3);
    assert!(!remaining.contains(&ids[0]));
    assert!(!remaining.contains(&ids[1]));
}

#[tokio::test]
async fn unknown_ids_are_ignored() {
    let (base, _state, _csv) = seeded_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/books/mark-synced"))
        .json(&json!({ "book_ids": [901, 902, 903] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["synced_count"], 0);
    assert_eq!(pending_ids(&base).await.len(), 5);
}

#[tokio::test]
async fn empty_list_is_ok() {
    let (base, _state, _csv) = seeded_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/books/mark-synced"))
        .json(&json!({ "book_ids": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["synced_count"], 0);
}

#[tokio::test]
async fn non_list_payload_rejected() {
    let (base, _state, _csv) = seeded_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/books/mark-synced"))
        .json(&json!({ "book_ids": "all of them" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn touched_rows_become_pending_again() {
    let (base, state, _csv) = seeded_server().await;
    let client = reqwest::Client::new();

    let ids = pending_ids(&base).await;
    let resp = client
        .post(format!("{base}/books/mark-synced"))
        .json(&json!({ "book_ids": ids }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(pending_ids(&base).await.is_empty());

    // Age past the acknowledgment stamp, then touch everything again.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let mut rng = StdRng::seed_from_u64(11);
    MutationEngine::new(&state.store).run(5, &mut rng).unwrap();

    assert_eq!(pending_ids(&base).await.len(), 5);
}
