//! Liveness and import endpoints.

use std::path::PathBuf;

use serde_json::Value;

use crate::support::{app_state, seeded_server, start_server};

#[tokio::test]
async fn index_lists_endpoints() {
    let state = app_state(PathBuf::from("unused.csv"));
    let base = start_server(state).await;

    let resp = reqwest::get(&base).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("running"));
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e.as_str().unwrap().contains("/books/changed")));
    assert!(endpoints.iter().any(|e| e.as_str().unwrap().contains("/books/load-csv")));
    assert!(endpoints.iter().any(|e| e.as_str().unwrap().contains("/books/mark-synced")));
}

#[tokio::test]
async fn load_csv_imports_catalog() {
    let (base, _state, _csv) = seeded_server().await;
    let client = reqwest::Client::new();

    // seeded_server already imported once; a second run skips everything.
    let resp = client
        .post(format!("{base}/books/load-csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["books_loaded"], 0);
    assert_eq!(body["skipped"], 5);

    // Row count is unchanged by the re-run.
    let resp = reqwest::get(format!("{base}/books/changed")).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total_books_in_db"], 5);
}

#[tokio::test]
async fn load_csv_missing_file_is_500() {
    let state = app_state(PathBuf::from("no/such/catalog.csv"));
    let base = start_server(state).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/books/load-csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("csv source error"));
}
