//! Request handlers for the sync API.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::error::ApiError;
use super::AppState;
use crate::book::ChangedBook;
use crate::changes::{ChangeMode, ChangeQuery, DEFAULT_WINDOW_HOURS};
use crate::import::CsvImporter;

/// `GET /` - liveness plus a map of the API.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "bookstore sync API is running",
        "endpoints": [
            "GET /books/changed - books changed within a trailing window (?hours=24) or pending sync (?mode=pending)",
            "POST /books/load-csv - import the catalog export",
            "POST /books/mark-synced - acknowledge processed books",
        ],
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangedParams {
    hours: Option<f64>,
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChangedResponse {
    changed_books: Vec<ChangedBook>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    hours_checked: Option<f64>,
    total_books_in_db: u64,
    timestamp: String,
    message: String,
}

/// `GET /books/changed` - the polling consumer's entry point.
pub async fn changed_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChangedParams>,
) -> Result<Json<ChangedResponse>, ApiError> {
    let mode = parse_mode(&params)?;
    let set = ChangeQuery::new(&state.store).run(mode)?;
    let message = match mode {
        ChangeMode::Window { hours } => format!(
            "Found {} books changed in the last {} hours",
            set.books.len(),
            hours
        ),
        ChangeMode::PendingSync => {
            format!("Found {} books that need syncing", set.books.len())
        }
    };
    Ok(Json(ChangedResponse {
        count: set.books.len(),
        changed_books: set.books,
        hours_checked: set.hours_checked,
        total_books_in_db: set.total_books,
        timestamp: Utc::now().to_rfc3339(),
        message,
    }))
}

fn parse_mode(params: &ChangedParams) -> Result<ChangeMode, ApiError> {
    match params.mode.as_deref() {
        None | Some("window") => {
            let hours = params.hours.unwrap_or(DEFAULT_WINDOW_HOURS);
            if !hours.is_finite() || hours < 0.0 {
                return Err(ApiError::BadRequest(
                    "hours must be a non-negative number".into(),
                ));
            }
            Ok(ChangeMode::Window { hours })
        }
        Some("pending") => Ok(ChangeMode::PendingSync),
        Some(other) => Err(ApiError::BadRequest(format!("unknown mode: {}", other))),
    }
}

#[derive(Debug, Serialize)]
pub struct LoadCsvResponse {
    books_loaded: u64,
    skipped: u64,
    message: String,
}

/// `POST /books/load-csv` - bulk import from the configured catalog export.
pub async fn load_csv(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LoadCsvResponse>, ApiError> {
    let outcome = CsvImporter::new(&state.store).import_path(&state.csv_path)?;
    Ok(Json(LoadCsvResponse {
        books_loaded: outcome.imported,
        skipped: outcome.skipped,
        message: format!(
            "Loaded {} books from {}",
            outcome.imported,
            state.csv_path.display()
        ),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MarkSyncedRequest {
    book_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct MarkSyncedResponse {
    synced_count: u64,
    message: String,
}

/// `POST /books/mark-synced` - best-effort acknowledgment. Unknown ids are
/// ignored and an empty list acknowledges nothing; neither is an error.
pub async fn mark_synced(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MarkSyncedRequest>,
) -> Result<Json<MarkSyncedResponse>, ApiError> {
    let synced = ChangeQuery::new(&state.store).acknowledge(&request.book_ids)?;
    info!(
        requested = request.book_ids.len(),
        synced, "books acknowledged"
    );
    Ok(Json(MarkSyncedResponse {
        synced_count: synced,
        message: format!("Marked {} books as synced", synced),
    }))
}
