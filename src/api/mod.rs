//! HTTP surface - a thin axum layer over the store, importer, and change query.
//!
//! ## Routes
//!
//! - `GET /` - liveness plus a map of the API.
//! - `GET /books/changed` - changed rows. `?hours=24` selects the trailing
//!   window (window mode, the default); `?mode=pending` selects the
//!   pending-sync set instead.
//! - `POST /books/load-csv` - import the catalog export configured at startup.
//! - `POST /books/mark-synced` - acknowledge processed rows.
//!   Body: `{ "book_ids": [...] }`.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookstore_sync::{api, AppState, BookStore};
//!
//! let store = BookStore::open(Path::new("bookstore.db"))?;
//! let state = Arc::new(AppState::new(store, "data/data.csv".into()));
//!
//! // Get the router to compose with other axum routes
//! let app = api::router(state.clone());
//!
//! // Or serve directly
//! api::serve(state, "127.0.0.1:5000").await?;
//! ```

mod error;
mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::store::BookStore;

pub use error::ApiError;

/// Shared state handed to every handler.
pub struct AppState {
    pub store: BookStore,
    /// Catalog export consumed by `POST /books/load-csv`.
    pub csv_path: PathBuf,
}

impl AppState {
    pub fn new(store: BookStore, csv_path: PathBuf) -> Self {
        Self { store, csv_path }
    }
}

/// Build the axum `Router` over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/books/changed", get(handlers::changed_books))
        .route("/books/load-csv", post(handlers::load_csv))
        .route("/books/mark-synced", post(handlers::mark_synced))
        .with_state(state)
}

/// Serve the API at the given address (e.g. `"127.0.0.1:5000"`).
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
