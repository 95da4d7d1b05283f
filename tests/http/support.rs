//! Shared helpers for the HTTP tests.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::NamedTempFile;

use bookstore_sync::{api, AppState, BookStore};

/// Catalog fixture: five books with ratings 1 through 5.
pub const CATALOG_CSV: &str = "\
isbn13,isbn10,title,subtitle,authors,categories,thumbnail,description,published_year,average_rating,num_pages,ratings_count
9780000000001,0000000001,Book One,,Author One,Fiction,,,2001,1.0,100,10
9780000000002,0000000002,Book Two,,Author Two,Fiction,,,2002,2.0,150,20
9780000000003,0000000003,Book Three,,Author Three,Science,,,2003,3.0,200,30
9780000000004,0000000004,Book Four,,Author Four,Science,,,2004,4.0,250,40
9780000000005,0000000005,Book Five,,Author Five,History,,,2005,5.0,300,50
";

/// Write the catalog fixture to a temp file. Keep the returned handle alive
/// for the duration of the test - the file is deleted on drop.
pub fn catalog_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CATALOG_CSV.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// In-memory state pointed at the given CSV path.
pub fn app_state(csv_path: PathBuf) -> Arc<AppState> {
    Arc::new(AppState::new(BookStore::open_in_memory().unwrap(), csv_path))
}

/// Bind to port 0 and return the base URL.
pub async fn start_server(state: Arc<AppState>) -> String {
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Boot a server with the five-book catalog already imported.
pub async fn seeded_server() -> (String, Arc<AppState>, NamedTempFile) {
    let csv = catalog_file();
    let state = app_state(csv.path().to_path_buf());
    let base = start_server(state.clone()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/books/load-csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    (base, state, csv)
}
