//! Sync API server.
//!
//! Opens (or creates) the book database and serves the HTTP surface until
//! interrupted. Pair with the `modify-books` binary on a cron schedule for a
//! full simulation loop.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookstore_sync::{api, AppState, BookStore};

#[derive(Parser)]
#[command(name = "bookstore-server")]
#[command(about = "Bookstore sync API server")]
#[command(version)]
struct Args {
    /// Database file path
    #[arg(long, default_value = "bookstore.db")]
    db: PathBuf,
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    addr: String,
    /// Catalog CSV consumed by POST /books/load-csv
    #[arg(long, default_value = "data/data.csv")]
    data: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let store = match BookStore::open(&args.db) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("failed to open {}: {}", args.db.display(), e);
            process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(store, args.data));
    info!(addr = %args.addr, db = %args.db.display(), "serving bookstore sync API");
    if let Err(e) = api::serve(state, &args.addr).await {
        eprintln!("server error: {}", e);
        process::exit(1);
    }
}
