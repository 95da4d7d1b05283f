//! Bulk catalog import from a CSV export.
//!
//! Row semantics follow the one-time import contract: stock starts at 10,
//! price is derived from the rating (`rating × 5 + 5`), and a missing rating
//! is taken as 3.0. Re-running the import is idempotent - rows whose ISBN is
//! already present are skipped, never replaced, so ids stay stable.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::book::{price_from_rating, NewBook};
use crate::error::ImportError;
use crate::store::{now_ms, BookStore};

/// Stock assigned to every imported row.
const DEFAULT_STOCK: i64 = 10;
/// Rating assumed when the source row has none; keeps the derived price at $20.
const DEFAULT_RATING: f64 = 3.0;

/// One row of the catalog export.
#[derive(Debug, Deserialize)]
struct CsvBook {
    #[serde(default)]
    isbn13: String,
    #[serde(default)]
    isbn10: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    authors: Option<String>,
    #[serde(default)]
    categories: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published_year: Option<i64>,
    #[serde(default)]
    average_rating: Option<f64>,
    #[serde(default)]
    num_pages: Option<i64>,
    #[serde(default)]
    ratings_count: Option<i64>,
}

/// Counts from one import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Rows newly inserted.
    pub imported: u64,
    /// Rows skipped: ISBN already present, missing key fields, or unparseable.
    pub skipped: u64,
}

/// Reads a catalog export into an explicit store handle.
pub struct CsvImporter<'a> {
    store: &'a BookStore,
}

impl<'a> CsvImporter<'a> {
    pub fn new(store: &'a BookStore) -> Self {
        Self { store }
    }

    /// Import from a CSV file on disk.
    pub fn import_path(&self, path: &Path) -> Result<ImportOutcome, ImportError> {
        let file = File::open(path)
            .map_err(|e| ImportError::Io(format!("{}: {}", path.display(), e)))?;
        self.import_reader(file)
    }

    /// Import from any CSV reader (first row is the header).
    ///
    /// Unparseable records are skipped with a warning rather than aborting
    /// the run; an I/O failure mid-read is fatal.
    pub fn import_reader<R: Read>(&self, reader: R) -> Result<ImportOutcome, ImportError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut outcome = ImportOutcome::default();
        let now = now_ms();

        for record in csv.deserialize::<CsvBook>() {
            let record = match record {
                Ok(r) => r,
                Err(e) if e.is_io_error() => return Err(ImportError::Io(e.to_string())),
                Err(e) => {
                    warn!(error = %e, "skipping unparseable csv row");
                    outcome.skipped += 1;
                    continue;
                }
            };
            if record.isbn13.trim().is_empty() || record.title.trim().is_empty() {
                warn!("skipping csv row without isbn13 or title");
                outcome.skipped += 1;
                continue;
            }

            let rating = record.average_rating.unwrap_or(DEFAULT_RATING);
            let book = NewBook {
                isbn13: record.isbn13.trim().to_string(),
                isbn10: record.isbn10,
                title: record.title.trim().to_string(),
                subtitle: record.subtitle,
                authors: record.authors,
                categories: record.categories,
                thumbnail: record.thumbnail,
                description: record.description,
                published_year: record.published_year,
                average_rating: Some(rating),
                num_pages: record.num_pages,
                ratings_count: record.ratings_count,
                stock_quantity: DEFAULT_STOCK,
                price: price_from_rating(rating),
            };
            if self.store.insert_book(&book, now)? {
                outcome.imported += 1;
            } else {
                outcome.skipped += 1;
            }
        }

        info!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            "csv import complete"
        );
        Ok(outcome)
    }
}
