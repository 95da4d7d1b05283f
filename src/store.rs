//! SQLite-backed book store.
//!
//! One table, one handle. The handle owns the connection behind a mutex and
//! is passed explicitly to the mutation engine and the change query service;
//! all coordination between the two flows through the `last_updated` column.
//!
//! Every write takes the caller's clock reading (`now_ms`) rather than
//! sampling a hidden one, which keeps timestamp behavior testable.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::info;

use crate::book::{Book, ChangedBook, NewBook};
use crate::error::StoreError;

/// Current wall-clock time as unix millis, the store's timestamp unit.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Field updates applied to one row. `None` leaves the column alone.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookUpdate {
    pub price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub average_rating: Option<f64>,
}

/// Handle to the book table.
pub struct BookStore {
    conn: Mutex<Connection>,
}

impl BookStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Storage(format!("open {}: {}", path.display(), e)))?;
        Self::init(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        info!("book database ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                isbn13 TEXT UNIQUE NOT NULL,
                isbn10 TEXT,
                title TEXT NOT NULL,
                subtitle TEXT,
                authors TEXT,
                categories TEXT,
                thumbnail TEXT,
                description TEXT,
                published_year INTEGER,
                average_rating REAL,
                num_pages INTEGER,
                ratings_count INTEGER,
                stock_quantity INTEGER NOT NULL DEFAULT 10,
                price REAL NOT NULL DEFAULT 0.0,
                last_updated INTEGER NOT NULL,
                synced_at INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_books_isbn13 ON books(isbn13);
            CREATE INDEX IF NOT EXISTS idx_books_synced ON books(synced_at);
            CREATE INDEX IF NOT EXISTS idx_books_updated ON books(last_updated);
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("connection lock poisoned".into()))
    }

    /// Insert a new row, skipping any ISBN already present.
    ///
    /// Returns `true` if the row was inserted, `false` if it was skipped.
    pub fn insert_book(&self, book: &NewBook, now_ms: i64) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO books
                 (isbn13, isbn10, title, subtitle, authors, categories, thumbnail,
                  description, published_year, average_rating, num_pages, ratings_count,
                  stock_quantity, price, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    book.isbn13,
                    book.isbn10,
                    book.title,
                    book.subtitle,
                    book.authors,
                    book.categories,
                    book.thumbnail,
                    book.description,
                    book.published_year,
                    book.average_rating,
                    book.num_pages,
                    book.ratings_count,
                    book.stock_quantity,
                    book.price,
                    now_ms,
                ],
            )
            .map_err(|e| StoreError::Storage(format!("insert: {}", e)))?;
        Ok(inserted == 1)
    }

    /// All row ids, in no particular order. The mutation engine samples from
    /// this set explicitly rather than leaning on SQL randomness.
    pub fn book_ids(&self) -> Result<Vec<i64>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id FROM books")
            .map_err(|e| StoreError::Storage(format!("ids: {}", e)))?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| StoreError::Storage(format!("ids: {}", e)))?;
        rows.collect::<Result<Vec<i64>, _>>()
            .map_err(|e| StoreError::Storage(format!("ids: {}", e)))
    }

    /// Fetch one full row by id.
    pub fn get_book(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, isbn13, isbn10, title, subtitle, authors, categories, thumbnail,
                    description, published_year, average_rating, num_pages, ratings_count,
                    stock_quantity, price, last_updated, synced_at
             FROM books WHERE id = ?1",
            params![id],
            |row| {
                Ok(Book {
                    id: row.get(0)?,
                    isbn13: row.get(1)?,
                    isbn10: row.get(2)?,
                    title: row.get(3)?,
                    subtitle: row.get(4)?,
                    authors: row.get(5)?,
                    categories: row.get(6)?,
                    thumbnail: row.get(7)?,
                    description: row.get(8)?,
                    published_year: row.get(9)?,
                    average_rating: row.get(10)?,
                    num_pages: row.get(11)?,
                    ratings_count: row.get(12)?,
                    stock_quantity: row.get(13)?,
                    price: row.get(14)?,
                    last_updated: row.get(15)?,
                    synced_at: row.get(16)?,
                })
            },
        )
        .optional()
        .map_err(|e| StoreError::Storage(format!("get: {}", e)))
    }

    /// Total number of rows.
    pub fn book_count(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| StoreError::Storage(format!("count: {}", e)))
    }

    /// Apply field updates to one row and touch it.
    ///
    /// The touch is unconditional and monotonic: `last_updated` advances to
    /// `now_ms` even when `update` is empty, and never moves backward.
    pub fn apply_update(
        &self,
        id: i64,
        update: &BookUpdate,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE books
             SET price = COALESCE(?1, price),
                 stock_quantity = COALESCE(?2, stock_quantity),
                 average_rating = COALESCE(?3, average_rating),
                 last_updated = MAX(last_updated, ?4)
             WHERE id = ?5",
            params![
                update.price,
                update.stock_quantity,
                update.average_rating,
                now_ms,
                id,
            ],
        )
        .map_err(|e| StoreError::Storage(format!("update: {}", e)))?;
        Ok(())
    }

    /// Rows touched at or after `cutoff_ms`, most recent first.
    pub fn changed_since(&self, cutoff_ms: i64) -> Result<Vec<ChangedBook>, StoreError> {
        self.changed_rows(
            "SELECT id, isbn13, title, authors, price, stock_quantity, last_updated
             FROM books WHERE last_updated >= ?1
             ORDER BY last_updated DESC",
            Some(cutoff_ms),
        )
    }

    /// Rows never acknowledged, or touched since their last acknowledgment.
    /// Most recent first.
    pub fn pending_sync(&self) -> Result<Vec<ChangedBook>, StoreError> {
        self.changed_rows(
            "SELECT id, isbn13, title, authors, price, stock_quantity, last_updated
             FROM books WHERE synced_at IS NULL OR last_updated > synced_at
             ORDER BY last_updated DESC",
            None,
        )
    }

    fn changed_rows(
        &self,
        sql: &str,
        cutoff_ms: Option<i64>,
    ) -> Result<Vec<ChangedBook>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| StoreError::Storage(format!("changed: {}", e)))?;
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        };
        let rows = match cutoff_ms {
            Some(cutoff) => stmt.query_map(params![cutoff], map_row),
            None => stmt.query_map([], map_row),
        }
        .map_err(|e| StoreError::Storage(format!("changed: {}", e)))?;

        let mut books = Vec::new();
        for row in rows {
            let (id, isbn13, title, authors, price, stock_quantity, updated_ms) =
                row.map_err(|e| StoreError::Storage(format!("changed: {}", e)))?;
            books.push(ChangedBook {
                id,
                isbn13,
                title,
                authors,
                price,
                stock_quantity,
                changed_at: datetime_from_ms(updated_ms)?,
            });
        }
        Ok(books)
    }

    /// Set `synced_at = now_ms` on each listed row. Ids not present in the
    /// store are silently ignored. `last_updated` is left alone, so this
    /// never makes a row look changed.
    ///
    /// Returns the number of rows actually updated.
    pub fn mark_synced(&self, ids: &[i64], now_ms: i64) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.lock()?;
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "UPDATE books SET synced_at = ? WHERE id IN ({})",
            placeholders
        );
        let updated = conn
            .execute(
                &sql,
                params_from_iter(std::iter::once(now_ms).chain(ids.iter().copied())),
            )
            .map_err(|e| StoreError::Storage(format!("mark_synced: {}", e)))?;
        Ok(updated as u64)
    }
}

fn datetime_from_ms(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| StoreError::Storage(format!("timestamp out of range: {}", ms)))
}
