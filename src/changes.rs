//! Change queries - the polling consumer's read path.
//!
//! Two selectable notions of "changed" behind one interface: a trailing time
//! window over `last_updated`, or the pending-sync set (rows never
//! acknowledged, or touched since their last acknowledgment). Both are
//! legitimate consumer contracts; the caller picks per query.

use crate::book::ChangedBook;
use crate::error::StoreError;
use crate::store::{now_ms, BookStore};

/// Window applied when the caller does not override it.
pub const DEFAULT_WINDOW_HOURS: f64 = 24.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// How the caller wants "changed" interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeMode {
    /// Rows touched within the trailing window.
    Window { hours: f64 },
    /// Rows never acknowledged, or touched since their last acknowledgment.
    PendingSync,
}

/// Result of a change query: the matching rows plus summary metadata.
#[derive(Debug)]
pub struct ChangeSet {
    /// Matching rows, most recently touched first.
    pub books: Vec<ChangedBook>,
    /// Total rows in the store, changed or not.
    pub total_books: u64,
    /// The window actually used, when the query ran in window mode.
    pub hours_checked: Option<f64>,
}

/// Read-side counterpart of the mutation engine, over the same store handle.
pub struct ChangeQuery<'a> {
    store: &'a BookStore,
}

impl<'a> ChangeQuery<'a> {
    pub fn new(store: &'a BookStore) -> Self {
        Self { store }
    }

    /// Run one query in the given mode.
    ///
    /// A zero-hour window returns the empty set; an arbitrarily large one
    /// returns every row. Validation of caller input (negative hours and the
    /// like) is the transport layer's job.
    pub fn run(&self, mode: ChangeMode) -> Result<ChangeSet, StoreError> {
        let books = match mode {
            ChangeMode::Window { hours } => {
                let cutoff = now_ms().saturating_sub((hours * MILLIS_PER_HOUR) as i64);
                self.store.changed_since(cutoff)?
            }
            ChangeMode::PendingSync => self.store.pending_sync()?,
        };
        Ok(ChangeSet {
            books,
            total_books: self.store.book_count()?,
            hours_checked: match mode {
                ChangeMode::Window { hours } => Some(hours),
                ChangeMode::PendingSync => None,
            },
        })
    }

    /// Acknowledge rows the consumer reports as processed.
    ///
    /// Unknown ids are ignored; returns how many rows were actually marked.
    /// Only affects pending-sync queries - window queries key off
    /// `last_updated`, which this never moves.
    pub fn acknowledge(&self, ids: &[i64]) -> Result<u64, StoreError> {
        self.store.mark_synced(ids, now_ms())
    }
}
