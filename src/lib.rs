pub mod api;
mod book;
mod changes;
mod error;
mod import;
mod mutation;
mod store;

pub use api::{ApiError, AppState};
pub use book::{price_from_rating, Book, ChangedBook, NewBook};
pub use changes::{ChangeMode, ChangeQuery, ChangeSet, DEFAULT_WINDOW_HOURS};
pub use error::{ImportError, StoreError};
pub use import::{CsvImporter, ImportOutcome};
pub use mutation::{FieldChange, MutationEngine, MutationOutcome, TouchedBook};
pub use store::{now_ms, BookStore, BookUpdate};
