use std::error::Error;
use std::fmt;

/// Error type for SQLite store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Storage-level failure (open, query, or write).
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl Error for StoreError {}

/// Error type for catalog import.
#[derive(Debug)]
pub enum ImportError {
    /// The source file could not be opened or read.
    Io(String),
    /// The store rejected a write.
    Store(StoreError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(msg) => write!(f, "csv source error: {}", msg),
            ImportError::Store(e) => write!(f, "import failed: {}", e),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImportError::Store(e) => Some(e),
            ImportError::Io(_) => None,
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(err: StoreError) -> Self {
        ImportError::Store(err)
    }
}
