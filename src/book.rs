//! Book rows and their consumer-facing projections.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A full catalog row, as stored.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: i64,
    pub isbn13: String,
    pub isbn10: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Option<String>,
    pub categories: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i64>,
    pub average_rating: Option<f64>,
    pub num_pages: Option<i64>,
    pub ratings_count: Option<i64>,
    pub stock_quantity: i64,
    pub price: f64,
    /// Unix millis. Advanced on every touch, never set backward.
    pub last_updated: i64,
    /// Unix millis. `None` until the consumer first acknowledges the row.
    pub synced_at: Option<i64>,
}

/// A row to be inserted by the catalog importer.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub isbn13: String,
    pub isbn10: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Option<String>,
    pub categories: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i64>,
    pub average_rating: Option<f64>,
    pub num_pages: Option<i64>,
    pub ratings_count: Option<i64>,
    pub stock_quantity: i64,
    pub price: f64,
}

/// What the polling consumer sees for each changed row.
#[derive(Debug, Clone, Serialize)]
pub struct ChangedBook {
    pub id: i64,
    pub isbn13: String,
    pub title: String,
    pub authors: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    /// The row's last-modified time, rendered as RFC 3339.
    pub changed_at: DateTime<Utc>,
}

/// List price derived from a rating: `rating × 5 + 5`, rounded to cents.
pub fn price_from_rating(rating: f64) -> f64 {
    round2(rating * 5.0 + 5.0)
}

/// Round a currency or rating value to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
