//! Randomized catalog mutation - simulates e-commerce activity.
//!
//! Each run picks rows without replacement and rolls three independent dice
//! per row: price (80%), stock (60%), rating (20%). Every picked row is
//! touched whether or not any die lands - consumers poll by timestamp, so a
//! touch is a change even when no value moved.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::book::round2;
use crate::error::StoreError;
use crate::store::{now_ms, BookStore, BookUpdate};

/// Price bounds after a perturbation.
const PRICE_MIN: f64 = 5.0;
const PRICE_MAX: f64 = 100.0;

/// Rating bounds after a perturbation.
const RATING_MIN: f64 = 0.0;
const RATING_MAX: f64 = 5.0;

/// One adjusted field on a touched row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Price { from: f64, to: f64 },
    Stock { from: i64, to: i64 },
    Rating { to: f64 },
}

/// A touched row and whatever adjustments landed on it.
///
/// `changes` may be empty: the row was still touched.
#[derive(Debug, Clone)]
pub struct TouchedBook {
    pub id: i64,
    pub title: String,
    pub changes: Vec<FieldChange>,
}

/// Summary of one mutation run.
#[derive(Debug, Default)]
pub struct MutationOutcome {
    pub touched: Vec<TouchedBook>,
    pub price_changes: usize,
    pub stock_changes: usize,
    pub rating_changes: usize,
}

/// Applies randomized perturbations against an explicit store handle.
pub struct MutationEngine<'a> {
    store: &'a BookStore,
}

impl<'a> MutationEngine<'a> {
    pub fn new(store: &'a BookStore) -> Self {
        Self { store }
    }

    /// Touch up to `count` randomly chosen rows.
    ///
    /// Selection is without replacement, via an explicit shuffle-and-slice
    /// over the full id set (`choose_multiple`). `count` is bounded to the
    /// population; zero is a valid no-op. Each row commits independently,
    /// and a storage failure aborts the run - no retries.
    pub fn run(&self, count: usize, rng: &mut impl Rng) -> Result<MutationOutcome, StoreError> {
        let mut outcome = MutationOutcome::default();
        if count == 0 {
            return Ok(outcome);
        }

        let ids = self.store.book_ids()?;
        let picked: Vec<i64> = ids.choose_multiple(rng, count).copied().collect();

        for id in picked {
            let book = match self.store.get_book(id)? {
                Some(book) => book,
                None => continue,
            };

            let mut update = BookUpdate::default();
            let mut changes = Vec::new();

            if rng.gen_bool(0.8) {
                let to = perturb_price(book.price, rng);
                update.price = Some(to);
                changes.push(FieldChange::Price {
                    from: book.price,
                    to,
                });
                outcome.price_changes += 1;
            }
            if rng.gen_bool(0.6) {
                let to = perturb_stock(book.stock_quantity, rng);
                update.stock_quantity = Some(to);
                changes.push(FieldChange::Stock {
                    from: book.stock_quantity,
                    to,
                });
                outcome.stock_changes += 1;
            }
            if rng.gen_bool(0.2) {
                let to = perturb_rating(book.average_rating, rng);
                update.average_rating = Some(to);
                changes.push(FieldChange::Rating { to });
                outcome.rating_changes += 1;
            }

            self.store.apply_update(id, &update, now_ms())?;
            outcome.touched.push(TouchedBook {
                id,
                title: book.title,
                changes,
            });
        }
        Ok(outcome)
    }
}

/// Shift price by ±5–15%, rounded to cents, kept within [$5, $100].
fn perturb_price(price: f64, rng: &mut impl Rng) -> f64 {
    let magnitude = rng.gen_range(0.05..=0.15);
    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    round2(price * (1.0 + direction * magnitude)).clamp(PRICE_MIN, PRICE_MAX)
}

/// A sale of 1–10 units (70%) or a restock of 5–20 (30%), floored at zero.
fn perturb_stock(stock: i64, rng: &mut impl Rng) -> i64 {
    let delta = if rng.gen_bool(0.7) {
        rng.gen_range(-10..=-1)
    } else {
        rng.gen_range(5..=20)
    };
    (stock + delta).max(0)
}

/// Nudge an existing rating by ±0.3 within [0, 5]; give unrated rows a
/// fresh value in [3.0, 4.5].
fn perturb_rating(rating: Option<f64>, rng: &mut impl Rng) -> f64 {
    match rating {
        Some(r) => round2((r + rng.gen_range(-0.3..=0.3)).clamp(RATING_MIN, RATING_MAX)),
        None => round2(rng.gen_range(3.0..=4.5)),
    }
}
