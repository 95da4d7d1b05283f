//! HTTP surface integration tests.
//!
//! Boots the router on port 0 and exercises it with reqwest.

mod support;

mod basic;
mod synced;
