//! Domain model for trade statistics.
//!
//! # Invariants
//! - A single standalone entity; no foreign keys.
//! - Records are created and deleted, never updated in place.

pub mod trade_record;
