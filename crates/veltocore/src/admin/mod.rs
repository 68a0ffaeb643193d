//! Admin-only reporting over the record store

pub mod reporting;

pub use reporting::{AdminReporting, Stats};
