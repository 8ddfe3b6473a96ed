//! Data layer for the bird dashboard.
//!
//! Reads semicolon-delimited observation logs into a normalized
//! [`RecordSet`](dashboard_core::models::RecordSet), filters it by species
//! and date range, and derives the aggregate views shown on the dashboard.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use dashboard_core as core;
