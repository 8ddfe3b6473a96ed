//! Shared building blocks for the bird observation dashboard.
//!
//! Holds the observation data model, the error type, command-line settings,
//! date helpers, and number formatting used by every other crate.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
