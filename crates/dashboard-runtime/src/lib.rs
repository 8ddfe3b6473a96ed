//! Runtime layer for the bird dashboard.
//!
//! Resolves and loads the observation source, and holds the per-session
//! selections that drive each dashboard computation.

pub mod data_manager;
pub mod session;

pub use dashboard_core as core;
pub use dashboard_data as data;
