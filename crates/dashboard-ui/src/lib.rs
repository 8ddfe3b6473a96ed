//! Terminal UI layer for the bird dashboard.
//!
//! Provides themes, header, share-bar and density-grid components, chart and
//! table views, the plain-text report, and the interactive application loop
//! built on [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod report;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;
