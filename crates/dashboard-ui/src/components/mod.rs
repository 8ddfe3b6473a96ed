//! Reusable line-producing widgets shared by the dashboard views.

pub mod density_grid;
pub mod header;
pub mod progress_bar;
