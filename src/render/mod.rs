//! Chart rendering via plotters.

pub mod chart;

pub use chart::render_chart;
