//! Report module - console tables, heatmaps and the JSON study report

pub mod heatmap;
pub mod study_report;
pub mod summary;

pub use heatmap::*;
pub use study_report::*;
pub use summary::*;
