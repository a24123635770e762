//! Campaign A/B Viewer
//!
//! Compares a control and a test marketing campaign: loads both CSV exports,
//! fills missing control metrics with column means, merges the campaigns by
//! date, totals each metric per campaign and charts the comparison either in
//! an egui window or as PNG files.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod report;
pub mod stats;

pub use config::ReportConfig;
pub use report::{AbReport, ReportError};
