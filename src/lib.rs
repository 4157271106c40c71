//! Turns the Amazon top-50 bestsellers dataset into a four-page PDF of charts.
//!
//! The stages are plain function calls: [`dataset`] loads and validates the
//! CSV, [`features`] derives title statistics, [`aggregate`] and [`charts`]
//! compute and draw the figures, [`builder`] lays them out as PDF pages and
//! [`viewer`] opens the result. [`pipeline::run`] wires them together.

pub mod aggregate;
pub mod builder;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod elements;
pub mod error;
pub mod features;
pub mod fonts;
pub mod model;
pub mod pipeline;
pub mod viewer;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use config::ReportConfig;
pub use error::ReportError;
pub use pipeline::{run, ReportOutcome};
