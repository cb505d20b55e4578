//! Chart plans for precomputed network-metric reports.
//!
//! A report is decoded into per-category datasets, each chart is classified
//! into an archetype, small pie slices are folded into "Others", and the
//! result is a chart-library configuration ready to draw.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod navigation;
pub mod record;
pub mod render;
pub mod report;

pub use aggregate::{aggregate, AggregatedSlice, OthersPolicy};
pub use classify::{classify, Archetype, ChartSpec};
pub use error::DashError;
pub use record::{ChartData, MetricRecord};
