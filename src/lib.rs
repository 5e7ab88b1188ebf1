//! Data drift detection between a reference dataset and live data.
//!
//! Every column shared by the two datasets is tested independently: categorical columns with a
//! chi-square test of association between category and dataset, numeric columns with the
//! two-sample Kolmogorov-Smirnov test. A column has drifted when its p-value falls below the
//! significance level (0.05 by default). Each column also gets a chart comparing the two
//! distributions, embedded in the report as base64 PNG text.

// Modules
pub mod constants;
pub mod data;
pub mod detector;
pub mod drift;
pub mod errors;
pub mod loader;
pub mod plot;
pub mod report;
pub mod utils;

// Individual classes, and functions
pub use data::{Column, ColumnType, ColumnValues, Dataset, Source};
pub use detector::config::{DriftConfig, JsonIO, KsMethod, UnsharedCategories};
pub use detector::core::{detect, DriftDetector};
pub use errors::DriftError;
pub use loader::CsvLoader;
pub use report::{ColumnDriftResult, DriftReport, DriftSummary, FeatureVisualization, TestKind};
