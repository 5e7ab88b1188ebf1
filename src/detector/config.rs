//! Detector Configuration
//!
//! Defines the configuration structures and enums used by the drift detector,
//! including the KS p-value method, the policy for categories seen on one side only,
//! chart settings, and JSON persistence.
use crate::constants::{
    FIGURE_HEIGHT, FIGURE_WIDTH, KDE_CUT, KDE_GRID_POINTS, KS_EXACT_MAX_SAMPLES, MAX_KDE_CUT, OBSERVED_LABEL,
    REFERENCE_LABEL, SIGNIFICANCE_LEVEL,
};
use crate::errors::DriftError;
use crate::utils::{items_to_strings, validate_float_parameter, validate_open_interval, validate_positive_count};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How the two-sample Kolmogorov-Smirnov p-value is computed.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum KsMethod {
    /// Exact when both samples are small enough, asymptotic otherwise.
    #[default]
    Auto,
    /// Exact null distribution of the statistic.
    Exact,
    /// Limiting Kolmogorov distribution with a small-sample correction.
    Asymptotic,
}

impl FromStr for KsMethod {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Auto" | "auto" => Ok(KsMethod::Auto),
            "Exact" | "exact" => Ok(KsMethod::Exact),
            "Asymptotic" | "asymptotic" | "asymp" => Ok(KsMethod::Asymptotic),
            _ => Err(DriftError::ParseString(
                s.to_string(),
                "KsMethod".to_string(),
                items_to_strings(vec!["Auto", "Exact", "Asymptotic"]),
            )),
        }
    }
}

/// What to do when a category occurs in only one of the two datasets.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum UnsharedCategories {
    /// Treat the table as degenerate and report the fallback p-value.
    #[default]
    NoEvidence,
    /// Run the chi-square test, falling back only when it is mathematically undefined.
    Test,
}

fn default_significance_level() -> f64 {
    SIGNIFICANCE_LEVEL
}
fn default_parallel() -> bool {
    true
}
fn default_num_threads() -> Option<usize> {
    None
}
fn default_ks_exact_max_samples() -> usize {
    KS_EXACT_MAX_SAMPLES
}
fn default_yates_correction() -> bool {
    true
}
fn default_figure_width() -> u32 {
    FIGURE_WIDTH
}
fn default_figure_height() -> u32 {
    FIGURE_HEIGHT
}
fn default_kde_grid_points() -> usize {
    KDE_GRID_POINTS
}
fn default_kde_cut() -> f64 {
    KDE_CUT
}
fn default_reference_label() -> String {
    REFERENCE_LABEL.to_string()
}
fn default_observed_label() -> String {
    OBSERVED_LABEL.to_string()
}

/// Configuration for the `DriftDetector`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// A column has drifted when its p-value is strictly below this level.
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,
    /// Whether to process columns on a thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Number of threads for the column loop, all available cores when `None`.
    #[serde(default = "default_num_threads")]
    pub num_threads: Option<usize>,
    /// Kolmogorov-Smirnov p-value method.
    #[serde(default)]
    pub ks_method: KsMethod,
    /// Largest sample size for which `KsMethod::Auto` uses the exact distribution.
    #[serde(default = "default_ks_exact_max_samples")]
    pub ks_exact_max_samples: usize,
    /// Continuity correction for two-category tables.
    #[serde(default = "default_yates_correction")]
    pub yates_correction: bool,
    /// Policy for categories present in one dataset only.
    #[serde(default)]
    pub unshared_categories: UnsharedCategories,
    /// Chart width in pixels.
    #[serde(default = "default_figure_width")]
    pub figure_width: u32,
    /// Chart height in pixels.
    #[serde(default = "default_figure_height")]
    pub figure_height: u32,
    /// Number of points the density curves are evaluated on.
    #[serde(default = "default_kde_grid_points")]
    pub kde_grid_points: usize,
    /// How many bandwidths the density grid extends past the data.
    #[serde(default = "default_kde_cut")]
    pub kde_cut: f64,
    /// Legend label for the reference data.
    #[serde(default = "default_reference_label")]
    pub reference_label: String,
    /// Legend label for the observed data.
    #[serde(default = "default_observed_label")]
    pub observed_label: String,
}

impl Default for DriftConfig {
    fn default() -> Self {
        DriftConfig {
            significance_level: SIGNIFICANCE_LEVEL,
            parallel: true,
            num_threads: None,
            ks_method: KsMethod::Auto,
            ks_exact_max_samples: KS_EXACT_MAX_SAMPLES,
            yates_correction: true,
            unshared_categories: UnsharedCategories::NoEvidence,
            figure_width: FIGURE_WIDTH,
            figure_height: FIGURE_HEIGHT,
            kde_grid_points: KDE_GRID_POINTS,
            kde_cut: KDE_CUT,
            reference_label: REFERENCE_LABEL.to_string(),
            observed_label: OBSERVED_LABEL.to_string(),
        }
    }
}

impl DriftConfig {
    /// Check every parameter, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), DriftError> {
        validate_open_interval(self.significance_level, 0.0, 1.0, "significance_level")?;
        if let Some(n) = self.num_threads {
            validate_positive_count(n, 1, "num_threads")?;
        }
        validate_positive_count(self.figure_width as usize, 1, "figure_width")?;
        validate_positive_count(self.figure_height as usize, 1, "figure_height")?;
        validate_positive_count(self.kde_grid_points, 2, "kde_grid_points")?;
        validate_float_parameter(self.kde_cut, 0.0, MAX_KDE_CUT, "kde_cut")?;
        Ok(())
    }
}

/// IO
pub trait JsonIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DriftError> {
        fs::write(path, self.json_dump()?).map_err(|e| DriftError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object
    fn json_dump(&self) -> Result<String, DriftError> {
        serde_json::to_string(self).map_err(|e| DriftError::UnableToWrite(e.to_string()))
    }

    /// Load from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, DriftError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| DriftError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, DriftError> {
        let json_str = fs::read_to_string(path).map_err(|e| DriftError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl JsonIO for DriftConfig {}
