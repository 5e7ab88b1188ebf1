//! Report
//!
//! The detector's output: one test result and one chart per column, in column order.
//! This is the hand-off format for whatever renders the final document, and it
//! round-trips through JSON.
use crate::constants::{IMAGE_MIME_TYPE, P_VALUE_PRECISION};
use crate::detector::config::JsonIO;
use crate::drift::stats::UndefinedTest;
use crate::errors::DriftError;
use crate::utils::{items_to_strings, precision_round};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Statistical test applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// Chi-square test of association between category and dataset.
    CategoricalAssociation,
    /// Two-sample Kolmogorov-Smirnov test.
    DistributionDistance,
}

impl TestKind {
    /// Conventional name of the test.
    pub fn test_name(&self) -> &'static str {
        match self {
            TestKind::CategoricalAssociation => "Chi-Square",
            TestKind::DistributionDistance => "Kolmogorov-Smirnov",
        }
    }
}

impl Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::CategoricalAssociation => write!(f, "categorical-association"),
            TestKind::DistributionDistance => write!(f, "distribution-distance"),
        }
    }
}

impl FromStr for TestKind {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categorical-association" | "Chi-Square" => Ok(TestKind::CategoricalAssociation),
            "distribution-distance" | "Kolmogorov-Smirnov" => Ok(TestKind::DistributionDistance),
            _ => Err(DriftError::ParseString(
                s.to_string(),
                "TestKind".to_string(),
                items_to_strings(vec![
                    "categorical-association",
                    "distribution-distance",
                    "Chi-Square",
                    "Kolmogorov-Smirnov",
                ]),
            )),
        }
    }
}

/// Test outcome for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDriftResult {
    /// Column name.
    pub feature: String,
    pub test_kind: TestKind,
    /// Chi-square statistic or KS distance. Zero when the fallback was taken.
    pub statistic: f64,
    pub p_value: f64,
    /// `p_value < significance_level`.
    pub drifted: bool,
    /// Set when the association test was undefined and the fallback p-value was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<UndefinedTest>,
}

impl ColumnDriftResult {
    /// P-value rounded for display.
    pub fn rounded_p_value(&self) -> f64 {
        precision_round(self.p_value, P_VALUE_PRECISION)
    }
}

impl Display for ColumnDriftResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} p={:.4} drifted={}",
            self.feature,
            self.test_kind.test_name(),
            self.p_value,
            if self.drifted { "Yes" } else { "No" }
        )
    }
}

/// Chart for one column, a base64-encoded PNG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVisualization {
    pub feature: String,
    pub image: String,
}

impl FeatureVisualization {
    pub(crate) fn new(feature: &str, image: String) -> Self {
        FeatureVisualization {
            feature: feature.to_string(),
            image,
        }
    }

    /// MIME type of the decoded image.
    pub fn mime_type(&self) -> &'static str {
        IMAGE_MIME_TYPE
    }

    /// `data:` URI for embedding the chart directly in a document.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", IMAGE_MIME_TYPE, self.image)
    }
}

/// Counts over a whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftSummary {
    pub total_features: usize,
    pub drifted_features: usize,
}

impl DriftSummary {
    /// Whether any column drifted.
    pub fn has_drift(&self) -> bool {
        self.drifted_features > 0
    }

    /// Share of columns that drifted, in `[0, 1]`.
    pub fn drift_share(&self) -> f64 {
        if self.total_features == 0 {
            0.0
        } else {
            self.drifted_features as f64 / self.total_features as f64
        }
    }
}

/// Parallel sequences of results and charts, one pair per column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    significance_level: f64,
    results: Vec<ColumnDriftResult>,
    visualizations: Vec<FeatureVisualization>,
}

impl DriftReport {
    pub(crate) fn new(
        significance_level: f64,
        results: Vec<ColumnDriftResult>,
        visualizations: Vec<FeatureVisualization>,
    ) -> Self {
        debug_assert_eq!(results.len(), visualizations.len());
        DriftReport {
            significance_level,
            results,
            visualizations,
        }
    }

    /// Level the verdicts were taken at.
    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    pub fn results(&self) -> &[ColumnDriftResult] {
        &self.results
    }

    pub fn visualizations(&self) -> &[FeatureVisualization] {
        &self.visualizations
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result and chart for a column.
    pub fn get(&self, feature: &str) -> Option<(&ColumnDriftResult, &FeatureVisualization)> {
        self.iter().find(|(r, _)| r.feature == feature)
    }

    /// Result and chart pairs, in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnDriftResult, &FeatureVisualization)> {
        self.results.iter().zip(self.visualizations.iter())
    }

    /// Names of the drifted columns, in column order.
    pub fn drifted_features(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.drifted)
            .map(|r| r.feature.as_str())
            .collect()
    }

    pub fn summary(&self) -> DriftSummary {
        DriftSummary {
            total_features: self.results.len(),
            drifted_features: self.results.iter().filter(|r| r.drifted).count(),
        }
    }

    /// Hand the two sequences to a renderer.
    pub fn into_parts(self) -> (Vec<ColumnDriftResult>, Vec<FeatureVisualization>) {
        (self.results, self.visualizations)
    }
}

impl JsonIO for DriftReport {}
