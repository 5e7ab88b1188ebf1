use crate::constants::{KS_SERIES_TERMS, KS_SERIES_TOLERANCE};
use crate::detector::config::KsMethod;
use crate::errors::DriftError;
use crate::utils::{cmp_f64, gcd};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::fmt::{self, Display};

/// Reason a categorical association test has no defined p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndefinedTest {
    /// Fewer than two categories, so the test has zero degrees of freedom.
    SingleCategory,
    /// A cell of the table has zero expected frequency.
    ZeroExpectedFrequency,
    /// A category occurs in only one of the two datasets.
    UnsharedCategory,
}

impl Display for UndefinedTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedTest::SingleCategory => write!(f, "fewer than two categories"),
            UndefinedTest::ZeroExpectedFrequency => write!(f, "zero expected frequency"),
            UndefinedTest::UnsharedCategory => write!(f, "category present in only one dataset"),
        }
    }
}

/// Category by source counts, over the sorted union of categories.
///
/// Column 0 holds reference counts, column 1 observed counts. A category missing from one
/// source has a zero count in that column.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    categories: Vec<String>,
    counts: Vec<[u64; 2]>,
}

impl ContingencyTable {
    /// Cross-tabulate two label samples.
    pub fn from_samples(reference: &[&str], observed: &[&str]) -> Self {
        let mut tally: HashMap<&str, [u64; 2]> = HashMap::new();
        for &label in reference {
            tally.entry(label).or_insert([0, 0])[0] += 1;
        }
        for &label in observed {
            tally.entry(label).or_insert([0, 0])[1] += 1;
        }
        let mut rows: Vec<(&str, [u64; 2])> = tally.into_iter().collect();
        rows.sort_unstable_by(|a, b| a.0.cmp(b.0));
        let (categories, counts): (Vec<String>, Vec<[u64; 2]>) =
            rows.into_iter().map(|(c, n)| (c.to_string(), n)).unzip();
        ContingencyTable { categories, counts }
    }

    /// Sorted categories.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Per-category `[reference, observed]` counts, aligned with [`Self::categories`].
    pub fn counts(&self) -> &[[u64; 2]] {
        &self.counts
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    /// `[reference, observed]` totals.
    pub fn totals(&self) -> [u64; 2] {
        self.counts
            .iter()
            .fold([0, 0], |acc, c| [acc[0] + c[0], acc[1] + c[1]])
    }

    /// First category (in sorted order) that is absent from one source.
    pub fn unshared_category(&self) -> Option<&str> {
        self.categories
            .iter()
            .zip(self.counts.iter())
            .find(|(_, c)| c[0] == 0 || c[1] == 0)
            .map(|(name, _)| name.as_str())
    }

    /// Normalized frequencies of one source column, summing to one.
    ///
    /// * `column` - 0 for reference, 1 for observed.
    pub fn proportions(&self, column: usize) -> Vec<f64> {
        let total = self.totals()[column];
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|c| c[column] as f64 / total as f64)
            .collect()
    }
}

/// Pearson chi-square test of association on a contingency table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub dof: usize,
    pub p_value: f64,
}

/// Outcome of the association test. An undefined test is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Association {
    Computed(ChiSquareTest),
    Undefined(UndefinedTest),
}

/// Chi-square test of independence between category and source.
///
/// For a table with `k` categories the test has `k - 1` degrees of freedom. When `yates`
/// is set and there is one degree of freedom, every `|observed - expected|` is reduced by
/// `min(0.5, |observed - expected|)` before squaring.
///
/// * `table` - Category by source counts.
/// * `yates` - Whether to apply the continuity correction on 2x2 tables.
pub fn chi2_contingency(table: &ContingencyTable, yates: bool) -> Result<Association, DriftError> {
    if table.n_categories() < 2 {
        return Ok(Association::Undefined(UndefinedTest::SingleCategory));
    }
    let totals = table.totals();
    let n = (totals[0] + totals[1]) as f64;

    let mut expected = Vec::with_capacity(table.n_categories());
    for row in table.counts() {
        let row_total = (row[0] + row[1]) as f64;
        let e = [row_total * totals[0] as f64 / n, row_total * totals[1] as f64 / n];
        if e[0] == 0.0 || e[1] == 0.0 {
            return Ok(Association::Undefined(UndefinedTest::ZeroExpectedFrequency));
        }
        expected.push(e);
    }

    let dof = table.n_categories() - 1;
    let correct = yates && dof == 1;
    let mut statistic = 0.0;
    for (row, e) in table.counts().iter().zip(expected.iter()) {
        for s in 0..2 {
            let mut diff = (row[s] as f64 - e[s]).abs();
            if correct {
                diff -= diff.min(0.5);
            }
            statistic += diff * diff / e[s];
        }
    }

    let dist = ChiSquared::new(dof as f64).map_err(|e| DriftError::Statistics(e.to_string()))?;
    let p_value = dist.sf(statistic).clamp(0.0, 1.0);
    Ok(Association::Computed(ChiSquareTest {
        statistic,
        dof,
        p_value,
    }))
}

/// Two-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KolmogorovSmirnovTest {
    /// Largest absolute difference between the two empirical CDFs.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Method actually used, never `Auto`.
    pub method: KsMethod,
}

/// Two-sided two-sample Kolmogorov-Smirnov test.
///
/// Returns `None` if either sample is empty. Values must not be NaN.
///
/// * `reference` - First sample.
/// * `observed` - Second sample.
/// * `method` - How to compute the p-value.
/// * `exact_max_samples` - Under `KsMethod::Auto`, the largest sample size for which the exact
///   distribution is used.
pub fn ks_2samp(
    reference: &[f64],
    observed: &[f64],
    method: KsMethod,
    exact_max_samples: usize,
) -> Option<KolmogorovSmirnovTest> {
    if reference.is_empty() || observed.is_empty() {
        return None;
    }
    let n1 = reference.len() as u64;
    let n2 = observed.len() as u64;
    let d_scaled = ks_scaled_statistic(reference, observed);
    let statistic = d_scaled as f64 / (n1 as f64 * n2 as f64);

    let method = match method {
        KsMethod::Auto if n1.max(n2) as usize <= exact_max_samples => KsMethod::Exact,
        KsMethod::Auto => KsMethod::Asymptotic,
        m => m,
    };
    let p_value = match method {
        KsMethod::Exact => {
            let g = gcd(n1, n2);
            ks_exact_p_value(n1 as usize, n2 as usize, d_scaled / g, g)
        }
        _ => {
            let en = (n1 as f64 * n2 as f64) / (n1 + n2) as f64;
            let sqrt_en = en.sqrt();
            kolmogorov_sf((sqrt_en + 0.12 + 0.11 / sqrt_en) * statistic)
        }
    };
    Some(KolmogorovSmirnovTest {
        statistic,
        p_value,
        method,
    })
}

/// `max |i * n2 - j * n1|` over all split points, that is `D * n1 * n2` as an integer.
/// Tied values advance both samples together.
fn ks_scaled_statistic(reference: &[f64], observed: &[f64]) -> u64 {
    let mut a = reference.to_vec();
    let mut b = observed.to_vec();
    a.sort_unstable_by(cmp_f64);
    b.sort_unstable_by(cmp_f64);
    let (n1, n2) = (a.len(), b.len());

    let (mut i, mut j) = (0, 0);
    let mut best = 0;
    while i < n1 && j < n2 {
        let x = if a[i] <= b[j] { a[i] } else { b[j] };
        while i < n1 && a[i] <= x {
            i += 1;
        }
        while j < n2 && b[j] <= x {
            j += 1;
        }
        let diff = (i as i128 * n2 as i128 - j as i128 * n1 as i128).unsigned_abs() as u64;
        best = best.max(diff);
    }
    best
}

/// `P(D >= d)` under the null, by walking the lattice of merged orderings.
///
/// A lattice point `(i, j)` stays inside the band when `|i * n2 / g - j * n1 / g| < h`, where `h`
/// is the observed statistic in units of `1 / lcm(n1, n2)`. `v[j]` holds the share of paths to
/// the current point that never left the band.
fn ks_exact_p_value(n1: usize, n2: usize, h: u64, g: u64) -> f64 {
    if h == 0 {
        return 1.0;
    }
    let step_i = n2 as i64 / g as i64;
    let step_j = n1 as i64 / g as i64;
    let inside = |i: usize, j: usize| (i as i64 * step_i - j as i64 * step_j).unsigned_abs() < h;

    let mut v = vec![0.0_f64; n2 + 1];
    v[0] = 1.0;
    for j in 1..=n2 {
        v[j] = if inside(0, j) { v[j - 1] } else { 0.0 };
    }
    for i in 1..=n1 {
        if !inside(i, 0) {
            v[0] = 0.0;
        }
        for j in 1..=n2 {
            v[j] = if inside(i, j) {
                (i as f64 * v[j] + j as f64 * v[j - 1]) / (i + j) as f64
            } else {
                0.0
            };
        }
    }
    (1.0 - v[n2]).clamp(0.0, 1.0)
}

/// Survival function of the Kolmogorov distribution.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    if lambda < 1.18 {
        // Small arguments converge faster through the theta-function form of the CDF.
        let y = (-std::f64::consts::PI.powi(2) / (8.0 * lambda * lambda)).exp();
        let cdf = (2.0 * std::f64::consts::PI).sqrt() / lambda * (y + y.powi(9) + y.powi(25) + y.powi(49));
        return (1.0 - cdf).clamp(0.0, 1.0);
    }
    let mut p = 0.0;
    for k in 1..=KS_SERIES_TERMS {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * (k as f64).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < KS_SERIES_TOLERANCE {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}
