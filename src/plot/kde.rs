//! Gaussian kernel density estimates for the continuous-feature chart.
use crate::constants::DEGENERATE_BANDWIDTH_FRACTION;
use crate::utils::sample_std;
use std::f64::consts::PI;

/// Scott's rule bandwidth, `sd * n^(-1/5)`.
///
/// Returns `None` when the sample has fewer than two values or no spread.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let sd = sample_std(values);
    if values.len() < 2 || sd <= 0.0 || !sd.is_finite() {
        None
    } else {
        Some(sd * (values.len() as f64).powf(-0.2))
    }
}

/// Gaussian kernel density of `values` at `x`.
pub fn gaussian_density(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * PI).sqrt());
    values
        .iter()
        .map(|v| {
            let z = (x - v) / bandwidth;
            (-0.5 * z * z).exp()
        })
        .sum::<f64>()
        * norm
}

/// Two density curves evaluated on one shared grid.
#[derive(Debug, Clone)]
pub struct DensityCurves {
    pub grid: Vec<f64>,
    pub reference: Vec<f64>,
    pub observed: Vec<f64>,
}

impl DensityCurves {
    /// Estimate both densities. The grid runs from `cut` bandwidths below the smallest value to
    /// `cut` bandwidths above the largest, over both samples. Samples must be non-empty.
    ///
    /// Returns `None` when the grid or a density value is not finite, as happens with infinite
    /// values or a spread too wide for `f64`.
    ///
    /// * `reference` - Reference values.
    /// * `observed` - Observed values.
    /// * `grid_points` - Number of evaluation points, at least two.
    /// * `cut` - Grid extension in bandwidths.
    pub fn estimate(reference: &[f64], observed: &[f64], grid_points: usize, cut: f64) -> Option<Self> {
        let (ref_min, ref_max) = min_max(reference);
        let (obs_min, obs_max) = min_max(observed);
        let span = ref_max.max(obs_max) - ref_min.min(obs_min);
        let fallback = if span > 0.0 {
            span * DEGENERATE_BANDWIDTH_FRACTION
        } else {
            (ref_min.abs() * DEGENERATE_BANDWIDTH_FRACTION).max(DEGENERATE_BANDWIDTH_FRACTION)
        };
        let ref_bw = scott_bandwidth(reference).unwrap_or(fallback);
        let obs_bw = scott_bandwidth(observed).unwrap_or(fallback);

        let mut lo = (ref_min - cut * ref_bw).min(obs_min - cut * obs_bw);
        let mut hi = (ref_max + cut * ref_bw).max(obs_max + cut * obs_bw);
        if !(lo.is_finite() && hi.is_finite() && ref_bw.is_finite() && obs_bw.is_finite()) {
            return None;
        }
        if hi <= lo {
            lo -= 0.5;
            hi += 0.5;
        }
        let step = (hi - lo) / (grid_points.max(2) - 1) as f64;
        let grid: Vec<f64> = (0..grid_points.max(2)).map(|i| lo + step * i as f64).collect();

        let reference: Vec<f64> = grid.iter().map(|&x| gaussian_density(reference, ref_bw, x)).collect();
        let observed: Vec<f64> = grid.iter().map(|&x| gaussian_density(observed, obs_bw, x)).collect();
        if !reference.iter().chain(observed.iter()).all(|d| d.is_finite()) {
            return None;
        }
        Some(DensityCurves {
            grid,
            reference,
            observed,
        })
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.grid[0], self.grid[self.grid.len() - 1])
    }

    /// Largest density value of either curve.
    pub fn y_max(&self) -> f64 {
        self.reference
            .iter()
            .chain(self.observed.iter())
            .copied()
            .fold(0.0, f64::max)
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
