use crate::detector::config::{KsMethod, UnsharedCategories};
use crate::DriftDetector;

impl DriftDetector {
    // Set methods for parameters

    /// Set the significance level on the detector.
    /// * `significance_level` - A column has drifted when its p-value is strictly below this level.
    pub fn set_significance_level(mut self, significance_level: f64) -> Self {
        self.cfg.significance_level = significance_level;
        self
    }

    /// Set whether columns are processed in parallel.
    /// * `parallel` - Run the column loop on a thread pool.
    pub fn set_parallel(mut self, parallel: bool) -> Self {
        self.cfg.parallel = parallel;
        self
    }

    /// Set the number of threads on the detector.
    /// * `num_threads` - Threads used for the column loop, all available cores when `None`.
    pub fn set_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.cfg.num_threads = num_threads;
        self
    }

    /// Set the Kolmogorov-Smirnov p-value method.
    /// * `ks_method` - Exact, asymptotic, or chosen by sample size.
    pub fn set_ks_method(mut self, ks_method: KsMethod) -> Self {
        self.cfg.ks_method = ks_method;
        self
    }

    /// Set the largest sample size for which the exact KS distribution is used automatically.
    /// * `ks_exact_max_samples` - Sample size limit.
    pub fn set_ks_exact_max_samples(mut self, ks_exact_max_samples: usize) -> Self {
        self.cfg.ks_exact_max_samples = ks_exact_max_samples;
        self
    }

    /// Set the continuity correction for two-category tables.
    /// * `yates_correction` - Apply Yates' correction when the table has one degree of freedom.
    pub fn set_yates_correction(mut self, yates_correction: bool) -> Self {
        self.cfg.yates_correction = yates_correction;
        self
    }

    /// Set the policy for categories present in one dataset only.
    /// * `unshared_categories` - Fall back to no evidence, or run the test anyway.
    pub fn set_unshared_categories(mut self, unshared_categories: UnsharedCategories) -> Self {
        self.cfg.unshared_categories = unshared_categories;
        self
    }

    /// Set the chart size in pixels.
    /// * `width` - Chart width.
    /// * `height` - Chart height.
    pub fn set_figure_size(mut self, width: u32, height: u32) -> Self {
        self.cfg.figure_width = width;
        self.cfg.figure_height = height;
        self
    }

    /// Set the number of points the density curves are evaluated on.
    /// * `kde_grid_points` - Grid size.
    pub fn set_kde_grid_points(mut self, kde_grid_points: usize) -> Self {
        self.cfg.kde_grid_points = kde_grid_points;
        self
    }

    /// Set how far the density grid extends past the data.
    /// * `kde_cut` - Extension in bandwidths.
    pub fn set_kde_cut(mut self, kde_cut: f64) -> Self {
        self.cfg.kde_cut = kde_cut;
        self
    }

    /// Set the legend labels of the two datasets.
    /// * `reference_label` - Label of the reference data.
    /// * `observed_label` - Label of the observed data.
    pub fn set_labels(mut self, reference_label: &str, observed_label: &str) -> Self {
        self.cfg.reference_label = reference_label.to_string();
        self.cfg.observed_label = observed_label.to_string();
        self
    }
}
