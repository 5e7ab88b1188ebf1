pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
pub const FALLBACK_P_VALUE: f64 = 1.0;
pub const KS_EXACT_MAX_SAMPLES: usize = 10_000;
pub const KS_SERIES_TERMS: usize = 100;
pub const KS_SERIES_TOLERANCE: f64 = 1e-10;
pub const FIGURE_WIDTH: u32 = 600;
pub const FIGURE_HEIGHT: u32 = 400;
pub const KDE_GRID_POINTS: usize = 200;
pub const KDE_CUT: f64 = 3.0;
pub const MAX_KDE_CUT: f64 = 10.0;
pub const KDE_FILL_ALPHA: f64 = 0.5;
pub const DEGENERATE_BANDWIDTH_FRACTION: f64 = 0.05;
pub const P_VALUE_PRECISION: i32 = 4;
pub const REFERENCE_LABEL: &str = "Train";
pub const OBSERVED_LABEL: &str = "Live";
pub const IMAGE_MIME_TYPE: &str = "image/png";
