//! Overlaid density curves for a numeric feature.
use crate::constants::KDE_FILL_ALPHA;
use crate::detector::config::DriftConfig;
use crate::errors::DriftError;
use crate::plot::kde::DensityCurves;
use crate::plot::{
    canvas, encode_png_base64, ensure_font, render_failure, FONT_FAMILY, LABEL_SIZE, OBSERVED_COLOR, REFERENCE_COLOR,
    TITLE_SIZE,
};
use crate::report::FeatureVisualization;
use plotters::prelude::*;
use std::error::Error;

/// Render filled kernel density estimates of the reference and observed values on shared axes.
///
/// * `feature` - Column name, used in the title and as the x-axis label.
/// * `reference` - Present reference values, non-empty.
/// * `observed` - Present observed values, non-empty.
/// * `cfg` - Figure size, density grid and legend labels.
pub fn render_continuous(
    feature: &str,
    reference: &[f64],
    observed: &[f64],
    cfg: &DriftConfig,
) -> Result<FeatureVisualization, DriftError> {
    ensure_font(feature)?;
    let curves = DensityCurves::estimate(reference, observed, cfg.kde_grid_points, cfg.kde_cut)
        .ok_or_else(|| render_failure(feature, "density estimate is not finite"))?;
    let (width, height) = (cfg.figure_width, cfg.figure_height);
    let mut buffer = canvas(width, height);
    draw_density(&mut buffer, feature, &curves, cfg).map_err(|e| render_failure(feature, e))?;
    let image = encode_png_base64(&buffer, width, height).map_err(|e| render_failure(feature, e))?;
    Ok(FeatureVisualization::new(feature, image))
}

fn draw_density(
    buffer: &mut [u8],
    feature: &str,
    curves: &DensityCurves,
    cfg: &DriftConfig,
) -> Result<(), Box<dyn Error>> {
    let (x_lo, x_hi) = curves.x_range();
    let y_max = curves.y_max().max(f64::EPSILON) * 1.1;

    let root = BitMapBackend::with_buffer(buffer, (cfg.figure_width, cfg.figure_height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution: {}", feature), (FONT_FAMILY, TITLE_SIZE))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(feature)
        .y_desc("Density")
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .axis_desc_style((FONT_FAMILY, LABEL_SIZE))
        .draw()?;

    let series = [
        (cfg.reference_label.as_str(), REFERENCE_COLOR, &curves.reference),
        (cfg.observed_label.as_str(), OBSERVED_COLOR, &curves.observed),
    ];
    for (label, color, density) in series {
        chart
            .draw_series(
                AreaSeries::new(
                    curves.grid.iter().copied().zip(density.iter().copied()),
                    0.0,
                    color.mix(KDE_FILL_ALPHA),
                )
                .border_style(color),
            )?
            .label(label)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(KDE_FILL_ALPHA).filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((FONT_FAMILY, LABEL_SIZE))
        .draw()?;
    root.present()?;
    Ok(())
}
