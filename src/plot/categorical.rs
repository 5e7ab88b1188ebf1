//! Grouped bar chart of category proportions.
use crate::detector::config::DriftConfig;
use crate::drift::stats::ContingencyTable;
use crate::errors::DriftError;
use crate::plot::{
    canvas, encode_png_base64, ensure_font, render_failure, FONT_FAMILY, LABEL_SIZE, OBSERVED_COLOR, REFERENCE_COLOR,
    TITLE_SIZE,
};
use crate::report::FeatureVisualization;
use plotters::prelude::*;
use std::error::Error;

const BAR_WIDTH: f64 = 0.4;

/// Render proportions of each category side by side, reference bar left of observed bar.
///
/// * `feature` - Column name, used in the title.
/// * `table` - Category by source counts over the sorted category union.
/// * `cfg` - Figure size and legend labels.
pub fn render_categorical(
    feature: &str,
    table: &ContingencyTable,
    cfg: &DriftConfig,
) -> Result<FeatureVisualization, DriftError> {
    ensure_font(feature)?;
    let (width, height) = (cfg.figure_width, cfg.figure_height);
    let mut buffer = canvas(width, height);
    draw_bars(&mut buffer, feature, table, cfg).map_err(|e| render_failure(feature, e))?;
    let image = encode_png_base64(&buffer, width, height).map_err(|e| render_failure(feature, e))?;
    Ok(FeatureVisualization::new(feature, image))
}

fn draw_bars(
    buffer: &mut [u8],
    feature: &str,
    table: &ContingencyTable,
    cfg: &DriftConfig,
) -> Result<(), Box<dyn Error>> {
    let categories = table.categories();
    let n = categories.len();
    let reference = table.proportions(0);
    let observed = table.proportions(1);
    let y_max = reference
        .iter()
        .chain(observed.iter())
        .copied()
        .fold(0.0, f64::max)
        .max(f64::EPSILON)
        * 1.1;

    let root = BitMapBackend::with_buffer(buffer, (cfg.figure_width, cfg.figure_height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution: {}", feature), (FONT_FAMILY, TITLE_SIZE))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(-0.6..(n as f64 - 0.4), 0.0..y_max)?;

    // Ticks land on integers when at least two labels per category are allowed;
    // anything between categories is left blank.
    let label_at = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < n {
            categories[idx as usize].clone()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(2 * n)
        .x_label_formatter(&label_at)
        .y_desc("Proportion")
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .axis_desc_style((FONT_FAMILY, LABEL_SIZE))
        .draw()?;

    let groups = [
        (cfg.reference_label.as_str(), REFERENCE_COLOR, &reference, -BAR_WIDTH),
        (cfg.observed_label.as_str(), OBSERVED_COLOR, &observed, 0.0),
    ];
    for (label, color, proportions, offset) in groups {
        chart
            .draw_series(proportions.iter().enumerate().map(|(i, &p)| {
                let left = i as f64 + offset;
                Rectangle::new([(left, 0.0), (left + BAR_WIDTH, p)], color.filled())
            }))?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
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
