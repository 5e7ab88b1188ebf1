//! Plot
//!
//! Draws the per-feature comparison charts into private in-memory RGB buffers and encodes
//! them as base64 PNG text, so a report can embed every chart without external files.
//! Text is drawn with a bundled font registered once per process.

pub mod categorical;
pub mod continuous;
pub mod kde;

pub use categorical::render_categorical;
pub use continuous::render_continuous;

use crate::errors::DriftError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use plotters::style::{register_font, FontStyle, RGBColor};
use std::fmt::Display;
use std::sync::OnceLock;

pub(crate) const FONT_FAMILY: &str = "sans-serif";
pub(crate) const REFERENCE_COLOR: RGBColor = RGBColor(31, 119, 180);
pub(crate) const OBSERVED_COLOR: RGBColor = RGBColor(255, 127, 14);
pub(crate) const TITLE_SIZE: u32 = 20;
pub(crate) const LABEL_SIZE: u32 = 13;

static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

/// Register the bundled font under the generic sans-serif family.
pub(crate) fn ensure_font(feature: &str) -> Result<(), DriftError> {
    FONT_REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_DATA)
                .map_err(|_| "bundled font is not a valid TrueType font".to_string())
        })
        .clone()
        .map_err(|e| render_failure(feature, e))
}

pub(crate) fn render_failure<E: Display>(feature: &str, e: E) -> DriftError {
    DriftError::RenderFailure {
        feature: feature.to_string(),
        reason: e.to_string(),
    }
}

/// Blank RGB canvas for one chart.
pub(crate) fn canvas(width: u32, height: u32) -> Vec<u8> {
    vec![255; width as usize * height as usize * 3]
}

/// PNG-encode an RGB buffer and wrap it as base64 text.
pub(crate) fn encode_png_base64(buffer: &[u8], width: u32, height: u32) -> Result<String, image::ImageError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(buffer, width, height, ExtendedColorType::Rgb8)?;
    Ok(STANDARD.encode(png))
}
