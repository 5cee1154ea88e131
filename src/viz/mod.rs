//! Visualization utilities: render [`Chart`] descriptions to **PNG** (in memory) or **SVG**.
//!
//! - Every render owns its pixel buffer and drawing area, so concurrent renders never share state
//! - Distinct series colors (Microsoft Office palette)
//! - Locale-aware tick labels (`30,000` vs `30.000`)
//! - Chart kinds: bars (vertical/horizontal), grouped bars, line, multi-line, labelled scatter,
//!   joint regression plot with marginals, annotated correlation heatmap

mod bars;
mod heatmap;
pub mod legend;
mod lines;
mod scatter;
pub mod text;
pub mod types;
pub mod util;

pub use types::{Chart, Labels, Orientation, Series};

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use num_format::Locale;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;
use std::sync::Once;

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        if plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        )
        .is_err()
        {
            log::warn!("bundled font could not be registered; chart text may be missing");
        }
    });
}

/// An encoded PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PngImage {
    /// Standard base64 (padded) of the PNG bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:image/png;base64,...` for inline embedding.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

/// Number formatting used on axes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisFormat {
    pub locale: &'static Locale,
    pub dec_sep: char,
}

impl AxisFormat {
    pub fn from_tag(tag: &str) -> Self {
        let (locale, dec_sep) = util::map_locale(tag);
        Self { locale, dec_sep }
    }

    pub fn value(&self, v: f64) -> String {
        util::axis_value_label(v, self.locale, self.dec_sep)
    }
}

/// Render `chart` into a PNG held in memory.
pub fn render_png(chart: &Chart, width: u32, height: u32, locale_tag: &str) -> Result<PngImage> {
    if chart.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    if width == 0 || height == 0 {
        return Err(anyhow!("canvas must be non-empty, got {width}x{height}"));
    }
    ensure_fonts_registered();
    let fmt = AxisFormat::from_tag(locale_tag);

    // RGB8, row-major; the drawing area borrows it until dropped at the end of the block
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, chart, fmt)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&buffer, width, height, ColorType::Rgb8)
        .context("PNG encoding failed")?;
    Ok(PngImage {
        bytes,
        width,
        height,
    })
}

/// Render `chart` to a file: SVG when the extension is `.svg`, PNG otherwise.
pub fn render_to_file<P: AsRef<Path>>(
    chart: &Chart,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<()> {
    let out_path = out_path.as_ref();
    let is_svg = out_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    if is_svg {
        if chart.is_empty() {
            return Err(anyhow!("no data to plot"));
        }
        ensure_fonts_registered();
        let fmt = AxisFormat::from_tag(locale_tag);
        let root = SVGBackend::new(out_path, (width, height)).into_drawing_area();
        draw_chart(&root, chart, fmt)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    } else {
        let png = render_png(chart, width, height, locale_tag)?;
        std::fs::write(out_path, &png.bytes)
            .with_context(|| format!("writing {}", out_path.display()))?;
    }
    Ok(())
}

/// Draw any chart kind onto any Plotters backend.
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &Chart,
    fmt: AxisFormat,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    match chart {
        Chart::Bars {
            labels,
            bars,
            color,
            orientation,
        } => match orientation {
            Orientation::Vertical => bars::draw_vertical(root, labels, bars, *color, fmt),
            Orientation::Horizontal => bars::draw_horizontal(root, labels, bars, *color, fmt),
        },
        Chart::GroupedBars {
            labels,
            categories,
            series,
        } => bars::draw_grouped(root, labels, categories, series, fmt),
        Chart::Line {
            labels,
            points,
            fill,
        } => lines::draw_line(root, labels, points, *fill, fmt),
        Chart::MultiLine {
            labels,
            categories,
            series,
        } => lines::draw_multi_line(root, labels, categories, series, fmt),
        Chart::Scatter { labels, points } => scatter::draw_labelled(root, labels, points, fmt),
        Chart::JointRegression {
            labels,
            points,
            fit,
            bins,
        } => scatter::draw_joint(root, labels, points, *fit, *bins, fmt),
        Chart::Heatmap {
            labels,
            names,
            matrix,
        } => heatmap::draw(root, labels, names, matrix),
    }
}
