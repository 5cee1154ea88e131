//! Bar charts over categorical axes.

use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use super::AxisFormat;
use super::legend::{LegendGlyph, draw_legend_panel};
use super::types::{Labels, Series};
use super::util::{
    bar_value_range, category_label, category_range, label_area_px, office_color,
    value_label_area_px,
};

const MARGIN: u32 = 16;
const TICK_FONT_PX: u32 = 12;
const BAR_WIDTH: f64 = 0.8;

/// Pixel width available to one category slot along an axis of `axis_px`.
fn slot_px(axis_px: u32, reserved: u32, n: usize) -> u32 {
    let usable = axis_px.saturating_sub(reserved + 2 * MARGIN);
    (usable / n.max(1) as u32).saturating_sub(6).max(24)
}

pub(super) fn draw_vertical<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    bars: &[(String, f64)],
    color: RGBColor,
    fmt: AxisFormat,
) -> Result<()> {
    let names: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let y_range = bar_value_range(bars.iter().map(|(_, v)| *v));
    let left_px = value_label_area_px(&y_range, fmt.locale, fmt.dec_sep, TICK_FONT_PX);
    let (w, _) = root.dim_in_pixel();
    let label_px = slot_px(w, left_px, names.len());

    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .caption(labels.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(category_range(names.len()), y_range)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |v: &f64| category_label(&names, *v, TICK_FONT_PX, label_px);
    let y_label_fmt = |v: &f64| fmt.value(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .x_labels(names.len())
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, v))| {
            let x = i as f64;
            let half = BAR_WIDTH / 2.0;
            Rectangle::new(
                [(x - half, 0.0f64.min(*v)), (x + half, 0.0f64.max(*v))],
                color.filled(),
            )
        }))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Categories run bottom to top in the given order.
pub(super) fn draw_horizontal<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    bars: &[(String, f64)],
    color: RGBColor,
    fmt: AxisFormat,
) -> Result<()> {
    let names: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let x_range = bar_value_range(bars.iter().map(|(_, v)| *v));
    let left_px = label_area_px(&names, TICK_FONT_PX, 60, 200);

    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .caption(labels.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(x_range, category_range(names.len()))
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |v: &f64| fmt.value(*v);
    let y_label_fmt =
        |v: &f64| category_label(&names, *v, TICK_FONT_PX, left_px.saturating_sub(12));
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .x_labels(10)
        .y_labels(names.len())
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, v))| {
            let y = i as f64;
            let half = BAR_WIDTH / 2.0;
            Rectangle::new(
                [(0.0f64.min(*v), y - half), (0.0f64.max(*v), y + half)],
                color.filled(),
            )
        }))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Side-by-side bars per category with a legend panel on the right.
pub(super) fn draw_grouped<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    categories: &[String],
    series: &[Series],
    fmt: AxisFormat,
) -> Result<()> {
    let (plot_area, legend_area) = root.split_horizontally((84).percent_width());

    let y_range = bar_value_range(series.iter().flat_map(|s| s.values.iter().flatten().copied()));
    let left_px = value_label_area_px(&y_range, fmt.locale, fmt.dec_sep, TICK_FONT_PX);
    let (w, _) = plot_area.dim_in_pixel();
    let label_px = slot_px(w, left_px, categories.len());

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .caption(labels.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(category_range(categories.len()), y_range)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |v: &f64| category_label(categories, *v, TICK_FONT_PX, label_px);
    let y_label_fmt = |v: &f64| fmt.value(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .x_labels(categories.len())
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let bar_w = BAR_WIDTH / series.len().max(1) as f64;
    let mut legend_items: Vec<(String, RGBAColor)> = Vec::with_capacity(series.len());
    for (idx, s) in series.iter().enumerate() {
        let color = office_color(idx);
        chart
            .draw_series(s.values.iter().enumerate().filter_map(|(ci, v)| {
                let v = (*v)?;
                let x0 = ci as f64 - BAR_WIDTH / 2.0 + idx as f64 * bar_w;
                Some(Rectangle::new(
                    [(x0, 0.0f64.min(v)), (x0 + bar_w, 0.0f64.max(v))],
                    color.filled(),
                ))
            }))
            .map_err(|e| anyhow!("{:?}", e))?;
        legend_items.push((s.name.clone(), color));
    }

    draw_legend_panel(&legend_area, &legend_items, "", LegendGlyph::Swatch)?;
    Ok(())
}
