//! Line charts over ordered categories (product lines sorted by value, calendar months).

use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::{AreaSeries, LineSeries};
use plotters::style::FontFamily;

use super::AxisFormat;
use super::legend::{LegendGlyph, draw_legend_panel};
use super::types::{Labels, Series};
use super::util::{
    STEEL_BLUE, category_label, category_range, office_color, padded_range, value_label_area_px,
};

const MARGIN: u32 = 16;
const TICK_FONT_PX: u32 = 12;

pub(super) fn draw_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    points: &[(String, f64)],
    fill: bool,
    fmt: AxisFormat,
) -> Result<()> {
    let names: Vec<String> = points.iter().map(|(l, _)| l.clone()).collect();
    let mut y_range = padded_range(points.iter().map(|(_, v)| *v));
    if fill && y_range.start > 0.0 {
        y_range.start = 0.0;
    }
    let left_px = value_label_area_px(&y_range, fmt.locale, fmt.dec_sep, TICK_FONT_PX);
    let (w, _) = root.dim_in_pixel();
    let label_px = (w.saturating_sub(left_px + 2 * MARGIN) / names.len().max(1) as u32).max(24);

    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .caption(labels.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(category_range(names.len()), y_range.clone())
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |v: &f64| category_label(&names, *v, TICK_FONT_PX, label_px);
    let y_label_fmt = |v: &f64| fmt.value(*v);
    chart
        .configure_mesh()
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

    let xy: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();
    let color = STEEL_BLUE.to_rgba();

    if fill {
        chart
            .draw_series(
                AreaSeries::new(xy.clone(), y_range.start, color.mix(0.15).filled())
                    .border_style(color.stroke_width(2)),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
    } else {
        chart
            .draw_series(LineSeries::new(xy.clone(), color.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    chart
        .draw_series(xy.iter().map(|(x, y)| Circle::new((*x, *y), 4, color.filled())))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// One line per series; gaps where a series has no value for a category.
pub(super) fn draw_multi_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    categories: &[String],
    series: &[Series],
    fmt: AxisFormat,
) -> Result<()> {
    let (plot_area, legend_area) = root.split_horizontally((80).percent_width());

    let y_range = padded_range(series.iter().flat_map(|s| s.values.iter().flatten().copied()));
    let left_px = value_label_area_px(&y_range, fmt.locale, fmt.dec_sep, TICK_FONT_PX);
    let (w, _) = plot_area.dim_in_pixel();
    let label_px =
        (w.saturating_sub(left_px + 2 * MARGIN) / categories.len().max(1) as u32).max(24);

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

    let mut legend_items: Vec<(String, RGBAColor)> = Vec::with_capacity(series.len());
    for (idx, s) in series.iter().enumerate() {
        let color = office_color(idx);
        // split into runs of consecutive present values so missing months leave a gap
        let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut run: Vec<(f64, f64)> = Vec::new();
        for (ci, v) in s.values.iter().enumerate() {
            match v {
                Some(v) => run.push((ci as f64, *v)),
                None if !run.is_empty() => runs.push(std::mem::take(&mut run)),
                None => {}
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }
        for run in &runs {
            chart
                .draw_series(LineSeries::new(run.clone(), color.stroke_width(2)))
                .map_err(|e| anyhow!("{:?}", e))?;
            chart
                .draw_series(run.iter().map(|(x, y)| Circle::new((*x, *y), 4, color.filled())))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        legend_items.push((s.name.clone(), color));
    }

    draw_legend_panel(&legend_area, &legend_items, "", LegendGlyph::LineMarker)?;
    Ok(())
}
