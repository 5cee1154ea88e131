//! Scatter plots: labelled aggregate points, and row-level points with a fitted line
//! and marginal histograms.

use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use super::AxisFormat;
use super::types::Labels;
use super::util::{SKY_BLUE, STEEL_BLUE, office_color, padded_range, value_label_area_px};
use crate::stats::{LinearFit, histogram};

const MARGIN: u32 = 16;
const TICK_FONT_PX: u32 = 12;
const BOTTOM_PX: u32 = 56;

pub(super) fn draw_labelled<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    points: &[(String, f64, f64)],
    fmt: AxisFormat,
) -> Result<()> {
    let x_range = padded_range(points.iter().map(|(_, x, _)| *x));
    // extra room above the highest point for its label
    let mut y_range = padded_range(points.iter().map(|(_, _, y)| *y));
    y_range.end += (y_range.end - y_range.start) * 0.05;
    let left_px = value_label_area_px(&y_range, fmt.locale, fmt.dec_sep, TICK_FONT_PX);

    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .caption(labels.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, BOTTOM_PX)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| anyhow!("{:?}", e))?;

    let value_fmt = |v: &f64| fmt.value(*v);
    chart
        .configure_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .x_labels(10)
        .y_labels(10)
        .x_label_formatter(&value_fmt)
        .y_label_formatter(&value_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let point_style = STEEL_BLUE.filled();
    let text_style = TextStyle::from((FontFamily::SansSerif, 13));
    chart
        .draw_series(points.iter().map(|(label, x, y)| {
            EmptyElement::at((*x, *y))
                + Circle::new((0, 0), 6, point_style)
                + Text::new(label.clone(), (8, -16), text_style.clone())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Main scatter in the lower-left, X marginal histogram above it, Y marginal to its right.
pub(super) fn draw_joint<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    points: &[(f64, f64)],
    fit: Option<LinearFit>,
    bins: usize,
    fmt: AxisFormat,
) -> Result<()> {
    let area = root
        .titled(labels.title.as_str(), (FontFamily::SansSerif, 24))
        .map_err(|e| anyhow!("{:?}", e))?;
    let (top, bottom) = area.split_vertically((20).percent_height());
    let (top_hist, _corner) = top.split_horizontally((80).percent_width());
    let (main, right_hist) = bottom.split_horizontally((80).percent_width());

    let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
    let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
    let x_range = padded_range(xs.iter().copied());
    let y_range = padded_range(ys.iter().copied());
    let left_px = value_label_area_px(&y_range, fmt.locale, fmt.dec_sep, TICK_FONT_PX);

    let mut chart = ChartBuilder::on(&main)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, BOTTOM_PX)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(|e| anyhow!("{:?}", e))?;

    let value_fmt = |v: &f64| fmt.value(*v);
    chart
        .configure_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .x_labels(10)
        .y_labels(10)
        .x_label_formatter(&value_fmt)
        .y_label_formatter(&value_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let point_style = STEEL_BLUE.mix(0.5).filled();
    chart
        .draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 3, point_style)))
        .map_err(|e| anyhow!("{:?}", e))?;

    if let Some(fit) = fit {
        let line = vec![
            (x_range.start, fit.at(x_range.start)),
            (x_range.end, fit.at(x_range.end)),
        ];
        chart
            .draw_series(LineSeries::new(line, office_color(1).stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    // X marginal shares the main plot's horizontal extent
    let x_bins = histogram(&xs, bins);
    let x_max = x_bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let mut top_chart = ChartBuilder::on(&top_hist)
        .margin(MARGIN)
        .margin_bottom(0)
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .build_cartesian_2d(x_range, 0.0..x_max * 1.05)
        .map_err(|e| anyhow!("{:?}", e))?;
    top_chart
        .draw_series(x_bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], SKY_BLUE.filled())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    // Y marginal shares the main plot's vertical extent
    let y_bins = histogram(&ys, bins);
    let y_max = y_bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let mut right_chart = ChartBuilder::on(&right_hist)
        .margin(MARGIN)
        .margin_left(0)
        .set_label_area_size(LabelAreaPosition::Bottom, BOTTOM_PX)
        .build_cartesian_2d(0.0..y_max * 1.05, y_range)
        .map_err(|e| anyhow!("{:?}", e))?;
    right_chart
        .draw_series(y_bins.iter().map(|b| {
            Rectangle::new([(0.0, b.start), (b.count as f64, b.end)], SKY_BLUE.filled())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    Ok(())
}
