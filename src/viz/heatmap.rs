//! Annotated correlation heatmap with a color bar.

use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::types::Labels;
use super::util::{MISSING_CELL, category_label, category_range, coolwarm, label_area_px};

const MARGIN: u32 = 16;
const TICK_FONT_PX: u32 = 12;
const CELL_FONT_PX: u32 = 13;
const COLORBAR_STEPS: usize = 100;

/// Row 0 of `matrix` is drawn at the top. NaN cells are grey and annotated `n/a`.
pub(super) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    names: &[String],
    matrix: &[Vec<f64>],
) -> Result<()> {
    let area = root
        .titled(labels.title.as_str(), (FontFamily::SansSerif, 24))
        .map_err(|e| anyhow!("{:?}", e))?;
    let (grid_area, bar_area) = area.split_horizontally((88).percent_width());

    let n = names.len();
    // y runs bottom-up, so the axis needs the names reversed
    let rev_names: Vec<String> = names.iter().rev().cloned().collect();
    let left_px = label_area_px(names, TICK_FONT_PX, 60, 200);
    let (w, _) = grid_area.dim_in_pixel();
    let slot_px = (w.saturating_sub(left_px + 2 * MARGIN) / n.max(1) as u32).max(24);

    let mut chart = ChartBuilder::on(&grid_area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(category_range(n), category_range(n))
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |v: &f64| category_label(names, *v, TICK_FONT_PX, slot_px);
    let y_label_fmt =
        |v: &f64| category_label(&rev_names, *v, TICK_FONT_PX, left_px.saturating_sub(12));
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let cells: Vec<(f64, f64, f64)> = matrix
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, v)| (c as f64, (n - 1 - r) as f64, *v))
        })
        .collect();

    chart
        .draw_series(cells.iter().map(|(x, y, v)| {
            let fill = if v.is_finite() { coolwarm(*v) } else { MISSING_CELL };
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], fill.filled())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    let centered = TextStyle::from((FontFamily::SansSerif, CELL_FONT_PX))
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(cells.iter().map(|(x, y, v)| {
            let (text, style) = if !v.is_finite() {
                ("n/a".to_string(), centered.color(&BLACK))
            } else if v.abs() > 0.6 {
                (format!("{:.2}", v), centered.color(&WHITE))
            } else {
                (format!("{:.2}", v), centered.color(&BLACK))
            };
            Text::new(text, (*x, *y), style)
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    draw_colorbar(&bar_area)
}

fn draw_colorbar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> Result<()> {
    let mut bar = ChartBuilder::on(area)
        .margin(MARGIN)
        .margin_left(4)
        .set_label_area_size(LabelAreaPosition::Right, 44)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..1.0, -1.0..1.0)
        .map_err(|e| anyhow!("{:?}", e))?;

    let tick_fmt = |v: &f64| format!("{:.1}", v);
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&tick_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let step = 2.0 / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let lo = -1.0 + i as f64 * step;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], coolwarm(lo + step / 2.0).filled())
    }))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
