//! Legend panel drawn beside the plot area.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::wrap_text_to_width;

/// Glyph shown next to a legend label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendGlyph {
    /// Filled square, for bars.
    Swatch,
    /// Short line with a dot, for line series.
    LineMarker,
}

// Layout constants
const FONT_PX: u32 = 14;
const TITLE_FONT_PX: u32 = 15;
const LINE_H: i32 = FONT_PX as i32 + 2;
const ROW_GAP: i32 = 6;
const PAD_X: i32 = 6;
const PAD_TOP: i32 = 40;

/// Draw a single-column legend into `legend_area`.
///
/// Labels wrap to the panel width. `title` may be empty.
pub fn draw_legend_panel<DB: DrawingBackend>(
    legend_area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBAColor)],
    title: &str,
    glyph: LegendGlyph,
) -> Result<()> {
    legend_area
        .fill(&WHITE)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let (w_u32, _) = legend_area.dim_in_pixel();
    let w = w_u32 as i32;

    let title_style = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Top));
    let label_style =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));

    let mut y = PAD_TOP;
    if !title.trim().is_empty() {
        legend_area
            .draw(&Text::new(title, (PAD_X, y), title_style))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        y += TITLE_FONT_PX as i32 + 10;
    }

    let text_x = PAD_X + 28;
    let max_text_w = (w - text_x - PAD_X).max(40) as u32;

    for (label, color) in items {
        let lines = wrap_text_to_width(label, FONT_PX, max_text_w);
        let block_h = (lines.len().max(1) as i32) * LINE_H;
        let center_y = y + LINE_H / 2;

        match glyph {
            LegendGlyph::Swatch => legend_area
                .draw(&Rectangle::new(
                    [(PAD_X + 4, center_y - 6), (PAD_X + 16, center_y + 6)],
                    color.filled(),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?,
            LegendGlyph::LineMarker => {
                legend_area
                    .draw(&PathElement::new(
                        vec![(PAD_X, center_y), (PAD_X + 20, center_y)],
                        color.stroke_width(2),
                    ))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                legend_area
                    .draw(&Circle::new((PAD_X + 10, center_y), 3, color.filled()))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let line_center_y = y + (i as i32) * LINE_H + LINE_H / 2;
            legend_area
                .draw(&Text::new(
                    line.as_str(),
                    (text_x, line_center_y),
                    label_style.clone(),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }

        y += block_h + ROW_GAP;
    }
    Ok(())
}
