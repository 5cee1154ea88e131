//! Utility functions for visualization: colors, ranges, category axes, locale formatting.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;
use std::ops::Range;

use super::text::{estimate_text_width_px, truncate_to_width};

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
pub const SALMON: RGBColor = RGBColor(250, 128, 114);
pub const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
pub const MISSING_CELL: RGBColor = RGBColor(220, 220, 220);

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Diverging blue-white-red scale for correlations in `[-1, 1]`.
pub fn coolwarm(r: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);
    let t = r.clamp(-1.0, 1.0);
    let (from, to, k) = if t < 0.0 { (MID, COLD, -t) } else { (MID, WARM, t) };
    let lerp = |a: f64, b: f64| (a + (b - a) * k).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Format with locale thousands separators and a fixed number of decimals.
pub fn format_decimal(v: f64, decimals: usize, locale: &Locale, dec_sep: char) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut out = String::new();
    if v < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&int_val.to_formatted_string(locale));
    if let Some(f) = frac_part {
        out.push(dec_sep);
        out.push_str(f);
    }
    out
}

/// Tick label for a value axis: whole numbers with separators above 1,000,
/// otherwise up to two decimals depending on magnitude.
pub fn axis_value_label(v: f64, locale: &Locale, dec_sep: char) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format_decimal(v, prec, locale, dec_sep)
}

/// Value range for bars: always includes zero, with headroom above the tallest bar.
pub fn bar_value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (mut lo, mut hi) = (0.0f64, 0.0f64);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if (hi - lo).abs() < f64::EPSILON {
        hi = lo + 1.0;
    }
    let pad = (hi - lo) * 0.08;
    let lo = if lo < 0.0 { lo - pad } else { lo };
    lo..(hi + pad)
}

/// Data range padded by 5% on each side (for lines and scatters).
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Coordinate range that centers `n` categories on the integers `0..n`.
pub fn category_range(n: usize) -> Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

/// Label for a category tick; empty for non-integer ticks or out-of-range positions.
pub fn category_label(labels: &[String], v: f64, font_px: u32, max_px: u32) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels
        .get(idx as usize)
        .map(|l| truncate_to_width(l, font_px, max_px))
        .unwrap_or_default()
}

/// Width in pixels of the widest label, padded and clamped for a label area.
pub fn label_area_px(labels: &[String], font_px: u32, min_px: u32, max_px: u32) -> u32 {
    let widest = labels
        .iter()
        .map(|l| estimate_text_width_px(l, font_px))
        .max()
        .unwrap_or(0);
    widest.saturating_add(18).clamp(min_px, max_px)
}

/// Left label area for a numeric Y axis, sized by the formatted tick labels.
pub fn value_label_area_px(range: &Range<f64>, locale: &Locale, dec_sep: char, font_px: u32) -> u32 {
    let ticks = 10;
    let labels: Vec<String> = (0..=ticks)
        .map(|i| {
            let t = i as f64 / ticks as f64;
            axis_value_label(range.start + (range.end - range.start) * t, locale, dec_sep)
        })
        .collect();
    label_area_px(&labels, font_px, 48, 140)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_format_respects_locale() {
        assert_eq!(format_decimal(2673.564, 2, &Locale::en, '.'), "2,673.56");
        assert_eq!(format_decimal(2673.564, 2, &Locale::de, ','), "2.673,56");
        assert_eq!(format_decimal(-0.001, 2, &Locale::en, '.'), "0.00");
        assert_eq!(format_decimal(-12.5, 1, &Locale::en, '.'), "-12.5");
        assert_eq!(format_decimal(f64::NAN, 2, &Locale::en, '.'), "n/a");
    }

    #[test]
    fn bar_range_includes_zero_and_headroom() {
        let r = bar_value_range([3.0, 10.0]);
        assert_eq!(r.start, 0.0);
        assert!(r.end > 10.0);
    }

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&labels, 1.0, 12, 100), "B");
        assert_eq!(category_label(&labels, 0.5, 12, 100), "");
        assert_eq!(category_label(&labels, 2.0, 12, 100), "");
    }

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
    }
}
