//! Text measurement, truncation, and wrapping for axis and legend labels.

/// Heuristic pixel width of `text` (Plotters has no text measuring without a backend).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px`, ending with a single ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        // reserve room for the ellipsis
        if estimate_text_width_px(&out, font_px) + estimate_text_width_px("…", font_px) > max_px {
            out.pop();
            break;
        }
    }
    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{trimmed}…")
}

/// Wrap on word boundaries to fit `max_px`; words longer than a line are truncated.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if estimate_text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
        } else if cur.is_empty() {
            lines.push(truncate_to_width(word, font_px, max_px));
        } else {
            lines.push(std::mem::take(&mut cur));
            if estimate_text_width_px(word, font_px) <= max_px {
                cur = word.to_string();
            } else {
                lines.push(truncate_to_width(word, font_px, max_px));
            }
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Food", 12, 200), "Food");
    }

    #[test]
    fn long_text_gets_ellipsis_and_fits() {
        let t = truncate_to_width("Electronic accessories", 12, 80);
        assert!(t.ends_with('…'));
        assert!(estimate_text_width_px(&t, 12) <= 80);
    }

    #[test]
    fn wraps_on_words() {
        let lines = wrap_text_to_width("Health and beauty", 10, 60);
        assert!(lines.len() >= 2);
        assert_eq!(lines.join(" "), "Health and beauty");
    }
}
