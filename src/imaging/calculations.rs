//! Pure layout calculations for the OG title.
//!
//! Nothing here touches fonts. Widths are estimated from an average glyph
//! advance, which is close enough for bold sans-serif faces to keep text
//! inside the padding; the rasterizer does the real shaping.

use super::params::{Canvas, TextStyle};

/// Average advance of a bold sans-serif glyph, as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.6;
/// How much the font shrinks per attempt when the title does not fit.
const FONT_STEP: f32 = 4.0;
/// Offset from the middle of a line box to its alphabetic baseline, in ems.
const BASELINE_EM: f32 = 0.35;

/// Final placement of the title.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font_size: f32,
    pub lines: Vec<String>,
    /// Baseline `y` of each line, top to bottom.
    pub baselines: Vec<f32>,
}

/// How many characters fit on one line at `font_size`.
///
/// # Examples
/// ```
/// # use metacraft::imaging::calculations::max_chars_per_line;
/// // 1040px usable, 72px font, -1 letter spacing → 42.2px per glyph
/// assert_eq!(max_chars_per_line(1040.0, 72.0, -1.0), 24);
/// ```
pub fn max_chars_per_line(usable_width: f32, font_size: f32, letter_spacing: f32) -> usize {
    let advance = (font_size * AVG_GLYPH_EM + letter_spacing).max(1.0);
    ((usable_width / advance).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split across lines.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(max_chars) {
            let chunk: String = chunk.iter().collect();
            let len = chunk.chars().count();
            if current_len == 0 {
                current = chunk;
                current_len = len;
            } else if current_len + 1 + len <= max_chars {
                current.push(' ');
                current.push_str(&chunk);
                current_len += 1 + len;
            } else {
                lines.push(std::mem::take(&mut current));
                current = chunk;
                current_len = len;
            }
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Keep at most `max_lines`, marking the cut with an ellipsis.
pub fn truncate_lines(mut lines: Vec<String>, max_lines: usize, max_chars: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines.max(1));
    if let Some(last) = lines.last_mut() {
        let keep = max_chars.saturating_sub(1).min(last.chars().count());
        let mut cut: String = last.chars().take(keep).collect();
        cut.truncate(cut.trim_end().len());
        cut.push('…');
        *last = cut;
    }
    lines
}

/// Baselines that centre `count` lines vertically on the canvas.
pub fn centered_baselines(count: usize, canvas_height: f32, font_size: f32, line_height: f32) -> Vec<f32> {
    let line_box = font_size * line_height;
    let top = (canvas_height - line_box * count as f32) / 2.0;
    (0..count)
        .map(|i| top + line_box * i as f32 + line_box / 2.0 + font_size * BASELINE_EM)
        .collect()
}

/// Fit `title` into the canvas: wrap, shrink towards the minimum size, and
/// cut with an ellipsis only when the minimum size still overflows.
pub fn layout_title(title: &str, canvas: &Canvas, style: &TextStyle) -> TextLayout {
    let usable_width = (canvas.width as f32 - 2.0 * canvas.padding).max(1.0);
    let usable_height = (canvas.height as f32 - 2.0 * canvas.padding).max(1.0);
    let min_size = style.min_font_size.min(style.font_size);

    let mut font_size = style.font_size;
    loop {
        let max_chars = max_chars_per_line(usable_width, font_size, style.letter_spacing);
        let lines = wrap_words(title, max_chars);
        let max_lines = ((usable_height / (font_size * style.line_height)).floor() as usize).max(1);

        if lines.len() <= max_lines || font_size <= min_size {
            let lines = truncate_lines(lines, max_lines, max_chars);
            let baselines =
                centered_baselines(lines.len(), canvas.height as f32, font_size, style.line_height);
            return TextLayout {
                font_size,
                lines,
                baselines,
            };
        }
        font_size = (font_size - FONT_STEP).max(min_size);
    }
}
