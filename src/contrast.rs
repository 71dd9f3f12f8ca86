//! Hex colour parsing and WCAG 2 contrast ratio.
//!
//! All functions are pure. Malformed colours never error: [`contrast_ratio`]
//! reports `0.0` so callers can show the "low contrast" state without a
//! separate failure path.

use serde::Serialize;
use std::fmt;

/// An opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// `#rrggbb`, lowercase.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Whether `value` is `#` followed by exactly 3 or 6 hex digits.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|d| (d.len() == 3 || d.len() == 6) && d.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Expand `#abc` to `#aabbcc`. Any other input is returned unchanged.
pub fn expand_hex(value: &str) -> String {
    match value.strip_prefix('#') {
        Some(d) if d.len() == 3 && d.bytes().all(|b| b.is_ascii_hexdigit()) => {
            let mut out = String::with_capacity(7);
            out.push('#');
            for c in d.chars() {
                out.push(c);
                out.push(c);
            }
            out
        }
        _ => value.to_string(),
    }
}

/// Parse a 3- or 6-digit hex colour.
pub fn parse_hex(value: &str) -> Option<Rgb> {
    if !is_hex_color(value) {
        return None;
    }
    let full = expand_hex(value);
    let channel = |i: usize| u8::from_str_radix(&full[i..i + 2], 16).ok();
    Some(Rgb {
        r: channel(1)?,
        g: channel(3)?,
        b: channel(5)?,
    })
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance in `[0, 1]`.
pub fn relative_luminance(color: Rgb) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// Contrast ratio between two hex colours, in `[1, 21]`, or `0.0` if either
/// fails to parse.
pub fn contrast_ratio(a: &str, b: &str) -> f64 {
    let (Some(a), Some(b)) = (parse_hex(a), parse_hex(b)) else {
        return 0.0;
    };
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

/// Readability bucket for a contrast ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastLevel {
    /// ≥ 4.5: fine for body text.
    Good,
    /// ≥ 3: only for large text.
    LargeText,
    Low,
}

impl ContrastLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 4.5 {
            Self::Good
        } else if ratio >= 3.0 {
            Self::LargeText
        } else {
            Self::Low
        }
    }

    /// Same name as the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::LargeText => "large_text",
            Self::Low => "low",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Good => "Bom contraste",
            Self::LargeText => "OK para texto grande",
            Self::Low => "Contraste baixo",
        }
    }
}

/// Ratio plus its bucket, as shown next to the preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contrast {
    pub ratio: f64,
    pub level: ContrastLevel,
    pub message: &'static str,
}

impl Contrast {
    pub fn between(background: &str, foreground: &str) -> Self {
        let ratio = contrast_ratio(background, foreground);
        let level = ContrastLevel::from_ratio(ratio);
        Self {
            ratio,
            level,
            message: level.message(),
        }
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}:1 — {}", self.ratio, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_short_hex() {
        assert_eq!(expand_hex("#abc"), "#aabbcc");
        assert_eq!(expand_hex("#aabbcc"), "#aabbcc");
        assert_eq!(expand_hex("abc"), "abc");
    }

    #[test]
    fn hex_shape() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#0EA5E9"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ggg"));
        assert!(!is_hex_color(""));
    }

    #[test]
    fn parse_hex_channels() {
        assert_eq!(parse_hex("#0ea5e9"), Some(Rgb { r: 0x0e, g: 0xa5, b: 0xe9 }));
        assert_eq!(parse_hex("#f00"), Some(Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(parse_hex("red"), None);
        assert_eq!(parse_hex("#é12"), None);
    }

    #[test]
    fn black_on_white_is_21() {
        let c = Contrast::between("#000000", "#ffffff");
        assert!((c.ratio - 21.0).abs() < 1e-9);
        assert_eq!(c.level, ContrastLevel::Good);
        assert_eq!(c.message, "Bom contraste");
        assert_eq!(c.to_string(), "21.00:1 — Bom contraste");
    }

    #[test]
    fn ratio_is_symmetric() {
        let pairs = [
            ("#0ea5e9", "#020617"),
            ("#123456", "#fedcba"),
            ("#777777", "#000000"),
            ("#ff0000", "#00ff00"),
        ];
        for (a, b) in pairs {
            assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
        }
    }

    #[test]
    fn identical_colors_have_ratio_one() {
        for c in ["#000000", "#ffffff", "#0ea5e9", "#abc"] {
            assert!((contrast_ratio(c, c) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn short_and_long_forms_agree() {
        assert_eq!(contrast_ratio("#fff", "#000"), contrast_ratio("#ffffff", "#000000"));
    }

    #[test]
    fn parse_failure_is_zero() {
        assert_eq!(contrast_ratio("#zzzzzz", "#ffffff"), 0.0);
        assert_eq!(contrast_ratio("#ffffff", ""), 0.0);
        assert_eq!(Contrast::between("nope", "#fff").level, ContrastLevel::Low);
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(ContrastLevel::from_ratio(4.5), ContrastLevel::Good);
        assert_eq!(ContrastLevel::from_ratio(4.49), ContrastLevel::LargeText);
        assert_eq!(ContrastLevel::from_ratio(3.0), ContrastLevel::LargeText);
        assert_eq!(ContrastLevel::from_ratio(2.99), ContrastLevel::Low);
    }

    #[test]
    fn default_og_colors_are_readable() {
        let c = Contrast::between("#0ea5e9", "#020617");
        assert_eq!(c.level, ContrastLevel::Good);
    }

    #[test]
    fn to_hex_lowercases() {
        assert_eq!(Rgb { r: 0xAB, g: 0, b: 0x0F }.to_hex(), "#ab000f");
    }

    #[test]
    fn level_names_match_serialized_form() {
        for level in [ContrastLevel::Good, ContrastLevel::LargeText, ContrastLevel::Low] {
            assert_eq!(serde_json::to_value(level).unwrap(), level.as_str());
        }
    }
}
