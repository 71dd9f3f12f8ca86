//! Parameter types for OG image rendering.
//!
//! These structs describe *what* to draw, not *how*. [`OgImageParams`] is the
//! per-request part (parsed from `/api/og?title=&bg=&fg=`); [`Canvas`] and
//! [`TextStyle`] come from configuration and stay fixed for the life of a
//! renderer.

use crate::contrast::{Rgb, parse_hex};
use crate::preview::og_image_title;
use crate::query::first_param;
use crate::types::{DEFAULT_OG_BG, DEFAULT_OG_FG, DEFAULT_OG_TEXT, MetaConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to draw on one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgImageParams {
    pub title: String,
    pub background: Rgb,
    pub foreground: Rgb,
}

fn default_rgb(hex: &str) -> Rgb {
    parse_hex(hex).unwrap_or(Rgb { r: 0, g: 0, b: 0 })
}

impl Default for OgImageParams {
    fn default() -> Self {
        Self {
            title: DEFAULT_OG_TEXT.to_string(),
            background: default_rgb(DEFAULT_OG_BG),
            foreground: default_rgb(DEFAULT_OG_FG),
        }
    }
}

impl OgImageParams {
    /// Parse `title`, `bg` and `fg`. Missing or empty values, and colours that
    /// are not 3/6-digit hex, fall back to the defaults.
    pub fn from_query(query: &str) -> Self {
        let defaults = Self::default();
        let title = first_param(query, "title")
            .filter(|t| !t.is_empty())
            .unwrap_or(defaults.title);
        let color = |key: &str, fallback: Rgb| {
            first_param(query, key)
                .and_then(|v| parse_hex(&v))
                .unwrap_or(fallback)
        };
        Self {
            title,
            background: color("bg", defaults.background),
            foreground: color("fg", defaults.foreground),
        }
    }

    /// The image that the preview URL for `values` points at.
    pub fn from_values(values: &MetaConfig) -> Self {
        let defaults = Self::default();
        Self {
            title: og_image_title(values).to_string(),
            background: parse_hex(&values.og_bg).unwrap_or(defaults.background),
            foreground: parse_hex(&values.og_fg).unwrap_or(defaults.foreground),
        }
    }
}

/// Output bitmap size and the margin kept free of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub padding: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            padding: 80.0,
        }
    }
}

/// Typography for the title.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// CSS font-family list.
    pub font_family: String,
    /// Preferred size in pixels.
    pub font_size: f32,
    /// Long titles shrink towards this size before being cut.
    pub min_font_size: f32,
    pub font_weight: u16,
    pub letter_spacing: f32,
    /// Multiple of the font size.
    pub line_height: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter, ui-sans-serif, system-ui, sans-serif".to_string(),
            font_size: 72.0,
            min_font_size: 32.0,
            font_weight: 800,
            letter_spacing: -1.0,
            line_height: 1.2,
        }
    }
}

/// Encoded image format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Webp => image::ImageFormat::WebP,
        }
    }

    /// Guess from a file extension (`png`, `jpg`/`jpeg`, `webp`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}
