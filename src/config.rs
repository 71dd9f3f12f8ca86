//! Application configuration.
//!
//! Handles loading, validating, and merging a `config.toml` file. Stock
//! defaults form the base layer; the user's file is merged on top, so it only
//! needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! base_url = "http://localhost:3000"   # METACRAFT_BASE_URL overrides this
//!
//! [defaults]                           # initial form values (query-string keys)
//! title = "MetaCraft — Gerador de SEO/OG/Schema"
//! siteName = "MetaCraft"
//! ogBg = "#0ea5e9"
//!
//! [image]
//! width = 1200
//! height = 630
//! format = "png"                       # png | jpeg | webp
//! fonts_dir = "fonts"                  # extra fonts on top of system fonts
//! cache_entries = 64
//!
//! [snippet]
//! escape_html = true
//!
//! [sync]
//! debounce_ms = 150
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::form::validate_all;
use crate::imaging::{Canvas, OutputFormat, TextStyle};
use crate::preview::SnippetEscaping;
use crate::types::MetaConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Listener address and public URL.
    pub server: ServerConfig,
    /// Form values used when the query string does not set a field.
    pub defaults: MetaConfig,
    /// OG image canvas, typography and encoding.
    pub image: ImageConfig,
    pub snippet: SnippetConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    pub bind: String,
    /// Public origin used in generated absolute URLs (OG image, share links).
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// OG image rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    /// Margin kept free of text on every side, in pixels.
    pub padding: f32,
    /// CSS-style font-family list; the first installed family wins.
    pub font_family: String,
    pub font_size: f32,
    /// Long titles shrink down to this size before being cut.
    pub min_font_size: f32,
    pub font_weight: u16,
    pub letter_spacing: f32,
    pub line_height: f32,
    /// Directory of extra font files loaded on top of the system fonts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonts_dir: Option<PathBuf>,
    pub format: OutputFormat,
    /// Rendered images kept in memory. `0` disables the cache.
    pub cache_entries: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        let canvas = Canvas::default();
        let style = TextStyle::default();
        Self {
            width: canvas.width,
            height: canvas.height,
            padding: canvas.padding,
            font_family: style.font_family,
            font_size: style.font_size,
            min_font_size: style.min_font_size,
            font_weight: style.font_weight,
            letter_spacing: style.letter_spacing,
            line_height: style.line_height,
            fonts_dir: None,
            format: OutputFormat::default(),
            cache_entries: 64,
        }
    }
}

impl ImageConfig {
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
            padding: self.padding,
        }
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            min_font_size: self.min_font_size,
            font_weight: self.font_weight,
            letter_spacing: self.letter_spacing,
            line_height: self.line_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnippetConfig {
    /// HTML-escape field values in the copyable snippet.
    pub escape_html: bool,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self { escape_html: true }
    }
}

impl SnippetConfig {
    pub fn escaping(&self) -> SnippetEscaping {
        if self.escape_html {
            SnippetEscaping::Html
        } else {
            SnippetEscaping::Raw
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Idle time after the last edit before the location is rewritten.
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { debounce_ms: 150 }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

const MAX_CANVAS_SIDE: u32 = 4096;
const MAX_DEBOUNCE_MS: u64 = 10_000;

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Validation(msg));

        if self.server.bind.parse::<SocketAddr>().is_err() {
            return invalid(format!(
                "server.bind must be a socket address, got {:?}",
                self.server.bind
            ));
        }
        match Url::parse(&self.server.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return invalid(format!(
                    "server.base_url must be an http(s) URL, got {:?}",
                    self.server.base_url
                ));
            }
        }

        if let Some((field, err)) = validate_all(&self.defaults).into_iter().next() {
            return invalid(format!("defaults.{}: {}", field.key(), err));
        }

        let img = &self.image;
        if !(1..=MAX_CANVAS_SIDE).contains(&img.width) || !(1..=MAX_CANVAS_SIDE).contains(&img.height) {
            return invalid(format!("image.width and image.height must be 1-{MAX_CANVAS_SIDE}"));
        }
        if img.padding < 0.0 || img.padding * 2.0 >= img.width.min(img.height) as f32 {
            return invalid("image.padding must leave room for text".into());
        }
        if img.font_size <= 0.0 || img.min_font_size <= 0.0 {
            return invalid("image.font_size and image.min_font_size must be positive".into());
        }
        if img.min_font_size > img.font_size {
            return invalid("image.min_font_size must not exceed image.font_size".into());
        }
        if !(1..=1000).contains(&img.font_weight) {
            return invalid("image.font_weight must be 1-1000".into());
        }
        if img.line_height <= 0.0 {
            return invalid("image.line_height must be positive".into());
        }
        if img.font_family.trim().is_empty() {
            return invalid("image.font_family must not be empty".into());
        }

        if self.sync.debounce_ms > MAX_DEBOUNCE_MS {
            return invalid(format!("sync.debounce_ms must be at most {MAX_DEBOUNCE_MS}"));
        }
        Ok(())
    }

    /// Replace `server.base_url`, e.g. from `METACRAFT_BASE_URL`.
    pub fn override_base_url(&mut self, base_url: Option<String>) -> Result<(), ConfigError> {
        if let Some(url) = base_url.filter(|u| !u.is_empty()) {
            self.server.base_url = url.trim_end_matches('/').to_string();
            self.validate()?;
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// Without a path the stock defaults are used. With a path the file must
/// exist; its values are merged on top of the defaults, unknown keys are
/// rejected and the result is validated.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# MetaCraft Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
# Socket address to listen on.
bind = "127.0.0.1:3000"

# Public origin used in absolute URLs (og:image, share links).
# The METACRAFT_BASE_URL environment variable takes precedence.
base_url = "http://localhost:3000"

# ---------------------------------------------------------------------------
# Initial form values
# ---------------------------------------------------------------------------
# Keys are the query-string keys. A value in the page URL always wins.
[defaults]
title = "MetaCraft — Gerador de SEO/OG/Schema"
description = "Gera <meta> OG/Twitter e JSON‑LD com preview ao vivo e imagem OG dinâmica."
siteName = "MetaCraft"
canonical = "http://localhost:3000/"
type = "website"                   # website | article
twitterCard = "summary_large_image" # summary | summary_large_image
# author = "Ana Souza"
ogImageText = "MetaCraft"
ogBg = "#0ea5e9"
ogFg = "#020617"
jsonldType = "WebSite"             # WebSite | Article | Person

# ---------------------------------------------------------------------------
# OG image rendering
# ---------------------------------------------------------------------------
[image]
# Output size in pixels. 1200x630 is what most social networks expect.
width = 1200
height = 630

# Margin kept free of text on every side.
padding = 80.0

# Font-family list; the first family installed on the system is used.
font_family = "Inter, ui-sans-serif, system-ui, sans-serif"

# Preferred title size. Long titles shrink towards min_font_size and are
# cut with an ellipsis only if they still do not fit.
font_size = 72.0
min_font_size = 32.0
font_weight = 800
letter_spacing = -1.0
line_height = 1.2

# Directory with extra .ttf/.otf files, loaded on top of system fonts.
# fonts_dir = "fonts"

# Encoding: png | jpeg | webp
format = "png"

# Rendered images kept in memory (0 disables the cache).
cache_entries = 64

# ---------------------------------------------------------------------------
# Head snippet
# ---------------------------------------------------------------------------
[snippet]
# HTML-escape field values. Set to false to interpolate them verbatim.
escape_html = true

# ---------------------------------------------------------------------------
# Location sync
# ---------------------------------------------------------------------------
[sync]
# Idle time (ms) after the last edit before the URL is rewritten.
debounce_ms = 150
"##
}
