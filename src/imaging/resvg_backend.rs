//! SVG rasterizer backend.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Layout | [`calculations::layout_title`](super::calculations::layout_title) |
//! | Scene | maud-built SVG ([`svg::scene`](super::svg::scene)) |
//! | Parse + text shaping | `usvg::Tree::from_str` with a shared `fontdb` |
//! | Rasterize | `resvg::render` into a `tiny_skia::Pixmap` |
//! | Encode | `image::DynamicImage::write_to` (PNG, JPEG, WebP) |
//!
//! The font database is built once (system fonts plus an optional extra
//! directory) and shared between renders.

use super::backend::{OgRenderer, RenderError, RenderedImage};
use super::calculations::layout_title;
use super::params::{Canvas, OgImageParams, OutputFormat, TextStyle};
use super::svg::scene;
use crate::config::ImageConfig;
use image::{DynamicImage, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Families tried, in order, for the generic `sans-serif` fallback.
const SANS_SERIF_PREFERENCE: &[&str] = &[
    "Inter",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

pub struct ResvgRenderer {
    canvas: Canvas,
    style: TextStyle,
    format: OutputFormat,
    fonts: Arc<fontdb::Database>,
}

impl ResvgRenderer {
    pub fn new(
        canvas: Canvas,
        style: TextStyle,
        format: OutputFormat,
        fonts_dir: Option<&Path>,
    ) -> Result<Self, RenderError> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(RenderError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }
        let fonts = load_fonts(fonts_dir)?;
        Ok(Self {
            canvas,
            style,
            format,
            fonts: Arc::new(fonts),
        })
    }

    pub fn from_config(config: &ImageConfig) -> Result<Self, RenderError> {
        Self::new(
            config.canvas(),
            config.text_style(),
            config.format,
            config.fonts_dir.as_deref(),
        )
    }

    /// The SVG document that [`render`](OgRenderer::render) rasterizes.
    pub fn scene(&self, params: &OgImageParams) -> String {
        let layout = layout_title(&params.title, &self.canvas, &self.style);
        scene(params, &self.canvas, &self.style, &layout)
    }

    fn rasterize(&self, svg: &str) -> Result<RgbaImage, RenderError> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fonts),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Svg(e.to_string()))?;

        let (width, height) = (self.canvas.width, self.canvas.height);
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidCanvas { width, height })?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let rgba: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(width, height, rgba).ok_or(RenderError::InvalidCanvas { width, height })
    }
}

fn load_fonts(fonts_dir: Option<&Path>) -> Result<fontdb::Database, RenderError> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = fonts_dir {
        if !dir.is_dir() {
            return Err(RenderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("fonts directory {} does not exist", dir.display()),
            )));
        }
        db.load_fonts_dir(dir);
    }

    let sans = SANS_SERIF_PREFERENCE.iter().copied().find(|name| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    });
    if let Some(name) = sans {
        db.set_sans_serif_family(name);
    }
    if db.len() == 0 {
        tracing::warn!("no fonts found, OG images will be rendered without text");
    }
    tracing::debug!(faces = db.len(), sans_serif = ?sans, "font database loaded");
    Ok(db)
}

fn encode(image: RgbaImage, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
    let image = match format {
        // JPEG has no alpha channel
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
        OutputFormat::Png | OutputFormat::Webp => DynamicImage::ImageRgba8(image),
    };
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
    Ok(bytes)
}

impl OgRenderer for ResvgRenderer {
    fn render(&self, params: &OgImageParams) -> Result<RenderedImage, RenderError> {
        let started = Instant::now();
        let svg = self.scene(params);
        let pixels = self.rasterize(&svg)?;
        let bytes = encode(pixels, self.format)?;
        tracing::debug!(
            title = %params.title,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rendered OG image"
        );
        Ok(RenderedImage {
            bytes,
            format: self.format,
            width: self.canvas.width,
            height: self.canvas.height,
        })
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    fn settings_key(&self) -> String {
        format!(
            "{:?}|{:?}|{}|fonts={}",
            self.canvas,
            self.style,
            self.format.content_type(),
            self.fonts.len()
        )
    }
}
