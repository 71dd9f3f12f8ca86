//! Rendering backend trait and shared types.
//!
//! The [`OgRenderer`] trait is the seam between the HTTP/CLI layers, which
//! decide *what* to draw, and the rasterizer. The production implementation
//! is [`ResvgRenderer`](super::resvg_backend::ResvgRenderer); tests use a
//! recording mock so they do not depend on installed fonts.

use super::params::{OgImageParams, OutputFormat};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SVG error: {0}")]
    Svg(String),
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// An encoded image ready to be served or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Something that can turn [`OgImageParams`] into an encoded bitmap.
pub trait OgRenderer: Send + Sync {
    fn render(&self, params: &OgImageParams) -> Result<RenderedImage, RenderError>;

    /// Format every [`RenderedImage`] from this renderer is encoded in.
    fn format(&self) -> OutputFormat;

    /// Output size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Everything besides the params that changes the output bytes: canvas,
    /// text style, format and fonts. Two renderers with equal keys produce
    /// identical images for the same params.
    fn settings_key(&self) -> String;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock renderer that records requests and returns a fixed payload.
    #[derive(Default)]
    pub struct MockRenderer {
        pub requests: Mutex<Vec<OgImageParams>>,
        pub fail: bool,
    }

    impl MockRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn get_requests(&self) -> Vec<OgImageParams> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl OgRenderer for MockRenderer {
        fn render(&self, params: &OgImageParams) -> Result<RenderedImage, RenderError> {
            self.requests.lock().unwrap().push(params.clone());
            if self.fail {
                return Err(RenderError::Svg("mock failure".to_string()));
            }
            Ok(RenderedImage {
                bytes: params.title.as_bytes().to_vec(),
                format: OutputFormat::Png,
                width: 1200,
                height: 630,
            })
        }

        fn format(&self) -> OutputFormat {
            OutputFormat::Png
        }

        fn dimensions(&self) -> (u32, u32) {
            (1200, 630)
        }

        fn settings_key(&self) -> String {
            "mock".to_string()
        }
    }

    #[test]
    fn mock_records_requests() {
        let r = MockRenderer::new();
        let img = r.render(&OgImageParams::default()).unwrap();
        assert_eq!(img.bytes, b"MetaCraft");
        assert_eq!(r.get_requests().len(), 1);
    }

    #[test]
    fn mock_can_fail() {
        let r = MockRenderer::failing();
        assert!(matches!(
            r.render(&OgImageParams::default()),
            Err(RenderError::Svg(_))
        ));
    }
}
