//! OG image rendering: title layout, SVG scene, rasterization, encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Layout** | pure word wrap + font shrink ([`calculations`]) |
//! | **Scene** | SVG markup via `maud` |
//! | **Rasterize** | `resvg` / `usvg` / `tiny-skia`, fonts from `fontdb` |
//! | **Encode** | `image` (PNG, JPEG, WebP) |
//!
//! The module is split into:
//! - **Parameters**: what to draw ([`OgImageParams`]) and fixed settings ([`Canvas`], [`TextStyle`])
//! - **Calculations**: pure layout math (unit testable)
//! - **Backend**: [`OgRenderer`] trait + [`ResvgRenderer`]

pub mod backend;
pub mod calculations;
mod params;
pub mod resvg_backend;
mod svg;

pub use backend::{OgRenderer, RenderError, RenderedImage};
pub use params::{Canvas, OgImageParams, OutputFormat, TextStyle};
pub use resvg_backend::ResvgRenderer;
