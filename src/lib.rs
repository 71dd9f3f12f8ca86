//! # MetaCraft
//!
//! A composer for the SEO, Open Graph and Twitter tags of a web page, with a
//! server-side OG image renderer and a schema.org JSON-LD block. One value set
//! ([`types::MetaConfig`]) drives everything: the `<head>` snippet, the image
//! URL, the contrast check and the shareable query string.
//!
//! # Architecture: Values In, Derived Out
//!
//! ```text
//! query string ─┐                        ┌─> <head> snippet   (preview, metadata)
//! form edit  ───┼─> MetaConfig ─> derive ┼─> OG image URL     (preview) ─> /api/og (imaging)
//! config.toml ──┘        │               ├─> contrast check   (contrast)
//!                        │               └─> JSON-LD          (metadata)
//!                        └─> debounced location write (sync)
//! ```
//!
//! Everything downstream of [`types::MetaConfig`] is a pure function of it, so
//! the browser page, the JSON API and the CLI all show the same result for
//! the same query string.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | The value set, its fields and the closed enums (`og:type`, card, `@type`) |
//! | [`form`] | Per-field validation rules and the form state that records errors |
//! | [`query`] | Query-string encoding and decoding of the value set |
//! | [`sync`] | Debounced, replace-only mirroring of the query into a location |
//! | [`contrast`] | Hex colour parsing and WCAG contrast ratio |
//! | [`preview`] | Derived values: OG image URL, `<head>` snippet, contrast |
//! | [`metadata`] | Tag list, head markup and JSON-LD shared by page and snippet |
//! | [`imaging`] | OG image layout, SVG scene, rasterization and encoding |
//! | [`cache`] | Content-addressed render cache and `ETag` keys |
//! | [`page`] | The generator page rendered with Maud |
//! | [`server`] | Axum router: page, `/api/og`, `/api/preview`, `/healthz` |
//! | [`config`] | `config.toml` loading, merging onto stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Metadata Assembly
//!
//! The page's own `<head>` and the copyable snippet come from the same tag
//! list in [`metadata`]. They only differ in how the list is rendered: Maud
//! markup for the page, text lines for the snippet.
//!
//! ## Advisory Validation
//!
//! Field errors never block an edit. Invalid colours fall back to the
//! defaults for the image and the contrast check, and an empty OG title falls
//! back to `MetaCraft`, so the preview always shows something.
//!
//! ## Deterministic Images
//!
//! `/api/og` output depends only on the title, the two colours and the
//! `[image]` config. The response carries an `ETag` derived from exactly
//! those inputs, and the in-memory cache uses the same key.
//!
//! ## Maud Over Template Engines
//!
//! HTML and SVG are generated with Maud: malformed markup is a build error
//! and all interpolation is auto-escaped, which matters when every value on
//! the page comes from a user-controlled query string.

pub mod cache;
pub mod config;
pub mod contrast;
pub mod form;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod page;
pub mod preview;
pub mod query;
pub mod server;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
