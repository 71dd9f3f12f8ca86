//! Values derived from the form: OG image URL, head snippet, contrast.
//!
//! Everything here is a pure function of a [`MetaConfig`] (plus the public
//! base URL), so the page can recompute it on every keystroke and the same
//! input always gives byte-identical output.

use crate::contrast::{Contrast, is_hex_color};
use crate::metadata::{HeadTag, PageMetadata};
use crate::query::to_query;
use crate::types::{DEFAULT_OG_BG, DEFAULT_OG_FG, DEFAULT_OG_TEXT, MetaConfig};
use maud::html;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// How field text is placed into the snippet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetEscaping {
    /// HTML-escape every interpolated value.
    #[default]
    Html,
    /// Interpolate verbatim. Quotes or angle brackets in a field produce
    /// broken (or hostile) markup.
    Raw,
}

impl SnippetEscaping {
    fn apply(self, text: &str) -> String {
        match self {
            Self::Html => html! { (text) }.into_string(),
            Self::Raw => text.to_string(),
        }
    }
}

/// Text drawn on the OG image: `ogImageText`, then `title`, then the default.
pub fn og_image_title(values: &MetaConfig) -> &str {
    [values.og_image_text.as_str(), values.title.as_str()]
        .into_iter()
        .find(|t| !t.is_empty())
        .unwrap_or(DEFAULT_OG_TEXT)
}

fn usable_color<'a>(value: &'a str, default: &'static str) -> &'a str {
    if is_hex_color(value) { value } else { default }
}

/// URL of the rendered OG image for these values.
pub fn og_image_url(base_url: &str, values: &MetaConfig) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("title", og_image_title(values))
        .append_pair("bg", usable_color(&values.og_bg, DEFAULT_OG_BG))
        .append_pair("fg", usable_color(&values.og_fg, DEFAULT_OG_FG))
        .finish();
    format!("{}/api/og?{}", base_url.trim_end_matches('/'), query)
}

fn snippet_line(tag: HeadTag<'_>, escaping: SnippetEscaping) -> String {
    let e = |s: &str| escaping.apply(s);
    match tag {
        HeadTag::Title(t) => format!("<title>{}</title>", e(t)),
        HeadTag::Name(name, content) => {
            format!(r#"<meta name="{}" content="{}" />"#, name, e(content))
        }
        HeadTag::Property(property, content) => {
            format!(r#"<meta property="{}" content="{}" />"#, property, e(content))
        }
        HeadTag::Link(rel, href) => format!(r#"<link rel="{}" href="{}" />"#, rel, e(href)),
        HeadTag::Comment(text) => format!("<!-- {} -->", text),
    }
}

/// The copyable `<head>` snippet, one tag per line.
pub fn head_snippet(values: &MetaConfig, base_url: &str, escaping: SnippetEscaping) -> String {
    let page = PageMetadata::from_values(values, base_url);
    page.snippet_tags()
        .into_iter()
        .map(|tag| snippet_line(tag, escaping))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything the preview pane shows for one value set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    pub og_image_url: String,
    pub snippet: String,
    pub contrast: Contrast,
    /// Query string that reproduces the value set.
    pub query: String,
}

pub fn derive(values: &MetaConfig, base_url: &str, escaping: SnippetEscaping) -> Derived {
    Derived {
        og_image_url: og_image_url(base_url, values),
        snippet: head_snippet(values, base_url, escaping),
        contrast: Contrast::between(&values.og_bg, &values.og_fg),
        query: to_query(values),
    }
}
