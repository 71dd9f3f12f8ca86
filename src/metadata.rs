//! Page metadata and JSON-LD, built once from a value set.
//!
//! Both the server-rendered `<head>` and the copyable snippet shown in the
//! preview come from [`PageMetadata`], so the two can never disagree about
//! which tags exist or what they contain. Only the final rendering differs:
//! [`render_head`] produces escaped markup, while
//! [`crate::preview::head_snippet`] produces text lines.

use crate::preview::og_image_url;
use crate::types::{Choice, ContentType, JsonLdType, MetaConfig, TwitterCard};
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

/// Metadata for a single page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenGraph {
    pub kind: ContentType,
    pub site_name: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitterMeta {
    pub card: TwitterCard,
    pub title: String,
    pub description: String,
    pub image: String,
}

/// A single element of the document head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadTag<'a> {
    Title(&'a str),
    /// `<meta name=.. content=..>`
    Name(&'static str, &'a str),
    /// `<meta property=.. content=..>`
    Property(&'static str, &'a str),
    Link(&'static str, &'a str),
    Comment(&'static str),
}

impl PageMetadata {
    pub fn from_values(values: &MetaConfig, base_url: &str) -> Self {
        let image = og_image_url(base_url, values);
        Self {
            title: values.title.clone(),
            description: values.description.clone(),
            canonical: values.canonical.clone(),
            open_graph: OpenGraph {
                kind: values.content_type,
                site_name: values.site_name.clone(),
                title: values.title.clone(),
                description: values.description.clone(),
                url: values.canonical.clone(),
                image: image.clone(),
            },
            twitter: TwitterMeta {
                card: values.twitter_card,
                title: values.title.clone(),
                description: values.description.clone(),
                image,
            },
        }
    }

    /// The tags of the copyable snippet, in their fixed order.
    pub fn snippet_tags(&self) -> Vec<HeadTag<'_>> {
        let og = &self.open_graph;
        let tw = &self.twitter;
        vec![
            HeadTag::Title(&self.title),
            HeadTag::Name("description", &self.description),
            HeadTag::Link("canonical", &self.canonical),
            HeadTag::Comment("Open Graph"),
            HeadTag::Property("og:type", og.kind.as_str()),
            HeadTag::Property("og:site_name", &og.site_name),
            HeadTag::Property("og:title", &og.title),
            HeadTag::Property("og:description", &og.description),
            HeadTag::Property("og:image", &og.image),
            HeadTag::Comment("Twitter"),
            HeadTag::Name("twitter:card", tw.card.as_str()),
            HeadTag::Name("twitter:title", &tw.title),
            HeadTag::Name("twitter:description", &tw.description),
            HeadTag::Name("twitter:image", &tw.image),
        ]
    }

    /// Tags for a served page: the snippet plus `og:url`, without comments.
    pub fn head_tags(&self) -> Vec<HeadTag<'_>> {
        let mut tags: Vec<HeadTag<'_>> = self
            .snippet_tags()
            .into_iter()
            .filter(|t| !matches!(t, HeadTag::Comment(_)))
            .collect();
        let after = tags
            .iter()
            .position(|t| matches!(t, HeadTag::Property("og:description", _)))
            .map_or(tags.len(), |i| i + 1);
        tags.insert(after, HeadTag::Property("og:url", &self.open_graph.url));
        tags
    }
}

/// Render head tags as markup. Attribute values and text are escaped.
pub fn render_head(page: &PageMetadata) -> Markup {
    html! {
        @for tag in page.head_tags() {
            @match tag {
                HeadTag::Title(t) => {
                    title { (t) }
                },
                HeadTag::Name(name, content) => {
                    meta name=(name) content=(content);
                },
                HeadTag::Property(property, content) => {
                    meta property=(property) content=(content);
                },
                HeadTag::Link(rel, href) => {
                    link rel=(rel) href=(href);
                },
                HeadTag::Comment(_) => {},
            }
        }
    }
}

/// Schema.org JSON-LD object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonLd<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: JsonLdType,
    pub name: &'a str,
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Person<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person<'a> {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: &'a str,
}

pub fn json_ld(values: &MetaConfig) -> JsonLd<'_> {
    JsonLd {
        context: "https://schema.org",
        kind: values.jsonld_type,
        name: &values.title,
        url: &values.canonical,
        author: values.author().map(|name| Person {
            kind: "Person",
            name,
        }),
    }
}

/// Compact JSON-LD text, safe to place inside a `<script>` element.
///
/// `<`, `>` and `&` are written as `\uXXXX` escapes, which JSON parsers read
/// back unchanged but the HTML tokenizer never sees.
pub fn json_ld_text(values: &MetaConfig) -> String {
    serde_json::to_string(&json_ld(values))
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

pub fn json_ld_script(values: &MetaConfig) -> Markup {
    html! {
        script type="application/ld+json" { (PreEscaped(json_ld_text(values))) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_values;

    const BASE: &str = "http://localhost:3000";

    #[test]
    fn snippet_tag_order() {
        let meta = PageMetadata::from_values(&MetaConfig::default(), BASE);
        let tags = meta.snippet_tags();
        assert_eq!(tags.len(), 14);
        assert!(matches!(tags[0], HeadTag::Title(_)));
        assert!(matches!(tags[3], HeadTag::Comment("Open Graph")));
        assert!(matches!(tags[8], HeadTag::Property("og:image", _)));
        assert!(matches!(tags[9], HeadTag::Comment("Twitter")));
        assert!(matches!(tags[13], HeadTag::Name("twitter:image", _)));
    }

    #[test]
    fn head_tags_add_og_url_after_description() {
        let meta = PageMetadata::from_values(&sample_values(), BASE);
        let tags = meta.head_tags();
        assert_eq!(tags.len(), 13);
        let i = tags
            .iter()
            .position(|t| matches!(t, HeadTag::Property("og:url", _)))
            .unwrap();
        assert!(matches!(tags[i - 1], HeadTag::Property("og:description", _)));
        assert_eq!(tags[i], HeadTag::Property("og:url", "https://example.com/post"));
    }

    #[test]
    fn og_and_twitter_share_image() {
        let meta = PageMetadata::from_values(&sample_values(), BASE);
        assert_eq!(meta.open_graph.image, meta.twitter.image);
        assert!(meta.open_graph.image.starts_with("http://localhost:3000/api/og?"));
    }

    #[test]
    fn render_head_escapes() {
        let values = MetaConfig {
            title: "<script>x</script>".into(),
            description: "say \"hi\"".into(),
            ..MetaConfig::default()
        };
        let html = render_head(&PageMetadata::from_values(&values, BASE)).into_string();
        assert!(html.contains("<title>&lt;script&gt;x&lt;/script&gt;</title>"));
        assert!(html.contains("content=\"say &quot;hi&quot;\""));
        assert!(!html.contains("<!--"));
    }

    #[test]
    fn json_ld_with_author() {
        let v = serde_json::to_value(json_ld(&sample_values())).unwrap();
        assert_eq!(v["@context"], "https://schema.org");
        assert_eq!(v["@type"], "Article");
        assert_eq!(v["name"], "Hello World");
        assert_eq!(v["url"], "https://example.com/post");
        assert_eq!(v["author"]["@type"], "Person");
        assert_eq!(v["author"]["name"], "Ana Souza");
    }

    #[test]
    fn json_ld_omits_missing_author() {
        let text = json_ld_text(&MetaConfig::default());
        assert!(!text.contains("author"));
        assert!(text.starts_with(r#"{"@context":"https://schema.org","@type":"WebSite""#));
    }

    #[test]
    fn json_ld_cannot_close_script() {
        let values = MetaConfig {
            title: "</script><script>alert(1)</script>".into(),
            ..MetaConfig::default()
        };
        let html = json_ld_script(&values).into_string();
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn json_ld_text_parses_back() {
        let values = MetaConfig {
            title: "a < b & c > d".into(),
            ..MetaConfig::default()
        };
        let text = json_ld_text(&values);
        assert!(!text.contains('<'));
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["name"], "a < b & c > d");
    }
}
