//! The value set shared by every stage: form, query string, derived values,
//! page metadata and the image endpoint.
//!
//! [`MetaConfig`] is deliberately flat. Each field maps to exactly one query
//! key (see [`Field::key`]) so the whole state survives a trip through the
//! URL without nesting rules.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TITLE: &str = "MetaCraft — Gerador de SEO/OG/Schema";
pub const DEFAULT_DESCRIPTION: &str =
    "Gera <meta> OG/Twitter e JSON‑LD com preview ao vivo e imagem OG dinâmica.";
pub const DEFAULT_SITE_NAME: &str = "MetaCraft";
pub const DEFAULT_CANONICAL: &str = "http://localhost:3000/";
pub const DEFAULT_OG_TEXT: &str = "MetaCraft";
pub const DEFAULT_OG_BG: &str = "#0ea5e9";
pub const DEFAULT_OG_FG: &str = "#020617";

/// Open Graph `og:type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Website,
    Article,
}

/// Twitter card variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwitterCard {
    Summary,
    #[default]
    SummaryLargeImage,
}

/// Schema.org `@type` emitted in the JSON-LD block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonLdType {
    #[default]
    WebSite,
    Article,
    Person,
}

/// Closed string enums that travel through forms and query strings.
///
/// `ALL` lists the members in the order the form offers them.
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }

    fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }
}

impl Choice for ContentType {
    const ALL: &'static [Self] = &[Self::Website, Self::Article];

    fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Article => "article",
        }
    }
}

impl Choice for TwitterCard {
    const ALL: &'static [Self] = &[Self::SummaryLargeImage, Self::Summary];

    fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::SummaryLargeImage => "summary_large_image",
        }
    }
}

impl Choice for JsonLdType {
    const ALL: &'static [Self] = &[Self::WebSite, Self::Article, Self::Person];

    fn as_str(self) -> &'static str {
        match self {
            Self::WebSite => "WebSite",
            Self::Article => "Article",
            Self::Person => "Person",
        }
    }
}

macro_rules! display_choice {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_choice!(ContentType, TwitterCard, JsonLdType);

/// One editable field of [`MetaConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Description,
    SiteName,
    Canonical,
    #[serde(rename = "type")]
    ContentType,
    TwitterCard,
    Author,
    OgImageText,
    OgBg,
    OgFg,
    JsonldType,
}

impl Field {
    /// Every field, in form and query-string order.
    pub const ALL: [Field; 11] = [
        Field::Title,
        Field::Description,
        Field::SiteName,
        Field::Canonical,
        Field::ContentType,
        Field::TwitterCard,
        Field::Author,
        Field::OgImageText,
        Field::OgBg,
        Field::OgFg,
        Field::JsonldType,
    ];

    /// Query-string key.
    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::SiteName => "siteName",
            Field::Canonical => "canonical",
            Field::ContentType => "type",
            Field::TwitterCard => "twitterCard",
            Field::Author => "author",
            Field::OgImageText => "ogImageText",
            Field::OgBg => "ogBg",
            Field::OgFg => "ogFg",
            Field::JsonldType => "jsonldType",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Form label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Título",
            Field::Description => "Descrição",
            Field::SiteName => "Site Name",
            Field::Canonical => "Canonical",
            Field::ContentType => "Tipo",
            Field::TwitterCard => "Twitter Card",
            Field::Author => "Autor (opcional)",
            Field::OgImageText => "OG Texto",
            Field::OgBg => "OG BG",
            Field::OgFg => "OG FG",
            Field::JsonldType => "JSON‑LD @type",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The complete editable state.
///
/// Text fields keep whatever the user typed, valid or not; validation is
/// reported separately by [`crate::form`]. Consumers that need a usable value
/// (colours, the OG title) apply their own fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MetaConfig {
    pub title: String,
    pub description: String,
    pub site_name: String,
    pub canonical: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub twitter_card: TwitterCard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub og_image_text: String,
    pub og_bg: String,
    pub og_fg: String,
    pub jsonld_type: JsonLdType,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            canonical: DEFAULT_CANONICAL.to_string(),
            content_type: ContentType::default(),
            twitter_card: TwitterCard::default(),
            author: None,
            og_image_text: DEFAULT_OG_TEXT.to_string(),
            og_bg: DEFAULT_OG_BG.to_string(),
            og_fg: DEFAULT_OG_FG.to_string(),
            jsonld_type: JsonLdType::default(),
        }
    }
}

impl MetaConfig {
    /// Current value of a field as it would appear in a form input.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::SiteName => &self.site_name,
            Field::Canonical => &self.canonical,
            Field::ContentType => self.content_type.as_str(),
            Field::TwitterCard => self.twitter_card.as_str(),
            Field::Author => self.author.as_deref().unwrap_or(""),
            Field::OgImageText => &self.og_image_text,
            Field::OgBg => &self.og_bg,
            Field::OgFg => &self.og_fg,
            Field::JsonldType => self.jsonld_type.as_str(),
        }
    }

    /// Author, treating an empty string the same as no author.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.is_empty())
    }
}
