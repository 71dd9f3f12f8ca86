//! Shared fixtures for the unit tests.

use crate::types::{ContentType, JsonLdType, MetaConfig, TwitterCard};

/// A fully valid value set with every field differing from the defaults.
pub fn sample_values() -> MetaConfig {
    MetaConfig {
        title: "Hello World".into(),
        description: "A short description".into(),
        site_name: "Example".into(),
        canonical: "https://example.com/post".into(),
        content_type: ContentType::Article,
        twitter_card: TwitterCard::Summary,
        author: Some("Ana Souza".into()),
        og_image_text: "Big Launch".into(),
        og_bg: "#112233".into(),
        og_fg: "#fff".into(),
        jsonld_type: JsonLdType::Article,
    }
}
