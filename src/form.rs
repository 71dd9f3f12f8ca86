//! Form state and field validation.
//!
//! Validation is a pure rule table ([`validate`]) keyed by [`Field`]; the
//! [`FormState`] only stores values and the latest error per field. Errors are
//! advisory: an edit is always applied (text fields keep invalid input so the
//! user can keep typing) and derived values fall back to defaults instead.

use crate::contrast::is_hex_color;
use crate::query::fields;
use crate::types::{Choice, ContentType, Field, JsonLdType, MetaConfig, TwitterCard};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("Obrigatório")]
    Required,
    #[error("URL inválida")]
    InvalidUrl,
    #[error("Cor inválida")]
    InvalidHex,
    #[error("Valor inválido")]
    NotAllowed { allowed: Vec<&'static str> },
}

enum Rule {
    Required,
    Url,
    Hex,
    OneOf(fn() -> Vec<&'static str>),
    Free,
}

fn rule(field: Field) -> Rule {
    match field {
        Field::Title | Field::Description | Field::SiteName => Rule::Required,
        Field::Canonical => Rule::Url,
        Field::OgBg | Field::OgFg => Rule::Hex,
        Field::ContentType => Rule::OneOf(ContentType::allowed),
        Field::TwitterCard => Rule::OneOf(TwitterCard::allowed),
        Field::JsonldType => Rule::OneOf(JsonLdType::allowed),
        Field::Author | Field::OgImageText => Rule::Free,
    }
}

/// Check one raw field value against its rule.
pub fn validate(field: Field, value: &str) -> Result<(), FieldError> {
    match rule(field) {
        Rule::Required if value.is_empty() => Err(FieldError::Required),
        Rule::Url if Url::parse(value).is_err() => Err(FieldError::InvalidUrl),
        Rule::Hex if !is_hex_color(value) => Err(FieldError::InvalidHex),
        Rule::OneOf(allowed) => {
            let allowed = allowed();
            if allowed.contains(&value) {
                Ok(())
            } else {
                Err(FieldError::NotAllowed { allowed })
            }
        }
        _ => Ok(()),
    }
}

/// Validate every field of a value set.
pub fn validate_all(values: &MetaConfig) -> BTreeMap<Field, FieldError> {
    Field::ALL
        .into_iter()
        .filter_map(|f| validate(f, values.get(f)).err().map(|e| (f, e)))
        .collect()
}

/// Live value set plus the current error for each invalid field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: MetaConfig,
    errors: BTreeMap<Field, FieldError>,
}

impl FormState {
    pub fn new(values: MetaConfig) -> Self {
        let errors = validate_all(&values);
        Self { values, errors }
    }

    /// Apply a raw edit. Never fails; the outcome is visible through
    /// [`FormState::error`].
    ///
    /// Enum fields only change when `raw` names a member, since there is no
    /// way to hold a non-member. The error is still recorded.
    pub fn edit(&mut self, field: Field, raw: &str) {
        let result = validate(field, raw);
        let v = &mut self.values;
        match field {
            Field::Title => v.title = raw.to_string(),
            Field::Description => v.description = raw.to_string(),
            Field::SiteName => v.site_name = raw.to_string(),
            Field::Canonical => v.canonical = raw.to_string(),
            Field::Author => v.author = Some(raw.to_string()).filter(|a| !a.is_empty()),
            Field::OgImageText => v.og_image_text = raw.to_string(),
            Field::OgBg => v.og_bg = raw.to_string(),
            Field::OgFg => v.og_fg = raw.to_string(),
            Field::ContentType => {
                if let Some(c) = ContentType::parse(raw) {
                    v.content_type = c;
                }
            }
            Field::TwitterCard => {
                if let Some(c) = TwitterCard::parse(raw) {
                    v.twitter_card = c;
                }
            }
            Field::JsonldType => {
                if let Some(c) = JsonLdType::parse(raw) {
                    v.jsonld_type = c;
                }
            }
        }
        match result {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(e) => {
                self.errors.insert(field, e);
            }
        }
    }

    /// Apply every recognised field of a submitted form query, in order.
    /// Unlike [`crate::query::from_query`], an empty value clears the field.
    pub fn edit_from_query(&mut self, query: &str) {
        for (field, value) in fields(query) {
            self.edit(field, &value);
        }
    }

    pub fn values(&self) -> &MetaConfig {
        &self.values
    }

    pub fn errors(&self) -> &BTreeMap<Field, FieldError> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_values(self) -> MetaConfig {
        self.values
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(MetaConfig::default())
    }
}
