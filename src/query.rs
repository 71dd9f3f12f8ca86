//! Query-string encoding of [`MetaConfig`].
//!
//! The query string is the only place the state lives between page loads, so
//! the two directions must agree: for every non-empty field,
//! `from_query(&to_query(v), defaults)` gives back `v`.
//!
//! ```text
//! ?title=Hello&siteName=Acme&type=article&ogBg=%23000000
//! ```

use crate::types::{Choice, ContentType, Field, JsonLdType, MetaConfig, TwitterCard};
use url::{Url, form_urlencoded};

/// The query-string part of `input`, which may be a bare query, `?query`, or
/// a full URL.
///
/// Only an input that parses as an absolute URL and has no `=` or `&` before
/// its first `?` is treated as a URL. Anything else is a bare query taken as
/// is, so hand-typed values like `canonical=https://x.test/p` or `ogBg=#000`
/// survive.
pub fn query_part(input: &str) -> &str {
    let input = input.trim();
    if let Some(query) = input.strip_prefix('?') {
        return query;
    }
    let head = input.split_once('?').map_or(input, |(h, _)| h);
    if head.contains(['=', '&']) || Url::parse(input).is_err() {
        return input;
    }
    let query = input.split_once('?').map_or("", |(_, q)| q);
    query.split_once('#').map_or(query, |(q, _)| q)
}

/// Serialize every non-empty field, in [`Field::ALL`] order.
pub fn to_query(values: &MetaConfig) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    for field in Field::ALL {
        let value = values.get(field);
        if !value.is_empty() {
            ser.append_pair(field.key(), value);
        }
    }
    ser.finish()
}

/// Recognised fields present in a query, in order of appearance.
///
/// Only the first occurrence of each key is kept. Empty values are kept too,
/// so a form submission can express "this field was cleared".
pub fn fields(input: &str) -> Vec<(Field, String)> {
    let mut found: Vec<(Field, String)> = Vec::with_capacity(Field::ALL.len());
    for (key, value) in form_urlencoded::parse(query_part(input).as_bytes()) {
        let Some(field) = Field::from_key(&key) else {
            continue;
        };
        if found.iter().any(|(f, _)| *f == field) {
            continue;
        }
        found.push((field, value.into_owned()));
    }
    found
}

/// Parse a query string on top of `defaults`.
///
/// Unknown keys are ignored, the first occurrence of a key wins, and an empty
/// or unrecognised value leaves the default in place.
pub fn from_query(input: &str, defaults: &MetaConfig) -> MetaConfig {
    let mut values = defaults.clone();
    for (field, value) in fields(input) {
        if !value.is_empty() {
            apply(&mut values, field, value);
        }
    }
    values
}

fn apply(values: &mut MetaConfig, field: Field, value: String) {
    match field {
        Field::Title => values.title = value,
        Field::Description => values.description = value,
        Field::SiteName => values.site_name = value,
        Field::Canonical => values.canonical = value,
        Field::Author => values.author = Some(value),
        Field::OgImageText => values.og_image_text = value,
        Field::OgBg => values.og_bg = value,
        Field::OgFg => values.og_fg = value,
        Field::ContentType => {
            if let Some(c) = ContentType::parse(&value) {
                values.content_type = c;
            }
        }
        Field::TwitterCard => {
            if let Some(c) = TwitterCard::parse(&value) {
                values.twitter_card = c;
            }
        }
        Field::JsonldType => {
            if let Some(c) = JsonLdType::parse(&value) {
                values.jsonld_type = c;
            }
        }
    }
}

/// Look up the first value for `key` in a raw query string.
pub fn first_param(input: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query_part(input).as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
