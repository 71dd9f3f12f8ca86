//! The generator page.
//!
//! One server-rendered HTML document: the form on the left, the live preview
//! (OG image, `<head>` snippet, contrast check) on the right. The `<head>` of
//! the page itself carries the meta tags and JSON-LD for the current values,
//! so a shared link unfurls with exactly what the form shows.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: layout and form styles
//! - `static/app.js`: debounced preview refresh and URL sync
//!
//! The script never derives anything itself. After the configured idle delay
//! it sends the form to `/api/preview`, swaps in the returned image URL,
//! snippet, contrast message and field errors, and rewrites the address bar
//! with `history.replaceState`.

use crate::contrast::{expand_hex, is_hex_color};
use crate::form::FormState;
use crate::metadata::{PageMetadata, json_ld_script, render_head};
use crate::preview::{Derived, SnippetEscaping, derive};
use crate::types::{Choice, ContentType, DEFAULT_OG_BG, DEFAULT_OG_FG, Field, JsonLdType, TwitterCard};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/app.js");

/// How a field is edited.
enum Control {
    Text,
    Url,
    TextArea,
    Select(Vec<&'static str>),
    Color,
}

fn control(field: Field) -> Control {
    match field {
        Field::Description => Control::TextArea,
        Field::Canonical => Control::Url,
        Field::ContentType => Control::Select(ContentType::allowed()),
        Field::TwitterCard => Control::Select(TwitterCard::allowed()),
        Field::JsonldType => Control::Select(JsonLdType::allowed()),
        Field::OgBg | Field::OgFg => Control::Color,
        Field::Title | Field::SiteName | Field::Author | Field::OgImageText => Control::Text,
    }
}

/// Settings that shape the page but are not part of the value set.
#[derive(Debug, Clone, Copy)]
pub struct PageOptions<'a> {
    pub base_url: &'a str,
    pub escaping: SnippetEscaping,
    /// Idle delay before the script refreshes the preview.
    pub debounce_ms: u64,
}

/// Render the full generator page for the current form state.
pub fn render_page(state: &FormState, options: PageOptions<'_>) -> Markup {
    let values = state.values();
    let meta = PageMetadata::from_values(values, options.base_url);
    let derived = derive(values, options.base_url, options.escaping);

    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                (render_head(&meta))
                (json_ld_script(values))
                style { (PreEscaped(CSS)) }
            }
            body {
                header.site-header {
                    h1 { "MetaCraft" }
                    span.tagline { "SEO • Open Graph • JSON‑LD" }
                }
                main.generator {
                    (render_form(state, options.debounce_ms))
                    (render_preview(&derived))
                }
                footer.site-footer { "Alguns direitos reservados" }
                script { (PreEscaped(JS)) }
            }
        }
    }
}

fn render_form(state: &FormState, debounce_ms: u64) -> Markup {
    html! {
        form #meta-form .meta-form data-debounce=(debounce_ms) autocomplete="off" {
            @for field in Field::ALL {
                (render_field(state, field))
            }
        }
    }
}

fn render_field(state: &FormState, field: Field) -> Markup {
    let key = field.key();
    let value = state.values().get(field);
    let error = state.error(field);
    let wide = matches!(field, Field::Description | Field::Canonical);

    html! {
        label.field.wide[wide].invalid[error.is_some()] {
            span.label { (field.label()) }
            @match control(field) {
                Control::Text => {
                    input type="text" name=(key) value=(value);
                },
                Control::Url => {
                    input type="url" name=(key) value=(value);
                },
                Control::TextArea => {
                    textarea name=(key) rows="3" { (value) }
                },
                Control::Select(choices) => {
                    select name=(key) {
                        @for choice in choices {
                            option value=(choice) selected[choice == value] { (choice) }
                        }
                    }
                },
                Control::Color => {
                    span.color-pair {
                        input type="color" data-color-for=(key) value=(color_input_value(field, value));
                        input type="text" name=(key) value=(value) spellcheck="false";
                    }
                },
            }
            p.field-error data-error-for=(key) {
                @if let Some(e) = error { (e.to_string()) }
            }
        }
    }
}

/// `<input type=color>` only accepts `#rrggbb`.
fn color_input_value(field: Field, value: &str) -> String {
    if is_hex_color(value) {
        expand_hex(value)
    } else {
        let fallback = match field {
            Field::OgFg => DEFAULT_OG_FG,
            _ => DEFAULT_OG_BG,
        };
        expand_hex(fallback)
    }
}

fn render_preview(derived: &Derived) -> Markup {
    html! {
        section.preview {
            div.card {
                div.card-title { "Prévia da imagem OG" }
                div.og-frame {
                    img #og-preview src=(derived.og_image_url) alt="Prévia OG" width="1200" height="630";
                    span.og-status { "Carregando…" }
                }
                p #contrast .contrast data-level=(derived.contrast.level.as_str()) { (derived.contrast.to_string()) }
            }
            div.card {
                div.card-title {
                    "Snippet de <head>"
                    button #copy-snippet type="button" { "Copiar" }
                }
                textarea #snippet readonly rows="14" spellcheck="false" { (derived.snippet) }
            }
        }
    }
}
