//! SVG scene for the OG image: a full-bleed background and centred title.
//!
//! Built with maud so the title is escaped. Every element is written with an
//! explicit closing tag because the result is parsed as XML, not HTML.

use super::calculations::TextLayout;
use super::params::{Canvas, OgImageParams, TextStyle};
use maud::html;

pub fn scene(params: &OgImageParams, canvas: &Canvas, style: &TextStyle, layout: &TextLayout) -> String {
    let cx = canvas.width as f32 / 2.0;
    html! {
        svg xmlns="http://www.w3.org/2000/svg"
            width=(canvas.width)
            height=(canvas.height)
            viewBox={ "0 0 " (canvas.width) " " (canvas.height) } {
            rect x="0" y="0" width=(canvas.width) height=(canvas.height) fill=(params.background.to_hex()) {}
            @if !layout.lines.is_empty() {
                text
                    text-anchor="middle"
                    font-family=(style.font_family)
                    font-size=(layout.font_size)
                    font-weight=(style.font_weight)
                    letter-spacing=(style.letter_spacing)
                    fill=(params.foreground.to_hex()) {
                    @for (line, y) in layout.lines.iter().zip(&layout.baselines) {
                        tspan x=(cx) y=(y) { (line) }
                    }
                }
            }
        }
    }
    .into_string()
}
