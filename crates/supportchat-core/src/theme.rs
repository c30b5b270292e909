//! Branding colors for the drawer.
//!
//! The server hands the widget a flat palette of `#rrggbb` strings. A
//! `Theme` is the resolved form the UI actually paints with, including the
//! derived hover/gradient shades. Building a `Theme` always produces a
//! complete replacement value, so re-applying a palette is idempotent.

use serde::{Deserialize, Serialize};

/// A 24-bit color, kept UI-framework agnostic so the core crate does not
/// depend on ratatui.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Named colors for the widget surfaces, verbatim from the config API.
/// All fields are required once a palette is present at all.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    pub send_button_color: String,
    pub chat_header_color: String,
    pub close_icon_color: String,
    pub chat_bg_color: String,
    pub ai_bubble_color: String,
    pub human_bubble_color: String,
    pub text_box_color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub tab_bg: Rgb,
    pub header: Rgb,
    pub header_gradient: Rgb,
    pub close_icon: Rgb,
    pub chat_bg: Rgb,
    pub assistant_bubble: Rgb,
    pub human_bubble: Rgb,
    pub input_box: Rgb,
    pub input_focus: Rgb,
    pub send_button: Rgb,
    pub send_button_hover: Rgb,
}

impl Default for Theme {
    /// Matches the server-side defaults used when a tenant has no
    /// customization yet.
    fn default() -> Self {
        let blue = Rgb(0x00, 0x7b, 0xff);
        Self {
            tab_bg: blue,
            header: blue,
            header_gradient: shade(blue),
            close_icon: Rgb(0xff, 0xff, 0xff),
            chat_bg: Rgb(0xf8, 0xf9, 0xfa),
            assistant_bubble: Rgb(0xff, 0xff, 0xff),
            human_bubble: blue,
            input_box: Rgb(0xff, 0xff, 0xff),
            input_focus: shade(Rgb(0xff, 0xff, 0xff)),
            send_button: blue,
            send_button_hover: shade(blue),
        }
    }
}

impl Theme {
    /// Resolve a palette into a full theme. Fields that fail to parse fall
    /// back to the default theme's value for that surface, so a partially
    /// broken palette degrades per-surface instead of wholesale.
    pub fn from_palette(palette: &ColorPalette) -> Self {
        let d = Theme::default();
        let header = parse_hex(&palette.chat_header_color).unwrap_or(d.header);
        let send_button = parse_hex(&palette.send_button_color).unwrap_or(d.send_button);
        let input_box = parse_hex(&palette.text_box_color).unwrap_or(d.input_box);

        Self {
            // The tab toggle shares the header color, matching the original
            // widget's visual grouping.
            tab_bg: header,
            header,
            header_gradient: shade(header),
            close_icon: parse_hex(&palette.close_icon_color).unwrap_or(d.close_icon),
            chat_bg: parse_hex(&palette.chat_bg_color).unwrap_or(d.chat_bg),
            assistant_bubble: parse_hex(&palette.ai_bubble_color).unwrap_or(d.assistant_bubble),
            human_bubble: parse_hex(&palette.human_bubble_color).unwrap_or(d.human_bubble),
            input_box,
            input_focus: shade(input_box),
            send_button,
            send_button_hover: shade(send_button),
        }
    }
}

/// Parse a `#rrggbb` string.
pub fn parse_hex(s: &str) -> Option<Rgb> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb(r, g, b))
}

/// Hover/gradient variant: alpha suffix `CC` (0.8) composited over black.
fn shade(c: Rgb) -> Rgb {
    let scale = |v: u8| ((v as u16 * 204) / 255) as u8;
    Rgb(scale(c.0), scale(c.1), scale(c.2))
}

/// Black or white, whichever reads better on the given background.
pub fn contrast(bg: Rgb) -> Rgb {
    // Rec. 601 luma
    let luma = 299 * bg.0 as u32 + 587 * bg.1 as u32 + 114 * bg.2 as u32;
    if luma > 128_000 {
        Rgb(0x00, 0x00, 0x00)
    } else {
        Rgb(0xff, 0xff, 0xff)
    }
}
