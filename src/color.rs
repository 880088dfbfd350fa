//! Parsing of CSS-style color strings into RGBA pixels.

use image::Rgba;

use crate::error::{Error, Result};

const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("transparent", [0, 0, 0, 0]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("navy", [0, 0, 128, 255]),
    ("teal", [0, 128, 128, 255]),
];

/// Parses a color string.
///
/// Accepted forms are `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` with `a` in `0.0..=1.0`, and a handful of named colors.
///
/// # Example
///
/// ```rust
/// use qistyle::color::parse_color;
///
/// assert_eq!(parse_color("#fff").unwrap().0, [255, 255, 255, 255]);
/// assert_eq!(parse_color("rgb(255, 165, 0)").unwrap().0, [255, 165, 0, 255]);
/// ```
pub fn parse_color(value: &str) -> Result<Rgba<u8>> {
    let trimmed = value.trim();
    let invalid = || Error::InvalidColor(value.to_string());

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    let lower = trimmed.to_ascii_lowercase();
    if let Some(args) = lower.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
        return parse_functional(args, true).ok_or_else(invalid);
    }
    if let Some(args) = lower.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        return parse_functional(args, false).ok_or_else(invalid);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgba)| Rgba(*rgba))
        .ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn parse_functional(args: &str, with_alpha: bool) -> Option<Rgba<u8>> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let mut channels = [0u8, 0, 0, 255];
    for (channel, part) in channels.iter_mut().zip(&parts[..3]) {
        *channel = part.parse::<u8>().ok()?;
    }
    if with_alpha {
        let alpha: f32 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        channels[3] = (alpha * 255.0).round() as u8;
    }
    Some(Rgba(channels))
}
