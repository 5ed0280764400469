//! Color picker support: preset palette and hex color parsing.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Swatch {
    pub name: &'static str,
    pub hex: &'static str,
}

pub const PALETTE: &[Swatch] = &[
    Swatch { name: "Slate", hex: "#1E293B" },
    Swatch { name: "Gray", hex: "#6B7280" },
    Swatch { name: "White", hex: "#FFFFFF" },
    Swatch { name: "Red", hex: "#DC2626" },
    Swatch { name: "Orange", hex: "#EA580C" },
    Swatch { name: "Amber", hex: "#D97706" },
    Swatch { name: "Green", hex: "#16A34A" },
    Swatch { name: "Teal", hex: "#0D9488" },
    Swatch { name: "Blue", hex: "#2563EB" },
    Swatch { name: "Indigo", hex: "#4F46E5" },
    Swatch { name: "Purple", hex: "#9333EA" },
    Swatch { name: "Pink", hex: "#DB2777" },
];

/// Parse `#rgb` or `#rrggbb` into RGB components.
#[must_use]
pub fn parse_hex(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = hex.chars().map(|c| {
                let v = u8::try_from(c.to_digit(16).unwrap_or(0)).unwrap_or(0);
                v * 17
            });
            Some((channels.next()?, channels.next()?, channels.next()?))
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}

#[must_use]
pub fn is_hex_color(raw: &str) -> bool {
    parse_hex(raw).is_some()
}

/// Canonical uppercase `#RRGGBB` form.
#[must_use]
pub fn normalize(raw: &str) -> Option<String> {
    let (r, g, b) = parse_hex(raw)?;
    Some(format!("#{r:02X}{g:02X}{b:02X}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_and_long_forms() {
        assert_eq!(parse_hex("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex("#2563EB"), Some((0x25, 0x63, 0xEB)));
        assert_eq!(normalize("#a0b"), Some("#AA00BB".into()));
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(!is_hex_color("2563EB"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#GGGGGG"));
        assert!(!is_hex_color("red"));
    }

    #[test]
    fn palette_is_valid_hex() {
        for swatch in PALETTE {
            assert_eq!(normalize(swatch.hex).as_deref(), Some(swatch.hex));
        }
    }
}
