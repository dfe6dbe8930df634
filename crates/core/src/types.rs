//! Shared value types: colours, fonts and canvas geometry.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed palette assigned to domains in first-seen order, cycling.
pub const DOMAIN_PALETTE: [Rgb; 10] = [
    Rgb::new(0x2E, 0x86, 0xC1),
    Rgb::new(0xAF, 0x7A, 0xC5),
    Rgb::new(0x48, 0xC9, 0xB0),
    Rgb::new(0xF5, 0xB0, 0x41),
    Rgb::new(0xEC, 0x70, 0x63),
    Rgb::new(0x16, 0xA0, 0x85),
    Rgb::new(0x5D, 0x6D, 0x7E),
    Rgb::new(0xCA, 0x6F, 0x1E),
    Rgb::new(0x7D, 0x3C, 0x98),
    Rgb::new(0x1F, 0x61, 0x8D),
];

/// Default body font size (points) for a new domain.
pub const DEFAULT_BODY_SIZE: u32 = 12;

/// Palette colour for the domain at `index` in first-seen order.
pub fn palette_color(index: usize) -> Rgb {
    DOMAIN_PALETTE[index % DOMAIN_PALETTE.len()]
}

/// An sRGB colour, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::Validation(format!("Invalid colour: {}", hex)));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| Error::Validation(format!("Invalid colour: {}", hex)))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase hex digits without the leading `#` (the OOXML `srgbClr` form).
    pub fn hex_digits(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex_digits())
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Font used for measuring and drawing text. The family is always Arial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Size in points.
    pub size: f32,
    pub bold: bool,
    pub underline: bool,
}

impl FontSpec {
    pub const FAMILY: &'static str = "Arial";

    pub fn regular(size: f32) -> Self {
        Self {
            size,
            bold: false,
            underline: false,
        }
    }

    pub fn bold(size: f32) -> Self {
        Self {
            size,
            bold: true,
            underline: false,
        }
    }

    pub fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// Live size of the preview canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Parse `WIDTHxHEIGHT` (e.g. `900x520`).
    pub fn parse(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::Validation(format!("Invalid canvas size: {}", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .ok()
                .filter(|n| *n > 1.0)
                .ok_or_else(|| Error::Validation(format!("Invalid canvas size: {}", s)))
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("#2E86C1").unwrap(), Rgb::new(0x2E, 0x86, 0xC1));
        assert_eq!(Rgb::from_hex("ff0000").unwrap(), Rgb::new(255, 0, 0));
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb::new(0x6E, 0x6E, 0x6E).to_string(), "#6E6E6E");
        assert_eq!(Rgb::WHITE.hex_digits(), "FFFFFF");
    }

    #[test]
    fn test_rgb_serde_as_string() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(1, 2, 3));
        assert!(serde_json::from_str::<Rgb>("\"red\"").is_err());
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), DOMAIN_PALETTE[0]);
        assert_eq!(palette_color(10), DOMAIN_PALETTE[0]);
        assert_eq!(palette_color(13), DOMAIN_PALETTE[3]);
    }

    #[test]
    fn test_canvas_parse() {
        assert_eq!(CanvasSize::parse("900x520").unwrap(), CanvasSize::new(900.0, 520.0));
        assert!(CanvasSize::parse("900").is_err());
        assert!(CanvasSize::parse("0x10").is_err());
    }
}
