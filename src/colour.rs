//! Colours as the shaders consume them.

use std::{fmt, str::FromStr};

use anyhow::{Context, bail};

/// A linear RGB colour.
///
/// Hex strings (`#rrggbb`) are sRGB encoded, so parsing converts each channel
/// to linear before it reaches a uniform buffer; the surface is sRGB and
/// encodes it back on output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: &str) -> anyhow::Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Expected a colour like #rrggbb, got {hex:?}");
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .with_context(|| format!("Invalid hex digits in colour {hex:?}"))
        };
        Ok(Self::from_srgb8([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }

    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        let [r, g, b] = rgb.map(|c| srgb_to_linear(c as f32 / 255.0));
        Self { r, g, b }
    }

    pub fn to_srgb8(self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (linear_to_srgb(c) * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// The colour with an extra fourth component, for vec4 uniforms.
    pub fn extend(self, w: f32) -> [f32; 4] {
        [self.r, self.g, self.b, w]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

impl FromStr for Colour {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_srgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn endpoints_parse_exactly() {
        assert_eq!(Colour::from_hex("#000000").unwrap(), Colour::new(0.0, 0.0, 0.0));
        assert_eq!(Colour::from_hex("#ffffff").unwrap(), Colour::WHITE);
    }

    #[test]
    fn hex_is_converted_to_linear() {
        let colour: Colour = "#ffeded".parse().unwrap();
        assert_eq!(colour.r, 1.0);
        // 0xed = 237 -> 0.929 sRGB -> ~0.846 linear
        assert_relative_eq!(colour.g, 0.846_873, epsilon = 1e-4);
        assert_eq!(colour.g, colour.b);
    }

    #[test]
    fn prefix_is_optional_and_case_is_ignored() {
        assert_eq!(
            Colour::from_hex("E4572E").unwrap(),
            Colour::from_hex("#e4572e").unwrap()
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        for bad in ["", "#fff", "#ffeded00", "#gg0000", "#ffé00", "#+f+f+f", "#-1-1-1"] {
            assert!(Colour::from_hex(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn display_round_trips_through_srgb() {
        for hex in ["#e4572e", "#17bebb", "#ffc914", "#76b041", "#1e1a20"] {
            assert_eq!(Colour::from_hex(hex).unwrap().to_string(), hex);
        }
    }
}
