use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Caption/box color in the notation ffmpeg filters accept.
///
/// Parsed from a color name (`white`), `#RRGGBB[AA]` or `0xRRGGBB[AA]`, each optionally followed
/// by `@alpha` with alpha in `[0, 1]`. An `@alpha` suffix wins over hex alpha.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaptionColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
}

impl CaptionColor {
    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            alpha: 1.0,
        }
    }

    /// Same color with a different opacity.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }
}

impl FromStr for CaptionColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (base, alpha) = match s.split_once('@') {
            Some((base, alpha)) => (base.trim(), Some(parse_alpha(alpha.trim())?)),
            None => (s, None),
        };

        let color = if let Some(hex) = base.strip_prefix('#') {
            parse_hex(hex)?
        } else if let Some(hex) = base
            .strip_prefix("0x")
            .or_else(|| base.strip_prefix("0X"))
        {
            parse_hex(hex)?
        } else {
            named(base).ok_or_else(|| format!("unknown color \"{base}\""))?
        };

        Ok(match alpha {
            Some(a) => color.with_alpha(a),
            None => color,
        })
    }
}

impl TryFrom<String> for CaptionColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CaptionColor> for String {
    fn from(value: CaptionColor) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for CaptionColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.alpha < 1.0 {
            write!(f, "@{}", self.alpha)?;
        }
        Ok(())
    }
}

fn parse_alpha(s: &str) -> Result<f64, String> {
    let a: f64 = s
        .parse()
        .map_err(|_| format!("invalid color alpha \"{s}\""))?;
    if !(0.0..=1.0).contains(&a) {
        return Err(format!("color alpha must be within [0, 1] (got {a})"));
    }
    Ok(a)
}

fn parse_hex(s: &str) -> Result<CaptionColor, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }
    match s.len() {
        6 => Ok(CaptionColor::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => {
            let a = hex_byte(&s[6..8])?;
            Ok(CaptionColor::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )
            .with_alpha(f64::from(a) / 255.0))
        }
        _ => Err("hex color must be RRGGBB or RRGGBBAA (case-insensitive)".to_owned()),
    }
}

fn named(name: &str) -> Option<CaptionColor> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "white" => (0xFF, 0xFF, 0xFF),
        "black" => (0x00, 0x00, 0x00),
        "red" => (0xFF, 0x00, 0x00),
        "green" => (0x00, 0x80, 0x00),
        "lime" => (0x00, 0xFF, 0x00),
        "blue" => (0x00, 0x00, 0xFF),
        "yellow" => (0xFF, 0xFF, 0x00),
        "cyan" => (0x00, 0xFF, 0xFF),
        "magenta" => (0xFF, 0x00, 0xFF),
        "gray" | "grey" => (0x80, 0x80, 0x80),
        "orange" => (0xFF, 0xA5, 0x00),
        _ => return None,
    };
    Some(CaptionColor::rgb(rgb.0, rgb.1, rgb.2))
}

#[cfg(test)]
#[path = "../../tests/unit/caption/color.rs"]
mod tests;
