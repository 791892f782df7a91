//! Paint color values used for live recoloring

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid color '{0}': expected #rgb or #rrggbb")]
    Invalid(String),
}

/// A validated sRGB color, stored as normalized `#rrggbb` hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorSpec {
    rgb: [u8; 3],
}

impl ColorSpec {
    pub const WHITE: ColorSpec = ColorSpec { rgb: [0xff, 0xff, 0xff] };

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b] }
    }

    /// Parse `#rgb`, `#rrggbb`, or the same without the leading `#`
    pub fn parse(text: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::Invalid(text.to_string());
        let digits = text.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, slot) in rgb.iter_mut().enumerate() {
                    let nibble = channel(&digits[i..i + 1])?;
                    *slot = nibble * 17;
                }
                Ok(Self { rgb })
            }
            6 => Ok(Self {
                rgb: [
                    channel(&digits[0..2])?,
                    channel(&digits[2..4])?,
                    channel(&digits[4..6])?,
                ],
            }),
            _ => Err(invalid()),
        }
    }

    pub fn rgb8(&self) -> [u8; 3] {
        self.rgb
    }

    /// sRGB channels in 0.0-1.0
    pub fn srgb(&self) -> [f32; 3] {
        self.rgb.map(|c| c as f32 / 255.0)
    }

    /// Lowercase `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for ColorSpec {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ColorSpec {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColorSpec> for String {
    fn from(color: ColorSpec) -> Self {
        color.hex()
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}
