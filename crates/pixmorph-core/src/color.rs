//! RGBA colour values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque white, used for the pointer repulsor.
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    /// Default fill for rasterized text (`#FAF0E6`).
    pub const LINEN: Rgba = Rgba::new(250, 240, 230, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Channels as an array, in RGBA order.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Error returned when a hex colour string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour `{0}`, expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ParseColorError(pub String);

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| err())
        };
        // #rgb expands each nibble: `f` -> `ff`
        let short = |i: usize| channel(i..i + 1).map(|v| v * 17);

        match hex.len() {
            3 => Ok(Rgba::rgb(short(0)?, short(1)?, short(2)?)),
            6 => Ok(Rgba::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Rgba::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#FAF0E6".parse::<Rgba>(), Ok(Rgba::LINEN));
        assert_eq!("#fff".parse::<Rgba>(), Ok(Rgba::WHITE));
        assert_eq!(
            "#10203040".parse::<Rgba>(),
            Ok(Rgba::new(0x10, 0x20, 0x30, 0x40))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("FAF0E6".parse::<Rgba>().is_err());
        assert!("#12345".parse::<Rgba>().is_err());
        assert!("#gggggg".parse::<Rgba>().is_err());
        assert!("#ééé".parse::<Rgba>().is_err());
        assert!("#+f+f+f".parse::<Rgba>().is_err());
        assert!("#+ff".parse::<Rgba>().is_err());
    }

    #[test]
    fn display_round_trips_opaque() {
        assert_eq!(Rgba::LINEN.to_string(), "#faf0e6");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
    }
}
