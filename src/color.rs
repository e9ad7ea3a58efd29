// Copyright 2020-2021 bd_
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions: The above copyright
// notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CalendarError, Result};

/// 8-bit RGB triple; the canonical color representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Channel-wise scale, truncating toward zero.
    pub fn scale(self, factor: f64) -> Rgb {
        let ch = |c: u8| (c as f64 * factor).max(0.0).min(255.0) as u8;
        Rgb(ch(self.0), ch(self.1), ch(self.2))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from(t: (u8, u8, u8)) -> Self {
        Rgb(t.0, t.1, t.2)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(a: [u8; 3]) -> Self {
        Rgb(a[0], a[1], a[2])
    }
}

impl FromStr for Rgb {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CalendarError::InvalidColorFormat {
            value: s.to_string(),
        };

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let rgb = Rgb(channel(0)?, channel(2)?, channel(4)?);

        debug!("HEX {:?} -> RGB {:?}", s, rgb);
        Ok(rgb)
    }
}

/// Floating point color as consumed by cairo.
#[derive(Clone, Copy, Debug)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color {
            r: (rgb.0 as f64 * (1.0 / 255.0)),
            g: (rgb.1 as f64 * (1.0 / 255.0)),
            b: (rgb.2 as f64 * (1.0 / 255.0)),
        }
    }
}

/// A color as written in configuration: either `"#RRGGBB"` / `"RRGGBB"` or
/// an `[r, g, b]` triple.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Hex(String),
    Triple([u8; 3]),
}

impl ColorSpec {
    pub fn resolve(&self) -> Result<Rgb> {
        match self {
            ColorSpec::Hex(s) => s.parse(),
            ColorSpec::Triple(t) => Ok(Rgb::from(*t)),
        }
    }
}

impl From<Rgb> for ColorSpec {
    fn from(c: Rgb) -> Self {
        ColorSpec::Triple([c.0, c.1, c.2])
    }
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        ColorSpec::Hex(s.to_string())
    }
}

pub fn resolve(value: impl Into<ColorSpec>) -> Result<Rgb> {
    value.into().resolve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_hex_with_and_without_hash() {
        assert_eq!(resolve("#010203").unwrap(), Rgb(1, 2, 3));
        assert_eq!(resolve("0a0B0c").unwrap(), Rgb(10, 11, 12));
        assert_eq!(resolve("#FFFFFF").unwrap(), Rgb(255, 255, 255));
    }

    #[test]
    fn triple_passes_through() {
        assert_eq!(resolve(Rgb(1, 2, 3)).unwrap(), Rgb(1, 2, 3));
        assert_eq!(ColorSpec::Triple([9, 8, 7]).resolve().unwrap(), Rgb(9, 8, 7));
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in &["bad", "", "#", "#12345", "#1234567", "##010203", "12345g", "+10203"] {
            match resolve(*bad) {
                Err(CalendarError::InvalidColorFormat { value }) => assert_eq!(value, *bad),
                other => panic!("{:?} resolved to {:?}", bad, other),
            }
        }
    }

    #[test]
    fn scale_dims_each_channel() {
        assert_eq!(Rgb(255, 100, 1).scale(0.5), Rgb(127, 50, 0));
        assert_eq!(Rgb(100, 200, 50).scale(0.6), Rgb(60, 120, 30));
    }

    #[test]
    fn deserializes_either_form() {
        #[derive(Deserialize)]
        struct Holder {
            a: ColorSpec,
            b: ColorSpec,
        }

        let h: Holder = toml::from_str("a = \"#102030\"\nb = [1, 2, 3]\n").unwrap();
        assert_eq!(h.a.resolve().unwrap(), Rgb(16, 32, 48));
        assert_eq!(h.b, ColorSpec::Triple([1, 2, 3]));
    }
}
