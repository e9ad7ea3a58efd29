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

use pango::{FontDescription, FontFamilyExt, FontMapExt};
use tracing::{debug, warn};

use crate::config::{FontSizes, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZES};

/// One value per text role on the calendar.
#[derive(Clone, Debug, PartialEq)]
pub struct FontRoles<T> {
    pub title: T,
    pub day: T,
    pub event: T,
}

impl<T> FontRoles<T> {
    pub fn try_map<U, E>(&self, f: impl Fn(&T) -> Result<U, E>) -> Result<FontRoles<U>, E> {
        Ok(FontRoles {
            title: f(&self.title)?,
            day: f(&self.day)?,
            event: f(&self.event)?,
        })
    }
}

pub type FontSet = FontRoles<FontDescription>;

#[derive(Clone, Debug, PartialEq)]
pub enum FontStatus {
    Requested,
    /// Every role uses the default font.
    Fallback { reason: String },
}

fn describe(family: &str, px: u32) -> FontDescription {
    let mut desc = FontDescription::new();
    desc.set_family(family);
    desc.set_absolute_size(px as f64 * pango::SCALE as f64);
    desc
}

fn font_set(family: &str, sizes: &FontSizes) -> FontSet {
    FontRoles {
        title: describe(family, sizes.title),
        day: describe(family, sizes.day),
        event: describe(family, sizes.event),
    }
}

/// Whether the default font map knows `family`.
pub fn family_available(family: &str) -> bool {
    let font_map = match pangocairo::FontMap::get_default() {
        Some(fm) => fm,
        None => return false,
    };

    font_map.list_families().iter().any(|f| {
        f.get_name()
            .map(|name| name.as_str().eq_ignore_ascii_case(family))
            .unwrap_or(false)
    })
}

/// Resolves the three calendar fonts. Falls back to the default font for
/// all roles at once if any of them cannot be had.
pub fn load_fonts(family: &str, sizes: &FontSizes) -> (FontSet, FontStatus) {
    load_fonts_with(family, sizes, family_available)
}

pub fn load_fonts_with(
    family: &str,
    sizes: &FontSizes,
    is_available: impl Fn(&str) -> bool,
) -> (FontSet, FontStatus) {
    let problem = if sizes.title == 0 || sizes.day == 0 || sizes.event == 0 {
        Some(format!("invalid font sizes {:?}", sizes))
    } else if family.trim().is_empty() {
        Some("no font family configured".to_string())
    } else if !is_available(family) {
        Some(format!("font family {:?} not found", family))
    } else {
        None
    };

    match problem {
        None => {
            debug!("Using font {:?} at {:?}", family, sizes);
            (font_set(family, sizes), FontStatus::Requested)
        }
        Some(reason) => {
            warn!("Fonts could not be loaded ({}). Using default fonts.", reason);
            (
                font_set(DEFAULT_FONT_FAMILY, &DEFAULT_FONT_SIZES),
                FontStatus::Fallback { reason },
            )
        }
    }
}
