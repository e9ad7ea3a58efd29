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

use std::str::SplitWhitespace;

use pango::{FontDescription, Layout};

use crate::error::{CalendarError, Result};
use crate::render_prims::{layout_size_px, prepare_layout};

/// Pixel extents of a single line of text in some font.
pub trait MeasureText {
    fn measure(&self, text: &str) -> (f64, f64);

    fn width(&self, text: &str) -> f64 {
        self.measure(text).0
    }
}

impl<M: MeasureText + ?Sized> MeasureText for &M {
    fn measure(&self, text: &str) -> (f64, f64) {
        (**self).measure(text)
    }
}

/// Measures with pango on a scratch surface, so the numbers match what
/// [`crate::render_prims::TextLine`] will draw.
pub struct PangoMeasure {
    layout: Layout,
    // The layout borrows the context's font options; keep it alive.
    _context: cairo::Context,
}

impl PangoMeasure {
    pub fn new(font: &FontDescription) -> Result<Self> {
        let tmp_surface = cairo::ImageSurface::create(cairo::Format::Rgb24, 16, 16)?;
        let context = cairo::Context::new(&tmp_surface);

        let layout = prepare_layout(&context, font, "")
            .map_err(CalendarError::Render)?;

        Ok(PangoMeasure {
            layout,
            _context: context,
        })
    }
}

impl MeasureText for PangoMeasure {
    fn measure(&self, text: &str) -> (f64, f64) {
        self.layout.set_text(text);
        layout_size_px(&self.layout)
    }
}

/// Every character is `advance` wide and lines are `line_height` tall.
/// Handy wherever layout has to be predictable to the pixel.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvance {
    pub advance: f64,
    pub line_height: f64,
}

impl MeasureText for FixedAdvance {
    fn measure(&self, text: &str) -> (f64, f64) {
        (text.chars().count() as f64 * self.advance, self.line_height)
    }
}

/// Greedy word wrapper; see [`wrap`].
pub struct Wrap<'a, M: ?Sized> {
    words: SplitWhitespace<'a>,
    current: String,
    max_width: f64,
    measure: &'a M,
}

impl<'a, M: MeasureText + ?Sized> Iterator for Wrap<'a, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(word) = self.words.next() {
            if self.current.is_empty() {
                // A lone word is taken even if it overflows; words are never split.
                self.current.push_str(word);
                continue;
            }

            let candidate = format!("{} {}", self.current, word);
            if self.measure.width(&candidate) <= self.max_width {
                self.current = candidate;
            } else {
                return Some(std::mem::replace(&mut self.current, word.to_string()));
            }
        }

        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }
}

/// Splits `text` into lines no wider than `max_width`, breaking only at
/// whitespace.
pub fn wrap<'a, M: MeasureText + ?Sized>(text: &'a str, max_width: f64, measure: &'a M) -> Wrap<'a, M> {
    Wrap {
        words: text.split_whitespace(),
        current: String::new(),
        max_width,
        measure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    const MONO: FixedAdvance = FixedAdvance {
        advance: 10.0,
        line_height: 12.0,
    };

    fn lines(text: &str, w: f64) -> Vec<String> {
        wrap(text, w, &MONO).collect()
    }

    #[test]
    fn fills_lines_greedily() {
        assert_eq!(lines("aa bb cc dd", 50.0), vec!["aa bb", "cc dd"]);
        assert_eq!(lines("aa bb cc dd", 49.0), vec!["aa", "bb", "cc", "dd"]);
        assert_eq!(lines("aa bb cc dd", 1000.0), vec!["aa bb cc dd"]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(lines("", 100.0).is_empty());
        assert!(lines("   \t\n ", 100.0).is_empty());
    }

    #[test]
    fn overwide_word_stands_alone() {
        assert_eq!(
            lines("a extraordinarily b", 30.0),
            vec!["a", "extraordinarily", "b"]
        );
        assert_eq!(lines("extraordinarily", 30.0), vec!["extraordinarily"]);
    }

    #[test]
    fn wrapping_preserves_words_and_respects_budget() {
        let text = "  09:30 - Quarterly   planning with the whole\tinfrastructure team and guests ";
        for &w in &[0.0, 25.0, 60.0, 95.0, 140.0, 500.0] {
            let out = lines(text, w);

            assert_eq!(out.iter().join(" "), text.split_whitespace().join(" "));
            for line in out.iter() {
                assert!(
                    MONO.width(line) <= w || !line.contains(' '),
                    "line {:?} too wide for {}",
                    line,
                    w
                );
            }
        }
    }

    #[test]
    fn iterator_is_lazy_and_ends() {
        let mut it = wrap("one two", 30.0, &MONO);
        assert_eq!(it.next().as_deref(), Some("one"));
        assert_eq!(it.next().as_deref(), Some("two"));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }
}
