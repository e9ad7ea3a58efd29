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

use std::fmt;

use chrono::NaiveDate;

/// Something went wrong but the render carried on.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A stored row whose timestamp did not parse; the row was dropped.
    EventParseSkipped {
        row: usize,
        timestamp: String,
        reason: String,
    },
    /// The configured font could not be used; every role got the default.
    FontLoadFallback { family: String, reason: String },
    /// A cell ran out of vertical room. `dropped_events` counts the events
    /// that were cut short or not drawn at all.
    EventOverflowTruncated {
        date: NaiveDate,
        dropped_events: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EventParseSkipped {
                row,
                timestamp,
                reason,
            } => write!(
                f,
                "skipped event row {} with timestamp {:?}: {}",
                row, timestamp, reason
            ),
            Diagnostic::FontLoadFallback { family, reason } => {
                write!(f, "font {:?} unavailable ({}), using default", family, reason)
            }
            Diagnostic::EventOverflowTruncated {
                date,
                dropped_events,
            } => write!(
                f,
                "event text overflowed cell {}; {} event(s) truncated",
                date, dropped_events
            ),
        }
    }
}
