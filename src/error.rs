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

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = CalendarError> = std::result::Result<T, E>;

/// Failures that abort a render. Recoverable problems are reported as
/// [`crate::diagnostics::Diagnostic`] values instead.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid color {value:?}: expected 6 hex digits, optionally prefixed with '#'")]
    InvalidColorFormat { value: String },

    #[error("Layout infeasible: {0}")]
    LayoutInfeasible(String),

    #[error("No such month: {year}-{month}")]
    InvalidDate { year: i32, month: u32 },

    #[error("Unsupported output image format for {path:?} (expected png, bmp, jpg or jpeg)")]
    UnsupportedImageFormat { path: PathBuf },

    #[error("Failed to write image to {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cairo error: {0}")]
    Cairo(cairo::Status),

    #[error("Rendering failed: {0}")]
    Render(#[source] anyhow::Error),

    #[error("Event store error: {0}")]
    EventStore(#[from] rusqlite::Error),

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl From<cairo::Status> for CalendarError {
    fn from(s: cairo::Status) -> Self {
        CalendarError::Cairo(s)
    }
}
