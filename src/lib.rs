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

//! Renders a month calendar with events into a wallpaper image.

pub mod color;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod fonts;
pub mod grid;
pub mod logging;
pub mod render;
pub mod render_prims;
pub mod text;

pub use color::{ColorSpec, Rgb};
pub use config::{CalendarConfig, OutputFormat, Settings};
pub use diagnostics::Diagnostic;
pub use error::{CalendarError, Result};
pub use events::{EventSource, EventsByDate, Projection, RawEvent, SqliteEventStore};
pub use grid::{DateGrid, StartOfWeek};
pub use render::{render, render_image, RenderReport, RenderRequest, RenderedImage};
