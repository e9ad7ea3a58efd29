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

//! Calendar page layout and painting.
//!
//! Rendering happens in two passes. [`plan_calendar`] computes every
//! position, color and line of text as plain data; [`scene`] turns that plan
//! into a tree of [`Renderable`]s which cairo then paints. Only the second
//! pass touches a drawing surface.

use std::convert::TryInto;
use std::io::Write;
use std::path::{Path, PathBuf};

use cairo::Rectangle;
use chrono::prelude::*;
use tracing::{debug, info, span, warn, Level};

use crate::color::Rgb;
use crate::config::*;
use crate::diagnostics::Diagnostic;
use crate::error::{CalendarError, Result};
use crate::events::EventsByDate;
use crate::fonts::{load_fonts, FontRoles, FontSet, FontStatus};
use crate::grid::{self, DateGrid, StartOfWeek};
use crate::render_prims::*;
use crate::text::{wrap, MeasureText, PangoMeasure};

/// What to draw: which month, which week layout, and which day is today.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    pub year: i32,
    pub month: u32,
    pub start_of_week: StartOfWeek,
    pub today: NaiveDate,
}

/// A piece of text with its top-left corner in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

impl PlacedText {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// The date belongs to the month being drawn.
    Current,
    /// Padding from the previous or next month.
    Adjacent,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CellRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellPlan {
    pub date: NaiveDate,
    pub row: usize,
    pub column: usize,
    pub rect: CellRect,
    pub kind: CellKind,
    pub is_today: bool,
    pub fill: Option<Rgb>,
    pub day_number: PlacedText,
    pub event_lines: Vec<PlacedText>,
}

/// Full geometry of one calendar page.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarPlan {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub grid_color: Rgb,
    pub title: PlacedText,
    pub weekday_labels: Vec<PlacedText>,
    pub rows: usize,
    pub cells: Vec<CellPlan>,
}

impl CalendarPlan {
    pub fn cell(&self, date: NaiveDate) -> Option<&CellPlan> {
        self.cells.iter().find(|c| c.date == date)
    }
}

fn place<M: MeasureText>(metrics: &M, text: String, x: f64, y: f64, color: Rgb) -> PlacedText {
    let (width, height) = metrics.measure(&text);
    PlacedText {
        text,
        x,
        y,
        width,
        height,
        color,
    }
}

/// Lays out event lines top-down from `y`, stopping before the first line
/// that would cross the bottom of the cell.
fn layout_events<M: MeasureText>(
    metrics: &M,
    date: NaiveDate,
    events: &[String],
    rect: &CellRect,
    mut y: f64,
    color: Rgb,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PlacedText> {
    let x = rect.left + EVENT_INSET_X;
    let budget = rect.width - 2.0 * EVENT_INSET_X;
    let mut lines = vec![];

    for (i, event) in events.iter().enumerate() {
        for line in wrap(event, budget, metrics) {
            let placed = place(metrics, line, x, y, color);
            if placed.bottom() > rect.bottom() {
                let dropped_events = events.len() - i;
                warn!(
                    "Event text overflowed in cell {}; {} event(s) truncated",
                    date, dropped_events
                );
                diagnostics.push(Diagnostic::EventOverflowTruncated {
                    date,
                    dropped_events,
                });
                return lines;
            }

            y = placed.bottom();
            lines.push(placed);
        }
    }

    lines
}

/// Computes the page geometry for `request`. Nothing is drawn.
pub fn plan_calendar<M: MeasureText>(
    request: &RenderRequest,
    grid: &DateGrid,
    events: &EventsByDate,
    config: &CalendarConfig,
    metrics: &FontRoles<M>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<CalendarPlan> {
    let palette = &config.palette;
    let margins = &config.margins;

    let (area_w, area_h) = config.drawable_area()?;
    let rows = std::cmp::max(grid.rows(), config.min_rows);
    let cell_width = area_w / 7.0;
    let cell_height = area_h / rows as f64;
    debug!("Cell size {}x{} over {} rows", cell_width, cell_height, rows);

    let left = margins.left as f64;
    let top = margins.top as f64;

    let first = grid::first_of_month(request.year, request.month)?;
    let title_text = first.format("%B %Y").to_string();
    let (title_w, _) = metrics.title.measure(&title_text);
    let title = place(
        &metrics.title,
        title_text,
        (config.width as f64 - title_w) / 2.0,
        top,
        palette.text,
    );

    let weekday_labels = request
        .start_of_week
        .columns()
        .iter()
        .enumerate()
        .map(|(col, wd)| {
            let label = wd.to_string();
            let (w, _) = metrics.day.measure(&label);
            let x = left + col as f64 * cell_width + (cell_width - w) / 2.0;
            place(&metrics.day, label, x, top + WEEKDAY_LABEL_OFFSET, palette.text)
        })
        .collect();

    let grid_top = top + config.header_band as f64;
    let mut cells = Vec::with_capacity(rows * 7);

    for (row, week) in grid.weeks().iter().enumerate() {
        for (column, &date) in week.iter().enumerate() {
            let rect = CellRect {
                left: left + column as f64 * cell_width,
                top: grid_top + row as f64 * cell_height,
                width: cell_width,
                height: cell_height,
            };

            let kind = if grid.is_current_month(date) {
                CellKind::Current
            } else {
                CellKind::Adjacent
            };
            let is_today = date == request.today;

            let day_color = match kind {
                CellKind::Current => palette.text,
                CellKind::Adjacent => palette.text.scale(ADJACENT_DAY_DIM),
            };
            let day_number = place(
                &metrics.day,
                date.day().to_string(),
                rect.left + DAY_NUMBER_INSET_X,
                rect.top + DAY_NUMBER_INSET_Y,
                day_color,
            );

            let event_color = if is_today {
                palette.today_event
            } else if kind == CellKind::Current {
                palette.event
            } else {
                palette.event.scale(ADJACENT_EVENT_DIM)
            };

            let event_lines = match events.get(&date) {
                Some(list) => layout_events(
                    &metrics.event,
                    date,
                    list,
                    &rect,
                    day_number.bottom() + EVENT_TOP_GAP,
                    event_color,
                    diagnostics,
                ),
                None => vec![],
            };

            cells.push(CellPlan {
                date,
                row,
                column,
                rect,
                kind,
                is_today,
                fill: if is_today && kind == CellKind::Current {
                    Some(palette.today_background)
                } else {
                    None
                },
                day_number,
                event_lines,
            });
        }
    }

    Ok(CalendarPlan {
        width: config.width,
        height: config.height,
        background: palette.background,
        grid_color: palette.grid,
        title,
        weekday_labels,
        rows,
        cells,
    })
}

fn text_at(t: &PlacedText, font: &pango::FontDescription, origin: (f64, f64)) -> RenderTranslate {
    TextLine::new(t.text.clone(), t.color.into(), font).offset(t.x - origin.0, t.y - origin.1)
}

/// Builds the drawable tree for a plan.
pub fn scene(plan: &CalendarPlan, fonts: &FontSet) -> RenderGroup {
    let mut root = RenderGroup::new();

    root.push(FillRect::rect(
        plan.background.into(),
        plan.width as f64,
        plan.height as f64,
    ));
    root.push(text_at(&plan.title, &fonts.title, (0.0, 0.0)));
    for label in plan.weekday_labels.iter() {
        root.push(text_at(label, &fonts.day, (0.0, 0.0)));
    }

    for cell in plan.cells.iter() {
        let rect = &cell.rect;
        let origin = (rect.left, rect.top);
        let mut cell_group = RenderGroup::new();

        if let Some(fill) = cell.fill {
            cell_group.push(FillRect::rect(fill.into(), rect.width, rect.height));
        }
        cell_group.push(StrokeRect {
            width: rect.width,
            height: rect.height,
            line_width: GRID_LINE_WIDTH,
            color: plan.grid_color.into(),
        });

        let mut contents = RenderGroup::new();
        contents.push(text_at(&cell.day_number, &fonts.day, origin));
        for line in cell.event_lines.iter() {
            contents.push(text_at(line, &fonts.event, origin));
        }
        cell_group.push(contents.clip_to(Rectangle {
            x: 0.0,
            y: 0.0,
            width: rect.width,
            height: rect.height,
        }));

        root.push(cell_group.offset(rect.left, rect.top));
    }

    root
}

/// A painted page that has not been written anywhere yet.
pub struct RenderedImage {
    surface: cairo::ImageSurface,
    pub grid: DateGrid,
    pub plan: CalendarPlan,
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        self.plan.width
    }

    pub fn height(&self) -> u32 {
        self.plan.height
    }

    /// Copies the pixels out of the cairo surface.
    pub fn to_rgb(&mut self) -> Result<image::RgbImage> {
        surface_to_rgb(&mut self.surface).map_err(CalendarError::Render)
    }

    /// Writes the image to `path`, replacing whatever is there.
    pub fn persist(&mut self, path: &Path, format: OutputFormat) -> Result<()> {
        info!("Writing image to {:?}", path);

        self.write(path, format)
            .map_err(|source| CalendarError::Persist {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write(&mut self, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Png => {
                let f = std::fs::File::create(path)?;
                let mut f = std::io::BufWriter::new(f);

                self.surface.write_to_png(&mut f)?;
                f.flush()?;
            }
            OutputFormat::Bmp => {
                surface_to_rgb(&mut self.surface)?.save_with_format(path, image::ImageFormat::Bmp)?;
            }
            OutputFormat::Jpeg => {
                surface_to_rgb(&mut self.surface)?.save_with_format(path, image::ImageFormat::Jpeg)?;
            }
        }

        Ok(())
    }
}

fn surface_to_rgb(surface: &mut cairo::ImageSurface) -> anyhow::Result<image::RgbImage> {
    surface.flush();

    let width: u32 = surface.get_width().try_into()?;
    let height: u32 = surface.get_height().try_into()?;
    let stride: usize = surface.get_stride().try_into()?;

    let data = surface.get_data()?;
    let mut img = image::RgbImage::new(width, height);

    for (y, row) in data.chunks_exact(stride).enumerate().take(height as usize) {
        // Rgb24 pixels are native-endian u32s: unused, R, G, B from the top byte down.
        for (x, px) in row.chunks_exact(4).enumerate().take(width as usize) {
            let v = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
            img.put_pixel(
                x as u32,
                y as u32,
                image::Rgb([(v >> 16) as u8, (v >> 8) as u8, v as u8]),
            );
        }
    }

    Ok(img)
}

/// Lays out and paints the calendar page in memory.
pub fn render_image(
    request: &RenderRequest,
    events: &EventsByDate,
    config: &CalendarConfig,
) -> Result<RenderedImage> {
    let span = span!(Level::INFO, "render_image", year = request.year, month = request.month);
    let _enter = span.enter();

    config.drawable_area()?;
    let grid = grid::generate(
        request.year,
        request.month,
        request.start_of_week,
        config.min_rows,
    )?;

    let mut diagnostics = vec![];

    let (fonts, status) = load_fonts(&config.font_family, &config.font_sizes);
    if let FontStatus::Fallback { reason } = status {
        diagnostics.push(Diagnostic::FontLoadFallback {
            family: config.font_family.clone(),
            reason,
        });
    }
    let metrics = fonts.try_map(PangoMeasure::new)?;

    info!("Generating layout");
    let plan = plan_calendar(request, &grid, events, config, &metrics, &mut diagnostics)?;

    info!("Rendering...");
    let surface = paint(&scene(&plan, &fonts), plan.width, plan.height).map_err(CalendarError::Render)?;

    Ok(RenderedImage {
        surface,
        grid,
        plan,
        diagnostics,
    })
}

/// Outcome of a successful [`render`].
#[derive(Clone, Debug)]
pub struct RenderReport {
    pub output: PathBuf,
    pub grid: DateGrid,
    pub plan: CalendarPlan,
    pub diagnostics: Vec<Diagnostic>,
}

/// Renders the calendar page and writes it to the configured output path.
pub fn render(
    request: &RenderRequest,
    events: &EventsByDate,
    config: &CalendarConfig,
) -> Result<RenderReport> {
    info!(
        "Generating calendar for {}-{:02} (week starts {})",
        request.year, request.month, request.start_of_week
    );

    let mut image = render_image(request, events, config)?;
    image.persist(&config.output, config.output_format)?;
    info!("Calendar image saved as {:?}", config.output);

    let RenderedImage {
        grid,
        plan,
        diagnostics,
        ..
    } = image;

    Ok(RenderReport {
        output: config.output.clone(),
        grid,
        plan,
        diagnostics,
    })
}
