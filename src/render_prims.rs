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

use anyhow::Result;
use std::convert::TryInto;

use cairo::Rectangle;

use pango::{FontDescription, Layout};

use crate::color::Color;

const PANGO_SCALE: f64 = 1024.0;

/// Builds a single-line pango layout for `text`.
pub fn prepare_layout(context: &cairo::Context, font: &FontDescription, text: &str) -> Result<Layout> {
    let layout = pangocairo::create_layout(context)
        .ok_or_else(|| anyhow::anyhow!("Failed to create pango layout"))?;

    layout.set_font_description(Some(font));
    layout.set_text(text);
    layout.set_width(-1);

    Ok(layout)
}

pub fn layout_size_px(layout: &pango::Layout) -> (f64, f64) {
    let (w, h) = layout.get_size();
    (w as f64 / PANGO_SCALE, h as f64 / PANGO_SCALE)
}

pub trait Renderable {
    fn render_internal(&self, cr: &mut cairo::Context) -> Result<()>;

    fn render(&self, cr: &mut cairo::Context) -> Result<()> {
        cr.save();
        cr.move_to(0.0, 0.0);
        let result = self.render_internal(cr);
        cr.restore();

        result
    }

    fn render_to(&self, cr: &mut cairo::Context, origin: (f64, f64)) -> Result<()> {
        cr.save();
        cr.translate(origin.0, origin.1);

        let result = self.render(cr);

        cr.restore();

        result
    }
}

pub struct RenderTranslate {
    pub inner: Box<dyn Renderable>,
    pub offset: (f64, f64),
}

impl Renderable for RenderTranslate {
    fn render_internal(&self, cr: &mut cairo::Context) -> Result<()> {
        self.inner.render_to(cr, (self.offset.0, self.offset.1))
    }
}

pub trait RenderableEx: Renderable {
    fn clip_to(self, clip_bounds: Rectangle) -> Clip<Self>
    where
        Self: Sized,
    {
        Clip {
            inner: self,
            clip_bounds,
        }
    }

    fn offset(self, x: f64, y: f64) -> RenderTranslate
    where
        Self: Sized + 'static,
    {
        RenderTranslate {
            inner: Box::new(self),
            offset: (x, y),
        }
    }
}

impl<R: Renderable> RenderableEx for R {}

pub struct RenderGroup {
    pub items: Vec<Box<dyn Renderable>>,
}

impl RenderGroup {
    pub fn new() -> Self {
        Self { items: vec![] }
    }

    pub fn push(&mut self, item: impl Renderable + 'static) {
        self.items.push(Box::new(item));
    }
}

impl Renderable for RenderGroup {
    fn render_internal(&self, cr: &mut cairo::Context) -> Result<()> {
        for item in self.items.iter() {
            item.render(cr)?;
        }

        Ok(())
    }
}

/// One line of text drawn with its logical top-left at the origin.
pub struct TextLine {
    text: String,
    color: Color,
    font: FontDescription,
}

impl TextLine {
    pub fn new(text: impl Into<String>, color: Color, font: &FontDescription) -> Self {
        TextLine {
            text: text.into(),
            color,
            font: font.clone(),
        }
    }
}

impl Renderable for TextLine {
    fn render_internal(&self, cr: &mut cairo::Context) -> Result<()> {
        cr.new_path();
        cr.move_to(0.0, 0.0);

        cr.set_source_rgb(self.color.r, self.color.g, self.color.b);
        let layout = prepare_layout(cr, &self.font, &self.text)?;
        pangocairo::show_layout(cr, &layout);

        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FillRect {
    pub bounds: Rectangle,
    pub color: Color,
}

impl FillRect {
    pub fn rect(color: Color, w: f64, h: f64) -> Self {
        Self {
            bounds: Rectangle {
                x: 0.0,
                y: 0.0,
                width: w,
                height: h,
            },
            color,
        }
    }
}

impl Renderable for FillRect {
    fn render_internal(&self, cr: &mut cairo::Context) -> Result<()> {
        cr.move_to(0.0, 0.0);
        cr.set_source_rgb(self.color.r, self.color.g, self.color.b);
        cr.new_path();
        cr.rectangle(
            self.bounds.x,
            self.bounds.y,
            self.bounds.width,
            self.bounds.height,
        );
        cr.fill();
        Ok(())
    }
}

/// Rectangle outline; the stroke is centred on the edge.
#[derive(Clone, Copy, Debug)]
pub struct StrokeRect {
    pub width: f64,
    pub height: f64,
    pub line_width: f64,
    pub color: Color,
}

impl Renderable for StrokeRect {
    fn render_internal(&self, cr: &mut cairo::Context) -> Result<()> {
        cr.new_path();
        cr.move_to(0.0, 0.0);
        cr.line_to(self.width, 0.0);
        cr.line_to(self.width, self.height);
        cr.line_to(0.0, self.height);
        cr.close_path();

        cr.set_source_rgb(self.color.r, self.color.g, self.color.b);
        cr.set_line_width(self.line_width);
        cr.stroke();

        Ok(())
    }
}

#[derive(Clone)]
pub struct Clip<R> {
    inner: R,
    clip_bounds: Rectangle,
}

impl<R: Renderable> Renderable for Clip<R> {
    fn render_internal(&self, cr: &mut cairo::Context) -> Result<()> {
        cr.save();

        cr.translate(-self.clip_bounds.x, -self.clip_bounds.y);
        cr.new_path();
        cr.rectangle(
            self.clip_bounds.x,
            self.clip_bounds.y,
            self.clip_bounds.width,
            self.clip_bounds.height,
        );
        cr.clip();
        cr.new_path();
        let result = self.inner.render(cr);

        cr.restore();

        result
    }
}

/// Paints `root` onto a fresh RGB surface of the given size.
pub fn paint(root: &dyn Renderable, width: u32, height: u32) -> Result<cairo::ImageSurface> {
    let surface = cairo::ImageSurface::create(
        cairo::Format::Rgb24,
        width.try_into()?,
        height.try_into()?,
    )
    .map_err(crate::error::CalendarError::from)?;

    let mut cairo_context = cairo::Context::new(&surface);
    root.render_to(&mut cairo_context, (0.0, 0.0))?;

    std::mem::drop(cairo_context);
    surface.flush();

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };

    fn pixel(surface: &mut cairo::ImageSurface, x: usize, y: usize) -> u32 {
        let stride = surface.get_stride() as usize;
        let data = surface.get_data().unwrap();
        let px = &data[y * stride + x * 4..y * stride + x * 4 + 4];
        u32::from_ne_bytes([px[0], px[1], px[2], px[3]]) & 0x00FF_FFFF
    }

    #[test]
    fn offset_and_clip_confine_drawing() {
        let mut group = RenderGroup::new();
        group.push(
            FillRect::rect(RED, 10.0, 10.0).clip_to(Rectangle {
                x: 0.0,
                y: 0.0,
                width: 4.0,
                height: 4.0,
            }),
        );

        let mut surface = paint(&group.offset(2.0, 2.0), 10, 10).unwrap();

        assert_eq!(pixel(&mut surface, 3, 3), 0xFF0000);
        assert_eq!(pixel(&mut surface, 5, 5), 0xFF0000);
        assert_eq!(pixel(&mut surface, 1, 1), 0);
        assert_eq!(pixel(&mut surface, 6, 6), 0);
        assert_eq!(pixel(&mut surface, 9, 9), 0);
    }

    #[test]
    fn stroke_rect_leaves_interior_alone() {
        let outline = StrokeRect {
            width: 10.0,
            height: 10.0,
            line_width: 2.0,
            color: RED,
        };

        let mut surface = paint(&outline, 10, 10).unwrap();

        assert_eq!(pixel(&mut surface, 0, 5), 0xFF0000);
        assert_eq!(pixel(&mut surface, 5, 5), 0);
    }
}
