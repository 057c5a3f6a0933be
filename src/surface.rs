//! The 2D drawing surface overlays are rendered onto.
//!
//! [`Surface`] is the minimal set of operations the overlay renderer needs. It is implemented for
//! [`Image`], which rasterizes immediately, and for [`Recorder`], which just remembers the calls
//! made to it.

use crate::{
    image::{self, Color, Image, Rect},
    resolution::Resolution,
};

/// A 2D drawing surface with a fixed pixel size.
///
/// Coordinates are in pixels, with the origin in the top left corner and Y pointing down. Drawing
/// outside of the surface is allowed and clipped.
pub trait Surface {
    /// Returns the size of the surface in pixels.
    fn resolution(&self) -> Resolution;

    /// Resets every pixel inside `rect` to fully transparent black.
    fn clear_rect(&mut self, rect: Rect);

    /// Draws `image` stretched to cover the whole surface.
    fn draw_image(&mut self, image: &Image);

    /// Draws a straight line between two points.
    fn draw_line(&mut self, start: [f32; 2], end: [f32; 2], color: Color, width: u32);

    /// Draws a filled circle.
    fn fill_circle(&mut self, center: [f32; 2], radius: u32, color: Color);

    /// Draws a filled, opaque rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws left-aligned text whose baseline starts at `(x, y)`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color);

    /// Clears the entire surface.
    fn clear(&mut self) {
        let rect = self.resolution().rect();
        self.clear_rect(rect);
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }

    fn clear_rect(&mut self, rect: Rect) {
        (**self).clear_rect(rect)
    }

    fn draw_image(&mut self, image: &Image) {
        (**self).draw_image(image)
    }

    fn draw_line(&mut self, start: [f32; 2], end: [f32; 2], color: Color, width: u32) {
        (**self).draw_line(start, end, color, width)
    }

    fn fill_circle(&mut self, center: [f32; 2], radius: u32, color: Color) {
        (**self).fill_circle(center, radius, color)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        (**self).fill_rect(rect, color)
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        (**self).draw_text(x, y, text, color)
    }
}

impl Surface for Image {
    fn resolution(&self) -> Resolution {
        Image::resolution(self)
    }

    fn clear_rect(&mut self, rect: Rect) {
        Image::clear_rect(self, rect, Color::NULL);
    }

    fn draw_image(&mut self, image: &Image) {
        self.draw_stretched(image);
    }

    fn draw_line(&mut self, start: [f32; 2], end: [f32; 2], color: Color, width: u32) {
        // Clip before rounding: far away endpoints would saturate when cast to `i32`, which
        // changes the direction of the visible part of the line.
        let bounds = self.rect().grow(width);
        let Some((start, end)) = bounds.clip_segment(start, end) else {
            log::trace!("line {start:?}-{end:?} is not visible, skipping");
            return;
        };
        image::draw_line(self, to_pixel(start), to_pixel(end))
            .color(color)
            .stroke_width(width);
    }

    fn fill_circle(&mut self, center: [f32; 2], radius: u32, color: Color) {
        let bounds = self.rect().grow(radius);
        let [x, y] = center;
        let inside = |v: f32, lo: i32, len: u32| {
            v >= lo as f32 && v <= (i64::from(lo) + i64::from(len)) as f32
        };
        // Also false for NaN and infinite coordinates.
        if !inside(x, bounds.x(), bounds.width()) || !inside(y, bounds.y(), bounds.height()) {
            log::trace!("circle at {center:?} is not visible, skipping");
            return;
        }
        let (x, y) = to_pixel(center);
        image::draw_circle(self, x, y).radius(radius).color(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        image::fill_rect(self, rect).color(color);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        image::draw_text(self, x, y, text).color(color);
    }
}

/// Rounds a point that is known to lie close to the target to pixel coordinates.
fn to_pixel([x, y]: [f32; 2]) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

/// A draw call recorded by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    ClearRect(Rect),
    /// An image of the given resolution was drawn as background.
    Image(Resolution),
    Line {
        start: [f32; 2],
        end: [f32; 2],
        color: Color,
        width: u32,
    },
    Circle {
        center: [f32; 2],
        radius: u32,
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Color,
    },
}

/// A [`Surface`] that records draw calls instead of rasterizing them.
///
/// Clearing the whole surface discards everything recorded before, the same way it discards all
/// pixels of a real surface. The recorded list is therefore exactly what is visible.
#[derive(Debug, Clone)]
pub struct Recorder {
    resolution: Resolution,
    ops: Vec<DrawOp>,
}

impl Recorder {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            ops: Vec::new(),
        }
    }

    /// Returns the draw calls recorded since the last full clear.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Returns all recorded filled rectangles.
    pub fn filled_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
    }

    /// Returns all recorded text strings.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(&**text),
            _ => None,
        })
    }
}

impl Surface for Recorder {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn clear_rect(&mut self, rect: Rect) {
        if rect.contains_rect(&self.resolution.rect()) {
            self.ops.clear();
        }
        self.ops.push(DrawOp::ClearRect(rect));
    }

    fn draw_image(&mut self, image: &Image) {
        self.ops.push(DrawOp::Image(image.resolution()));
    }

    fn draw_line(&mut self, start: [f32; 2], end: [f32; 2], color: Color, width: u32) {
        self.ops.push(DrawOp::Line {
            start,
            end,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: [f32; 2], radius: u32, color: Color) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}
