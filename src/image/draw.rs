//! Draw-on-drop guards rasterizing primitives onto an [`Image`].
//!
//! Every guard clips against the image before handing the primitive to `embedded-graphics`, so
//! arbitrary coordinates are accepted. Anything that can't be visible is skipped.

use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::image::{Color, Image, Rect};

/// Circle radii and stroke widths are capped to this.
///
/// `embedded-graphics` squares these sizes in `u32`, which overflows for larger values. At this
/// size a primitive already covers any realistic render target.
const MAX_RADIUS: u32 = 1 << 14;

/// Guard returned by [`fill_rect`]; fills the rectangle when dropped.
pub struct FillRect<'a> {
    image: &'a mut Image,
    rect: Rect,
    color: Color,
}

impl FillRect<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for FillRect<'_> {
    fn drop(&mut self) {
        let Some(visible) = self.rect.intersection(&self.image.rect()) else {
            return;
        };
        rasterize(
            self.image,
            &visible.rect.into_styled(PrimitiveStyle::with_fill(self.color)),
        );
    }
}

/// Guard returned by [`draw_circle`]; draws the filled circle when dropped.
pub struct DrawCircle<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    color: Color,
    radius: u32,
}

impl DrawCircle<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the circle's radius in pixels.
    ///
    /// The default radius is 3. A radius of 0 results in a single pixel getting drawn.
    pub fn radius(&mut self, radius: u32) -> &mut Self {
        self.radius = radius;
        self
    }
}

impl Drop for DrawCircle<'_> {
    fn drop(&mut self) {
        let radius = self.radius.min(MAX_RADIUS);
        let r = i64::from(radius);
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        let (width, height) = (i64::from(self.image.width()), i64::from(self.image.height()));
        if x + r < 0 || y + r < 0 || x - r >= width || y - r >= height {
            return;
        }

        // The center is now within `MAX_RADIUS` of the image, so nothing below overflows.
        let circle = Circle::with_center(Point::new(self.x, self.y), radius * 2 + 1);
        rasterize(
            self.image,
            &circle.into_styled(PrimitiveStyle::with_fill(self.color)),
        );
    }
}

/// Guard returned by [`draw_line`]; draws the line when dropped.
pub struct DrawLine<'a> {
    image: &'a mut Image,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
}

impl DrawLine<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the line's stroke width. Defaults to 1.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawLine<'_> {
    fn drop(&mut self) {
        // Thick lines just outside the image can still reach into it.
        let stroke_width = self.stroke_width.min(MAX_RADIUS);
        let bounds = self.image.rect().grow(stroke_width);
        let to_f32 = |(x, y): (i32, i32)| [x as f32, y as f32];
        let Some((start, end)) = bounds.clip_segment(to_f32(self.start), to_f32(self.end)) else {
            return;
        };

        let to_point = |[x, y]: [f32; 2]| Point::new(x.round() as i32, y.round() as i32);
        let line = Line::new(to_point(start), to_point(end));
        rasterize(
            self.image,
            &line.into_styled(PrimitiveStyle::with_stroke(self.color, stroke_width)),
        );
    }
}

/// Guard returned by [`draw_text`]; draws the text when dropped.
pub struct DrawText<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    text: &'a str,
    color: Color,
}

impl DrawText<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawText<'_> {
    fn drop(&mut self) {
        let font = &FONT_10X20;
        let glyph_width = i64::from(font.character_size.width + font.character_spacing);
        let glyph_height = i64::from(font.character_size.height);
        let chars = i64::try_from(self.text.chars().count()).unwrap_or(i64::MAX);
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        if x >= i64::from(self.image.width())
            || x.saturating_add(chars.saturating_mul(glyph_width)) < 0
            || y - glyph_height >= i64::from(self.image.height())
            || y + glyph_height < 0
        {
            return;
        }

        // FIXME: e-g's mono fonts are ASCII only, everything else renders as '?'
        let character_style = MonoTextStyle::new(font, self.color);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Left)
            .baseline(Baseline::Alphabetic)
            .build();
        let text = Text::with_text_style(
            self.text,
            Point::new(self.x, self.y),
            character_style,
            text_style,
        );
        rasterize(self.image, &text);
    }
}

/// Fills a rectangle. Parts outside of the image are ignored.
pub fn fill_rect(image: &mut Image, rect: Rect) -> FillRect<'_> {
    FillRect {
        image,
        rect,
        color: Color::WHITE,
    }
}

/// Draws a filled circle centered at `(x, y)`.
pub fn draw_circle(image: &mut Image, x: i32, y: i32) -> DrawCircle<'_> {
    DrawCircle {
        image,
        x,
        y,
        color: Color::RED,
        radius: 3,
    }
}

/// Draws a straight line between two pixels.
pub fn draw_line(image: &mut Image, start: (i32, i32), end: (i32, i32)) -> DrawLine<'_> {
    DrawLine {
        image,
        start,
        end,
        color: Color::GREEN,
        stroke_width: 1,
    }
}

/// Draws left-aligned text whose baseline starts at `(x, y)`, like a canvas `fillText` call.
pub fn draw_text<'a>(image: &'a mut Image, x: i32, y: i32, text: &'a str) -> DrawText<'a> {
    DrawText {
        image,
        x,
        y,
        text,
        color: Color::BLACK,
    }
}

fn rasterize<D: Drawable<Color = Color>>(image: &mut Image, item: &D) {
    match item.draw(&mut Target(image)) {
        Ok(_) => {}
        Err(infallible) => match infallible {},
    }
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        self.0.rect().rect
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.0.width(), self.0.height());
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                if x < width && y < height {
                    self.0.set(x, y, color);
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // Large circles and thick lines are filled by scanline, clip each one instead of visiting
        // every pixel.
        self.0.clear_rect(Rect { rect: *area }, color);
        Ok(())
    }
}
