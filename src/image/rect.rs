use std::fmt;

use embedded_graphics::{prelude::*, primitives::Rectangle};

/// An axis-aligned rectangle with integer coordinates.
///
/// Width and height may be zero. Edge computations are done in `i64`, so rectangles placed near
/// the ends of the `i32` range don't overflow.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub(crate) rect: Rectangle,
}

impl Rect {
    /// Creates a rectangle extending right and down from `(x, y)`.
    #[inline]
    pub fn from_top_left(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            rect: Rectangle::new(Point::new(x, y), Size::new(width, height)),
        }
    }

    /// Creates a rectangle spanning two inclusive corner pixels.
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        let (x0, y0) = top_left;
        let (x1, y1) = bottom_right;
        assert!(x0 <= x1 && y0 <= y1, "corners {top_left:?} and {bottom_right:?} are swapped");
        let width = i64::from(x1) - i64::from(x0) + 1;
        let height = i64::from(y1) - i64::from(y0) + 1;
        Self::from_top_left(x0, y0, width as u32, height as u32)
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.rect.top_left.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.rect.top_left.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.size.height
    }

    /// X coordinate one past the right edge.
    fn right(&self) -> i64 {
        i64::from(self.x()) + i64::from(self.width())
    }

    /// Y coordinate one past the bottom edge.
    fn bottom(&self) -> i64 {
        i64::from(self.y()) + i64::from(self.height())
    }

    /// Returns the pixels covered by both `self` and `other`, or `None` if there are none.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x().max(other.x());
        let y0 = self.y().max(other.y());
        let x1 = self.right().min(other.right()) - 1;
        let y1 = self.bottom().min(other.bottom()) - 1;
        if i64::from(x0) > x1 || i64::from(y0) > y1 {
            return None;
        }
        // Both maxima lie inside one of the inputs, so they fit in an `i32`.
        Some(Rect::from_corners((x0, y0), (x1 as i32, y1 as i32)))
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Returns whether every pixel of `other` is also part of `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x() <= other.x()
            && self.y() <= other.y()
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Returns a rectangle that extends `self` by `margin` pixels on every side.
    ///
    /// The result is clamped to the `i32` coordinate range.
    #[must_use]
    pub fn grow(&self, margin: u32) -> Rect {
        let margin = i64::from(margin);
        let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
        let x0 = clamp(i64::from(self.x()) - margin);
        let y0 = clamp(i64::from(self.y()) - margin);
        let x1 = clamp(self.right() + margin);
        let y1 = clamp(self.bottom() + margin);
        let size = |lo: i64, hi: i64| (hi - lo).min(i64::from(u32::MAX)) as u32;
        Rect::from_top_left(x0 as i32, y0 as i32, size(x0, x1), size(y0, y1))
    }

    /// Clips the line segment from `start` to `end` against the area covered by `self`.
    ///
    /// Returns the visible part of the segment, or `None` if it misses the rectangle entirely or
    /// any coordinate is NaN or infinite. The returned points always lie within `self`, so they
    /// can be rounded to pixel coordinates without overflowing.
    pub fn clip_segment(
        &self,
        start: [f32; 2],
        end: [f32; 2],
    ) -> Option<([f32; 2], [f32; 2])> {
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const ABOVE: u8 = 4;
        const BELOW: u8 = 8;

        if !start.iter().chain(&end).all(|c| c.is_finite()) {
            return None;
        }

        // Intersections are computed in `f64`, `f32` loses too much precision for far away points.
        let (x_min, y_min) = (f64::from(self.x()), f64::from(self.y()));
        let (x_max, y_max) = (self.right() as f64, self.bottom() as f64);
        let region = |[x, y]: [f64; 2]| {
            let mut code = 0;
            if x < x_min {
                code |= LEFT;
            } else if x > x_max {
                code |= RIGHT;
            }
            if y < y_min {
                code |= ABOVE;
            } else if y > y_max {
                code |= BELOW;
            }
            code
        };

        let (mut a, mut b) = (start.map(f64::from), end.map(f64::from));
        let (mut code_a, mut code_b) = (region(a), region(b));
        // Every iteration moves one endpoint onto a boundary line, 4 per endpoint at most.
        for _ in 0..8 {
            if code_a | code_b == 0 {
                return Some((a.map(|c| c as f32), b.map(|c| c as f32)));
            }
            if code_a & code_b != 0 {
                return None;
            }

            let code = if code_a != 0 { code_a } else { code_b };
            let ([x0, y0], [x1, y1]) = (a, b);
            let p = if code & ABOVE != 0 {
                [x0 + (x1 - x0) * (y_min - y0) / (y1 - y0), y_min]
            } else if code & BELOW != 0 {
                [x0 + (x1 - x0) * (y_max - y0) / (y1 - y0), y_max]
            } else if code & RIGHT != 0 {
                [x_max, y0 + (y1 - y0) * (x_max - x0) / (x1 - x0)]
            } else {
                [x_min, y0 + (y1 - y0) * (x_min - x0) / (x1 - x0)]
            };

            if code == code_a {
                a = p;
                code_a = region(a);
            } else {
                b = p;
                code_b = region(b);
            }
        }

        None
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect {}x{} @ ({}, {})",
            self.width(),
            self.height(),
            self.x(),
            self.y()
        )
    }
}
