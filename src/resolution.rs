//! Pixel sizes of camera frames and render targets.

use std::fmt;

use crate::image::Rect;

/// Size of a frame or render target, in pixels.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// `720x560`, the size camera frames are requested at and overlays are drawn with.
    pub const OVERLAY: Self = Self::new(720, 560);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the rectangle covering every pixel, with its top left corner at the origin.
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0, 0, self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::OVERLAY
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Resolution::default().to_string(), "720x560");
        assert_eq!(format!("{:?}", Resolution::new(1, 2)), "1x2");
    }

    #[test]
    fn rect() {
        let rect = Resolution::OVERLAY.rect();
        assert_eq!((rect.x(), rect.y()), (0, 0));
        assert_eq!((rect.width(), rect.height()), (720, 560));
    }
}
