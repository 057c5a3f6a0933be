//! Raster images, colors and the drawing primitives used to render overlays.
//!
//! [`Image`] is the default render target. The free `draw_*` and [`fill_rect`] functions return
//! guards that rasterize when dropped and clip against the image, so callers can pass any
//! coordinates.

mod draw;
mod rect;


use std::{fmt, path::Path};

use embedded_graphics::{pixelcolor::raw::RawU32, prelude::PixelColor};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage};

use crate::resolution::Resolution;

pub use draw::*;
pub use rect::*;

/// Picks the file format from the extension of `path`. Only JPEG and PNG are supported.
fn format_of(path: &Path) -> Result<ImageFormat, crate::Error> {
    match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Ok(format),
        _ => Err(format!(
            "unsupported image file '{}', expected .png or .jpg",
            path.display()
        )
        .into()),
    }
}

/// An 8-bit sRGB image with alpha channel.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    pub(crate) buf: RgbaImage,
}

impl Image {
    /// Loads a PNG or JPEG file, picking the format from the file extension.
    pub fn load<A: AsRef<Path>>(path: A) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let buf = image::load_from_memory_with_format(&data, format_of(path)?)?.to_rgba8();
        log::trace!("loaded {}x{} image from {}", buf.width(), buf.height(), path.display());
        Ok(Self { buf })
    }

    /// Decodes a JPEG, such as an MJPG camera frame.
    pub fn decode_jpeg(data: &[u8]) -> Result<Self, crate::Error> {
        let buf = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?.to_rgba8();
        Ok(Self { buf })
    }

    /// Writes the image to a PNG or JPEG file, picking the format from the file extension.
    ///
    /// JPEG files drop the alpha channel.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), crate::Error> {
        let path = path.as_ref();
        match format_of(path)? {
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(self.buf.clone()).to_rgb8().save(path)?,
            _ => self.buf.save(path)?,
        }
        Ok(())
    }

    /// Creates an empty image of a specified size.
    ///
    /// The image will start out black and fully transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    /// Creates an image of the given resolution, filled with `color`.
    pub fn filled(res: Resolution, color: Color) -> Self {
        Self {
            buf: ImageBuffer::from_pixel(res.width(), res.height(), Rgba(color.0)),
        }
    }

    /// Returns the width of this image, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this image, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns the size of this image.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns the [`Rect`] covering every pixel of this image.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.resolution().rect()
    }

    /// Gets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    pub fn get(&self, x: u32, y: u32) -> Color {
        let rgb = &self.buf[(x, y)];
        Color(rgb.0)
    }

    /// Sets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Clears the image, setting every pixel value to `color`.
    pub fn clear(&mut self, color: Color) {
        self.buf.pixels_mut().for_each(|pix| pix.0 = color.0);
    }

    /// Sets every pixel inside of `rect` to `color`, ignoring the parts outside of the image.
    pub fn clear_rect(&mut self, rect: Rect, color: Color) {
        let Some(rect) = rect.intersection(&self.rect()) else {
            return;
        };
        if rect == self.rect() {
            return self.clear(color);
        }

        // The intersection lies inside the image, so its coordinates are non-negative.
        let (x0, y0) = (rect.x() as u32, rect.y() as u32);
        for y in y0..y0 + rect.height() {
            for x in x0..x0 + rect.width() {
                self.set(x, y, color);
            }
        }
    }

    /// Overwrites the entire image with `src`, stretching or shrinking `src` as necessary.
    ///
    /// This uses nearest neighbor interpolation, so the result won't look very good when scaling,
    /// but it is fast and deterministic.
    pub fn draw_stretched(&mut self, src: &Image) {
        if src.resolution() == self.resolution() {
            self.buf.copy_from_slice(src.data());
            return;
        }
        if src.width() == 0 || src.height() == 0 {
            log::trace!("drawing empty {:?} onto {:?}, clearing", src, self);
            self.clear(Color::NULL);
            return;
        }

        log::trace!("stretching {} -> {}", src.resolution(), self.resolution());

        let (width, height) = (self.width(), self.height());
        for dest_y in 0..height {
            for dest_x in 0..width {
                let src_x = ((dest_x as f32 + 0.5) / width as f32 * src.width() as f32) as u32;
                let src_y = ((dest_y as f32 + 0.5) / height as f32 * src.height() as f32) as u32;

                let pixel = src.get(src_x.min(src.width() - 1), src_y.min(src.height() - 1));
                self.set(dest_x, dest_y, pixel);
            }
        }
    }

    #[inline]
    pub(crate) fn data(&self) -> &[u8] {
        self.buf.as_raw()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}

/// An 8-bit RGBA color.
///
/// Colors are always in the sRGB color space and use non-premultiplied alpha.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color(pub(crate) [u8; 4]);

impl Color {
    /// Fully transparent black (all components are 0).
    pub const NULL: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r(),
            self.g(),
            self.b(),
            self.a(),
        )
    }
}

// FIXME leaks `embedded-graphics` dependency
impl PixelColor for Color {
    type Raw = RawU32;
}
