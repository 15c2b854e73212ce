use std::{fmt, path::Path};

use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, RgbImage, Rgba,
    RgbaImage,
    buffer::ConvertBuffer,
};

use crate::MaskError;

/// Color layouts a session can work with. Every channel is 8 bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    Luma8,
    LumaA8,
    Rgb8,
    Rgba8,
}

impl ColorMode {
    pub fn has_alpha(self) -> bool {
        matches!(self, ColorMode::LumaA8 | ColorMode::Rgba8)
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMode::Luma8 => "L",
            ColorMode::LumaA8 => "LA",
            ColorMode::Rgb8 => "RGB",
            ColorMode::Rgba8 => "RGBA",
        })
    }
}

/// Value painted into a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskValue {
    Unmarked,
    Marked,
}

impl MaskValue {
    pub fn level(self) -> u8 {
        match self {
            MaskValue::Unmarked => 0,
            MaskValue::Marked => 255,
        }
    }
}

/// Pixels which can represent a mask level: the level is replicated over the
/// color channels and alpha is always opaque.
trait MaskPixel: Pixel<Subpixel = u8> + 'static {
    fn from_level(level: u8) -> Self;
}

impl MaskPixel for Luma<u8> {
    fn from_level(level: u8) -> Self {
        Luma([level])
    }
}

impl MaskPixel for LumaA<u8> {
    fn from_level(level: u8) -> Self {
        LumaA([level, 255])
    }
}

impl MaskPixel for Rgb<u8> {
    fn from_level(level: u8) -> Self {
        Rgb([level; 3])
    }
}

impl MaskPixel for Rgba<u8> {
    fn from_level(level: u8) -> Self {
        Rgba([level, level, level, 255])
    }
}

// Keeps `center ± radius` inside of i32 for the rasterizer
const MAX_DRAW_RADIUS: i64 = i32::MAX as i64 / 2;

/// Owned image in one of the supported [`ColorMode`]s
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    Luma8(GrayImage),
    LumaA8(GrayAlphaImage),
    Rgb8(RgbImage),
    Rgba8(RgbaImage),
}

/// Evaluates `$body` with `$img` bound to the inner buffer
macro_rules! with_buffer {
    ($buffer:expr, $img:ident => $body:expr) => {
        match $buffer {
            PixelBuffer::Luma8($img) => $body,
            PixelBuffer::LumaA8($img) => $body,
            PixelBuffer::Rgb8($img) => $body,
            PixelBuffer::Rgba8($img) => $body,
        }
    };
}

/// Like `with_buffer`, but wraps the resulting buffer into the same variant
macro_rules! map_buffer {
    ($buffer:expr, $img:ident => $body:expr) => {
        match $buffer {
            PixelBuffer::Luma8($img) => PixelBuffer::Luma8($body),
            PixelBuffer::LumaA8($img) => PixelBuffer::LumaA8($body),
            PixelBuffer::Rgb8($img) => PixelBuffer::Rgb8($body),
            PixelBuffer::Rgba8($img) => PixelBuffer::Rgba8($body),
        }
    };
}

impl PixelBuffer {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MaskError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| MaskError::image(path, e))?;
        Self::try_from(image)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MaskError> {
        let path = path.as_ref();
        with_buffer!(self, img => img.save(path)).map_err(|e| MaskError::image(path, e))
    }

    /// Buffer of the given size where every pixel holds `value`
    pub fn blank(mode: ColorMode, width: u32, height: u32, value: MaskValue) -> Self {
        fn filled<P: MaskPixel>(width: u32, height: u32, value: MaskValue) -> ImageBuffer<P, Vec<u8>> {
            ImageBuffer::from_pixel(width, height, P::from_level(value.level()))
        }
        match mode {
            ColorMode::Luma8 => PixelBuffer::Luma8(filled(width, height, value)),
            ColorMode::LumaA8 => PixelBuffer::LumaA8(filled(width, height, value)),
            ColorMode::Rgb8 => PixelBuffer::Rgb8(filled(width, height, value)),
            ColorMode::Rgba8 => PixelBuffer::Rgba8(filled(width, height, value)),
        }
    }

    pub fn mode(&self) -> ColorMode {
        match self {
            PixelBuffer::Luma8(_) => ColorMode::Luma8,
            PixelBuffer::LumaA8(_) => ColorMode::LumaA8,
            PixelBuffer::Rgb8(_) => ColorMode::Rgb8,
            PixelBuffer::Rgba8(_) => ColorMode::Rgba8,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        with_buffer!(self, img => img.dimensions())
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Raw interleaved channel values
    pub fn as_raw(&self) -> &[u8] {
        with_buffer!(self, img => img.as_raw().as_slice())
    }

    /// Nearest neighbour view of `self` scaled to `scaled` and moved by `offset`.
    ///
    /// Only the `window` at the origin is materialized, so the cost depends on the
    /// window and not on the scaled size. Pixels the scaled image doesn't cover hold `fill`.
    pub fn resampled_window(
        &self,
        scaled: (u32, u32),
        offset: (i64, i64),
        window: (u32, u32),
        fill: MaskValue,
    ) -> Self {
        fn sample<P: MaskPixel>(
            img: &ImageBuffer<P, Vec<u8>>,
            scaled: (u32, u32),
            offset: (i64, i64),
            window: (u32, u32),
            fill: MaskValue,
        ) -> ImageBuffer<P, Vec<u8>> {
            let columns: Vec<Option<u32>> = (0..window.0)
                .map(|x| nearest_source(x as i64 - offset.0, scaled.0, img.width()))
                .collect();
            let rows: Vec<Option<u32>> = (0..window.1)
                .map(|y| nearest_source(y as i64 - offset.1, scaled.1, img.height()))
                .collect();
            let fill = P::from_level(fill.level());
            ImageBuffer::from_fn(window.0, window.1, |x, y| {
                match (columns[x as usize], rows[y as usize]) {
                    (Some(sx), Some(sy)) => *img.get_pixel(sx, sy),
                    _ => fill,
                }
            })
        }
        map_buffer!(self, img => sample(img, scaled, offset, window, fill))
    }

    /// Per channel `self + opacity * (other - self)`, so `opacity == 1.0` yields `other`
    pub fn blend(&self, other: &Self, opacity: f32) -> Result<Self, MaskError> {
        fn mix<P: MaskPixel>(
            a: &ImageBuffer<P, Vec<u8>>,
            b: &ImageBuffer<P, Vec<u8>>,
            opacity: f32,
        ) -> ImageBuffer<P, Vec<u8>> {
            ImageBuffer::from_fn(a.width(), a.height(), |x, y| {
                a.get_pixel(x, y).map2(b.get_pixel(x, y), |p, q| {
                    let p = p as f32;
                    (p + opacity * (q as f32 - p)).round().clamp(0.0, 255.0) as u8
                })
            })
        }

        if self.dimensions() != other.dimensions() {
            return Err(MaskError::SizeMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        let opacity = opacity.clamp(0.0, 1.0);
        Ok(match (self, other) {
            (PixelBuffer::Luma8(a), PixelBuffer::Luma8(b)) => PixelBuffer::Luma8(mix(a, b, opacity)),
            (PixelBuffer::LumaA8(a), PixelBuffer::LumaA8(b)) => {
                PixelBuffer::LumaA8(mix(a, b, opacity))
            }
            (PixelBuffer::Rgb8(a), PixelBuffer::Rgb8(b)) => PixelBuffer::Rgb8(mix(a, b, opacity)),
            (PixelBuffer::Rgba8(a), PixelBuffer::Rgba8(b)) => PixelBuffer::Rgba8(mix(a, b, opacity)),
            (a, b) => {
                return Err(MaskError::ModeMismatch {
                    source_mode: a.mode(),
                    destination_mode: b.mode(),
                });
            }
        })
    }

    /// Rasterizes a filled circle. Pixels outside of the buffer are skipped.
    ///
    /// The radius is capped at the distance to the farthest corner, larger circles
    /// cover the same pixels.
    pub fn fill_circle(&mut self, center: (i32, i32), radius: u32, value: MaskValue) {
        fn draw<P: MaskPixel>(
            img: &mut ImageBuffer<P, Vec<u8>>,
            center: (i32, i32),
            radius: u32,
            value: MaskValue,
        ) {
            let (cx, cy) = (center.0 as i64, center.1 as i64);
            let dx = cx.abs().max((cx - img.width() as i64).abs());
            let dy = cy.abs().max((cy - img.height() as i64).abs());
            let reach = (dx as f64).hypot(dy as f64) as i64 + 1;
            let radius = (radius as i64).min(reach).min(MAX_DRAW_RADIUS) as i32;
            imageproc::drawing::draw_filled_circle_mut(
                img,
                center,
                radius,
                P::from_level(value.level()),
            );
        }
        with_buffer!(self, img => draw(img, center, radius, value))
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        with_buffer!(self, img => img.convert())
    }
}

/// Source index sampled by position `pos` of an axis scaled from `len` to `scaled_len`,
/// `None` if `pos` lies outside of the scaled axis
fn nearest_source(pos: i64, scaled_len: u32, len: u32) -> Option<u32> {
    if len == 0 || pos < 0 || pos >= scaled_len as i64 {
        return None;
    }
    let source = (pos as f64 + 0.5) * len as f64 / scaled_len as f64;
    Some((source as u32).min(len - 1))
}

impl TryFrom<DynamicImage> for PixelBuffer {
    type Error = MaskError;

    fn try_from(value: DynamicImage) -> Result<Self, Self::Error> {
        match value {
            DynamicImage::ImageLuma8(i) => Ok(PixelBuffer::Luma8(i)),
            DynamicImage::ImageLumaA8(i) => Ok(PixelBuffer::LumaA8(i)),
            DynamicImage::ImageRgb8(i) => Ok(PixelBuffer::Rgb8(i)),
            DynamicImage::ImageRgba8(i) => Ok(PixelBuffer::Rgba8(i)),
            other => Err(MaskError::UnsupportedColorMode(other.color())),
        }
    }
}
