use crate::{MaskValue, PixelBuffer};

/// Integer displacement of the source relative to the destination canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Self) -> Self::Output {
        Offset {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
        }
    }
}

impl std::ops::AddAssign for Offset {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Size of `(width, height)` scaled by `zoom`, truncated and at least one pixel per axis
pub fn scaled_size((width, height): (u32, u32), zoom: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * zoom) as u32).max(1);
    (scale(width), scale(height))
}

/// Scales `base` by `zoom`, moves it by `offset` and crops/pads the result to `canvas`.
///
/// Equivalent to pasting the scaled image at `offset` into a frame large enough
/// for both the canvas and the displaced image, then cutting the canvas out of it.
/// Positive offsets move the content, negative offsets move the crop window instead.
/// Only the canvas is sampled, so large zoom levels cost no more than small ones.
/// Padding uses unmarked pixels with opaque alpha. The result always has the size of `canvas`.
pub fn transform(base: &PixelBuffer, zoom: f64, offset: Offset, canvas: (u32, u32)) -> PixelBuffer {
    base.resampled_window(
        scaled_size(base.dimensions(), zoom),
        (offset.x as i64, offset.y as i64),
        canvas,
        MaskValue::Unmarked,
    )
}
