use std::path::PathBuf;

use crate::ColorMode;

#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    #[error(
        "Source ({source_mode}) and destination ({destination_mode}) use different color modes"
    )]
    ModeMismatch {
        source_mode: ColorMode,
        destination_mode: ColorMode,
    },
    #[error("Unsupported color mode {0:?}, expected 8 bit L, LA, RGB or RGBA")]
    UnsupportedColorMode(image::ColorType),
    #[error("Expected an image of {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("Zoom factor must be finite and positive, got {0}")]
    InvalidZoomFactor(f64),
    #[error("{}: {error}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        error: image::ImageError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MaskError {
    pub(crate) fn image(path: impl Into<PathBuf>, error: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            error,
        }
    }
}
