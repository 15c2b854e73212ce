use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{MaskError, MaskValue, Offset, PixelBuffer, transform};

/// Upper bound for [`SessionSettings::brush_radius`]
pub const MAX_BRUSH_RADIUS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionSettings {
    pub brush_radius: u32,
    /// Weight of the mask in the preview overlay, never applied to saved files
    pub blend_opacity: f32,
}

impl SessionSettings {
    pub fn new(brush_radius: u32, blend_opacity: f32) -> Self {
        Self {
            brush_radius,
            blend_opacity,
        }
    }

    fn sanitized(self) -> Self {
        Self {
            brush_radius: self.brush_radius.clamp(1, MAX_BRUSH_RADIUS),
            blend_opacity: if self.blend_opacity.is_nan() {
                Self::default().blend_opacity
            } else {
                self.blend_opacity.clamp(0.0, 1.0)
            },
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            brush_radius: 10,
            blend_opacity: 0.6,
        }
    }
}

/// What [`Session::render`] shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Transformed source with the mask blended on top
    #[default]
    Source,
    Mask,
    /// Destination with the mask blended on top
    Destination,
}

/// State of one mask editing task.
///
/// The destination defines the canvas: the transformed source and the mask
/// always have its size and color mode. The source is resampled from the
/// pristine original on every pan or zoom, while the mask is shifted and scaled
/// incrementally from its current content, so content moved off canvas is lost.
pub struct Session {
    source: PixelBuffer,
    destination: PixelBuffer,
    transformed_source: PixelBuffer,
    mask: PixelBuffer,
    zoom_level: f64,
    pan_offset: Offset,
    active_view: View,
    settings: SessionSettings,
    destination_extension: Option<String>,
}

impl Session {
    pub fn new(
        source: PixelBuffer,
        destination: PixelBuffer,
        settings: SessionSettings,
    ) -> Result<Self, MaskError> {
        if source.mode() != destination.mode() {
            return Err(MaskError::ModeMismatch {
                source_mode: source.mode(),
                destination_mode: destination.mode(),
            });
        }
        let canvas = destination.dimensions();
        let transformed_source = transform(&source, 1.0, Offset::ZERO, canvas);
        let mask = PixelBuffer::blank(destination.mode(), canvas.0, canvas.1, MaskValue::Unmarked);
        info!(
            "New session: source {:?}, canvas {canvas:?}, mode {}",
            source.dimensions(),
            destination.mode()
        );

        Ok(Self {
            source,
            destination,
            transformed_source,
            mask,
            zoom_level: 1.0,
            pan_offset: Offset::ZERO,
            active_view: View::Source,
            settings: settings.sanitized(),
            destination_extension: None,
        })
    }

    /// Loads both images. Nothing is kept if either fails to load or the color modes differ.
    pub fn open(
        source_path: impl AsRef<Path>,
        destination_path: impl AsRef<Path>,
        settings: SessionSettings,
    ) -> Result<Self, MaskError> {
        let destination_path = destination_path.as_ref();
        let source = PixelBuffer::open(source_path)?;
        let destination = PixelBuffer::open(destination_path)?;
        let mut session = Self::new(source, destination, settings)?;
        session.destination_extension = destination_path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_owned);
        Ok(session)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        let delta = Offset::new(dx, dy);
        self.pan_offset += delta;
        self.transformed_source = transform(
            &self.source,
            self.zoom_level,
            self.pan_offset,
            self.canvas_size(),
        );
        self.mask = transform(&self.mask, 1.0, delta, self.canvas_size());
        debug!("Pan by {delta:?}, offset is now {:?}", self.pan_offset);
    }

    pub fn zoom(&mut self, factor: f64) -> Result<(), MaskError> {
        let zoom_level = self.zoom_level * factor;
        if !factor.is_finite() || factor <= 0.0 || !zoom_level.is_normal() {
            return Err(MaskError::InvalidZoomFactor(factor));
        }
        self.zoom_level = zoom_level;
        self.transformed_source = transform(
            &self.source,
            self.zoom_level,
            self.pan_offset,
            self.canvas_size(),
        );
        self.mask = transform(&self.mask, factor, Offset::ZERO, self.canvas_size());
        debug!("Zoom by {factor}, zoom level is now {}", self.zoom_level);
        Ok(())
    }

    pub fn paint(&mut self, x: i32, y: i32, value: MaskValue) {
        self.mask.fill_circle((x, y), self.settings.brush_radius, value);
    }

    pub fn render(&self) -> Result<PixelBuffer, MaskError> {
        match self.active_view {
            View::Source => self
                .transformed_source
                .blend(&self.mask, self.settings.blend_opacity),
            View::Mask => Ok(self.mask.clone()),
            View::Destination => self
                .destination
                .blend(&self.mask, self.settings.blend_opacity),
        }
    }

    pub fn set_active_view(&mut self, view: View) {
        self.active_view = view;
    }

    pub fn active_view(&self) -> View {
        self.active_view
    }

    /// Writes the mask, returns the path actually written to
    pub fn save_mask(&self, path: impl AsRef<Path>) -> Result<PathBuf, MaskError> {
        self.save(&self.mask, path.as_ref())
    }

    /// Writes the source as fitted to the destination canvas
    pub fn save_transformed_source(&self, path: impl AsRef<Path>) -> Result<PathBuf, MaskError> {
        self.save(&self.transformed_source, path.as_ref())
    }

    fn save(&self, buffer: &PixelBuffer, path: &Path) -> Result<PathBuf, MaskError> {
        let path = self.path_with_default_extension(path);
        buffer.save(&path)?;
        info!("Saved {}", path.display());
        Ok(path)
    }

    /// Appends the destination's extension if `path` has none
    pub fn path_with_default_extension(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match (&self.destination_extension, path.extension()) {
            (Some(extension), None) => path.with_extension(extension),
            _ => path.to_path_buf(),
        }
    }

    pub fn destination_extension(&self) -> Option<&str> {
        self.destination_extension.as_deref()
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.destination.dimensions()
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub fn destination(&self) -> &PixelBuffer {
        &self.destination
    }

    pub fn transformed_source(&self) -> &PixelBuffer {
        &self.transformed_source
    }

    pub fn mask(&self) -> &PixelBuffer {
        &self.mask
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn pan_offset(&self) -> Offset {
        self.pan_offset
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, RgbImage, RgbaImage};

    use super::*;
    use crate::ColorMode;

    fn grey(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::Luma8(GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 7 + y * 13) % 251) as u8])
        }))
    }

    fn session(source: PixelBuffer, destination: PixelBuffer) -> Session {
        Session::new(source, destination, SessionSettings::default()).unwrap()
    }

    fn channels_at(b: &PixelBuffer, x: u32, y: u32) -> &[u8] {
        let channels = b.as_raw().len() / (b.width() * b.height()) as usize;
        let start = (y * b.width() + x) as usize * channels;
        &b.as_raw()[start..start + channels]
    }

    #[test]
    fn new_session_fits_source_to_destination() {
        let s = session(grey(100, 100), grey(200, 150));
        assert_eq!(s.transformed_source().dimensions(), (200, 150));
        assert_eq!(s.mask().dimensions(), (200, 150));
        assert_eq!(s.canvas_size(), (200, 150));
        assert_eq!(channels_at(s.transformed_source(), 150, 120), &[0]);
        assert_eq!(
            channels_at(s.transformed_source(), 42, 17),
            channels_at(s.source(), 42, 17)
        );
        assert!(s.mask().as_raw().iter().all(|&p| p == 0));
        assert_eq!(s.active_view(), View::Source);
        assert_eq!(s.zoom_level(), 1.0);
        assert_eq!(s.pan_offset(), Offset::ZERO);
    }

    #[test]
    fn mode_mismatch_creates_no_session() {
        let rgb = PixelBuffer::Rgb8(RgbImage::new(10, 10));
        let result = Session::new(grey(10, 10), rgb, SessionSettings::default());
        assert!(matches!(
            result,
            Err(MaskError::ModeMismatch {
                source_mode: ColorMode::Luma8,
                destination_mode: ColorMode::Rgb8
            })
        ));
    }

    #[test]
    fn paint_marks_circle_and_keeps_alpha_opaque() {
        let rgba = |w, h| PixelBuffer::Rgba8(RgbaImage::from_pixel(w, h, image::Rgba([9, 9, 9, 255])));
        let mut s = session(rgba(40, 40), rgba(40, 40));
        let radius = s.settings().brush_radius as i64;
        s.paint(20, 15, MaskValue::Marked);
        for y in 0..40i64 {
            for x in 0..40i64 {
                let d2 = (x - 20).pow(2) + (y - 15).pow(2);
                let p = channels_at(s.mask(), x as u32, y as u32);
                if d2 <= radius.pow(2) {
                    assert_eq!(p, &[255, 255, 255, 255], "inside at {x},{y}");
                } else if d2 > (radius + 1).pow(2) {
                    assert_eq!(p, &[0, 0, 0, 255], "outside at {x},{y}");
                }
            }
        }
    }

    #[test]
    fn paint_unmarked_erases() {
        let mut s = session(grey(30, 30), grey(30, 30));
        s.paint(15, 15, MaskValue::Marked);
        s.paint(15, 15, MaskValue::Unmarked);
        assert!(s.mask().as_raw().iter().all(|&p| p == 0));
    }

    #[test]
    fn paint_near_edge_is_clipped() {
        let mut s = session(grey(30, 30), grey(30, 30));
        s.paint(0, 0, MaskValue::Marked);
        s.paint(-5, 40, MaskValue::Marked);
        assert_eq!(channels_at(s.mask(), 0, 0), &[255]);
        assert_eq!(channels_at(s.mask(), 29, 0), &[0]);
    }

    #[test]
    fn pan_back_and_forth_restores_source() {
        let mut s = session(grey(50, 40), grey(50, 40));
        let before = s.transformed_source().clone();
        s.pan(7, 0);
        assert_eq!(s.pan_offset(), Offset::new(7, 0));
        assert_ne!(s.transformed_source(), &before);
        s.pan(-7, 0);
        assert_eq!(s.pan_offset(), Offset::ZERO);
        assert_eq!(s.transformed_source(), &before);
    }

    #[test]
    fn pan_loses_mask_content_pushed_off_canvas() {
        let mut s = session(grey(50, 40), grey(50, 40));
        s.paint(45, 20, MaskValue::Marked);
        s.pan(10, 0);
        assert_eq!(channels_at(s.mask(), 10, 20), &[0]);
        s.pan(-10, 0);
        assert_eq!(channels_at(s.mask(), 45, 20), &[0]);
        assert_eq!(channels_at(s.mask(), 39, 20), &[255]);
    }

    #[test]
    fn pan_moves_mask_by_delta() {
        let mut s = session(grey(50, 40), grey(50, 40));
        s.paint(20, 20, MaskValue::Marked);
        s.pan(0, -10);
        assert_eq!(channels_at(s.mask(), 20, 10), &[255]);
        assert_eq!(channels_at(s.mask(), 20, 30), &[0]);
    }

    #[test]
    fn zoom_in_and_out_keeps_canvas_size() {
        let mut s = session(grey(64, 48), grey(80, 60));
        s.paint(30, 30, MaskValue::Marked);
        s.zoom(0.9).unwrap();
        s.zoom(1.0 / 0.9).unwrap();
        assert!((s.zoom_level() - 1.0).abs() < 1e-9);
        assert_eq!(s.transformed_source().dimensions(), (80, 60));
        assert_eq!(s.mask().dimensions(), (80, 60));
    }

    #[test]
    fn zoom_rejects_non_positive_factor() {
        let mut s = session(grey(10, 10), grey(10, 10));
        assert!(matches!(s.zoom(0.0), Err(MaskError::InvalidZoomFactor(_))));
        assert!(matches!(s.zoom(-2.0), Err(MaskError::InvalidZoomFactor(_))));
        assert!(matches!(s.zoom(f64::NAN), Err(MaskError::InvalidZoomFactor(_))));
        assert_eq!(s.zoom_level(), 1.0);
    }

    #[test]
    fn render_is_idempotent_and_view_dependent() {
        let mut s = session(grey(20, 20), grey(20, 20));
        s.paint(10, 10, MaskValue::Marked);
        assert_eq!(s.render().unwrap(), s.render().unwrap());

        s.set_active_view(View::Mask);
        assert_eq!(&s.render().unwrap(), s.mask());

        s.set_active_view(View::Destination);
        let expected = s.destination().blend(s.mask(), 0.6).unwrap();
        assert_eq!(s.render().unwrap(), expected);
    }

    #[test]
    fn settings_are_sanitized() {
        let s = Session::new(grey(4, 4), grey(4, 4), SessionSettings::new(0, 3.0)).unwrap();
        assert_eq!(s.settings(), SessionSettings::new(1, 1.0));
    }

    #[test]
    fn oversized_brush_is_capped() {
        let settings = SessionSettings::new(u32::MAX, 0.6);
        let mut s = Session::new(grey(20, 20), grey(20, 20), settings).unwrap();
        assert_eq!(s.settings().brush_radius, MAX_BRUSH_RADIUS);
        s.paint(10, 10, MaskValue::Marked);
        assert!(s.mask().as_raw().iter().all(|&p| p == 255));
    }

    #[test]
    fn repeated_zoom_in_stays_canvas_sized() {
        let source = PixelBuffer::Rgb8(RgbImage::from_fn(400, 300, |x, y| {
            image::Rgb([x as u8, y as u8, (x ^ y) as u8])
        }));
        let destination = PixelBuffer::Rgb8(RgbImage::new(320, 240));
        let mut s = session(source, destination);
        s.paint(160, 120, MaskValue::Marked);
        for _ in 0..40 {
            s.zoom(1.0 / 0.9).unwrap();
        }
        s.pan(-3000, -2000);
        assert!(s.zoom_level() > 60.0);
        assert_eq!(s.transformed_source().dimensions(), (320, 240));
        assert_eq!(s.mask().dimensions(), (320, 240));
        assert_eq!(s.render().unwrap().dimensions(), (320, 240));
    }

    #[test]
    fn default_extension_is_appended_only_when_missing() {
        let mut s = session(grey(4, 4), grey(4, 4));
        assert_eq!(s.path_with_default_extension("mask"), PathBuf::from("mask"));
        s.destination_extension = Some("png".into());
        assert_eq!(s.path_with_default_extension("mask"), PathBuf::from("mask.png"));
        assert_eq!(
            s.path_with_default_extension("mask.tif"),
            PathBuf::from("mask.tif")
        );
    }
}
