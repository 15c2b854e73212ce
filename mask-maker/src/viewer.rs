use egui::{
    self, Color32, ColorImage, InnerResponse, Pos2, Rect, Sense, TextureHandle, TextureOptions,
    Vec2,
};

use crate::PixelBuffer;

/// Shows the rendered session view scaled to fit the available space.
///
/// The texture is uploaded lazily on the next `ui` call after [`ImageViewer::set_image`],
/// so several edits within one frame cause a single upload.
#[derive(Default)]
pub struct ImageViewer {
    texture: Option<TextureHandle>,
    pending: Option<ColorImage>,
}

impl ImageViewer {
    pub fn set_image(&mut self, image: &PixelBuffer) {
        let rgba = image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        self.pending = Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()));
    }

    pub fn reset(&mut self) {
        self.texture = None;
        self.pending = None;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) -> InnerResponse<Option<ImageViewerInteraction>> {
        let texture_options = TextureOptions {
            magnification: egui::TextureFilter::Nearest,
            ..Default::default()
        };
        if let Some(image) = self.pending.take() {
            match &mut self.texture {
                Some(handle) => handle.set(image, texture_options),
                None => {
                    self.texture =
                        Some(ui.ctx().load_texture("session-view", image, texture_options))
                }
            }
        }

        let viewport_rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(viewport_rect, Sense::click_and_drag());
        let Some(texture) = &self.texture else {
            return InnerResponse {
                inner: None,
                response,
            };
        };

        let image_size = texture.size_vec2();
        let viewport_size = viewport_rect.size();
        // At 1.0 the image is shown pixel by pixel
        let fit_scale =
            (viewport_size.x / image_size.x).min(viewport_size.y / image_size.y);
        let image_rect = Rect::from_center_size(viewport_rect.center(), image_size * fit_scale);

        let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
        ui.painter()
            .with_clip_rect(viewport_rect)
            .image(texture.id(), image_rect, uv, Color32::WHITE);

        let cursor_image_pos = response
            .interact_pointer_pos()
            .or_else(|| response.hover_pos())
            .filter(|_| fit_scale > f32::EPSILON)
            .map(|pos| to_image_pos(pos, image_rect.min, fit_scale));
        log::trace!("Cursor at {cursor_image_pos:?}, scale {fit_scale}");

        InnerResponse {
            inner: Some(ImageViewerInteraction { cursor_image_pos }),
            response,
        }
    }
}

fn to_image_pos(screen: Pos2, image_min: Pos2, scale: f32) -> (i32, i32) {
    let p: Vec2 = (screen - image_min) / scale;
    (p.x.floor() as i32, p.y.floor() as i32)
}

pub struct ImageViewerInteraction {
    /// Cursor position in image pixels, might lie outside of the image
    pub cursor_image_pos: Option<(i32, i32)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_to_image_position() {
        let min = Pos2::new(100.0, 50.0);
        assert_eq!(to_image_pos(Pos2::new(100.0, 50.0), min, 2.0), (0, 0));
        assert_eq!(to_image_pos(Pos2::new(121.0, 59.9), min, 2.0), (10, 4));
        assert_eq!(to_image_pos(Pos2::new(99.0, 50.0), min, 2.0), (-1, 0));
    }
}
