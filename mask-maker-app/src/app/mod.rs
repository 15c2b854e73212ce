use std::path::PathBuf;

use eframe::egui::{self, InnerResponse, PointerButton, UiBuilder};
use log::{debug, info, warn};
use mask_maker::{
    Command, ImageViewer, ImageViewerInteraction, MaskError, MaskValue, Session, SessionSettings,
    View,
};

mod config;
mod menu;
mod native;
mod save_job;
mod session_dialog;

pub(crate) use config::Config;
pub use native::run_native;
use save_job::SaveJob;
use session_dialog::{DialogOutcome, SessionDialog};

const NO_SESSION_TEXT: &str = "Please create a session";
const INSTRUCTIONS_TEXT: &str = "Left click and drag to add to the mask.\n\
Right click and drag to remove from the mask.\n\
Move source and mask with w,a,s,d (1px) or W,A,S,D (10px), zoom with - and +\n\
Use 1,2,3 to view source, mask, destination";
const MODE_MISMATCH_TEXT: &str =
    "Please select two images using the same color mode.\nEx: RGB, RGBA, L, etc.";

pub(crate) struct MaskMakerApp {
    session: Option<Session>,
    settings: SessionSettings,
    viewer: ImageViewer,
    dialog: Option<SessionDialog>,
    save_jobs: Vec<SaveJob>,
    status: String,
    // Last position painted during the current stroke
    last_paint: Option<((i32, i32), MaskValue)>,
    view_dirty: bool,
}

impl MaskMakerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: SessionSettings,
        initial_session: Option<(PathBuf, PathBuf)>,
    ) -> Self {
        let mut app = Self::without_session(settings);
        if let Some((source, destination)) = initial_session {
            app.create_session(source, destination);
        }
        app
    }

    fn without_session(settings: SessionSettings) -> Self {
        Self {
            session: None,
            settings,
            viewer: ImageViewer::default(),
            dialog: None,
            save_jobs: Vec::new(),
            status: NO_SESSION_TEXT.into(),
            last_paint: None,
            view_dirty: false,
        }
    }

    /// Replaces the current session. A failed attempt keeps the previous one.
    fn create_session(&mut self, source: PathBuf, destination: PathBuf) {
        info!(
            "Create session from {} onto {}",
            source.display(),
            destination.display()
        );
        match Session::open(&source, &destination, self.settings) {
            Ok(session) => {
                self.session = Some(session);
                self.status = INSTRUCTIONS_TEXT.into();
                self.viewer.reset();
                self.view_dirty = true;
            }
            Err(e @ MaskError::ModeMismatch { .. }) => {
                warn!("{e}");
                self.status = format!("{MODE_MISMATCH_TEXT}\n{e}");
            }
            Err(e) => {
                warn!("Couldn't create session: {e}");
                self.status = format!("Couldn't create session: {e}");
            }
        }
    }

    fn run_command(&mut self, command: Command) {
        let Some(session) = self.session.as_mut() else {
            debug!("No active session, ignore {command:?}");
            return;
        };
        match command.apply(session) {
            Ok(()) => self.view_dirty = true,
            Err(e) => warn!("{command:?} failed: {e}"),
        }
    }

    fn show_view(&mut self, view: View) {
        self.run_command(Command::ShowView(view));
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if self.dialog.is_some() || ctx.wants_keyboard_input() {
            return;
        }
        let commands: Vec<Command> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .flat_map(Command::parse_all)
                .collect()
        });
        for command in commands {
            self.run_command(command);
        }
    }

    fn handle_pointer(&mut self, response: &egui::Response, cursor_image_pos: Option<(i32, i32)>) {
        let value = response.ctx.input(|i| {
            if i.pointer.button_down(PointerButton::Primary) {
                Some(MaskValue::Marked)
            } else if i.pointer.button_down(PointerButton::Secondary)
                || i.pointer.button_down(PointerButton::Middle)
            {
                Some(MaskValue::Unmarked)
            } else {
                None
            }
        });
        if !response.is_pointer_button_down_on() {
            self.last_paint = None;
            return;
        }
        if let (Some(value), Some(pos)) = (value, cursor_image_pos) {
            self.paint_at(pos, value);
        }
    }

    fn paint_at(&mut self, pos: (i32, i32), value: MaskValue) {
        let Some(session) = self.session.as_mut() else {
            debug!("No active session, ignore paint at {pos:?}");
            return;
        };
        if self.last_paint == Some((pos, value)) {
            return;
        }
        session.paint(pos.0, pos.1, value);
        self.last_paint = Some((pos, value));
        self.view_dirty = true;
    }

    fn poll_save_jobs(&mut self) {
        let mut finished = Vec::new();
        self.save_jobs.retain_mut(|job| match job.poll() {
            Some(result) => {
                finished.push((job.target(), result));
                false
            }
            None => true,
        });
        for (target, result) in finished {
            self.status = match result {
                Ok(path) => format!("Saved {} to {}", target.label(), path.display()),
                Err(e) => {
                    warn!("Saving {} failed: {e}", target.label());
                    format!("Error during save: {e}")
                }
            };
        }
    }

    fn refresh_view(&mut self, ctx: &egui::Context) {
        if !self.view_dirty {
            return;
        }
        self.view_dirty = false;
        if let Some(session) = &self.session {
            match session.render() {
                Ok(rendered) => self.viewer.set_image(&rendered),
                Err(e) => {
                    warn!("Couldn't render {:?}: {e}", session.active_view());
                    self.status = format!("Error: {e}");
                }
            }
            ctx.request_repaint();
        }
    }
}

impl eframe::App for MaskMakerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_save_jobs();
        if !self.save_jobs.is_empty() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| self.menu_ui(ui));

        if let Some(dialog) = self.dialog.as_mut() {
            match dialog.ui(ctx) {
                DialogOutcome::Pending => {}
                DialogOutcome::Cancelled => self.dialog = None,
                DialogOutcome::Confirmed {
                    source,
                    destination,
                } => {
                    self.dialog = None;
                    self.create_session(source, destination);
                }
            }
        }

        self.handle_keys(ctx);
        self.refresh_view(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(&self.status);

            let InnerResponse {
                inner: interaction,
                response,
            } = ui.reserve_bottom_space(30., |ui| self.viewer.ui(ui));

            if self.dialog.is_none() {
                let cursor_image_pos = interaction
                    .as_ref()
                    .and_then(|i: &ImageViewerInteraction| i.cursor_image_pos);
                self.handle_pointer(&response, cursor_image_pos);
            }

            if let Some(session) = &self.session {
                let offset = session.pan_offset();
                let mut line = format!(
                    "Zoom: {:.2}x, Offset: ({}, {}), Canvas: {:?}",
                    session.zoom_level(),
                    offset.x,
                    offset.y,
                    session.canvas_size()
                );
                if let Some((x, y)) = interaction.and_then(|i| i.cursor_image_pos) {
                    line.push_str(&format!(", Pixel Coordinates: ({x}, {y})"));
                }
                ui.label(line);
            }
        });

        // Edits from this frame's pointer input
        self.refresh_view(ctx);
    }
}

trait UiExt {
    fn reserve_bottom_space<T>(&mut self, size: f32, inner: impl FnOnce(&mut egui::Ui) -> T) -> T;
}

impl UiExt for egui::Ui {
    fn reserve_bottom_space<T>(&mut self, size: f32, inner: impl FnOnce(&mut egui::Ui) -> T) -> T {
        let mut available = self.available_rect_before_wrap();
        available.max.y = (available.max.y - size).max(available.min.y);

        let r = self.scope_builder(UiBuilder::new().max_rect(available), inner);

        let InnerResponse { inner, .. } = r;
        inner
    }
}
