use eframe::egui::{self, Button};
use log::debug;
use mask_maker::View;

use super::{save_job::SaveJob, session_dialog::SessionDialog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SaveTarget {
    Mask,
    TransformedSource,
}

impl SaveTarget {
    pub fn label(self) -> &'static str {
        match self {
            SaveTarget::Mask => "mask",
            SaveTarget::TransformedSource => "adjusted source",
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            SaveTarget::Mask => "mask",
            SaveTarget::TransformedSource => "source",
        }
    }
}

const VIEWS: [(&str, View); 3] = [
    ("View Source (1)", View::Source),
    ("View Mask (2)", View::Mask),
    ("View Destination (3)", View::Destination),
];

impl super::MaskMakerApp {
    pub(super) fn menu_ui(&mut self, ui: &mut egui::Ui) {
        let has_session = self.session.is_some();
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New Session").clicked() {
                    self.dialog = Some(SessionDialog::default());
                    ui.close_menu();
                }
                ui.separator();
                if ui
                    .add_enabled(has_session, Button::new("Save Mask As"))
                    .clicked()
                {
                    ui.close_menu();
                    self.save_as(SaveTarget::Mask);
                }
                if ui
                    .add_enabled(has_session, Button::new("Save Adjusted Source As"))
                    .clicked()
                {
                    ui.close_menu();
                    self.save_as(SaveTarget::TransformedSource);
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("View", |ui| {
                for (label, view) in VIEWS {
                    let selected = self
                        .session
                        .as_ref()
                        .is_some_and(|s| s.active_view() == view);
                    if ui
                        .add_enabled(has_session, Button::new(label).selected(selected))
                        .clicked()
                    {
                        self.show_view(view);
                        ui.close_menu();
                    }
                }
            });
            if !self.save_jobs.is_empty() {
                ui.spinner();
            }
        });
    }

    /// Asks for a path and writes a snapshot of the target in the background
    pub(super) fn save_as(&mut self, target: SaveTarget) {
        let Some(session) = self.session.as_ref() else {
            debug!("No active session, nothing to save");
            return;
        };
        let extension = session.destination_extension().unwrap_or("png");
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{}.{extension}", target.file_stem()))
            .add_filter(extension, &[extension])
            .save_file()
        else {
            return;
        };

        let path = session.path_with_default_extension(path);
        let snapshot = match target {
            SaveTarget::Mask => session.mask().clone(),
            SaveTarget::TransformedSource => session.transformed_source().clone(),
        };
        self.save_jobs.push(SaveJob::spawn(target, snapshot, path));
    }
}
