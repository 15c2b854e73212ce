use std::path::PathBuf;

use eframe::egui::{self, Button};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "tiff"];

pub(super) enum DialogOutcome {
    Pending,
    Cancelled,
    Confirmed {
        source: PathBuf,
        destination: PathBuf,
    },
}

/// Picks a source and a destination image before a session is created
#[derive(Default)]
pub(super) struct SessionDialog {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
}

impl SessionDialog {
    pub fn ui(&mut self, ctx: &egui::Context) -> DialogOutcome {
        let mut outcome = DialogOutcome::Pending;
        egui::Window::new("Please select a source and a destination image")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                path_row(ui, "Source Image : ", &mut self.source);
                path_row(ui, "Destination Image : ", &mut self.destination);

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        outcome = DialogOutcome::Cancelled;
                    }
                    let selection = self.selection();
                    if ui
                        .add_enabled(selection.is_some(), Button::new("Confirm"))
                        .clicked()
                        && let Some((source, destination)) = selection
                    {
                        outcome = DialogOutcome::Confirmed {
                            source,
                            destination,
                        };
                    }
                });
            });
        outcome
    }

    fn selection(&self) -> Option<(PathBuf, PathBuf)> {
        Some((self.source.clone()?, self.destination.clone()?))
    }
}

fn path_row(ui: &mut egui::Ui, label: &str, path: &mut Option<PathBuf>) {
    ui.horizontal(|ui| {
        ui.label(label);
        match path {
            Some(p) => ui.label(p.display().to_string()),
            None => ui.label("None selected"),
        };
        if ui.button("Pick").clicked()
            && let Some(picked) = rfd::FileDialog::new()
                .add_filter("Images", &IMAGE_EXTENSIONS)
                .pick_file()
        {
            *path = Some(picked);
        }
    });
}
