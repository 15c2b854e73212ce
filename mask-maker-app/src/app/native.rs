use std::{io, path::PathBuf};

use eframe::egui;
use log::info;

use super::MaskMakerApp;

pub fn run_native() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = match std::fs::File::open("config.json") {
        Ok(f) => serde_json::from_reader(f).map_err(|e| eframe::Error::AppCreation(Box::new(e)))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => crate::config::Config::default(),
        Err(e) => Err(eframe::Error::AppCreation(Box::new(e)))?,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MaskMaker")
            .with_inner_size(config.egui.viewport),
        ..Default::default()
    };

    // mask-maker-app [SOURCE DESTINATION]
    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let initial_session = match (args.next(), args.next()) {
        (Some(source), Some(destination)) => Some((source, destination)),
        _ => None,
    };

    info!("Run with config: {config:?}");
    eframe::run_native(
        "MaskMaker",
        options,
        Box::new(move |cc| {
            Ok(Box::new(MaskMakerApp::new(
                cc,
                config.session,
                initial_session,
            )))
        }),
    )
}
