mod app;
mod color;
mod data;
mod ml;
mod state;
mod ui;

use std::path::Path;

use app::HydromonApp;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional CLI argument: a dataset to load at startup.
    let mut state = AppState::default();
    if let Some(path) = std::env::args().nth(1) {
        state.load_dataset_from(Path::new(&path));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "HydroMon – Hydraulic Condition Monitor",
        options,
        Box::new(|_cc| Ok(Box::new(HydromonApp::with_state(state)))),
    )
}
