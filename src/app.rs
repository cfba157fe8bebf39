use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct HydromonApp {
    pub state: AppState,
}

impl HydromonApp {
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for HydromonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: target selection + dataset overview ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: model analysis ----
        egui::CentralPanel::default().show(ctx, |ui| {
            report::analysis_view(ui, &mut self.state);
        });
    }
}
