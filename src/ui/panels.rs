use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ClassPalette;
use crate::data::model::Dataset;
use crate::ml::TargetLabel;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let file = state
                .dataset_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{file}: {} cycles, {} numeric columns",
                ds.n_rows(),
                ds.numeric_columns().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – target selection and dataset overview
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Condition monitoring");
    ui.separator();

    ui.strong("Target");
    let current = state.selected_target;
    egui::ComboBox::from_id_salt("target_select")
        .selected_text(current.display_name())
        .show_ui(ui, |ui: &mut Ui| {
            for target in TargetLabel::ALL {
                if ui
                    .selectable_label(current == target, target.display_name())
                    .clicked()
                {
                    state.select_target(target);
                }
            }
        });
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Dataset");
            ui.label(format!("Cycles: {}", dataset.n_rows()));
            ui.label(format!(
                "Numeric columns: {}",
                dataset.numeric_columns().len()
            ));
            let targets_present = TargetLabel::ALL
                .iter()
                .filter(|t| dataset.has_column(t.column_name()))
                .count();
            ui.label(format!("Target columns: {targets_present}/4"));
            ui.separator();

            ui.strong("Class distribution");
            class_distribution_chart(ui, dataset, state.selected_target);
        });
}

/// Bar chart of a target's class counts, one colour per class.
fn class_distribution_chart(ui: &mut Ui, dataset: &Dataset, target: TargetLabel) {
    let Some(counts) = dataset.class_counts(target.column_name()) else {
        ui.label(format!(
            "Column '{}' is absent or not categorical.",
            target.column_name()
        ));
        return;
    };

    let palette = ClassPalette::new(counts.keys());
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (label, &count))| {
            Bar::new(i as f64, count as f64)
                .name(label.to_string())
                .fill(palette.color_for(label))
        })
        .collect();

    Plot::new("class_distribution")
        .height(160.0)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sensor dataset")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_dataset_from(&path);
    }
}
