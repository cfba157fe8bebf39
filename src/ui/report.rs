use eframe::egui::{self, Align2, Color32, FontId, Rect, RichText, ScrollArea, Sense, Ui, pos2, vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};

use crate::color;
use crate::ml::analysis::{AnalysisError, ModelAnalysis};
use crate::ml::metrics::{Averages, ClassificationReport, ConfusionMatrix};
use crate::ml::stats::CorrelationMatrix;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – model analysis view
// ---------------------------------------------------------------------------

/// Render the analysis view for the selected target.
pub fn analysis_view(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to analyze model performance  (File → Open dataset…)");
        });
        return;
    }

    state.ensure_analysis();
    ui.heading(state.selected_target.display_name());
    ui.separator();

    if let Some(matrix) = &state.correlation_matrix {
        egui::CollapsingHeader::new("Feature correlation matrix")
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
                    correlation_heatmap(ui, matrix);
                });
            });
        ui.separator();
    }

    match state.current_analysis() {
        None => {
            ui.label("Analysis has not run yet.");
        }
        Some(Err(e)) => render_error(ui, e),
        Some(Ok(analysis)) => render_analysis(ui, analysis),
    }
}

fn render_error(ui: &mut Ui, error: &AnalysisError) {
    ui.label(RichText::new(error.to_string()).color(Color32::RED));

    match error {
        AnalysisError::TargetLeakage { .. } => {
            ui.label(
                "The target variable must not be used as an input feature. \
                 Retrain the classifier without the target column.",
            );
        }
        AnalysisError::FeatureShapeMismatch {
            expected,
            available,
            ..
        } => {
            ui.label("The classifier was trained with different features than are available now.");
            egui::CollapsingHeader::new("Diagnostic details")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.strong(format!("Expected features ({})", expected.len()));
                    ui.label(expected.join(", "));
                    ui.add_space(4.0);
                    ui.strong(format!("Available features ({})", available.len()));
                    ui.label(available.join(", "));
                });
        }
        AnalysisError::ClassifierInvalid { .. } => {
            ui.label("Fix or replace the artifact, then reselect the target to retry.");
        }
        AnalysisError::ClassifierUnavailable(target) => {
            ui.label(format!(
                "Place a trained artifact at models/best_model_{}.json to enable this view.",
                target.artifact_stem()
            ));
        }
        _ => {}
    }
}

fn render_analysis(ui: &mut Ui, analysis: &ModelAnalysis) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for note in &analysis.diagnostics {
                ui.label(RichText::new(note).color(Color32::from_rgb(0xb0, 0x80, 0x00)));
            }
            ui.add_space(8.0);

            ui.strong("Confusion matrix");
            ui.label("rows: true class · columns: predicted class");
            confusion_heatmap(ui, &analysis.confusion);
            ui.add_space(12.0);

            ui.strong("Classification report");
            report_table(ui, &analysis.report);
            ui.add_space(12.0);

            ui.strong("Feature correlation with target");
            correlation_chart(ui, &analysis.correlations);
        });
}

// ---------------------------------------------------------------------------
// Confusion matrix heatmap
// ---------------------------------------------------------------------------

const CELL: f32 = 52.0;
const LABEL_W: f32 = 90.0;
const LABEL_H: f32 = 22.0;

fn confusion_heatmap(ui: &mut Ui, cm: &ConfusionMatrix) {
    let n = cm.classes.len();
    if n == 0 {
        ui.label("No observations.");
        return;
    }

    let size = vec2(LABEL_W + n as f32 * CELL, LABEL_H + n as f32 * CELL);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let max = cm.max_count().max(1) as f64;
    let text_color = ui.visuals().text_color();

    // Column headers (predicted classes).
    for (j, class) in cm.classes.iter().enumerate() {
        let x = rect.min.x + LABEL_W + (j as f32 + 0.5) * CELL;
        painter.text(
            pos2(x, rect.min.y + LABEL_H * 0.5),
            Align2::CENTER_CENTER,
            class.to_string(),
            FontId::proportional(13.0),
            text_color,
        );
    }

    for (i, class) in cm.classes.iter().enumerate() {
        let y = rect.min.y + LABEL_H + (i as f32 + 0.5) * CELL;

        // Row header (true class).
        painter.text(
            pos2(rect.min.x + LABEL_W - 8.0, y),
            Align2::RIGHT_CENTER,
            class.to_string(),
            FontId::proportional(13.0),
            text_color,
        );

        for (j, &count) in cm.counts[i].iter().enumerate() {
            let cell = Rect::from_min_size(
                pos2(
                    rect.min.x + LABEL_W + j as f32 * CELL,
                    rect.min.y + LABEL_H + i as f32 * CELL,
                ),
                vec2(CELL, CELL),
            );
            let t = count as f64 / max;
            painter.rect_filled(cell.shrink(1.0), egui::CornerRadius::same(2), color::heat_color(t));
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                count.to_string(),
                FontId::proportional(13.0),
                color::heat_text_color(t),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Feature × feature correlation heatmap (dataset overview)
// ---------------------------------------------------------------------------

const CORR_CELL: f32 = 46.0;

/// Signed r per cell; colour intensity follows |r|, the text keeps the sign.
fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.features.len();
    if n < 2 {
        ui.label("Not enough numeric columns to correlate.");
        return;
    }

    let size = vec2(LABEL_W + n as f32 * CORR_CELL, LABEL_H + n as f32 * CORR_CELL);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();

    for (j, name) in matrix.features.iter().enumerate() {
        let x = rect.min.x + LABEL_W + (j as f32 + 0.5) * CORR_CELL;
        painter.text(
            pos2(x, rect.min.y + LABEL_H * 0.5),
            Align2::CENTER_CENTER,
            name,
            FontId::proportional(10.0),
            text_color,
        );
    }

    for (i, name) in matrix.features.iter().enumerate() {
        let y = rect.min.y + LABEL_H + (i as f32 + 0.5) * CORR_CELL;
        painter.text(
            pos2(rect.min.x + LABEL_W - 8.0, y),
            Align2::RIGHT_CENTER,
            name,
            FontId::proportional(10.0),
            text_color,
        );

        for (j, &r) in matrix.values[i].iter().enumerate() {
            let cell = Rect::from_min_size(
                pos2(
                    rect.min.x + LABEL_W + j as f32 * CORR_CELL,
                    rect.min.y + LABEL_H + i as f32 * CORR_CELL,
                ),
                vec2(CORR_CELL, CORR_CELL),
            );
            let t = r.abs();
            painter.rect_filled(cell.shrink(1.0), egui::CornerRadius::same(2), color::heat_color(t));
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                format!("{r:.2}"),
                FontId::proportional(10.0),
                color::heat_text_color(t),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Classification report table
// ---------------------------------------------------------------------------

fn report_table(ui: &mut Ui, report: &ClassificationReport) {
    let metric_row = |mut row: egui_extras::TableRow<'_, '_>,
                      name: String,
                      avg: &Averages,
                      support: String| {
        row.col(|ui| {
            ui.strong(name);
        });
        row.col(|ui| {
            ui.label(format!("{:.4}", avg.precision));
        });
        row.col(|ui| {
            ui.label(format!("{:.4}", avg.recall));
        });
        row.col(|ui| {
            ui.label(format!("{:.4}", avg.f1));
        });
        row.col(|ui| {
            ui.label(support);
        });
    };

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .columns(Column::auto().at_least(70.0), 4)
        .header(20.0, |mut header| {
            for title in ["Class", "Precision", "Recall", "F1", "Support"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for m in &report.per_class {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(m.label.to_string());
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.4}", m.precision));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.4}", m.recall));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.4}", m.f1));
                    });
                    row.col(|ui| {
                        ui.label(m.support.to_string());
                    });
                });
            }

            let total: usize = report.per_class.iter().map(|m| m.support).sum();
            body.row(18.0, |mut row| {
                row.col(|ui| {
                    ui.strong("accuracy");
                });
                row.col(|_| {});
                row.col(|_| {});
                row.col(|ui| {
                    ui.label(format!("{:.4}", report.accuracy));
                });
                row.col(|ui| {
                    ui.label(total.to_string());
                });
            });
            body.row(18.0, |row| {
                metric_row(row, "macro avg".into(), &report.macro_avg, total.to_string());
            });
            body.row(18.0, |row| {
                metric_row(
                    row,
                    "weighted avg".into(),
                    &report.weighted_avg,
                    total.to_string(),
                );
            });
        });
}

// ---------------------------------------------------------------------------
// Feature ↔ target correlation chart
// ---------------------------------------------------------------------------

const TOP_CORRELATIONS: usize = 15;

fn correlation_chart(ui: &mut Ui, correlations: &[(String, f64)]) {
    let top: Vec<&(String, f64)> = correlations.iter().take(TOP_CORRELATIONS).collect();
    if top.is_empty() {
        ui.label("No numeric features to correlate.");
        return;
    }

    // Strongest at the top of the horizontal chart.
    let bars: Vec<Bar> = top
        .iter()
        .rev()
        .enumerate()
        .map(|(i, (name, r))| Bar::new(i as f64, *r).name(name.clone()))
        .collect();

    Plot::new("target_correlations")
        .height(24.0 * top.len() as f32 + 30.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .include_x(0.0)
        .include_x(1.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });

    for (name, r) in &top {
        ui.label(format!("{name}: |r| = {r:.3}"));
    }
}
