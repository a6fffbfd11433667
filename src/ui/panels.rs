use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left control panel: the correlation column multi-select, the
/// per-column chart-type and x-axis choices, and the prediction model label.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns = dataset.column_names.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Column multi-select for correlation / visualizations ----
            ui.strong("Columns for correlation");
            for col in &columns {
                let mut checked = state.selected_columns.contains(col);
                if ui.checkbox(&mut checked, col).changed() {
                    state.toggle_column(col);
                }
            }
            ui.separator();

            // ---- Per-column chart choices ----
            let selected = state.selected_in_order();
            if selected.len() >= 2 {
                ui.strong("Per-column charts");
                for col in &selected {
                    ui.add_space(4.0);
                    ui.label(RichText::new(col).strong());

                    let current_kind = state.chart_kind(col);
                    // Widget ids are salted with the column name so several
                    // combo boxes of the same kind can coexist.
                    egui::ComboBox::from_id_salt(format!("{col}_chart_kind"))
                        .selected_text(current_kind.label())
                        .show_ui(ui, |ui: &mut Ui| {
                            for kind in ChartKind::ALL {
                                if ui
                                    .selectable_label(current_kind == kind, kind.label())
                                    .clicked()
                                {
                                    state.set_chart_kind(col, kind);
                                }
                            }
                        });

                    if state.chart_kind(col).needs_x_axis() {
                        let current_axis = state.x_axis_for(col).unwrap_or_default();
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label("X axis");
                            egui::ComboBox::from_id_salt(format!("{col}_x_axis"))
                                .selected_text(&current_axis)
                                .show_ui(ui, |ui: &mut Ui| {
                                    for axis in &selected {
                                        if ui
                                            .selectable_label(current_axis == *axis, axis)
                                            .clicked()
                                        {
                                            state.set_x_axis(col, axis.clone());
                                        }
                                    }
                                });
                        });
                    }
                }
                ui.separator();
            }

            // ---- Prediction model label ----
            ui.strong("Prediction model");
            ui.text_edit_singleline(&mut state.model_name);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                if let Some(path) = state.source_path.clone() {
                    state.cache.invalidate(&path);
                    state.load_from_path(&path);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows × {} columns",
                ds.len(),
                ds.column_names.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open student dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_from_path(&path);
    }
}
