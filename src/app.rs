use std::path::Path;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, panels};

/// CSV auto-loaded from the working directory on startup, when present.
pub const DEFAULT_DATASET: &str = "Student_dataset.csv";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GradeboardApp {
    pub state: AppState,
}

impl Default for GradeboardApp {
    fn default() -> Self {
        let mut state = AppState::default();
        let default_path = Path::new(DEFAULT_DATASET);
        if default_path.exists() {
            state.load_from_path(default_path);
        }
        Self { state }
    }
}

impl eframe::App for GradeboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selections ----
        egui::SidePanel::left("control_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}
