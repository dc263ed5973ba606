use eframe::egui;

use crate::state::AppState;
use crate::ui::{map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CareMapApp {
    pub state: AppState,
}

impl CareMapApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CareMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: filtered rows ----
        if self.state.show_table && !self.state.output.is_empty() {
            egui::TopBottomPanel::bottom("table_panel")
                .resizable(true)
                .default_height(220.0)
                .show(ctx, |ui| {
                    table::facility_table(ui, &self.state);
                });
        }

        // ---- Central panel: map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::facility_map(ui, &mut self.state);
        });
    }
}
