use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use caremap::config::PointColoring;
use caremap::data::filter::FilterOutcome;
use caremap::data::matching::MatchStrategy;
use caremap::data::model::{Column, ColumnKind};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    if state.table.is_none() {
        ui.label("No facility file loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the loop.
    let options = state.options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            matching_controls(ui, state);
            ui.separator();

            for col in Column::ALL {
                let Some(values) = options.get(&col) else {
                    continue;
                };
                match col {
                    Column::WalkIn => single_choice(ui, state, col, values),
                    _ => multi_select(ui, state, col, values),
                }
            }
        });
}

/// Matching strategy, fuzzy threshold and point colouring.
fn matching_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Match options by");
    let current = state.config.matching;
    egui::ComboBox::from_id_salt("matching")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for strategy in MatchStrategy::ALL {
                if ui
                    .selectable_label(current == strategy, strategy.label())
                    .clicked()
                {
                    state.set_matching(strategy);
                }
            }
        });

    if state.config.matching == MatchStrategy::Fuzzy {
        let mut threshold = state.config.fuzzy_threshold;
        if ui
            .add(egui::Slider::new(&mut threshold, 0..=100).text("threshold"))
            .changed()
        {
            state.set_fuzzy_threshold(threshold);
        }
    }

    let mut strip = state.config.strip_stopwords;
    if ui.checkbox(&mut strip, "Ignore stop words in options").changed() {
        state.set_strip_stopwords(strip);
    }

    ui.add_space(4.0);
    ui.strong("Color by");
    let mut coloring = state.config.coloring;
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut coloring, PointColoring::Uniform, "None");
        ui.radio_value(&mut coloring, PointColoring::ByDistrict, Column::District.label());
    });
    if coloring != state.config.coloring {
        state.set_coloring(coloring);
    }
}

/// Collapsible checkbox list; nothing checked means no restriction.
fn multi_select(ui: &mut Ui, state: &mut AppState, col: Column, values: &[String]) {
    let n_selected = state.selected(col).map_or(0, |s| s.len());
    let n_total = values.len();
    let header_text = format!("{col}  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(col.label())
        .default_open(col == Column::District)
        .show(ui, |ui: &mut Ui| {
            if n_total == 0 {
                ui.weak("No values");
                return;
            }
            if ui.small_button("Clear").clicked() {
                state.clear(col);
            }

            for value in values {
                let mut checked = state.selected(col).is_some_and(|s| s.contains(value));

                let mut text = RichText::new(value);
                if col == Column::District && state.config.coloring == PointColoring::ByDistrict {
                    text = text.color(state.color_map.color_for(Some(value)));
                }

                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_option(col, value);
                }
            }
        });

    if col.kind() == ColumnKind::Multi && n_selected > 0 {
        ui.weak(format!("matching: {}", state.config.matching.label()));
    }
}

/// Radio buttons with an "All" entry, for yes/no style columns.
fn single_choice(ui: &mut Ui, state: &mut AppState, col: Column, values: &[String]) {
    ui.add_space(4.0);
    ui.strong(col.label());

    let current = state
        .selected(col)
        .and_then(|s| s.iter().next().cloned());
    let mut choice = current.clone();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.radio_value(&mut choice, None, "All");
        for value in values {
            ui.radio_value(&mut choice, Some(value.clone()), value);
        }
    });
    if choice != current {
        state.set_single(col, choice);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data…").clicked() {
                open_data_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open boundaries…").clicked() {
                open_boundary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(name) = state.data_path.as_deref().and_then(|p| p.file_name()) {
            ui.label(RichText::new(name.to_string_lossy()).strong());
        }

        if let Some(table) = &state.table {
            let summary = match state.output.outcome() {
                FilterOutcome::Unfiltered => format!("{} facilities", table.len()),
                FilterOutcome::Matched(n) => format!("{n} of {} facilities", table.len()),
                FilterOutcome::NoMatches => "No facilities found".to_string(),
            };
            ui.label(summary);

            let defaulted = state.output.defaulted_count();
            if defaulted > 0 {
                ui.label(
                    RichText::new(format!("{defaulted} without coordinates"))
                        .color(Color32::DARK_RED),
                );
            }
        }

        ui.separator();

        if ui.selectable_label(state.show_table, "Table").clicked() {
            state.show_table = !state.show_table;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_data_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open facility data")
        .add_filter("Supported files", &["xlsx", "xls", "ods", "csv", "tsv", "json", "parquet"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "xlsb", "ods"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_data(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn open_boundary_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open district boundaries")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        state.load_boundary(&path);
    }
}
