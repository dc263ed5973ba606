use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};

use caremap::data::model::FacilityRecord;

use crate::state::AppState;

const HEADERS: [&str; 7] = [
    "Site name",
    "Address",
    "Ward",
    "Walk-in",
    "Insurance Accepted",
    "Services Available",
    "Populations Served",
];

fn cells<'a>(record: &'a FacilityRecord, extra_columns: &'a [String]) -> Vec<&'a str> {
    let fixed = [
        &record.name,
        &record.address,
        &record.district,
        &record.walk_in,
        &record.insurance,
        &record.services,
        &record.populations,
    ];
    fixed
        .into_iter()
        .map(|v| v.as_deref().unwrap_or(""))
        .chain(
            extra_columns
                .iter()
                .map(|c| record.extra.get(c).map_or("", String::as_str)),
        )
        .collect()
}

/// The filtered facilities as rows, in source order. Unmapped source
/// columns follow the fixed ones.
pub fn facility_table(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let points = &state.output.points;
    let n_columns = HEADERS.len() + table.extra_columns.len();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(TableColumn::auto().at_least(80.0).clip(true), n_columns - 1)
        .column(TableColumn::remainder())
        .header(20.0, |mut header| {
            let titles = HEADERS
                .iter()
                .copied()
                .chain(table.extra_columns.iter().map(String::as_str));
            for title in titles {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, points.len(), |mut row| {
                let record = &table.records[points[row.index()].index];
                for text in cells(record, &table.extra_columns) {
                    row.col(|ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
