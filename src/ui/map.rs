use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Polygon};

use caremap::config::PointColoring;
use caremap::data::filter::FilterOutcome;
use caremap::pipeline::RenderedPoint;

use crate::color::{OVERLAY_FILL, OVERLAY_STROKE, POINT_COLOR};
use crate::state::AppState;

const SITES: &str = "Sites";

// ---------------------------------------------------------------------------
// Facility map (central panel)
// ---------------------------------------------------------------------------

/// Render the facility map in the central panel: one marker per filtered
/// facility on a lon/lat plane, with the selected districts outlined.
pub fn facility_map(ui: &mut Ui, state: &mut AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a facility file to view sites  (File → Open data…)");
        });
        return;
    }

    let Some(center) = state.output.center else {
        let text = match state.output.outcome() {
            FilterOutcome::NoMatches => "No facilities found",
            _ => "The loaded file has no facilities",
        };
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(text);
        });
        return;
    };

    let points = &state.output.points;
    let overlay = &state.output.overlay;
    let coloring = state.config.coloring;
    let color_map = &state.color_map;

    // Equirectangular: a degree of longitude is cos(lat) as wide as one of latitude.
    let aspect = (1.0 / center.lat.to_radians().cos().max(0.01)) as f32;
    let half_lon = state.config.view_span / 2.0;
    let half_lat = half_lon * center.lat.to_radians().cos();
    let recenter = std::mem::take(&mut state.recenter);

    Plot::new("facility_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(aspect)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(|name, value| hover_label(name, value, points))
        .show(ui, |plot_ui| {
            let markers = |series: Vec<[f64; 2]>| {
                Points::new(PlotPoints::from(series))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(5.0)
                    .name(SITES)
            };

            for feature in overlay {
                for ring in &feature.rings {
                    let polygon = Polygon::new(PlotPoints::from(ring.clone()))
                        .fill_color(OVERLAY_FILL)
                        .stroke(Stroke::new(1.5, OVERLAY_STROKE))
                        .name(format!("Ward {}", feature.district));
                    plot_ui.polygon(polygon);
                }
            }

            match coloring {
                PointColoring::Uniform => {
                    plot_ui.points(markers(marker_series(points.iter())).color(POINT_COLOR));
                }
                PointColoring::ByDistrict => {
                    for (district, color) in color_map.legend_entries() {
                        let group = points
                            .iter()
                            .filter(|p| p.district.as_deref() == Some(district));
                        plot_ui.points(markers(marker_series(group)).color(color));
                    }
                    let unknown = points
                        .iter()
                        .filter(|p| color_map.color_for(p.district.as_deref()) == Color32::GRAY);
                    plot_ui.points(markers(marker_series(unknown)).color(Color32::GRAY));
                }
            }

            if recenter {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [center.lon - half_lon, center.lat - half_lat],
                    [center.lon + half_lon, center.lat + half_lat],
                ));
            }
        });
}

fn marker_series<'a>(points: impl Iterator<Item = &'a RenderedPoint>) -> Vec<[f64; 2]> {
    points.map(|p| [p.position.lon, p.position.lat]).collect()
}

/// Tooltip for the facility nearest to the hovered marker.
fn hover_label(name: &str, value: &PlotPoint, points: &[RenderedPoint]) -> String {
    if name != SITES {
        return format!("{name}\n{:.5}, {:.5}", value.y, value.x);
    }
    points
        .iter()
        .min_by(|a, b| {
            let da = (a.position.lon - value.x).powi(2) + (a.position.lat - value.y).powi(2);
            let db = (b.position.lon - value.x).powi(2) + (b.position.lat - value.y).powi(2);
            da.total_cmp(&db)
        })
        .map(|p| p.tooltip.clone())
        .unwrap_or_default()
}
