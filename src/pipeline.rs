use crate::config::AppConfig;
use crate::data::boundary::{BoundaryFeature, BoundaryLayer};
use crate::data::filter::{FilterOutcome, FilterSelection, FilteredView, apply_filters};
use crate::data::geocode::{LatLon, coordinates_or_default};
use crate::data::model::{Column, FacilityTable};

// ---------------------------------------------------------------------------
// Render-ready output
// ---------------------------------------------------------------------------

/// A facility projected to numeric coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPoint {
    /// Row index in the source table.
    pub index: usize,
    pub position: LatLon,
    pub tooltip: String,
    pub district: Option<String>,
    /// The coordinate text was absent or malformed.
    pub defaulted: bool,
}

/// Everything the map needs for one selection.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub view: FilteredView,
    pub points: Vec<RenderedPoint>,
    /// Mean position of `points`; `None` when there are none.
    pub center: Option<LatLon>,
    pub overlay: Vec<BoundaryFeature>,
}

impl PipelineOutput {
    pub fn outcome(&self) -> FilterOutcome {
        self.view.outcome()
    }

    /// Nothing to draw: either the filters excluded every row or the table
    /// was empty to begin with.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn defaulted_count(&self) -> usize {
        self.points.iter().filter(|p| p.defaulted).count()
    }
}

/// Arithmetic mean of the point positions. `None` for an empty slice.
pub fn view_center(points: &[RenderedPoint]) -> Option<LatLon> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lon) = points.iter().fold((0.0, 0.0), |(lat, lon), p| {
        (lat + p.position.lat, lon + p.position.lon)
    });
    Some(LatLon::new(lat / n, lon / n))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Filter the table, geocode the survivors and pick the boundary overlay.
///
/// The table is never modified; rerun this whenever the selection, the
/// configuration or the data changes.
pub fn run(
    table: &FacilityTable,
    selection: &FilterSelection,
    config: &AppConfig,
    boundary: Option<&BoundaryLayer>,
) -> PipelineOutput {
    let matcher = config.matcher();
    let view = apply_filters(table, selection, matcher.as_ref());
    log::debug!(
        "Filtered {} of {} facilities with {} matcher ({:?})",
        view.len(),
        table.len(),
        matcher.name(),
        view.outcome()
    );

    let default = LatLon::from(config.default_coordinates);
    let points: Vec<RenderedPoint> = view
        .records(table)
        .map(|(index, record)| {
            let (position, defaulted) = coordinates_or_default(record.coordinates.as_deref(), default);
            RenderedPoint {
                index,
                position,
                tooltip: record.tooltip(),
                district: record.district.as_ref().map(|d| d.trim().to_string()),
                defaulted,
            }
        })
        .collect();

    let center = view_center(&points);

    let overlay = match (boundary, selection.get(&Column::District)) {
        (Some(layer), Some(districts)) => layer.overlay_for(districts).into_iter().cloned().collect(),
        _ => Vec::new(),
    };

    PipelineOutput {
        view,
        points,
        center,
        overlay,
    }
}
