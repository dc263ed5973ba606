use std::collections::BTreeSet;
use std::path::Path;

use geojson::{GeoJson, Value};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::number_cell;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("opening boundary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing boundary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("boundary file is not a FeatureCollection")]
    NotFeatureCollection,
    #[error("feature {index} has no {property:?} property")]
    MissingProperty { index: usize, property: String },
}

/// One district outline. Rings are exterior rings as `[lon, lat]` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub district: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// District polygons read from a GeoJSON FeatureCollection.
#[derive(Debug, Clone, Default)]
pub struct BoundaryLayer {
    pub property: String,
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryLayer {
    pub fn load(path: &Path, property: &str) -> Result<Self, BoundaryError> {
        let file = std::fs::File::open(path)?;
        let geojson = GeoJson::from_reader(std::io::BufReader::new(file))?;
        Self::from_geojson(geojson, property)
    }

    pub fn from_geojson(geojson: GeoJson, property: &str) -> Result<Self, BoundaryError> {
        let GeoJson::FeatureCollection(fc) = geojson else {
            return Err(BoundaryError::NotFeatureCollection);
        };

        let mut features = Vec::with_capacity(fc.features.len());
        for (index, feature) in fc.features.iter().enumerate() {
            let district = feature
                .property(property)
                .and_then(property_text)
                .ok_or_else(|| BoundaryError::MissingProperty {
                    index,
                    property: property.to_string(),
                })?;

            let mut rings = Vec::new();
            if let Some(geometry) = &feature.geometry {
                collect_rings(&geometry.value, &mut rings);
            }
            if rings.is_empty() {
                log::debug!("Boundary feature {index} ({district}) has no polygon geometry");
            }
            features.push(BoundaryFeature { district, rings });
        }

        Ok(BoundaryLayer {
            property: property.to_string(),
            features,
        })
    }

    /// Features whose district is one of `selected`, in file order. Empty
    /// when nothing is selected.
    pub fn overlay_for(&self, selected: &BTreeSet<String>) -> Vec<&BoundaryFeature> {
        self.features
            .iter()
            .filter(|f| selected.contains(&f.district))
            .collect()
    }
}

/// District identifiers compare as text; numeric `3` equals `"3"`.
fn property_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => n.as_f64().and_then(number_cell),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

fn collect_rings(value: &Value, out: &mut Vec<Vec<[f64; 2]>>) {
    let exterior = |polygon: &Vec<Vec<Vec<f64>>>| -> Option<Vec<[f64; 2]>> {
        polygon.first().map(|ring| {
            ring.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| [p[0], p[1]])
                .collect()
        })
    };
    match value {
        Value::Polygon(polygon) => out.extend(exterior(polygon)),
        Value::MultiPolygon(polygons) => out.extend(polygons.iter().filter_map(exterior)),
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_rings(&g.value, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64) -> String {
        format!("[[[{x}, 0.0], [{x1}, 0.0], [{x1}, 1.0], [{x}, 1.0], [{x}, 0.0]]]", x1 = x + 1.0)
    }

    fn wards_geojson() -> GeoJson {
        let text = format!(
            r#"{{ "type": "FeatureCollection", "features": [
                {{ "type": "Feature", "properties": {{ "WARD": 1 }},
                   "geometry": {{ "type": "Polygon", "coordinates": {} }} }},
                {{ "type": "Feature", "properties": {{ "WARD": "2" }},
                   "geometry": {{ "type": "Polygon", "coordinates": {} }} }},
                {{ "type": "Feature", "properties": {{ "WARD": 3.0 }},
                   "geometry": {{ "type": "MultiPolygon", "coordinates": [{}, {}] }} }}
            ] }}"#,
            square(0.0),
            square(1.0),
            square(2.0),
            square(3.0)
        );
        text.parse().unwrap()
    }

    #[test]
    fn two_selected_districts_give_exactly_their_polygons() {
        let layer = BoundaryLayer::from_geojson(wards_geojson(), "WARD").unwrap();
        assert_eq!(layer.property, "WARD");
        let selected = BTreeSet::from(["1".to_string(), "3".to_string()]);
        let overlay = layer.overlay_for(&selected);
        let districts: Vec<&str> = overlay.iter().map(|f| f.district.as_str()).collect();
        assert_eq!(districts, vec!["1", "3"]);
        assert_eq!(overlay[1].rings.len(), 2);
        assert_eq!(overlay[0].rings[0][1], [1.0, 0.0]);
    }

    #[test]
    fn no_selection_gives_no_overlay() {
        let layer = BoundaryLayer::from_geojson(wards_geojson(), "WARD").unwrap();
        assert!(layer.overlay_for(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn missing_property_is_an_error() {
        let err = BoundaryLayer::from_geojson(wards_geojson(), "DISTRICT").unwrap_err();
        assert!(matches!(err, BoundaryError::MissingProperty { index: 0, .. }));
    }

    #[test]
    fn bare_geometry_is_rejected() {
        let geojson: GeoJson = r#"{ "type": "Point", "coordinates": [1.0, 2.0] }"#.parse().unwrap();
        assert!(matches!(
            BoundaryLayer::from_geojson(geojson, "WARD"),
            Err(BoundaryError::NotFeatureCollection)
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BoundaryLayer::load(Path::new("/nonexistent/wards.geojson"), "WARD").unwrap_err();
        assert!(matches!(err, BoundaryError::Io(_)));
    }

    #[test]
    fn invalid_json_is_json_error() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"{ \"type\": \"FeatureCollection\", ").unwrap();
        let err = BoundaryLayer::load(file.path(), "WARD").unwrap_err();
        assert!(matches!(err, BoundaryError::Json(_)), "{err}");
    }

    #[test]
    fn loads_feature_collection_from_file() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        std::io::Write::write_all(&mut file, wards_geojson().to_string().as_bytes()).unwrap();
        let layer = BoundaryLayer::load(file.path(), "WARD").unwrap();
        let districts: Vec<&str> = layer.features.iter().map(|f| f.district.as_str()).collect();
        assert_eq!(districts, vec!["1", "2", "3"]);
    }
}
