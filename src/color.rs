use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Facility marker colour when points are not coloured by district.
pub const POINT_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

/// Fill and outline of the selected district overlay (yellow, alpha 100).
pub const OVERLAY_FILL: Color32 = Color32::from_rgba_premultiplied(100, 100, 0, 100);
pub const OVERLAY_STROKE: Color32 = Color32::from_rgb(255, 255, 0);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: district → Color32
// ---------------------------------------------------------------------------

/// Maps each district to a distinct colour.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the district option set.
    pub fn new(districts: &[String]) -> Self {
        let mapping = districts
            .iter()
            .cloned()
            .zip(generate_palette(districts.len()))
            .collect();
        ColorMap { mapping }
    }

    /// Colour of a district; gray for unknown or missing districts.
    pub fn color_for(&self, district: Option<&str>) -> Color32 {
        district
            .and_then(|d| self.mapping.get(d))
            .copied()
            .unwrap_or(Color32::GRAY)
    }

    /// Return the legend entries (district → colour) for the UI.
    pub fn legend_entries(&self) -> impl Iterator<Item = (&str, Color32)> {
        self.mapping.iter().map(|(d, c)| (d.as_str(), *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = generate_palette(8);
        assert_eq!(p.len(), 8);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_district_is_gray() {
        let map = ColorMap::new(&["1".to_string(), "2".to_string()]);
        assert_ne!(map.color_for(Some("1")), map.color_for(Some("2")));
        assert_eq!(map.color_for(Some("9")), Color32::GRAY);
        assert_eq!(map.color_for(None), Color32::GRAY);
        assert_eq!(map.legend_entries().count(), 2);
    }
}
