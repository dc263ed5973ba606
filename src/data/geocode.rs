use thiserror::Error;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }
}

impl From<[f64; 2]> for LatLon {
    fn from([lat, lon]: [f64; 2]) -> Self {
        LatLon { lat, lon }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeocodeError {
    #[error("expected \"(lat, lon)\", got {0:?}")]
    Format(String),
    #[error("{axis} {text:?} is not a number")]
    Number { axis: &'static str, text: String },
    #[error("{axis} {value} is out of range")]
    Range { axis: &'static str, value: f64 },
}

/// Parse a `"(lat, lon)"` pair.
///
/// Leading and trailing parentheses are stripped, the remainder is split on
/// the literal `", "` and both halves are parsed as floats.
pub fn parse_coordinates(text: &str) -> Result<LatLon, GeocodeError> {
    let inner = text.trim().trim_matches(|c| c == '(' || c == ')');
    let mut parts = inner.split(", ");
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeocodeError::Format(text.to_string()));
    };
    let lat = parse_axis("latitude", lat, 90.0)?;
    let lon = parse_axis("longitude", lon, 180.0)?;
    Ok(LatLon { lat, lon })
}

fn parse_axis(axis: &'static str, text: &str, limit: f64) -> Result<f64, GeocodeError> {
    let value: f64 = text.trim().parse().map_err(|_| GeocodeError::Number {
        axis,
        text: text.to_string(),
    })?;
    if !value.is_finite() || value.abs() > limit {
        return Err(GeocodeError::Range { axis, value });
    }
    Ok(value)
}

/// Parse `text`, or fall back to `default` when it is absent or malformed.
/// The flag is `true` when the default was used.
pub fn coordinates_or_default(text: Option<&str>, default: LatLon) -> (LatLon, bool) {
    match text.map(parse_coordinates) {
        Some(Ok(pos)) => (pos, false),
        Some(Err(e)) => {
            log::warn!("Substituting default coordinates: {e}");
            (default, true)
        }
        None => (default, true),
    }
}
