use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::data::matching::{MatchStrategy, Matcher, StopwordMatcher};

// ---------------------------------------------------------------------------
// Column names of the source table
// ---------------------------------------------------------------------------

/// Header names used to locate each facility field in the input file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnNames {
    pub name: String,
    pub address: String,
    pub coordinates: String,
    pub district: String,
    pub insurance: String,
    pub services: String,
    pub populations: String,
    pub walk_in: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: "Site name".to_string(),
            address: "Address".to_string(),
            coordinates: "Coordinates".to_string(),
            district: "Ward".to_string(),
            insurance: "Insurance Accepted".to_string(),
            services: "Services Available".to_string(),
            populations: "Populations served".to_string(),
            walk_in: "See Walk-In/ Unscheduled Patients".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Point colouring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointColoring {
    #[default]
    Uniform,
    ByDistrict,
}

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("fuzzy_threshold must be within 0..=100, got {0}")]
    Threshold(u8),
}

/// Everything that varies between deployments of the viewer. Every field has
/// a default, so an empty JSON object is a valid config file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub columns: ColumnNames,
    /// How selected options are compared against multi-valued cells.
    pub matching: MatchStrategy,
    /// Cut-off on the 0–100 token-set similarity scale for fuzzy matching.
    pub fuzzy_threshold: u8,
    /// Drop English stop words from option labels before collecting them.
    pub strip_stopwords: bool,
    /// Substituted for absent or malformed coordinate text, as `[lat, lon]`.
    pub default_coordinates: [f64; 2],
    /// Feature property in the boundary file holding the district identifier.
    pub boundary_property: String,
    pub coloring: PointColoring,
    /// Width in degrees of longitude shown around the view center.
    pub view_span: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            matching: MatchStrategy::Contains,
            fuzzy_threshold: 85,
            strip_stopwords: false,
            default_coordinates: [0.0, 0.0],
            boundary_property: "WARD".to_string(),
            coloring: PointColoring::Uniform,
            view_span: 0.2,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: display,
                source,
            },
            other => other,
        })
    }

    /// The configured matcher. With stop-word stripping on, cells are
    /// stripped too so every option still selects the rows it came from.
    pub fn matcher(&self) -> Box<dyn Matcher> {
        let matcher = self.matching.matcher(self.fuzzy_threshold);
        if self.strip_stopwords {
            Box::new(StopwordMatcher::new(matcher))
        } else {
            matcher
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        if config.fuzzy_threshold > 100 {
            return Err(ConfigError::Threshold(config.fuzzy_threshold));
        }
        Ok(config)
    }
}
