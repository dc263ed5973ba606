use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use caremap::config::{AppConfig, PointColoring};
use caremap::data::boundary::BoundaryLayer;
use caremap::data::filter::FilterSelection;
use caremap::data::loader::load_file;
use caremap::data::matching::MatchStrategy;
use caremap::data::model::{Column, FacilityTable};
use caremap::data::options::{OptionSets, option_sets};
use caremap::pipeline::{self, PipelineOutput};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded facility table (None until user loads a file).
    pub table: Option<FacilityTable>,
    pub data_path: Option<PathBuf>,

    /// Selectable values per column, derived from `table`.
    pub options: OptionSets,

    /// Per-column filter selections.
    pub selection: FilterSelection,

    /// District polygons for the overlay, if a boundary file was loaded.
    pub boundary: Option<BoundaryLayer>,

    /// Result of the last pipeline run.
    pub output: PipelineOutput,

    /// District colours, used when colouring by district.
    pub color_map: ColorMap,

    /// Show the filtered rows as a table below the map.
    pub show_table: bool,

    /// Move the map to the new view center on the next frame.
    pub recenter: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            table: None,
            data_path: None,
            options: OptionSets::new(),
            selection: FilterSelection::new(),
            boundary: None,
            output: PipelineOutput::default(),
            color_map: ColorMap::default(),
            show_table: false,
            recenter: true,
            status_message: None,
        }
    }

    /// Load a facility file and make it the current table.
    pub fn load_data(&mut self, path: &Path) -> Result<()> {
        let table = load_file(path, &self.config.columns)?;
        log::info!(
            "Loaded {} facilities from {} (extra columns {:?})",
            table.len(),
            path.display(),
            table.extra_columns
        );
        self.data_path = Some(path.to_path_buf());
        self.set_table(table);
        Ok(())
    }

    /// Ingest a newly loaded table, reset filters and colours.
    pub fn set_table(&mut self, table: FacilityTable) {
        self.options = option_sets(&table, self.config.strip_stopwords);
        self.selection = FilterSelection::new();
        self.color_map = ColorMap::new(
            self.options
                .get(&Column::District)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        );
        self.table = Some(table);
        self.status_message = None;
        self.recenter = true;
        self.refilter();
    }

    /// Load district polygons for the overlay. A failure only disables the
    /// overlay; the points keep rendering.
    pub fn load_boundary(&mut self, path: &Path) {
        match BoundaryLayer::load(path, &self.config.boundary_property) {
            Ok(layer) => {
                log::info!(
                    "Loaded {} boundary features keyed by {:?} from {}",
                    layer.features.len(),
                    layer.property,
                    path.display()
                );
                self.boundary = Some(layer);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Boundary overlay disabled: {e}");
                self.boundary = None;
                self.status_message = Some(format!("Boundary overlay disabled: {e}"));
            }
        }
        self.refilter();
    }

    /// Rerun the pipeline after any change to selection, config or data.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.output = pipeline::run(table, &self.selection, &self.config, self.boundary.as_ref());
            if self.output.defaulted_count() > 0 {
                log::info!(
                    "{} facilities shown at default coordinates",
                    self.output.defaulted_count()
                );
            }
        }
    }

    /// Selected values of a column (empty = no restriction).
    pub fn selected(&self, column: Column) -> Option<&BTreeSet<String>> {
        self.selection.get(&column)
    }

    /// Toggle a single option in a column's filter.
    pub fn toggle_option(&mut self, column: Column, value: &str) {
        let selected = self.selection.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.recenter = true;
        self.refilter();
    }

    /// Drop the filter on a column.
    pub fn clear(&mut self, column: Column) {
        if self.selection.remove(&column).is_some() {
            self.recenter = true;
            self.refilter();
        }
    }

    /// Single-choice filter: `None` means "All".
    pub fn set_single(&mut self, column: Column, value: Option<String>) {
        match value {
            Some(v) => {
                self.selection.insert(column, BTreeSet::from([v]));
            }
            None => {
                self.selection.remove(&column);
            }
        }
        self.recenter = true;
        self.refilter();
    }

    pub fn set_matching(&mut self, strategy: MatchStrategy) {
        if self.config.matching != strategy {
            log::info!("Matching strategy: {}", strategy.label());
            self.config.matching = strategy;
            self.refilter();
        }
    }

    pub fn set_fuzzy_threshold(&mut self, threshold: u8) {
        self.config.fuzzy_threshold = threshold.min(100);
        if self.config.matching == MatchStrategy::Fuzzy {
            self.refilter();
        }
    }

    pub fn set_coloring(&mut self, coloring: PointColoring) {
        self.config.coloring = coloring;
    }

    pub fn set_strip_stopwords(&mut self, strip: bool) {
        if self.config.strip_stopwords == strip {
            return;
        }
        self.config.strip_stopwords = strip;
        if let Some(table) = &self.table {
            self.options = option_sets(table, strip);
            // Options may have been renamed; keep only those still offered.
            for (col, selected) in self.selection.iter_mut() {
                if let Some(opts) = self.options.get(col) {
                    selected.retain(|v| opts.contains(v));
                }
            }
            self.refilter();
        }
    }
}
