use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Column – the filterable fields of a facility record
// ---------------------------------------------------------------------------

/// How a column's cell text is interpreted by the filter engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// One value per cell, compared by exact equality.
    Single,
    /// Comma-joined free text, compared with the configured matcher.
    Multi,
}

/// A categorical column the user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    District,
    Insurance,
    Services,
    Populations,
    WalkIn,
}

impl Column {
    /// All filterable columns in sidebar order.
    pub const ALL: [Column; 5] = [
        Column::District,
        Column::Insurance,
        Column::Services,
        Column::Populations,
        Column::WalkIn,
    ];

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::District | Column::WalkIn => ColumnKind::Single,
            Column::Insurance | Column::Services | Column::Populations => ColumnKind::Multi,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::District => "Ward",
            Column::Insurance => "Insurance Accepted",
            Column::Services => "Services Available",
            Column::Populations => "Populations Served",
            Column::WalkIn => "See Walk-In Patients",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// FacilityRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single care site. Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    /// Raw `"(lat, lon)"` text, parsed later by the geocode stage.
    pub coordinates: Option<String>,
    pub district: Option<String>,
    pub insurance: Option<String>,
    pub services: Option<String>,
    pub populations: Option<String>,
    pub walk_in: Option<String>,
    /// Source columns not mapped to a field above.
    pub extra: BTreeMap<String, String>,
}

impl FacilityRecord {
    /// Raw cell text for a filterable column.
    pub fn get(&self, column: Column) -> Option<&str> {
        match column {
            Column::District => self.district.as_deref(),
            Column::Insurance => self.insurance.as_deref(),
            Column::Services => self.services.as_deref(),
            Column::Populations => self.populations.as_deref(),
            Column::WalkIn => self.walk_in.as_deref(),
        }
    }

    /// Hover label shown on the map.
    pub fn tooltip(&self) -> String {
        format!(
            "Site name: {}\nAddress: {}",
            self.name.as_deref().unwrap_or(""),
            self.address.as_deref().unwrap_or("")
        )
    }
}

// ---------------------------------------------------------------------------
// FacilityTable – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded facility rows. Never mutated after loading; filtering produces
/// index views over it.
#[derive(Debug, Clone, Default)]
pub struct FacilityTable {
    pub records: Vec<FacilityRecord>,
    /// Names of the unmapped source columns, in file order.
    pub extra_columns: Vec<String>,
}

impl FacilityTable {
    pub fn new(records: Vec<FacilityRecord>, extra_columns: Vec<String>) -> Self {
        FacilityTable {
            records,
            extra_columns,
        }
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw cell values of one column, in row order.
    pub fn column(&self, column: Column) -> impl Iterator<Item = Option<&str>> {
        self.records.iter().map(move |r| r.get(column))
    }
}

// ---------------------------------------------------------------------------
// Cell normalisation shared by the loaders
// ---------------------------------------------------------------------------

/// Whitespace-only text counts as an empty cell.
pub fn text_cell(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Render a numeric cell the way a user would type it: whole numbers lose
/// their fractional part so a ward read as `3.0` compares equal to `"3"`.
pub fn number_cell(v: f64) -> Option<String> {
    if v.is_nan() {
        None
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        Some(format!("{}", v as i64))
    } else {
        Some(v.to_string())
    }
}
