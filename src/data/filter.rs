use std::collections::{BTreeMap, BTreeSet};

use super::matching::Matcher;
use super::model::{Column, ColumnKind, FacilityRecord, FacilityTable};

// ---------------------------------------------------------------------------
// Filter selection: which option values are chosen per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column → set of selected option values.
/// If a column is absent or its set is empty, it means "no filter" (show all).
pub type FilterSelection = BTreeMap<Column, BTreeSet<String>>;

/// Number of columns with a non-empty selection.
pub fn active_filter_count(selection: &FilterSelection) -> usize {
    selection.values().filter(|s| !s.is_empty()).count()
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// What a filter pass produced, as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No filter is active; every row is shown.
    Unfiltered,
    /// At least one filter is active and this many rows survived.
    Matched(usize),
    /// Filters are active and excluded every row.
    NoMatches,
}

/// Indices into a [`FacilityTable`] of the rows passing all active filters,
/// in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    pub indices: Vec<usize>,
    pub active_filters: usize,
}

impl FilteredView {
    /// A view over every row with no filter applied.
    pub fn all(table: &FacilityTable) -> Self {
        FilteredView {
            indices: (0..table.len()).collect(),
            active_filters: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn outcome(&self) -> FilterOutcome {
        if self.active_filters == 0 {
            FilterOutcome::Unfiltered
        } else if self.indices.is_empty() {
            FilterOutcome::NoMatches
        } else {
            FilterOutcome::Matched(self.indices.len())
        }
    }

    /// The surviving records, borrowed from the table.
    pub fn records<'a>(
        &'a self,
        table: &'a FacilityTable,
    ) -> impl Iterator<Item = (usize, &'a FacilityRecord)> + 'a {
        self.indices.iter().map(move |&i| (i, &table.records[i]))
    }

    /// Apply another selection on top of this view.
    pub fn refine(
        &self,
        table: &FacilityTable,
        selection: &FilterSelection,
        matcher: &dyn Matcher,
    ) -> FilteredView {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| row_matches(&table.records[i], selection, matcher))
            .collect();
        FilteredView {
            indices,
            active_filters: self.active_filters.max(active_filter_count(selection)),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return the view of facilities that pass all active filters.
///
/// A facility passes a column filter when:
/// * The column is not present in `selection` or its set is empty → passes
/// * Single-valued column: the trimmed cell equals one selected value
/// * Multi-valued column: `matcher` accepts at least one selected option
///   against the raw cell text
///
/// An absent cell never passes an active filter.
pub fn apply_filters(
    table: &FacilityTable,
    selection: &FilterSelection,
    matcher: &dyn Matcher,
) -> FilteredView {
    FilteredView::all(table).refine(table, selection, matcher)
}

fn row_matches(record: &FacilityRecord, selection: &FilterSelection, matcher: &dyn Matcher) -> bool {
    for (&col, selected) in selection {
        if selected.is_empty() {
            continue;
        }
        let Some(cell) = record.get(col) else {
            return false;
        };
        let pass = match col.kind() {
            ColumnKind::Single => selected.contains(cell.trim()),
            ColumnKind::Multi => selected.iter().any(|opt| matcher.matches(opt, cell)),
        };
        if !pass {
            return false;
        }
    }
    true
}
