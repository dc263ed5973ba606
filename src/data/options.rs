use std::collections::{BTreeMap, BTreeSet};

use super::model::{Column, ColumnKind, FacilityTable};

/// Option labels per filterable column, each sorted ascending.
pub type OptionSets = BTreeMap<Column, Vec<String>>;

/// Common English words that carry no meaning as a filter option.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Split every present cell on commas and collect the distinct trimmed
/// tokens. Empty tokens (`"a,,b"`, trailing commas) are dropped.
pub fn split_options<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut options = BTreeSet::new();
    for value in values.into_iter().flatten() {
        for item in value.split(',') {
            let item = item.trim();
            if !item.is_empty() {
                options.insert(item.to_string());
            }
        }
    }
    options.into_iter().collect()
}

/// Like [`split_options`], but removes stop words from each token first.
/// Tokens made only of stop words disappear.
pub fn split_options_without_stopwords<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut options = BTreeSet::new();
    for value in values.into_iter().flatten() {
        for item in value.split(',') {
            let cleaned = strip_stopwords(item);
            if !cleaned.is_empty() {
                options.insert(cleaned);
            }
        }
    }
    options.into_iter().collect()
}

/// Distinct whole values of a single-valued column, trimmed and sorted.
pub fn distinct_values<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Strip stop words from every comma-separated token of a cell, keeping the
/// token structure so stripped option labels can be found in it.
pub fn strip_cell_stopwords(cell: &str) -> String {
    cell.split(',')
        .map(strip_stopwords)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_stopwords(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| {
            let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
            !STOPWORDS.contains(&bare.to_lowercase().as_str())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the option sets of every filterable column from the table.
pub fn option_sets(table: &FacilityTable, strip_stopwords: bool) -> OptionSets {
    Column::ALL
        .iter()
        .map(|&col| {
            let values = table.column(col);
            let options = match col.kind() {
                ColumnKind::Single => distinct_values(values),
                ColumnKind::Multi if strip_stopwords => split_options_without_stopwords(values),
                ColumnKind::Multi => split_options(values),
            };
            (col, options)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FacilityRecord;

    fn is_sorted_unique(v: &[String]) -> bool {
        v.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn splits_trims_dedupes_and_sorts() {
        let cells = [
            Some("Medicaid, Medicare"),
            None,
            Some("Private Insurance ,Medicaid"),
            Some("  Sliding Scale  "),
        ];
        let opts = split_options(cells);
        assert_eq!(
            opts,
            vec!["Medicaid", "Medicare", "Private Insurance", "Sliding Scale"]
        );
    }

    #[test]
    fn no_empty_tokens_from_stray_commas() {
        let opts = split_options([Some("Adults,, Children,"), Some(" , "), None]);
        assert_eq!(opts, vec!["Adults", "Children"]);
        assert!(opts.iter().all(|o| !o.is_empty()));
    }

    #[test]
    fn value_without_comma_is_single_token() {
        assert_eq!(split_options([Some("  Dental  ")]), vec!["Dental"]);
    }

    #[test]
    fn all_absent_gives_empty_set() {
        assert!(split_options([None, None]).is_empty());
        assert!(distinct_values([None]).is_empty());
    }

    #[test]
    fn distinct_values_do_not_split() {
        let vals = distinct_values([Some("2"), Some("1"), Some("2"), Some("Yes, No"), None]);
        assert_eq!(vals, vec!["1", "2", "Yes, No"]);
    }

    #[test]
    fn stopwords_are_stripped_from_tokens() {
        let opts = split_options_without_stopwords([
            Some("Adults and Children, Victims of Domestic Violence"),
            Some("the, Seniors"),
        ]);
        assert_eq!(
            opts,
            vec!["Adults Children", "Seniors", "Victims Domestic Violence"]
        );
    }

    #[test]
    fn cell_stripping_matches_option_labels() {
        let cell = "Adults and Children, Victims of Domestic Violence, the";
        assert_eq!(
            strip_cell_stopwords(cell),
            "Adults Children, Victims Domestic Violence"
        );
        for option in split_options_without_stopwords([Some(cell)]) {
            assert!(strip_cell_stopwords(cell).contains(&option));
        }
    }

    #[test]
    fn option_sets_are_deterministic_and_clean() {
        let records = vec![
            FacilityRecord {
                district: Some("8".into()),
                insurance: Some("Medicaid, Medicare".into()),
                walk_in: Some("Yes".into()),
                ..Default::default()
            },
            FacilityRecord {
                district: Some("1".into()),
                insurance: None,
                services: Some("Dental,Primary Care".into()),
                walk_in: Some("No".into()),
                ..Default::default()
            },
            FacilityRecord::default(),
        ];
        let table = FacilityTable::new(records, Vec::new());
        let first = option_sets(&table, false);
        let second = option_sets(&table, false);
        assert_eq!(first, second);
        assert_eq!(first[&Column::District], vec!["1", "8"]);
        assert_eq!(first[&Column::WalkIn], vec!["No", "Yes"]);
        assert_eq!(first[&Column::Services], vec!["Dental", "Primary Care"]);
        assert!(first[&Column::Populations].is_empty());
        for opts in first.values() {
            assert!(is_sorted_unique(opts));
            assert!(opts.iter().all(|o| !o.is_empty()));
        }
    }
}
