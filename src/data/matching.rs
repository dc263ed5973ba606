use std::collections::BTreeSet;

use serde::Deserialize;

use super::options::strip_cell_stopwords;

// ---------------------------------------------------------------------------
// Matching strategies for multi-valued columns
// ---------------------------------------------------------------------------

/// Decides whether one selected option matches a row's raw cell text.
pub trait Matcher {
    fn matches(&self, option: &str, cell: &str) -> bool;

    /// Short label shown in the UI and in logs.
    fn name(&self) -> &'static str;
}

/// Configurable choice of [`Matcher`].
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Substring containment. `"Medicaid"` also matches `"Non-Medicaid"`.
    #[default]
    Contains,
    /// Exact membership in the cell's comma-separated tokens.
    Token,
    /// Token-set similarity at or above a threshold.
    Fuzzy,
}

impl MatchStrategy {
    pub const ALL: [MatchStrategy; 3] = [
        MatchStrategy::Contains,
        MatchStrategy::Token,
        MatchStrategy::Fuzzy,
    ];

    pub fn matcher(self, fuzzy_threshold: u8) -> Box<dyn Matcher> {
        match self {
            MatchStrategy::Contains => Box::new(ContainsMatcher),
            MatchStrategy::Token => Box::new(TokenMatcher),
            MatchStrategy::Fuzzy => Box::new(FuzzyMatcher::new(fuzzy_threshold)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchStrategy::Contains => "Contains",
            MatchStrategy::Token => "Exact token",
            MatchStrategy::Fuzzy => "Fuzzy",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsMatcher;

impl Matcher for ContainsMatcher {
    fn matches(&self, option: &str, cell: &str) -> bool {
        cell.contains(option)
    }

    fn name(&self) -> &'static str {
        "contains"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMatcher;

impl Matcher for TokenMatcher {
    fn matches(&self, option: &str, cell: &str) -> bool {
        let option = option.trim();
        cell.split(',').any(|token| token.trim() == option)
    }

    fn name(&self) -> &'static str {
        "token"
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    pub threshold: u8,
}

impl FuzzyMatcher {
    pub fn new(threshold: u8) -> Self {
        FuzzyMatcher { threshold }
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        FuzzyMatcher::new(85)
    }
}

impl Matcher for FuzzyMatcher {
    fn matches(&self, option: &str, cell: &str) -> bool {
        token_set_ratio(option, cell) >= self.threshold
    }

    fn name(&self) -> &'static str {
        "fuzzy"
    }
}

/// Compares against the cell with its stop words removed, the same way
/// option labels are stripped when stop-word stripping is on.
pub struct StopwordMatcher {
    inner: Box<dyn Matcher>,
}

impl StopwordMatcher {
    pub fn new(inner: Box<dyn Matcher>) -> Self {
        StopwordMatcher { inner }
    }
}

impl Matcher for StopwordMatcher {
    fn matches(&self, option: &str, cell: &str) -> bool {
        self.inner.matches(option, &strip_cell_stopwords(cell))
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

// ---------------------------------------------------------------------------
// Token-set similarity
// ---------------------------------------------------------------------------

/// Lowercase, non-alphanumerics to spaces, trimmed.
fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Indel similarity on a 0–100 scale. Zero when either side is empty.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let common = lcs_len(&a, &b) as f64;
    let score = 200.0 * common / (a.len() + b.len()) as f64;
    score.round() as u8
}

/// Order- and duplicate-insensitive similarity between two phrases.
///
/// The shared words are compared against each side's full word set, so a
/// short option scores 100 against any cell that contains all of its words.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&str>| set.join(" ");
    let sect = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{sect} {only_a}").trim().to_string();
    let combined_b = format!("{sect} {only_b}").trim().to_string();

    ratio(&sect, &combined_a)
        .max(ratio(&sect, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_matchers() -> Vec<Box<dyn Matcher>> {
        MatchStrategy::ALL.iter().map(|s| s.matcher(85)).collect()
    }

    #[test]
    fn ratio_reference_values() {
        assert_eq!(ratio("medicaid", "medicaid"), 100);
        assert_eq!(ratio("medicare", "medicaid"), 75);
        assert_eq!(ratio("medicad", "medicaid"), 93);
        assert_eq!(ratio("", "medicaid"), 0);
    }

    #[test]
    fn token_set_ignores_order_and_case() {
        assert_eq!(
            token_set_ratio("fuzzy wuzzy was a bear", "wuzzy fuzzy was a bear"),
            100
        );
        assert_eq!(
            token_set_ratio("New York Mets vs Atlanta Braves", "atlanta braves vs new york mets"),
            100
        );
    }

    #[test]
    fn token_set_subset_scores_full() {
        assert_eq!(token_set_ratio("Medicaid", "Medicaid, Medicare"), 100);
        assert_eq!(token_set_ratio("Medicaid", "None"), 17);
        assert_eq!(token_set_ratio("", "Medicaid"), 0);
        assert_eq!(token_set_ratio("--", "Medicaid"), 0);
    }

    #[test]
    fn every_matcher_includes_listed_option_and_excludes_none() {
        for m in all_matchers() {
            assert!(m.matches("Medicaid", "Medicaid, Medicare"), "{}", m.name());
            assert!(!m.matches("Medicaid", "None"), "{}", m.name());
        }
    }

    #[test]
    fn substring_false_positive_depends_on_strategy() {
        let cell = "Non-Medicaid, Private Insurance";
        assert!(ContainsMatcher.matches("Medicaid", cell));
        assert!(!TokenMatcher.matches("Medicaid", cell));
        // "non medicaid" shares the word "medicaid", so token-set scores 100.
        assert!(FuzzyMatcher::default().matches("Medicaid", cell));
    }

    #[test]
    fn fuzzy_tolerates_typos_but_not_different_words() {
        let fuzzy = FuzzyMatcher::new(85);
        assert!(fuzzy.matches("Medicad", "Medicaid"));
        assert!(!fuzzy.matches("Medicare", "Medicaid"));
        assert!(!ContainsMatcher.matches("Medicad", "Medicaid"));
    }

    #[test]
    fn token_matcher_trims_both_sides() {
        assert!(TokenMatcher.matches(" Dental ", "Primary Care ,  Dental"));
        assert!(!TokenMatcher.matches("Dent", "Primary Care, Dental"));
    }

    #[test]
    fn stopword_matcher_finds_stripped_labels() {
        let cell = "Adults and Children, Victims of Domestic Violence";
        for strategy in MatchStrategy::ALL {
            let plain = strategy.matcher(85);
            let stripped = StopwordMatcher::new(strategy.matcher(85));
            assert!(stripped.matches("Adults Children", cell), "{}", stripped.name());
            assert!(stripped.matches("Victims Domestic Violence", cell), "{}", stripped.name());
            assert!(!stripped.matches("Seniors", cell), "{}", stripped.name());
            if strategy != MatchStrategy::Fuzzy {
                assert!(!plain.matches("Adults Children", cell), "{}", plain.name());
            }
        }
    }

    #[test]
    fn strategy_deserializes_lowercase() {
        let s: MatchStrategy = serde_json::from_str("\"token\"").unwrap();
        assert_eq!(s, MatchStrategy::Token);
    }
}
