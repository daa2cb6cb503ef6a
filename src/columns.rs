// Column names of the TMDB movies export and of the cleaned table.

pub const ID: &str = "id";
pub const IMDB_ID: &str = "imdb_id";
pub const POPULARITY: &str = "popularity";
pub const BUDGET: &str = "budget";
pub const REVENUE: &str = "revenue";
pub const ORIGINAL_TITLE: &str = "original_title";
pub const TITLE: &str = "title";
pub const CAST: &str = "cast";
pub const HOMEPAGE: &str = "homepage";
pub const DIRECTOR: &str = "director";
pub const TAGLINE: &str = "tagline";
pub const KEYWORDS: &str = "keywords";
pub const OVERVIEW: &str = "overview";
pub const RUNTIME: &str = "runtime";
pub const GENRES: &str = "genres";
pub const PRODUCTION_COMPANIES: &str = "production_companies";
pub const RELEASE_DATE: &str = "release_date";
pub const VOTE_COUNT: &str = "vote_count";
pub const VOTE_AVERAGE: &str = "vote_average";
pub const RELEASE_YEAR: &str = "release_year";
pub const BUDGET_ADJ: &str = "budget_adj";
pub const REVENUE_ADJ: &str = "revenue_adj";

// Derived
pub const PROFIT: &str = "profit";
pub const RATING_CLASS: &str = "rating_class";
pub const VOTE_COUNT_CLASS: &str = "vote_counts_class";
pub const RUNTIME_CLASS: &str = "runtime_class";
pub const BUDGET_CLASS: &str = "budget_class";

/// Columns with no use in the analysis.
pub const NOT_RELEVANT: [&str; 7] = [
    IMDB_ID,
    POPULARITY,
    HOMEPAGE,
    TAGLINE,
    OVERVIEW,
    REVENUE_ADJ,
    BUDGET_ADJ,
];

/// Integer columns after numeric normalization.
pub const INTEGER_COLUMNS: [&str; 6] = [ID, RUNTIME, BUDGET, REVENUE, VOTE_COUNT, RELEASE_YEAR];

/// Pipe-delimited multi-value columns.
pub const MULTI_VALUE_COLUMNS: [&str; 4] = [CAST, GENRES, PRODUCTION_COMPANIES, KEYWORDS];

/// Presentation order of the cleaned table.
pub const FINAL_ORDER: [&str; 19] = [
    ID,
    TITLE,
    RELEASE_YEAR,
    RELEASE_DATE,
    RUNTIME,
    RUNTIME_CLASS,
    DIRECTOR,
    CAST,
    GENRES,
    VOTE_AVERAGE,
    RATING_CLASS,
    VOTE_COUNT,
    VOTE_COUNT_CLASS,
    REVENUE,
    BUDGET,
    PROFIT,
    BUDGET_CLASS,
    PRODUCTION_COMPANIES,
    KEYWORDS,
];

pub const RATING_LABELS: [&str; 4] = ["very low", "low", "medium", "high"];
pub const VOTE_COUNT_LABELS: [&str; 4] = ["not relevant", "few", "middle", "many"];
pub const RUNTIME_LABELS: [&str; 4] = [
    "short film",
    "medium-length film",
    "feature-length film",
    "over-length film",
];
pub const BUDGET_LABELS: [&str; 4] = ["low", "middle", "higher", "premium"];

/// Label set of a classification column, in ascending order.
pub fn labels_of(column: &str) -> Option<&'static [&'static str; 4]> {
    match column {
        RATING_CLASS => Some(&RATING_LABELS),
        VOTE_COUNT_CLASS => Some(&VOTE_COUNT_LABELS),
        RUNTIME_CLASS => Some(&RUNTIME_LABELS),
        BUDGET_CLASS => Some(&BUDGET_LABELS),
        _ => None,
    }
}

/// Position of `label` within the label set of `column`.
pub fn label_rank(column: &str, label: &str) -> Option<usize> {
    labels_of(column)?.iter().position(|l| *l == label)
}

#[cfg(test)]
mod test_columns {
    use super::*;

    #[test]
    fn test_label_rank() {
        assert_eq!(label_rank(BUDGET_CLASS, "premium"), Some(3));
        assert_eq!(label_rank(RATING_CLASS, "very low"), Some(0));
        assert_eq!(label_rank(RATING_CLASS, "premium"), None);
        assert_eq!(label_rank(GENRES, "Drama"), None);
    }

    #[test]
    fn test_final_order_contains_classes() {
        for class in [RATING_CLASS, VOTE_COUNT_CLASS, RUNTIME_CLASS, BUDGET_CLASS] {
            assert!(FINAL_ORDER.contains(&class));
            assert!(labels_of(class).is_some());
        }
        for dropped in NOT_RELEVANT {
            assert!(!FINAL_ORDER.contains(&dropped));
        }
    }
}
