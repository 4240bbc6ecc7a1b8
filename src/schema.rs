//! Column catalog for the popular-repositories dataset.
//! These constants define the mapping between raw CSV headers and the
//! canonical column names the rest of the pipeline works with.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Autogenerated index columns carry this header prefix and are dropped on load.
pub const RESERVED_INDEX_PREFIX: &str = "Unnamed:";

/// Suffix marking a count expressed in thousands, e.g. `"310k"`.
pub const SCALE_MARKER: char = 'k';
pub const SCALE_FACTOR: f64 = 1000.0;

/// Thousands separator stripped from tolerant count columns, e.g. `"1,234"`.
pub const THOUSANDS_SEPARATOR: char = ',';

// Canonical column names (used everywhere after load)
pub const TOPIC: &str = "Topic";
pub const REPO_NAME: &str = "Repo_Name";
pub const USER_NAME: &str = "User_Name";
pub const STAR: &str = "Star";
pub const FORK: &str = "Fork";
pub const WATCH: &str = "Watch";
pub const ISSUES: &str = "Issues";
pub const PULL_REQUESTS: &str = "Pull_Requests";
pub const TOPIC_TAGS: &str = "Topic_Tags";
pub const COMMITS: &str = "Commits";
pub const CONTRIBUTORS: &str = "Contributors";

/// Derived after tag decoding; never present in the raw file.
pub const TOTAL_TAGS: &str = "Total_Tags";

/// How a column is rewritten during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeRule {
    /// Text column, carried through untouched.
    Keep,
    /// Required count with an optional thousands suffix. Malformed cells are fatal.
    ScaledCount,
    /// Count with optional comma separators. Malformed cells become null.
    TolerantCount,
    /// Python-style list literal of tag strings. Malformed cells are fatal.
    TagList,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Header name in the raw CSV.
    pub source: &'static str,
    /// Canonical name after load.
    pub name: &'static str,
    pub rule: NormalizeRule,
}

/// The eleven selected columns, in canonical output order. Everything else
/// in the raw file is ignored. Note the `contributers` typo in the source
/// data, corrected by the rename.
pub static SCHEMA: &[ColumnSpec] = &[
    ColumnSpec {
        source: "topic",
        name: TOPIC,
        rule: NormalizeRule::Keep,
    },
    ColumnSpec {
        source: "name",
        name: REPO_NAME,
        rule: NormalizeRule::Keep,
    },
    ColumnSpec {
        source: "user",
        name: USER_NAME,
        rule: NormalizeRule::Keep,
    },
    ColumnSpec {
        source: "star",
        name: STAR,
        rule: NormalizeRule::ScaledCount,
    },
    ColumnSpec {
        source: "fork",
        name: FORK,
        rule: NormalizeRule::ScaledCount,
    },
    ColumnSpec {
        source: "watch",
        name: WATCH,
        rule: NormalizeRule::ScaledCount,
    },
    ColumnSpec {
        source: "issue",
        name: ISSUES,
        rule: NormalizeRule::TolerantCount,
    },
    ColumnSpec {
        source: "pull_requests",
        name: PULL_REQUESTS,
        rule: NormalizeRule::TolerantCount,
    },
    ColumnSpec {
        source: "topic_tag",
        name: TOPIC_TAGS,
        rule: NormalizeRule::TagList,
    },
    ColumnSpec {
        source: "commits",
        name: COMMITS,
        rule: NormalizeRule::TolerantCount,
    },
    ColumnSpec {
        source: "contributers",
        name: CONTRIBUTORS,
        rule: NormalizeRule::TolerantCount,
    },
];

/// Raw header -> column spec, for the loader.
static BY_SOURCE: Lazy<HashMap<&'static str, &'static ColumnSpec>> =
    Lazy::new(|| SCHEMA.iter().map(|spec| (spec.source, spec)).collect());

/// Canonical name -> column spec, for the normalizer.
static BY_NAME: Lazy<HashMap<&'static str, &'static ColumnSpec>> =
    Lazy::new(|| SCHEMA.iter().map(|spec| (spec.name, spec)).collect());

pub fn spec_for_source(header: &str) -> Option<&'static ColumnSpec> {
    BY_SOURCE.get(header).copied()
}

pub fn spec_for_name(name: &str) -> Option<&'static ColumnSpec> {
    BY_NAME.get(name).copied()
}

/// Canonical column order of the normalized table, derived column included.
pub fn normalized_columns() -> Vec<&'static str> {
    SCHEMA
        .iter()
        .map(|spec| spec.name)
        .chain(std::iter::once(TOTAL_TAGS))
        .collect()
}

/// Columns normalized with the thousands-suffix rule.
pub const POPULARITY_COLUMNS: [&str; 3] = [STAR, FORK, WATCH];

/// Columns normalized tolerantly; any of these may hold nulls.
pub const CONTRIBUTION_COLUMNS: [&str; 4] = [ISSUES, PULL_REQUESTS, COMMITS, CONTRIBUTORS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributor_typo_is_corrected_by_the_rename() {
        let spec = spec_for_source("contributers").unwrap();
        assert_eq!(spec.name, CONTRIBUTORS);
        assert!(spec_for_source("contributors").is_none());
    }

    #[test]
    fn lookup_maps_cover_the_whole_catalog() {
        for spec in SCHEMA {
            assert_eq!(spec_for_source(spec.source).unwrap().name, spec.name);
            assert_eq!(spec_for_name(spec.name).unwrap().source, spec.source);
        }
        assert!(spec_for_name(TOTAL_TAGS).is_none());
    }

    #[test]
    fn normalized_order_ends_with_the_derived_column() {
        let names = normalized_columns();
        assert_eq!(names.len(), SCHEMA.len() + 1);
        assert_eq!(names.first(), Some(&TOPIC));
        assert_eq!(names.last(), Some(&TOTAL_TAGS));
    }
}
