use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::stats;
use crate::error::Result;
use crate::schema::{
    COMMITS, CONTRIBUTORS, FORK, ISSUES, PULL_REQUESTS, REPO_NAME, STAR, TOPIC, TOTAL_TAGS,
    USER_NAME, WATCH,
};
use crate::table::Table;

/// Per-topic means over every numeric column. Tolerant columns ignore null
/// cells within the group and stay null when the whole group is null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMeanRow {
    pub topic: String,
    pub star: f64,
    pub fork: f64,
    pub watch: f64,
    pub issues: Option<f64>,
    pub pull_requests: Option<f64>,
    pub commits: Option<f64>,
    pub contributors: Option<f64>,
    pub total_tags: f64,
}

/// Groups by topic and averages, sorted by mean stars descending; equal
/// means keep topics in alphabetical order.
pub fn topic_means(table: &Table) -> Result<Vec<TopicMeanRow>> {
    let topics = table.text_column(TOPIC)?;
    let star = table.float_column(STAR)?;
    let fork = table.float_column(FORK)?;
    let watch = table.float_column(WATCH)?;
    let issues = table.optional_float_column(ISSUES)?;
    let pull_requests = table.optional_float_column(PULL_REQUESTS)?;
    let commits = table.optional_float_column(COMMITS)?;
    let contributors = table.optional_float_column(CONTRIBUTORS)?;
    let total_tags: Vec<f64> = table
        .int_column(TOTAL_TAGS)?
        .into_iter()
        .map(|v| v as f64)
        .collect();

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, &topic) in topics.iter().enumerate() {
        groups.entry(topic).or_default().push(row);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (topic, rows) in groups {
        let gather = |column: &[f64]| rows.iter().map(|&r| column[r]).collect::<Vec<f64>>();
        let gather_present = |column: &[Option<f64>]| {
            rows.iter()
                .map(|&r| column[r])
                .collect::<Vec<Option<f64>>>()
        };
        // groups hold at least one row, so the required means always exist
        let mean_of = |column: &[f64]| stats::mean(&gather(column)).unwrap_or_default();
        out.push(TopicMeanRow {
            topic: topic.to_string(),
            star: mean_of(&star),
            fork: mean_of(&fork),
            watch: mean_of(&watch),
            issues: stats::mean_present(&gather_present(&issues)),
            pull_requests: stats::mean_present(&gather_present(&pull_requests)),
            commits: stats::mean_present(&gather_present(&commits)),
            contributors: stats::mean_present(&gather_present(&contributors)),
            total_tags: mean_of(&total_tags),
        });
    }
    out.sort_by(|a, b| b.star.total_cmp(&a.star));
    Ok(out)
}

/// One leaderboard entry. `value` is the ranked column's cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRepo {
    pub rank: usize,
    pub user_name: String,
    pub repo_name: String,
    pub topic: String,
    pub value: f64,
}

/// The `k` highest rows by `column`; ties keep earlier rows first.
pub fn top_repos(table: &Table, column: &str, k: usize) -> Result<Vec<TopRepo>> {
    let values = table.float_column(column)?;
    let users = table.text_column(USER_NAME)?;
    let repos = table.text_column(REPO_NAME)?;
    let topics = table.text_column(TOPIC)?;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    Ok(order
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, row)| TopRepo {
            rank: i + 1,
            user_name: users[row].to_string(),
            repo_name: repos[row].to_string(),
            topic: topics[row].to_string(),
            value: values[row],
        })
        .collect())
}

/// Pairwise correlation between the three popularity signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularityCorrelation {
    pub star_fork: Option<f64>,
    pub star_watch: Option<f64>,
    pub fork_watch: Option<f64>,
}

pub fn popularity_correlation(table: &Table) -> Result<PopularityCorrelation> {
    let star: Vec<Option<f64>> = table.float_column(STAR)?.into_iter().map(Some).collect();
    let fork: Vec<Option<f64>> = table.float_column(FORK)?.into_iter().map(Some).collect();
    let watch: Vec<Option<f64>> = table.float_column(WATCH)?.into_iter().map(Some).collect();
    Ok(PopularityCorrelation {
        star_fork: stats::pearson(&star, &fork),
        star_watch: stats::pearson(&star, &watch),
        fork_watch: stats::pearson(&fork, &watch),
    })
}
