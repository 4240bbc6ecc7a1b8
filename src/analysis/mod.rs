pub mod contribution;
pub mod ownership;
pub mod popularity;
pub mod stats;
pub mod tags;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::schema::{self, CONTRIBUTION_COLUMNS, POPULARITY_COLUMNS};
use crate::table::Table;

use self::contribution::ContributionCorrelations;
use self::ownership::{OwnerCount, OwnerHolding};
use self::popularity::{PopularityCorrelation, TopRepo, TopicMeanRow};
use self::stats::DescribeStats;
use self::tags::{TagCount, TopicTagTotal};

/// Dataset-level summary: shape, per-column describe, null counts.
#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: usize,
    pub describe: Vec<ColumnSummary>,
    pub null_counts: Vec<NullCount>,
}

#[derive(Debug, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub stats: DescribeStats,
}

#[derive(Debug, Serialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
}

pub fn summarize(table: &Table) -> Result<TableSummary> {
    let mut describe = Vec::new();
    let mut push = |column: &str, values: &[f64]| {
        if let Some(stats) = stats::describe(values) {
            describe.push(ColumnSummary {
                column: column.to_string(),
                stats,
            });
        }
    };

    for name in POPULARITY_COLUMNS {
        push(name, &table.float_column(name)?);
    }
    for name in CONTRIBUTION_COLUMNS {
        let present: Vec<f64> = table
            .optional_float_column(name)?
            .into_iter()
            .flatten()
            .collect();
        push(name, &present);
    }
    let totals: Vec<f64> = table
        .int_column(schema::TOTAL_TAGS)?
        .into_iter()
        .map(|v| v as f64)
        .collect();
    push(schema::TOTAL_TAGS, &totals);

    let null_counts = table
        .names()
        .iter()
        .map(|name| {
            Ok(NullCount {
                column: name.clone(),
                nulls: table.null_count(name)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TableSummary {
        rows: table.len(),
        columns: table.names().len(),
        describe,
        null_counts,
    })
}

/// Knobs for the analyze stage, taken from `[report]` in the config.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub top_repos: usize,
    pub top_tags: usize,
    pub popular_subset: usize,
    pub top_owners: usize,
}

/// Everything the analyze stage computes, ready for reporting.
#[derive(Debug)]
pub struct AnalysisBundle {
    pub summary: TableSummary,
    pub topic_means: Vec<TopicMeanRow>,
    pub top_starred: Vec<TopRepo>,
    pub top_watched: Vec<TopRepo>,
    pub top_forked: Vec<TopRepo>,
    pub popularity_correlation: PopularityCorrelation,
    pub owners: Vec<OwnerCount>,
    pub holdings: Vec<OwnerHolding>,
    pub contributions: ContributionCorrelations,
    pub top_tags: Vec<TagCount>,
    pub tags_by_topic: Vec<TopicTagTotal>,
}

/// Runs every analysis over a normalized table.
pub fn run(table: &Table, options: &AnalysisOptions) -> Result<AnalysisBundle> {
    let owners = ownership::top_owners(table, options.top_owners)?;
    let bundle = AnalysisBundle {
        summary: summarize(table)?,
        topic_means: popularity::topic_means(table)?,
        top_starred: popularity::top_repos(table, schema::STAR, options.top_repos)?,
        top_watched: popularity::top_repos(table, schema::WATCH, options.top_repos)?,
        top_forked: popularity::top_repos(table, schema::FORK, options.top_repos)?,
        popularity_correlation: popularity::popularity_correlation(table)?,
        holdings: ownership::holdings_of(table, &owners)?,
        contributions: contribution::correlations(table, options.popular_subset, &owners)?,
        top_tags: tags::top_tags(table, options.top_tags)?,
        tags_by_topic: tags::tags_by_topic(table)?,
        owners,
    };
    info!(
        topics = bundle.topic_means.len(),
        owners = bundle.owners.len(),
        tags = bundle.top_tags.len(),
        "analysis complete"
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn normalized_table() -> Table {
        let mut table = Table::new();
        let text = |values: &[&str]| {
            values
                .iter()
                .map(|v| CellValue::Str(v.to_string()))
                .collect::<Vec<_>>()
        };
        let floats = |values: &[f64]| {
            values
                .iter()
                .map(|&v| CellValue::Float(v))
                .collect::<Vec<_>>()
        };
        table.insert_column("Topic", text(&["ML", "Web"])).unwrap();
        table
            .insert_column("User_Name", text(&["alice", "bob"]))
            .unwrap();
        table
            .insert_column("Repo_Name", text(&["a", "b"]))
            .unwrap();
        table.insert_column("Star", floats(&[10.0, 20.0])).unwrap();
        table.insert_column("Fork", floats(&[1.0, 2.0])).unwrap();
        table.insert_column("Watch", floats(&[3.0, 4.0])).unwrap();
        table
            .insert_column("Issues", vec![CellValue::Float(5.0), CellValue::Null])
            .unwrap();
        table
            .insert_column("Pull_Requests", floats(&[1.0, 1.0]))
            .unwrap();
        table
            .insert_column(
                "Topic_Tags",
                vec![
                    CellValue::Tags(vec!["python".to_string()]),
                    CellValue::Tags(vec![]),
                ],
            )
            .unwrap();
        table
            .insert_column("Commits", vec![CellValue::Null, CellValue::Null])
            .unwrap();
        table
            .insert_column("Contributors", floats(&[2.0, 3.0]))
            .unwrap();
        table
            .insert_column("Total_Tags", vec![CellValue::Int(1), CellValue::Int(0)])
            .unwrap();
        table
    }

    #[test]
    fn summary_counts_nulls_and_skips_all_null_describes() {
        let summary = summarize(&normalized_table()).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 12);

        let described: Vec<&str> = summary
            .describe
            .iter()
            .map(|c| c.column.as_str())
            .collect();
        // Commits is all null, so it has no describe entry
        assert!(!described.contains(&"Commits"));
        assert!(described.contains(&"Star"));
        assert!(described.contains(&"Issues"));
        assert!(described.contains(&"Total_Tags"));

        let nulls = |name: &str| {
            summary
                .null_counts
                .iter()
                .find(|n| n.column == name)
                .unwrap()
                .nulls
        };
        assert_eq!(nulls("Commits"), 2);
        assert_eq!(nulls("Issues"), 1);
        assert_eq!(nulls("Topic"), 0);
    }

    #[test]
    fn summary_describe_ignores_nulls() {
        let summary = summarize(&normalized_table()).unwrap();
        let issues = summary
            .describe
            .iter()
            .find(|c| c.column == "Issues")
            .unwrap();
        assert_eq!(issues.stats.count, 1);
        assert_eq!(issues.stats.mean, 5.0);
    }

    #[test]
    fn run_produces_a_full_bundle() {
        let options = AnalysisOptions {
            top_repos: 10,
            top_tags: 15,
            popular_subset: 100,
            top_owners: 10,
        };
        let bundle = run(&normalized_table(), &options).unwrap();
        assert_eq!(bundle.summary.rows, 2);
        assert_eq!(bundle.topic_means.len(), 2);
        assert_eq!(bundle.top_starred.len(), 2);
        assert_eq!(bundle.owners.len(), 2);
        assert_eq!(bundle.holdings.len(), 2);
        assert_eq!(bundle.contributions.most_starred.rows_used, 2);
        assert_eq!(bundle.top_tags.len(), 1);
        assert_eq!(bundle.tags_by_topic.len(), 2);
    }
}
