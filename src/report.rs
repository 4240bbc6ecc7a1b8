//! Report artifacts: the normalized dataset as CSV, plus numbers-first
//! JSON documents (with CSV companions for the tabular ones) so results
//! can be compared run to run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::popularity::{TopRepo, TopicMeanRow};
use crate::analysis::tags::TagCount;
use crate::analysis::AnalysisBundle;
use crate::error::{InsightsError, Result};
use crate::pipeline::normalize::rules;
use crate::schema;
use crate::table::{CellValue, Table};

/// Bumped when the artifact layout changes shape.
pub const REPORT_SCHEMA_VERSION: &str = "repo_insights_report_v1";

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactMeta {
    pub tool: &'static str,
    pub tool_version: &'static str,
    pub generated_at: DateTime<Utc>,
}

impl ArtifactMeta {
    fn now() -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME"),
            tool_version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Artifact<T: Serialize> {
    schema_version: &'static str,
    meta: ArtifactMeta,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Serialize)]
struct PopularityPayload<'a> {
    topic_means: &'a [TopicMeanRow],
    top_starred: &'a [TopRepo],
    top_watched: &'a [TopRepo],
    top_forked: &'a [TopRepo],
    correlation: &'a crate::analysis::popularity::PopularityCorrelation,
}

#[derive(Debug, Serialize)]
struct OwnersPayload<'a> {
    owners: &'a [crate::analysis::ownership::OwnerCount],
    holdings: &'a [crate::analysis::ownership::OwnerHolding],
}

#[derive(Debug, Serialize)]
struct TagsPayload<'a> {
    top_tags: &'a [TagCount],
    tags_by_topic: &'a [crate::analysis::tags::TopicTagTotal],
}

/// Writes every artifact of an analyze run into `out_dir` and returns the
/// paths, normalized dataset first.
pub fn write_all(table: &Table, bundle: &AnalysisBundle, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut paths = Vec::new();

    let normalized = out_dir.join("normalized.csv");
    write_normalized_csv(table, &normalized)?;
    paths.push(normalized);

    paths.push(write_json(
        out_dir.join("summary.json"),
        &bundle.summary,
    )?);
    paths.push(write_json(
        out_dir.join("popularity.json"),
        PopularityPayload {
            topic_means: &bundle.topic_means,
            top_starred: &bundle.top_starred,
            top_watched: &bundle.top_watched,
            top_forked: &bundle.top_forked,
            correlation: &bundle.popularity_correlation,
        },
    )?);
    let topic_means = out_dir.join("topic_means.csv");
    write_topic_means_csv(&bundle.topic_means, &topic_means)?;
    paths.push(topic_means);

    paths.push(write_json(
        out_dir.join("owners.json"),
        OwnersPayload {
            owners: &bundle.owners,
            holdings: &bundle.holdings,
        },
    )?);
    paths.push(write_json(
        out_dir.join("contributions.json"),
        &bundle.contributions,
    )?);
    paths.push(write_json(
        out_dir.join("tags.json"),
        TagsPayload {
            top_tags: &bundle.top_tags,
            tags_by_topic: &bundle.tags_by_topic,
        },
    )?);
    let top_tags = out_dir.join("top_tags.csv");
    write_top_tags_csv(&bundle.top_tags, &top_tags)?;
    paths.push(top_tags);

    Ok(paths)
}

/// Writes the normalized table in canonical column order, with the
/// corrected contributor header and the derived tag total last. Null cells
/// become empty fields; tag cells are re-encoded as list literals.
pub fn write_normalized_csv(table: &Table, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let names = schema::normalized_columns();
    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        columns.push(
            table
                .column(name)
                .ok_or_else(|| InsightsError::MissingColumn(name.to_string()))?,
        );
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&names)?;
    for row in 0..table.len() {
        let record: Vec<String> = columns.iter().map(|cells| render_cell(&cells[row])).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = table.len(), "wrote normalized dataset");
    Ok(())
}

fn write_topic_means_csv(rows: &[TopicMeanRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "topic",
        "star",
        "fork",
        "watch",
        "issues",
        "pull_requests",
        "commits",
        "contributors",
        "total_tags",
    ])?;
    for row in rows {
        writer.write_record(&[
            row.topic.clone(),
            row.star.to_string(),
            row.fork.to_string(),
            row.watch.to_string(),
            render_optional(row.issues),
            render_optional(row.pull_requests),
            render_optional(row.commits),
            render_optional(row.contributors),
            row.total_tags.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), "wrote topic means");
    Ok(())
}

fn write_top_tags_csv(rows: &[TagCount], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["tag", "count"])?;
    for row in rows {
        writer.write_record(&[row.tag.clone(), row.count.to_string()])?;
    }
    writer.flush()?;
    info!(path = %path.display(), "wrote tag counts");
    Ok(())
}

fn write_json<T: Serialize>(path: PathBuf, payload: T) -> Result<PathBuf> {
    let artifact = Artifact {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: ArtifactMeta::now(),
        payload,
    };
    let json = serde_json::to_string_pretty(&artifact)?;
    fs::write(&path, json)?;
    info!(path = %path.display(), "wrote artifact");
    Ok(path)
}

fn render_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Str(s) => s.clone(),
        CellValue::Float(v) => v.to_string(),
        CellValue::Int(v) => v.to_string(),
        CellValue::Tags(tags) => rules::encode_tag_list(tags),
        CellValue::Null => String::new(),
    }
}

fn render_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{self, AnalysisOptions};

    fn normalized_table() -> Table {
        let mut table = Table::new();
        table
            .insert_column("Topic", vec![CellValue::Str("ML".to_string())])
            .unwrap();
        table
            .insert_column("Repo_Name", vec![CellValue::Str("repo-a".to_string())])
            .unwrap();
        table
            .insert_column("User_Name", vec![CellValue::Str("alice".to_string())])
            .unwrap();
        table
            .insert_column("Star", vec![CellValue::Float(310_000.0)])
            .unwrap();
        table
            .insert_column("Fork", vec![CellValue::Float(36_200.0)])
            .unwrap();
        table
            .insert_column("Watch", vec![CellValue::Float(8_400.0)])
            .unwrap();
        table
            .insert_column("Issues", vec![CellValue::Null])
            .unwrap();
        table
            .insert_column("Pull_Requests", vec![CellValue::Float(25.0)])
            .unwrap();
        table
            .insert_column(
                "Topic_Tags",
                vec![CellValue::Tags(vec![
                    "python".to_string(),
                    "ml".to_string(),
                ])],
            )
            .unwrap();
        table
            .insert_column("Commits", vec![CellValue::Float(2189.0)])
            .unwrap();
        table
            .insert_column("Contributors", vec![CellValue::Float(50.0)])
            .unwrap();
        table
            .insert_column("Total_Tags", vec![CellValue::Int(2)])
            .unwrap();
        table
    }

    #[test]
    fn normalized_csv_renders_headers_nulls_and_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normalized.csv");
        write_normalized_csv(&normalized_table(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Topic,Repo_Name,User_Name,Star,Fork,Watch,Issues,Pull_Requests,Topic_Tags,Commits,Contributors,Total_Tags"
        );
        // the null issue count is an empty field, the tag list is quoted
        assert_eq!(
            lines.next().unwrap(),
            "ML,repo-a,alice,310000,36200,8400,,25,\"['python', 'ml']\",2189,50,2"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_artifacts_carry_schema_version_and_meta() {
        let dir = tempfile::tempdir().unwrap();
        #[derive(Serialize)]
        struct Payload {
            answer: u32,
        }
        let path = write_json(dir.path().join("a.json"), Payload { answer: 42 }).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["schema_version"], REPORT_SCHEMA_VERSION);
        assert_eq!(value["meta"]["tool"], "repo_insights");
        assert!(value["meta"]["generated_at"].is_string());
        // flattened payload sits next to the meta fields
        assert_eq!(value["answer"], 42);
    }

    #[test]
    fn write_all_produces_the_expected_artifact_set() {
        let dir = tempfile::tempdir().unwrap();
        let table = normalized_table();
        let options = AnalysisOptions {
            top_repos: 10,
            top_tags: 15,
            popular_subset: 100,
            top_owners: 10,
        };
        let bundle = analysis::run(&table, &options).unwrap();

        let paths = write_all(&table, &bundle, dir.path()).unwrap();
        let names: Vec<&str> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "normalized.csv",
                "summary.json",
                "popularity.json",
                "topic_means.csv",
                "owners.json",
                "contributions.json",
                "tags.json",
                "top_tags.csv",
            ]
        );
        for path in &paths {
            assert!(path.exists(), "missing artifact {}", path.display());
        }

        let popularity: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("popularity.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(popularity["topic_means"][0]["topic"], "ML");
        assert_eq!(popularity["top_starred"][0]["repo_name"], "repo-a");
        // null correlation for a single-row table serializes as JSON null
        assert!(popularity["correlation"]["star_fork"].is_null());
    }
}
