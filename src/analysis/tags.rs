use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::Result;
use crate::schema::{TOPIC, TOPIC_TAGS, TOTAL_TAGS};
use crate::table::Table;

/// One tag with the number of repositories carrying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// The `k` most frequent tags across all repositories. Ties keep the tag
/// that appeared first in the data, so the ranking is reproducible.
pub fn top_tags(table: &Table, k: usize) -> Result<Vec<TagCount>> {
    let tag_lists = table.tag_column(TOPIC_TAGS)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ordered: Vec<(usize, &str)> = Vec::new();
    for tags in &tag_lists {
        for tag in *tags {
            match index.get(tag.as_str()) {
                Some(&slot) => ordered[slot].0 += 1,
                None => {
                    index.insert(tag.as_str(), ordered.len());
                    ordered.push((1, tag.as_str()));
                }
            }
        }
    }

    ordered.sort_by(|a, b| b.0.cmp(&a.0));
    ordered.truncate(k);
    Ok(ordered
        .into_iter()
        .map(|(count, tag)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect())
}

/// Sum of the derived tag totals per topic, largest first; equal sums rank
/// alphabetically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTagTotal {
    pub topic: String,
    pub total_tags: i64,
}

pub fn tags_by_topic(table: &Table) -> Result<Vec<TopicTagTotal>> {
    let topics = table.text_column(TOPIC)?;
    let totals = table.int_column(TOTAL_TAGS)?;

    let mut sums: BTreeMap<&str, i64> = BTreeMap::new();
    for (&topic, &total) in topics.iter().zip(totals.iter()) {
        *sums.entry(topic).or_insert(0) += total;
    }

    let mut out: Vec<TopicTagTotal> = sums
        .into_iter()
        .map(|(topic, total_tags)| TopicTagTotal {
            topic: topic.to_string(),
            total_tags,
        })
        .collect();
    out.sort_by(|a, b| b.total_tags.cmp(&a.total_tags));
    Ok(out)
}
