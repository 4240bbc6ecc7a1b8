use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::schema::{REPO_NAME, STAR, TOPIC, USER_NAME};
use crate::table::Table;

/// An owner ranked by how many rows of the dataset they account for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerCount {
    pub user_name: String,
    pub repos: usize,
}

/// The `k` owners with the most repositories. Equal counts rank by name so
/// the leaderboard is the same on every run.
pub fn top_owners(table: &Table, k: usize) -> Result<Vec<OwnerCount>> {
    let users = table.text_column(USER_NAME)?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &user in &users {
        *counts.entry(user).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    Ok(ranked
        .into_iter()
        .take(k)
        .map(|(user, repos)| OwnerCount {
            user_name: user.to_string(),
            repos,
        })
        .collect())
}

/// One repository belonging to a ranked owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerHolding {
    pub user_name: String,
    pub topic: String,
    pub repo_name: String,
    pub star: f64,
}

/// Every row owned by one of `owners`, most starred first.
pub fn holdings_of(table: &Table, owners: &[OwnerCount]) -> Result<Vec<OwnerHolding>> {
    let rows = rows_owned_by(table, owners)?;
    let users = table.text_column(USER_NAME)?;
    let topics = table.text_column(TOPIC)?;
    let repos = table.text_column(REPO_NAME)?;
    let star = table.float_column(STAR)?;

    let mut holdings: Vec<OwnerHolding> = rows
        .into_iter()
        .map(|row| OwnerHolding {
            user_name: users[row].to_string(),
            topic: topics[row].to_string(),
            repo_name: repos[row].to_string(),
            star: star[row],
        })
        .collect();
    holdings.sort_by(|a, b| b.star.total_cmp(&a.star));
    Ok(holdings)
}

/// Row indexes owned by any of `owners`, in table order.
pub fn rows_owned_by(table: &Table, owners: &[OwnerCount]) -> Result<Vec<usize>> {
    let users = table.text_column(USER_NAME)?;
    let owner_set: HashSet<&str> = owners.iter().map(|o| o.user_name.as_str()).collect();
    Ok((0..users.len())
        .filter(|&row| owner_set.contains(users[row]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn owned_table() -> Table {
        let mut table = Table::new();
        let text = |values: &[&str]| {
            values
                .iter()
                .map(|v| CellValue::Str(v.to_string()))
                .collect::<Vec<_>>()
        };
        table
            .insert_column(
                TOPIC,
                text(&["ML", "Web", "ML", "Data", "Web", "ML"]),
            )
            .unwrap();
        table
            .insert_column(
                USER_NAME,
                text(&["alice", "bob", "alice", "carol", "bob", "dan"]),
            )
            .unwrap();
        table
            .insert_column(REPO_NAME, text(&["a1", "b1", "a2", "c1", "b2", "d1"]))
            .unwrap();
        table
            .insert_column(
                STAR,
                [5.0, 40.0, 25.0, 10.0, 15.0, 30.0]
                    .iter()
                    .map(|&v| CellValue::Float(v))
                    .collect(),
            )
            .unwrap();
        table
    }

    #[test]
    fn owners_rank_by_count_then_name() {
        let owners = top_owners(&owned_table(), 2).unwrap();
        // alice and bob both own two; alice wins the tie alphabetically
        assert_eq!(
            owners,
            vec![
                OwnerCount {
                    user_name: "alice".to_string(),
                    repos: 2
                },
                OwnerCount {
                    user_name: "bob".to_string(),
                    repos: 2
                },
            ]
        );
    }

    #[test]
    fn holdings_cover_exactly_the_ranked_owners_most_starred_first() {
        let table = owned_table();
        let owners = top_owners(&table, 2).unwrap();
        let holdings = holdings_of(&table, &owners).unwrap();
        let repos: Vec<&str> = holdings.iter().map(|h| h.repo_name.as_str()).collect();
        assert_eq!(repos, vec!["b1", "a2", "b2", "a1"]);
        assert!(holdings.iter().all(|h| h.user_name != "carol"));
    }

    #[test]
    fn owned_rows_keep_table_order() {
        let table = owned_table();
        let owners = top_owners(&table, 2).unwrap();
        assert_eq!(rows_owned_by(&table, &owners).unwrap(), vec![0, 1, 2, 4]);
    }
}
