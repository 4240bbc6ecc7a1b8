use serde::Serialize;

use crate::analysis::ownership::{self, OwnerCount};
use crate::analysis::stats;
use crate::error::Result;
use crate::schema::{CONTRIBUTION_COLUMNS, CONTRIBUTORS, ISSUES, PULL_REQUESTS, STAR};
use crate::table::Table;

/// Pearson matrix over the contribution columns for one row subset.
/// Remaining nulls inside the subset are handled pairwise-complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub rows_used: usize,
    /// Row-major, aligned with `columns`; null where undefined.
    pub matrix: Vec<Vec<Option<f64>>>,
}

/// The three row subsets the analysis reports on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionCorrelations {
    /// Rows where issues, pull requests and contributors are all present.
    /// Commits is deliberately left out of the presence filter; its gaps
    /// are handled pairwise.
    pub complete_rows: CorrelationMatrix,
    /// The most starred rows, no presence filter.
    pub most_starred: CorrelationMatrix,
    /// Rows owned by the busiest owners, no presence filter.
    pub busiest_owners: CorrelationMatrix,
}

pub fn correlations(
    table: &Table,
    popular_subset: usize,
    owners: &[OwnerCount],
) -> Result<ContributionCorrelations> {
    let issues = table.optional_float_column(ISSUES)?;
    let pull_requests = table.optional_float_column(PULL_REQUESTS)?;
    let contributors = table.optional_float_column(CONTRIBUTORS)?;
    let complete: Vec<usize> = (0..table.len())
        .filter(|&row| {
            issues[row].is_some() && pull_requests[row].is_some() && contributors[row].is_some()
        })
        .collect();

    let star = table.float_column(STAR)?;
    let mut most_starred: Vec<usize> = (0..star.len()).collect();
    most_starred.sort_by(|&a, &b| star[b].total_cmp(&star[a]));
    most_starred.truncate(popular_subset);

    let owned = ownership::rows_owned_by(table, owners)?;

    Ok(ContributionCorrelations {
        complete_rows: matrix_for(table, &complete)?,
        most_starred: matrix_for(table, &most_starred)?,
        busiest_owners: matrix_for(table, &owned)?,
    })
}

fn matrix_for(table: &Table, rows: &[usize]) -> Result<CorrelationMatrix> {
    let mut columns_data = Vec::with_capacity(CONTRIBUTION_COLUMNS.len());
    for name in CONTRIBUTION_COLUMNS {
        let full = table.optional_float_column(name)?;
        columns_data.push(rows.iter().map(|&row| full[row]).collect::<Vec<_>>());
    }
    Ok(CorrelationMatrix {
        columns: CONTRIBUTION_COLUMNS.iter().map(|s| s.to_string()).collect(),
        rows_used: rows.len(),
        matrix: stats::correlation_matrix(&columns_data),
    })
}
