pub mod rules;

use tracing::{debug, error, info};

use crate::error::{CellDefect, InsightsError, NormalizeFailure, Result};
use crate::schema::{self, ColumnSpec, NormalizeRule};
use crate::table::{CellValue, Table};

/// Outcome of a successful normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows: usize,
    /// Cells coerced to null this pass, per tolerant column.
    pub coerced_nulls: Vec<(String, usize)>,
}

/// Rewrites every cataloged column in place according to its rule and
/// derives the tag total column. The row count never changes: tolerant
/// columns coerce bad cells to null, required columns collect defects
/// instead, and a single defect fails the whole pass.
///
/// Cells that are already typed pass through untouched, so running this
/// twice is a no-op.
pub fn normalize(table: &mut Table) -> Result<NormalizeReport> {
    let rows = table.len();
    let mut defects = Vec::new();
    let mut coerced_nulls = Vec::new();

    // Catalog order, rows ascending: the defect list is deterministic.
    for spec in schema::SCHEMA {
        match spec.rule {
            NormalizeRule::Keep => {}
            NormalizeRule::ScaledCount => normalize_scaled(table, spec, &mut defects)?,
            NormalizeRule::TolerantCount => {
                let coerced = normalize_tolerant(table, spec)?;
                if coerced > 0 {
                    debug!(column = spec.name, coerced, "coerced unparseable cells to null");
                }
                coerced_nulls.push((spec.name.to_string(), coerced));
            }
            NormalizeRule::TagList => normalize_tags(table, spec, &mut defects)?,
        }
    }

    if !defects.is_empty() {
        error!(defects = defects.len(), "normalization rejected the dataset");
        return Err(NormalizeFailure { defects }.into());
    }

    let totals: Vec<CellValue> = table
        .tag_column(schema::TOPIC_TAGS)?
        .iter()
        .map(|tags| CellValue::Int(tags.len() as i64))
        .collect();
    table.insert_column(schema::TOTAL_TAGS, totals)?;

    debug_assert_eq!(table.len(), rows);
    info!(rows, "normalization complete");
    Ok(NormalizeReport { rows, coerced_nulls })
}

fn column_mut<'t>(table: &'t mut Table, spec: &ColumnSpec) -> Result<&'t mut Vec<CellValue>> {
    table
        .column_mut(spec.name)
        .ok_or_else(|| InsightsError::MissingColumn(spec.name.to_string()))
}

fn normalize_scaled(
    table: &mut Table,
    spec: &ColumnSpec,
    defects: &mut Vec<CellDefect>,
) -> Result<()> {
    for (row, cell) in column_mut(table, spec)?.iter_mut().enumerate() {
        let raw = match cell {
            CellValue::Str(s) => s.as_str(),
            // already normalized
            CellValue::Float(_) | CellValue::Int(_) => continue,
            other => {
                defects.push(defect(spec, row, format!("{other:?}"), "not a count cell"));
                continue;
            }
        };
        match rules::parse_scaled_count(raw) {
            Some(value) => match count_defect(value) {
                None => *cell = CellValue::Float(value),
                Some(reason) => defects.push(defect(spec, row, raw.to_string(), reason)),
            },
            None => defects.push(defect(spec, row, raw.to_string(), "not a number")),
        }
    }
    Ok(())
}

fn normalize_tolerant(table: &mut Table, spec: &ColumnSpec) -> Result<usize> {
    let mut coerced = 0usize;
    for cell in column_mut(table, spec)?.iter_mut() {
        let parsed = match cell {
            CellValue::Str(s) => rules::parse_tolerant_count(s.as_str()),
            _ => continue,
        };
        *cell = match parsed {
            Some(value) => CellValue::Float(value),
            None => {
                coerced += 1;
                CellValue::Null
            }
        };
    }
    Ok(coerced)
}

fn normalize_tags(
    table: &mut Table,
    spec: &ColumnSpec,
    defects: &mut Vec<CellDefect>,
) -> Result<()> {
    for (row, cell) in column_mut(table, spec)?.iter_mut().enumerate() {
        let raw = match cell {
            CellValue::Str(s) => s.as_str(),
            CellValue::Tags(_) => continue,
            other => {
                defects.push(defect(spec, row, format!("{other:?}"), "not a tag cell"));
                continue;
            }
        };
        match rules::decode_tag_list(raw) {
            Ok(tags) => *cell = CellValue::Tags(tags),
            Err(reason) => defects.push(defect(spec, row, raw.to_string(), reason)),
        }
    }
    Ok(())
}

/// Counts must be usable in downstream means, so a parseable but negative
/// or non-finite value is still a defect in a required column.
fn count_defect(value: f64) -> Option<&'static str> {
    if !value.is_finite() {
        Some("non-finite count")
    } else if value < 0.0 {
        Some("negative count")
    } else {
        None
    }
}

fn defect(spec: &ColumnSpec, row: usize, value: String, reason: impl Into<String>) -> CellDefect {
    CellDefect {
        column: spec.name.to_string(),
        row,
        value,
        reason: reason.into(),
    }
}
