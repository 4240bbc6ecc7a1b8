use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{InsightsError, Result};
use crate::schema::{self, RESERVED_INDEX_PREFIX};
use crate::table::{CellValue, Table};

/// Reads the raw dataset into a columnar table of text cells.
///
/// Header handling: autogenerated index columns (reserved prefix) are
/// discarded, the cataloged columns are selected and renamed to their
/// canonical names, anything else is ignored. Canonical headers are accepted
/// in place of the raw ones, so a previously normalized CSV loads too. Every
/// cataloged column must be present. Cell contents are untouched here;
/// typing happens in normalize.
pub fn load_csv(path: &Path) -> Result<Table> {
    info!(path = %path.display(), "loading dataset");
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let table = read_table(&mut reader)?;
    info!(rows = table.len(), columns = table.names().len(), "loaded dataset");
    Ok(table)
}

/// Same as [`load_csv`] but over any reader, for in-memory inputs.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    read_table(&mut reader)
}

fn read_table<R: Read>(reader: &mut csv::Reader<R>) -> Result<Table> {
    let headers = reader.headers()?.clone();

    let mut source_index: HashMap<&str, usize> = HashMap::new();
    let mut dropped_index_columns = 0usize;
    for (idx, header) in headers.iter().enumerate() {
        let name = header.trim();
        if name.starts_with(RESERVED_INDEX_PREFIX) {
            dropped_index_columns += 1;
            continue;
        }
        match schema::spec_for_source(name).or_else(|| schema::spec_for_name(name)) {
            Some(spec) => {
                source_index.insert(spec.source, idx);
            }
            None => debug!(column = name, "ignoring column outside the catalog"),
        }
    }
    if dropped_index_columns > 0 {
        debug!(
            count = dropped_index_columns,
            "discarded autogenerated index columns"
        );
    }

    // Field positions aligned with the catalog order.
    let mut positions = Vec::with_capacity(schema::SCHEMA.len());
    for spec in schema::SCHEMA {
        match source_index.get(spec.source) {
            Some(&idx) => positions.push(idx),
            None => return Err(InsightsError::MissingColumn(spec.source.to_string())),
        }
    }

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); positions.len()];
    for record in reader.records() {
        let record = record?;
        for (slot, &idx) in positions.iter().enumerate() {
            let field = record.get(idx).unwrap_or("");
            columns[slot].push(CellValue::Str(field.to_string()));
        }
    }

    let mut table = Table::new();
    for (spec, cells) in schema::SCHEMA.iter().zip(columns) {
        table.insert_column(spec.name, cells)?;
    }
    Ok(table)
}
