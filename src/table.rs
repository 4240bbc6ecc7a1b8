use std::collections::HashMap;

use crate::error::{InsightsError, Result};

/// One cell of the table. Loading produces only `Str`; normalization
/// rewrites count columns to `Float`/`Null`, tag columns to `Tags`, and the
/// derived total column to `Int`. A cell that is already typed passes
/// through its normalization rule untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Str(String),
    Float(f64),
    Int(i64),
    Tags(Vec<String>),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell, covering both float and integer cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&[String]> {
        match self {
            CellValue::Tags(tags) => Some(tags),
            _ => None,
        }
    }
}

/// Column-major table with a stable column order. All columns always hold
/// exactly one cell per row; the row count never changes after load.
#[derive(Debug, Clone, Default)]
pub struct Table {
    names: Vec<String>,
    columns: HashMap<String, Vec<CellValue>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.names
            .first()
            .and_then(|name| self.columns.get(name))
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<CellValue>> {
        self.columns.get_mut(name)
    }

    /// Adds a column, or replaces its cells if the name is already present.
    /// Every column must match the table's row count.
    pub fn insert_column(&mut self, name: impl Into<String>, cells: Vec<CellValue>) -> Result<()> {
        let name = name.into();
        if !self.names.is_empty() && cells.len() != self.len() {
            return Err(InsightsError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: cells.len(),
            });
        }
        if !self.columns.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.columns.insert(name, cells);
        Ok(())
    }

    fn require(&self, name: &str) -> Result<&[CellValue]> {
        self.column(name)
            .ok_or_else(|| InsightsError::MissingColumn(name.to_string()))
    }

    /// Extracts a never-null numeric column. Any other cell kind is a type
    /// error, so callers downstream of normalization can rely on plain `f64`.
    pub fn float_column(&self, name: &str) -> Result<Vec<f64>> {
        self.require(name)?
            .iter()
            .map(|cell| {
                cell.as_f64().ok_or_else(|| InsightsError::ColumnType {
                    column: name.to_string(),
                    expected: "numeric",
                })
            })
            .collect()
    }

    /// Extracts a numeric column that may hold nulls.
    pub fn optional_float_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        self.require(name)?
            .iter()
            .map(|cell| match cell {
                CellValue::Null => Ok(None),
                other => other
                    .as_f64()
                    .map(Some)
                    .ok_or_else(|| InsightsError::ColumnType {
                        column: name.to_string(),
                        expected: "numeric or null",
                    }),
            })
            .collect()
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<&str>> {
        self.require(name)?
            .iter()
            .map(|cell| {
                cell.as_str().ok_or_else(|| InsightsError::ColumnType {
                    column: name.to_string(),
                    expected: "text",
                })
            })
            .collect()
    }

    pub fn tag_column(&self, name: &str) -> Result<Vec<&[String]>> {
        self.require(name)?
            .iter()
            .map(|cell| {
                cell.as_tags().ok_or_else(|| InsightsError::ColumnType {
                    column: name.to_string(),
                    expected: "a tag list",
                })
            })
            .collect()
    }

    pub fn int_column(&self, name: &str) -> Result<Vec<i64>> {
        self.require(name)?
            .iter()
            .map(|cell| match cell {
                CellValue::Int(v) => Ok(*v),
                _ => Err(InsightsError::ColumnType {
                    column: name.to_string(),
                    expected: "integer",
                }),
            })
            .collect()
    }

    pub fn null_count(&self, name: &str) -> Result<usize> {
        Ok(self.require(name)?.iter().filter(|c| c.is_null()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| CellValue::Str(v.to_string()))
            .collect()
    }

    #[test]
    fn insert_column_keeps_order_and_replaces_in_place() {
        let mut table = Table::new();
        table.insert_column("a", text(&["1", "2"])).unwrap();
        table.insert_column("b", text(&["x", "y"])).unwrap();
        table
            .insert_column("a", vec![CellValue::Int(1), CellValue::Int(2)])
            .unwrap();
        assert_eq!(table.names(), &["a", "b"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.int_column("a").unwrap(), vec![1, 2]);
    }

    #[test]
    fn insert_column_rejects_ragged_lengths() {
        let mut table = Table::new();
        table.insert_column("a", text(&["1", "2"])).unwrap();
        let err = table.insert_column("b", text(&["only one"])).unwrap_err();
        assert!(matches!(
            err,
            InsightsError::LengthMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn float_column_accepts_ints_and_rejects_nulls() {
        let mut table = Table::new();
        table
            .insert_column("n", vec![CellValue::Float(1.5), CellValue::Int(2)])
            .unwrap();
        assert_eq!(table.float_column("n").unwrap(), vec![1.5, 2.0]);

        table
            .insert_column("m", vec![CellValue::Float(1.0), CellValue::Null])
            .unwrap();
        assert!(matches!(
            table.float_column("m").unwrap_err(),
            InsightsError::ColumnType { .. }
        ));
        assert_eq!(
            table.optional_float_column("m").unwrap(),
            vec![Some(1.0), None]
        );
    }

    #[test]
    fn missing_column_is_its_own_error() {
        let table = Table::new();
        assert!(matches!(
            table.text_column("nope").unwrap_err(),
            InsightsError::MissingColumn(name) if name == "nope"
        ));
    }

    #[test]
    fn null_count_counts_only_nulls() {
        let mut table = Table::new();
        table
            .insert_column(
                "n",
                vec![CellValue::Null, CellValue::Float(1.0), CellValue::Null],
            )
            .unwrap();
        assert_eq!(table.null_count("n").unwrap(), 2);
    }
}
