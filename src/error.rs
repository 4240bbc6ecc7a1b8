use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Column {column} is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("Column {column} has {actual} cells, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeFailure),
}

pub type Result<T> = std::result::Result<T, InsightsError>;

/// A single cell in a required column that could not be normalized.
/// `row` is zero-based and counts data rows, not file lines.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDefect {
    pub column: String,
    pub row: usize,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for CellDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[row {}] = {:?}: {}",
            self.column, self.row, self.value, self.reason
        )
    }
}

/// Fatal normalization outcome: every offending cell, in column-then-row
/// order, so the same input always produces the same report.
#[derive(Error, Debug)]
pub struct NormalizeFailure {
    pub defects: Vec<CellDefect>,
}

impl NormalizeFailure {
    const DISPLAY_LIMIT: usize = 5;
}

impl fmt::Display for NormalizeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cell(s) in required columns could not be normalized",
            self.defects.len()
        )?;
        for defect in self.defects.iter().take(Self::DISPLAY_LIMIT) {
            write!(f, "\n  {defect}")?;
        }
        if self.defects.len() > Self::DISPLAY_LIMIT {
            write!(
                f,
                "\n  ... and {} more",
                self.defects.len() - Self::DISPLAY_LIMIT
            )?;
        }
        Ok(())
    }
}
