// Data processing pipeline: load, then normalize in place

pub mod loader;
pub mod normalize;

use std::path::Path;

use crate::error::Result;
use crate::table::Table;

use self::normalize::NormalizeReport;

/// Output of the load + normalize stages.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub table: Table,
    pub report: NormalizeReport,
}

/// Loads the raw dataset and normalizes it in one pass. Analysis and
/// reporting are driven by the caller so the normalize-only command can
/// stop here.
pub fn load_and_normalize(input: &Path) -> Result<PipelineOutcome> {
    let mut table = loader::load_csv(input)?;
    let report = normalize::normalize(&mut table)?;
    Ok(PipelineOutcome { table, report })
}
