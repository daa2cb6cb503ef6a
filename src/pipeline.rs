use polars::prelude::*;
use std::path::Path;

use crate::binning::BinEdges;
use crate::cleaner::{self, ZeroValueReport};
use crate::config::PipelineConfig;
use crate::enricher;
use crate::error::Result;
use crate::loader;

/// The cleaned, enriched table and what the stages measured on the way.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub movies: DataFrame,
    pub loaded_rows: usize,
    pub duplicates_removed: usize,
    pub zero_report: ZeroValueReport,
    pub bins: Vec<BinEdges>,
}

/// Cleaner then enricher over an already loaded table.
pub fn prepare(raw: &DataFrame, config: &PipelineConfig) -> Result<Prepared> {
    config.validate()?;
    let cleaned = cleaner::clean(raw, config)?;
    let enriched = enricher::enrich(&cleaned.table, config)?;
    Ok(Prepared {
        movies: enriched.table,
        loaded_rows: raw.height(),
        duplicates_removed: cleaned.duplicates_removed,
        zero_report: cleaned.zero_report,
        bins: enriched.bins,
    })
}

pub fn prepare_file(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<Prepared> {
    let raw = loader::load_csv(path, config)?;
    prepare(&raw, config)
}
