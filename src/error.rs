use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Structural failures while loading, cleaning or enriching the table.
/// Any of these aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read {path}: {reason}")]
    DataAccess { path: PathBuf, reason: String },

    #[error("column '{column}' not found ({context})")]
    Schema { column: String, context: String },

    #[error("row {row}: cannot parse '{value}' in column '{column}'")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Failures local to a single query.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("division by zero: {context}")]
    Arithmetic { context: String },

    #[error("column '{0}' not found")]
    Schema(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
