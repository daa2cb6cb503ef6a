use polars::prelude::*;

use crate::error::{AnalysisError, AnalysisResult, PipelineError, Result};

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn require_columns(df: &DataFrame, names: &[&str], context: &str) -> Result<()> {
    match names.iter().find(|name| !has_column(df, name)) {
        Some(missing) => Err(PipelineError::Schema {
            column: missing.to_string(),
            context: context.to_string(),
        }),
        None => Ok(()),
    }
}

pub fn require_query_columns(df: &DataFrame, names: &[&str]) -> AnalysisResult<()> {
    match names.iter().find(|name| !has_column(df, name)) {
        Some(missing) => Err(AnalysisError::Schema(missing.to_string())),
        None => Ok(()),
    }
}

/// Any numeric column viewed as f64.
pub fn floats(df: &DataFrame, name: &str) -> PolarsResult<Float64Chunked> {
    Ok(df.column(name)?.cast(&DataType::Float64)?.f64()?.clone())
}

/// Any integer-like column viewed as i64.
pub fn ints(df: &DataFrame, name: &str) -> PolarsResult<Int64Chunked> {
    Ok(df.column(name)?.cast(&DataType::Int64)?.i64()?.clone())
}

/// Any column rendered as text; nulls stay null.
pub fn texts(df: &DataFrame, name: &str) -> PolarsResult<StringChunked> {
    Ok(df.column(name)?.cast(&DataType::String)?.str()?.clone())
}

/// Rows at `positions`, renumbered from 0.
pub fn take_rows(df: &DataFrame, positions: Vec<IdxSize>) -> PolarsResult<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), positions);
    df.take(&idx)
}
