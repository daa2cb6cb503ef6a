use polars::prelude::*;
use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::group::Grouped;
use crate::table;

/// `part` as a percentage of `whole`.
pub fn percent(part: f64, whole: f64, context: &str) -> AnalysisResult<f64> {
    if whole == 0.0 {
        return Err(AnalysisError::Arithmetic {
            context: context.to_string(),
        });
    }
    Ok(part * 100.0 / whole)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Percentage of each group in the total of `counts`.
pub fn shares(counts: &[Grouped<usize>], context: &str) -> AnalysisResult<Vec<Share>> {
    let total: usize = counts.iter().map(|g| g.value).sum();
    counts
        .iter()
        .map(|g| {
            Ok(Share {
                label: g.label(),
                count: g.value,
                percent: percent(g.value as f64, total as f64, context)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// Min, mean and max of the non-null values of `column`; `None` when there
/// are none.
pub fn summary(df: &DataFrame, column: &str) -> AnalysisResult<Option<Summary>> {
    table::require_query_columns(df, &[column])?;
    let values: Vec<f64> = table::floats(df, column)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Ok(None);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Ok(Some(Summary {
        count: values.len(),
        min,
        mean,
        max,
    }))
}
