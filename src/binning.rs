use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table;

/// Edges of a four-way classification of one column. Bin `i` covers
/// `(edges[i], edges[i + 1]]`; the first bin also includes `edges[0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinEdges {
    pub column: String,
    pub labels: Vec<String>,
    pub edges: Vec<f64>,
}

impl BinEdges {
    /// `edges` is empty when the column has no values at all.
    pub fn new(column: &str, labels: &[&str], edges: Vec<f64>) -> Result<Self> {
        if !edges.is_empty() && edges.len() != labels.len() + 1 {
            return Err(PipelineError::Config(format!(
                "{} labels need {} edges, got {}",
                labels.len(),
                labels.len() + 1,
                edges.len()
            )));
        }
        Ok(BinEdges {
            column: column.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            edges,
        })
    }

    pub fn label_of(&self, value: f64) -> Option<&str> {
        assign(value, &self.edges).map(|i| self.labels[i].as_str())
    }
}

/// Linear interpolation between the closest ranks of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// The 0, 1/bins, ..., 1 quantiles of the non-null values of `column`.
pub fn quantile_edges(df: &DataFrame, column: &str, bins: usize) -> Result<Vec<f64>> {
    table::require_columns(df, &[column], "quantile binning")?;
    let mut values: Vec<f64> = table::floats(df, column)?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let step = 1.0 / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .filter_map(|i| quantile(&values, step * i as f64))
        .collect();
    debug!(column, ?edges, "quantile edges");
    Ok(edges)
}

/// Fixed lower edges closed by the column maximum, which must lie above the
/// last breakpoint.
pub fn fixed_edges(df: &DataFrame, column: &str, breakpoints: &[i64]) -> Result<Vec<f64>> {
    table::require_columns(df, &[column], "fixed binning")?;
    let Some(max) = table::floats(df, column)?.max() else {
        return Ok(Vec::new());
    };
    let mut edges: Vec<f64> = breakpoints.iter().map(|b| *b as f64).collect();
    if let Some(&last) = edges.last() {
        if max <= last {
            return Err(PipelineError::Config(format!(
                "max {column} {max} does not exceed the last breakpoint {last}"
            )));
        }
    }
    edges.push(max);
    Ok(edges)
}

/// Index of the bin holding `value`. A value on an inner edge belongs to the
/// lower bin; the lowest edge belongs to the first bin.
pub fn assign(value: f64, edges: &[f64]) -> Option<usize> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    if value.is_nan() || value < first || value > last {
        return None;
    }
    edges[1..].iter().position(|upper| value <= *upper)
}

/// Adds `target` with the label of every value of `bins.column`.
pub fn classify(df: &DataFrame, bins: &BinEdges, target: &str) -> Result<DataFrame> {
    let values = table::floats(df, &bins.column)?;
    let labels: Vec<Option<&str>> = values
        .into_iter()
        .map(|v| v.and_then(|v| bins.label_of(v)))
        .collect();
    let mut out = df.clone();
    out.with_column(Series::new(target.into(), labels))?;
    Ok(out)
}
