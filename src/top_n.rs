use polars::prelude::*;
use serde::Serialize;

use crate::columns::{BUDGET, REVENUE, TITLE};
use crate::error::AnalysisResult;
use crate::table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Descending,
    Ascending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub title: String,
    pub value: f64,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
}

/// Positions of the first `n` rows ordered by `by`. Equal values keep table
/// order; nulls are never ranked.
pub fn ranked_positions(df: &DataFrame, by: &str, n: usize, order: Order) -> AnalysisResult<Vec<(usize, f64)>> {
    table::require_query_columns(df, &[by])?;
    let mut rows: Vec<(usize, f64)> = table::floats(df, by)?
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| Some((i, v?)))
        .filter(|(_, v)| !v.is_nan())
        .collect();

    match order {
        Order::Descending => rows.sort_by(|a, b| b.1.total_cmp(&a.1)),
        Order::Ascending => rows.sort_by(|a, b| a.1.total_cmp(&b.1)),
    }
    rows.truncate(n);
    Ok(rows)
}

pub fn top_n(df: &DataFrame, by: &str, n: usize, order: Order) -> AnalysisResult<Vec<Ranked>> {
    table::require_query_columns(df, &[TITLE])?;
    let rows = ranked_positions(df, by, n, order)?;
    let titles = table::texts(df, TITLE)?;
    let budget = table::has_column(df, BUDGET)
        .then(|| table::floats(df, BUDGET))
        .transpose()?;
    let revenue = table::has_column(df, REVENUE)
        .then(|| table::floats(df, REVENUE))
        .transpose()?;

    Ok(rows
        .into_iter()
        .map(|(i, value)| Ranked {
            title: titles.get(i).unwrap_or_default().to_string(),
            value,
            budget: budget.as_ref().and_then(|b| b.get(i)),
            revenue: revenue.as_ref().and_then(|r| r.get(i)),
        })
        .collect())
}

/// Same ordering as [`top_n`], returning whole rows.
pub fn top_rows(df: &DataFrame, by: &str, n: usize, order: Order) -> AnalysisResult<DataFrame> {
    let positions = ranked_positions(df, by, n, order)?
        .into_iter()
        .map(|(i, _)| i as IdxSize)
        .collect();
    Ok(table::take_rows(df, positions)?)
}
