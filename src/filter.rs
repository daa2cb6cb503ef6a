use polars::prelude::*;

use crate::error::AnalysisResult;
use crate::multivalue;
use crate::table;

/// Rows where every `(column, value)` pair matches, in table order. No
/// predicates keeps every row; no match yields an empty table.
pub fn filter_eq(df: &DataFrame, predicates: &[(&str, &str)]) -> AnalysisResult<DataFrame> {
    let names: Vec<&str> = predicates.iter().map(|(c, _)| *c).collect();
    table::require_query_columns(df, &names)?;

    let predicate = predicates
        .iter()
        .map(|(c, v)| col(*c).eq(lit(*v)))
        .reduce(|acc, e| acc.and(e));

    match predicate {
        Some(predicate) => Ok(df.clone().lazy().filter(predicate).collect()?),
        None => Ok(df.clone()),
    }
}

/// Rows whose pipe-delimited `column` lists `component`, in table order.
pub fn with_component(df: &DataFrame, column: &str, component: &str) -> AnalysisResult<DataFrame> {
    table::require_query_columns(df, &[column])?;
    let positions: Vec<IdxSize> = table::texts(df, column)?
        .into_iter()
        .enumerate()
        .filter_map(|(row, value)| {
            let value = value?;
            multivalue::components(value)
                .contains(&component)
                .then_some(row as IdxSize)
        })
        .collect();
    Ok(table::take_rows(df, positions)?)
}
