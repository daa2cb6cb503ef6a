use polars::prelude::*;
use serde::Serialize;

use crate::error::AnalysisResult;
use crate::group::{self, Count};
use crate::table;

/// Position of the source record in an exploded table.
pub const SOURCE_ROW: &str = "source_row";

/// Ordered components of a pipe-delimited field such as `genres` or `cast`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MultiValue(Vec<String>);

impl MultiValue {
    pub fn parse(value: &str) -> Self {
        MultiValue(components(value).into_iter().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, component: &str) -> bool {
        self.0.iter().any(|c| c == component)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Splits on `|`. A value without separators, the sentinel included, is a
/// single component.
pub fn components(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for pos in memchr::memchr_iter(b'|', value.as_bytes()) {
        parts.push(&value[start..pos]);
        start = pos + 1;
    }
    parts.push(&value[start..]);
    parts
}

pub fn item_column(column: &str) -> String {
    format!("{column}_item")
}

/// One row per (record, component) pair of `column`. Every column of the
/// source is carried along; the component lands in `<column>_item` and the
/// source position in `source_row`. A null field yields one row with a null
/// component.
pub fn explode(df: &DataFrame, column: &str) -> AnalysisResult<DataFrame> {
    table::require_query_columns(df, &[column])?;
    let values = table::texts(df, column)?;

    let mut positions: Vec<IdxSize> = Vec::with_capacity(values.len());
    let mut items: Vec<Option<&str>> = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        match value {
            Some(value) => {
                for part in components(value) {
                    positions.push(row as IdxSize);
                    items.push(Some(part));
                }
            }
            None => {
                positions.push(row as IdxSize);
                items.push(None);
            }
        }
    }

    let mut out = table::take_rows(df, positions.clone())?;
    out.with_column(Series::new(item_column(column).into(), items))?;
    out.with_column(Series::new(SOURCE_ROW.into(), positions))?;
    Ok(out)
}

/// Component frequencies of `column`, most frequent first.
pub fn component_counts(df: &DataFrame, column: &str) -> AnalysisResult<Vec<Count>> {
    let exploded = explode(df, column)?;
    group::value_counts(&exploded, &item_column(column))
}
