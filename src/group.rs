use polars::prelude::*;
use rustc_hash::FxHashMap as HashMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::columns;
use crate::error::AnalysisResult;
use crate::table;

/// One component of a group key. Classification labels order by label
/// rank, integers numerically, other text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Int(i64),
    Label { rank: usize, label: String },
    Text(String),
}

impl KeyPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyPart::Int(_) => None,
            KeyPart::Label { label, .. } => Some(label),
            KeyPart::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Int(v) => write!(f, "{v}"),
            KeyPart::Label { label, .. } => f.write_str(label),
            KeyPart::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for KeyPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyPart::Int(v) => serializer.serialize_i64(*v),
            KeyPart::Label { label, .. } => serializer.serialize_str(label),
            KeyPart::Text(text) => serializer.serialize_str(text),
        }
    }
}

pub type GroupKey = Vec<KeyPart>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouped<T> {
    pub key: GroupKey,
    pub value: T,
}

impl<T> Grouped<T> {
    pub fn label(&self) -> String {
        self.key
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

fn key_parts(df: &DataFrame, column: &str) -> AnalysisResult<Vec<Option<KeyPart>>> {
    if df.column(column)?.dtype().is_integer() {
        return Ok(table::ints(df, column)?
            .into_iter()
            .map(|v| v.map(KeyPart::Int))
            .collect());
    }
    Ok(table::texts(df, column)?
        .into_iter()
        .map(|v| {
            v.map(|s| match columns::label_rank(column, s) {
                Some(rank) => KeyPart::Label {
                    rank,
                    label: s.to_string(),
                },
                None => KeyPart::Text(s.to_string()),
            })
        })
        .collect())
}

/// Group key of every row; `None` when any key column is null there.
fn row_keys(df: &DataFrame, keys: &[&str]) -> AnalysisResult<Vec<Option<GroupKey>>> {
    table::require_query_columns(df, keys)?;
    let parts: Vec<Vec<Option<KeyPart>>> = keys
        .iter()
        .map(|k| key_parts(df, k))
        .collect::<AnalysisResult<_>>()?;
    Ok((0..df.height())
        .map(|row| parts.iter().map(|p| p[row].clone()).collect())
        .collect())
}

/// Rows per group, ordered by key.
pub fn group_count(df: &DataFrame, keys: &[&str]) -> AnalysisResult<Vec<Grouped<usize>>> {
    let mut counts: HashMap<GroupKey, usize> = HashMap::default();
    for key in row_keys(df, keys)?.into_iter().flatten() {
        *counts.entry(key).or_default() += 1;
    }
    let mut out: Vec<Grouped<usize>> = counts
        .into_iter()
        .map(|(key, value)| Grouped { key, value })
        .collect();
    out.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(out)
}

/// Mean of each of `values` per group, ordered by key. A mean is `None`
/// when the group holds no non-null value of that column.
pub fn group_means(
    df: &DataFrame,
    keys: &[&str],
    values: &[&str],
) -> AnalysisResult<Vec<Grouped<Vec<Option<f64>>>>> {
    table::require_query_columns(df, values)?;
    let columns: Vec<Float64Chunked> = values
        .iter()
        .map(|v| table::floats(df, v))
        .collect::<PolarsResult<_>>()?;

    let mut acc: HashMap<GroupKey, Vec<(f64, usize)>> = HashMap::default();
    for (row, key) in row_keys(df, keys)?.into_iter().enumerate() {
        let Some(key) = key else { continue };
        let sums = acc.entry(key).or_insert_with(|| vec![(0.0, 0); columns.len()]);
        for (sum, column) in sums.iter_mut().zip(columns.iter()) {
            if let Some(v) = column.get(row) {
                sum.0 += v;
                sum.1 += 1;
            }
        }
    }

    let mut out: Vec<Grouped<Vec<Option<f64>>>> = acc
        .into_iter()
        .map(|(key, sums)| Grouped {
            key,
            value: sums
                .into_iter()
                .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                .collect(),
        })
        .collect();
    out.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(out)
}

/// Mean of `value` per group, ordered by key; groups without a value are
/// left out.
pub fn group_mean(df: &DataFrame, keys: &[&str], value: &str) -> AnalysisResult<Vec<Grouped<f64>>> {
    Ok(group_means(df, keys, &[value])?
        .into_iter()
        .filter_map(|g| {
            let mean = g.value.first().copied().flatten()?;
            Some(Grouped {
                key: g.key,
                value: mean,
            })
        })
        .collect())
}

/// Stable sort by value, largest first.
pub fn sort_desc(groups: &mut [Grouped<f64>]) {
    groups.sort_by(|a, b| b.value.total_cmp(&a.value));
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Count {
    pub value: String,
    pub count: usize,
}

/// Occurrences of each distinct value of a text column, most frequent first;
/// ties keep the order of first appearance.
pub fn value_counts(df: &DataFrame, column: &str) -> AnalysisResult<Vec<Count>> {
    table::require_query_columns(df, &[column])?;
    let values = table::texts(df, column)?;
    let mut seen: HashMap<&str, (usize, usize)> = HashMap::default();
    for (row, value) in values.into_iter().enumerate() {
        let Some(value) = value else { continue };
        seen.entry(value).or_insert((row, 0)).1 += 1;
    }
    let mut counts: Vec<(&str, (usize, usize))> = seen.into_iter().collect();
    counts.sort_by(|a, b| b.1.1.cmp(&a.1.1).then(a.1.0.cmp(&b.1.0)));
    Ok(counts
        .into_iter()
        .map(|(value, (_, count))| Count {
            value: value.to_string(),
            count,
        })
        .collect())
}

/// Counts over two key columns. Classification columns contribute their
/// full label set, so empty cells appear as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_column: String,
    pub column_column: String,
    pub rows: Vec<KeyPart>,
    pub columns: Vec<KeyPart>,
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> Option<usize> {
        let r = self.rows.iter().position(|k| k.to_string() == row)?;
        let c = self.columns.iter().position(|k| k.to_string() == column)?;
        Some(self.counts[r][c])
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

fn levels(column: &str, observed: impl Iterator<Item = KeyPart>) -> Vec<KeyPart> {
    let mut levels: Vec<KeyPart> = match columns::labels_of(column) {
        Some(labels) => labels
            .iter()
            .enumerate()
            .map(|(rank, label)| KeyPart::Label {
                rank,
                label: label.to_string(),
            })
            .collect(),
        None => Vec::new(),
    };
    for part in observed {
        if !levels.contains(&part) {
            levels.push(part);
        }
    }
    levels.sort();
    levels
}

pub fn crosstab(df: &DataFrame, row: &str, column: &str) -> AnalysisResult<CrossTab> {
    let counts = group_count(df, &[row, column])?;
    let rows = levels(row, counts.iter().map(|g| g.key[0].clone()));
    let cols = levels(column, counts.iter().map(|g| g.key[1].clone()));

    let mut grid = vec![vec![0; cols.len()]; rows.len()];
    for g in &counts {
        let r = rows.iter().position(|k| *k == g.key[0]);
        let c = cols.iter().position(|k| *k == g.key[1]);
        if let (Some(r), Some(c)) = (r, c) {
            grid[r][c] = g.value;
        }
    }

    Ok(CrossTab {
        row_column: row.to_string(),
        column_column: column.to_string(),
        rows,
        columns: cols,
        counts: grid,
    })
}
