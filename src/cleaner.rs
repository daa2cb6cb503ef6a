use ahash::HashSet;
use polars::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::columns::{self, BUDGET, RELEASE_DATE, RELEASE_YEAR, REVENUE, RUNTIME, VOTE_AVERAGE};
use crate::config::PipelineConfig;
use crate::dates;
use crate::error::{PipelineError, Result};
use crate::table;

/// Share of rows carrying the "not recorded" zero, measured before they are
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroValueReport {
    pub rows: usize,
    pub zero_budget: usize,
    pub zero_revenue: usize,
    pub zero_runtime: usize,
    pub zero_runtime_and_budget: usize,
    pub kept: usize,
}

impl ZeroValueReport {
    pub fn budget_pct(&self) -> Option<f64> {
        pct(self.zero_budget, self.rows)
    }

    pub fn revenue_pct(&self) -> Option<f64> {
        pct(self.zero_revenue, self.rows)
    }

    pub fn runtime_pct(&self) -> Option<f64> {
        pct(self.zero_runtime, self.rows)
    }

    /// Relative to the zero-runtime rows, not to the whole table.
    pub fn runtime_and_budget_pct(&self) -> Option<f64> {
        pct(self.zero_runtime_and_budget, self.zero_runtime)
    }

    pub fn dropped(&self) -> usize {
        self.rows - self.kept
    }
}

fn pct(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 * 100.0 / whole as f64)
}

#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: DataFrame,
    pub duplicates_removed: usize,
    pub zero_report: ZeroValueReport,
}

pub fn clean(df: &DataFrame, config: &PipelineConfig) -> Result<Cleaned> {
    let start = Instant::now();

    let drop: Vec<&str> = config.drop_columns.iter().map(String::as_str).collect();
    let df = project(df, &drop)?;

    let before = df.height();
    let df = dedup(&df)?;
    let duplicates_removed = before - df.height();
    info!(duplicates_removed, "removed duplicate rows");

    let df = normalize_numeric(&df)?;
    let df = dates::normalize_dates(&df, RELEASE_DATE, Some(RELEASE_YEAR))?;

    debug!(nulls = ?null_counts(&df), "null counts before imputation");
    let df = impute(&df, &config.sentinel)?;

    let (df, zero_report) = filter_zero(&df)?;
    info!(
        rows = zero_report.rows,
        kept = zero_report.kept,
        zero_budget = zero_report.zero_budget,
        zero_revenue = zero_report.zero_revenue,
        zero_runtime = zero_report.zero_runtime,
        "dropped rows with unrecorded budget, revenue or runtime"
    );

    info!(rows = df.height(), elapsed = ?start.elapsed(), "cleaning done");
    Ok(Cleaned {
        table: df,
        duplicates_removed,
        zero_report,
    })
}

/// Drops `drop`; every name must exist.
pub fn project(df: &DataFrame, drop: &[&str]) -> Result<DataFrame> {
    table::require_columns(df, drop, "drop list")?;
    let mut out = df.clone();
    for name in drop {
        out = out.drop(name)?;
    }
    Ok(out)
}

/// Keeps the first of every group of rows equal across all columns.
pub fn dedup(df: &DataFrame) -> Result<DataFrame> {
    let rendered: Vec<StringChunked> = df
        .get_columns()
        .iter()
        .map(|c| Ok(c.cast(&DataType::String)?.str()?.clone()))
        .collect::<PolarsResult<_>>()?;

    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::default();
    let mut keep: Vec<IdxSize> = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let key: Vec<Option<&str>> = rendered.iter().map(|c| c.get(row)).collect();
        if seen.insert(key) {
            keep.push(row as IdxSize);
        }
    }

    if keep.len() == df.height() {
        return Ok(df.clone());
    }
    Ok(table::take_rows(df, keep)?)
}

/// Casts the integer columns to Int64 and the rating to Float64. A value the
/// cast cannot represent is reported with its row.
pub fn normalize_numeric(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    let targets = columns::INTEGER_COLUMNS
        .iter()
        .map(|c| (*c, DataType::Int64))
        .chain(std::iter::once((VOTE_AVERAGE, DataType::Float64)));

    for (name, dtype) in targets {
        if !table::has_column(df, name) {
            continue;
        }
        let column = df.column(name)?;
        if column.dtype() == &dtype {
            continue;
        }
        let cast = column.cast(&dtype)?;
        let truncated = if dtype == DataType::Int64 && column.dtype().is_float() {
            first_fractional(column)?
        } else {
            None
        };
        if let Some(row) = truncated.or_else(|| first_lost_value(column, &cast)) {
            let value = column.get(row)?.to_string();
            return Err(PipelineError::Parse {
                row,
                column: name.to_string(),
                value,
            });
        }
        out.with_column(cast)?;
    }
    Ok(out)
}

/// First row whose float value has a fractional part an integer cast would drop.
fn first_fractional(column: &Column) -> Result<Option<usize>> {
    Ok(column
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .position(|v| v.is_some_and(|v| v.fract() != 0.0)))
}

fn first_lost_value(before: &Column, after: &Column) -> Option<usize> {
    let before = before.is_null();
    let after = after.is_null();
    before
        .into_iter()
        .zip(after.into_iter())
        .position(|(b, a)| b == Some(false) && a == Some(true))
}

/// Fills nulls of every text column with `sentinel`.
pub fn impute(df: &DataFrame, sentinel: &str) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in df.get_columns() {
        if column.dtype() != &DataType::String || column.null_count() == 0 {
            continue;
        }
        let filled: StringChunked = column
            .str()?
            .into_iter()
            .map(|v| Some(v.unwrap_or(sentinel)))
            .collect();
        out.with_column(filled.with_name(column.name().clone()).into_series())?;
    }
    Ok(out)
}

/// Drops rows whose budget, revenue or runtime is zero or missing. The
/// surviving rows are renumbered from 0.
pub fn filter_zero(df: &DataFrame) -> Result<(DataFrame, ZeroValueReport)> {
    table::require_columns(df, &[BUDGET, REVENUE, RUNTIME], "zero-value filter")?;
    let budget = table::ints(df, BUDGET)?;
    let revenue = table::ints(df, REVENUE)?;
    let runtime = table::ints(df, RUNTIME)?;

    let mut report = ZeroValueReport {
        rows: df.height(),
        zero_budget: 0,
        zero_revenue: 0,
        zero_runtime: 0,
        zero_runtime_and_budget: 0,
        kept: 0,
    };
    let mut keep: Vec<IdxSize> = Vec::with_capacity(df.height());

    for (row, ((b, r), t)) in budget
        .into_iter()
        .zip(revenue.into_iter())
        .zip(runtime.into_iter())
        .enumerate()
    {
        report.zero_budget += (b == Some(0)) as usize;
        report.zero_revenue += (r == Some(0)) as usize;
        report.zero_runtime += (t == Some(0)) as usize;
        report.zero_runtime_and_budget += (t == Some(0) && b == Some(0)) as usize;

        if let (Some(b), Some(r), Some(t)) = (b, r, t) {
            if b > 0 && r > 0 && t > 0 {
                keep.push(row as IdxSize);
            }
        }
    }

    report.kept = keep.len();
    Ok((table::take_rows(df, keep)?, report))
}

/// Nulls per column, in column order.
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

#[cfg(test)]
mod test_cleaner {
    use super::*;

    fn sample() -> PolarsResult<DataFrame> {
        df!(
            "id" => [1i64, 2, 2, 3, 4],
            "title" => ["A", "B", "B", "C", "D"],
            "director" => [Some("X"), Some("Y"), Some("Y"), None, Some("Z")],
            "budget" => [10i64, 20, 20, 0, 40],
            "revenue" => [15i64, 10, 10, 30, 0],
            "runtime" => [90i64, 100, 100, 80, 120]
        )
    }

    #[test]
    fn test_project_unknown_column() -> Result<()> {
        let df = sample()?;
        let out = project(&df, &["director"])?;
        assert!(!table::has_column(&out, "director"));
        assert!(matches!(
            project(&df, &["homepage"]),
            Err(PipelineError::Schema { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_dedup_keeps_first_and_is_idempotent() -> Result<()> {
        let df = sample()?;
        let once = dedup(&df)?;
        assert_eq!(once.height(), 4);
        let ids: Vec<Option<i64>> = once.column("id")?.i64()?.into_iter().collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4)]);
        let twice = dedup(&once)?;
        assert!(twice.equals_missing(&once));
        Ok(())
    }

    #[test]
    fn test_dedup_null_differs_from_text() -> Result<()> {
        let df = df!("a" => [Some("null"), None, None])?;
        assert_eq!(dedup(&df)?.height(), 2);
        Ok(())
    }

    #[test]
    fn test_impute_text_only() -> Result<()> {
        let df = df!(
            "director" => [Some("X"), None],
            "budget" => [Some(1i64), None]
        )?;
        let out = impute(&df, "Unknown")?;
        let directors: Vec<Option<&str>> = out.column("director")?.str()?.into_iter().collect();
        assert_eq!(directors, vec![Some("X"), Some("Unknown")]);
        assert_eq!(out.column("budget")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_filter_zero() -> Result<()> {
        let df = sample()?;
        let (out, report) = filter_zero(&df)?;
        let ids: Vec<Option<i64>> = out.column("id")?.i64()?.into_iter().collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(2)]);
        assert_eq!(report.zero_budget, 1);
        assert_eq!(report.zero_revenue, 1);
        assert_eq!(report.zero_runtime, 0);
        assert_eq!(report.dropped(), 2);
        assert_eq!(report.budget_pct(), Some(20.0));
        assert_eq!(report.runtime_and_budget_pct(), None);
        Ok(())
    }

    #[test]
    fn test_filter_zero_drops_missing() -> Result<()> {
        let df = df!(
            "budget" => [Some(5i64), None],
            "revenue" => [Some(6i64), Some(7)],
            "runtime" => [Some(90i64), Some(90)]
        )?;
        let (out, report) = filter_zero(&df)?;
        assert_eq!(out.height(), 1);
        assert_eq!(report.kept, 1);
        Ok(())
    }

    #[test]
    fn test_normalize_numeric() -> Result<()> {
        let df = df!(
            "id" => ["1", "2"],
            "vote_average" => [7i64, 6]
        )?;
        let out = normalize_numeric(&df)?;
        assert_eq!(out.column("id")?.dtype(), &DataType::Int64);
        assert_eq!(out.column("vote_average")?.dtype(), &DataType::Float64);

        let bad = df!("runtime" => ["90", "long"])?;
        match normalize_numeric(&bad) {
            Err(PipelineError::Parse { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "runtime");
            }
            other => panic!("unexpected {other:?}"),
        }

        let whole = df!("budget" => [1.5e7, 2.0e6])?;
        let budgets: Vec<Option<i64>> = normalize_numeric(&whole)?
            .column("budget")?
            .i64()?
            .into_iter()
            .collect();
        assert_eq!(budgets, vec![Some(15_000_000), Some(2_000_000)]);
        Ok(())
    }

    #[test]
    fn test_normalize_numeric_rejects_fractions() -> Result<()> {
        let df = df!(
            "runtime" => [90.0, 100.5],
            "budget" => [1.5e7, 2.75]
        )?;
        match normalize_numeric(&df) {
            Err(PipelineError::Parse { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "runtime");
                assert_eq!(value, "100.5");
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }
}
