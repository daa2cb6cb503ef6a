use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

use crate::binning::{self, BinEdges};
use crate::columns::*;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::table;

#[derive(Debug, Clone)]
pub struct Enriched {
    pub table: DataFrame,
    /// Rating, vote count, runtime and budget classifications, in that order.
    pub bins: Vec<BinEdges>,
}

/// Budget classes are cut on raw-unit budgets, before the table is
/// rescaled to millions.
pub fn enrich(df: &DataFrame, config: &PipelineConfig) -> Result<Enriched> {
    let start = Instant::now();
    table::require_columns(
        df,
        &[ORIGINAL_TITLE, BUDGET, REVENUE, RUNTIME, VOTE_AVERAGE, VOTE_COUNT],
        "enrichment",
    )?;

    let mut df = df.clone();
    df.rename(ORIGINAL_TITLE, TITLE.into())?;
    let df = add_profit(&df)?;

    let bins = config.quantile_bins;
    let rating = BinEdges::new(
        VOTE_AVERAGE,
        &RATING_LABELS,
        binning::quantile_edges(&df, VOTE_AVERAGE, bins)?,
    )?;
    let votes = BinEdges::new(
        VOTE_COUNT,
        &VOTE_COUNT_LABELS,
        binning::quantile_edges(&df, VOTE_COUNT, bins)?,
    )?;
    let runtime = BinEdges::new(
        RUNTIME,
        &RUNTIME_LABELS,
        binning::fixed_edges(&df, RUNTIME, &config.runtime_breakpoints)?,
    )?;
    let budget = BinEdges::new(
        BUDGET,
        &BUDGET_LABELS,
        binning::quantile_edges(&df, BUDGET, bins)?,
    )?;

    let df = binning::classify(&df, &rating, RATING_CLASS)?;
    let df = binning::classify(&df, &votes, VOTE_COUNT_CLASS)?;
    let df = binning::classify(&df, &runtime, RUNTIME_CLASS)?;
    let df = binning::classify(&df, &budget, BUDGET_CLASS)?;
    for b in [&rating, &votes, &runtime, &budget] {
        debug!(column = %b.column, edges = ?b.edges, "classified");
    }

    let df = rescale(&df, &[BUDGET, REVENUE, PROFIT], config.money_divisor)?;
    let df = reorder(&df)?;

    info!(rows = df.height(), elapsed = ?start.elapsed(), "enrichment done");
    Ok(Enriched {
        table: df,
        bins: vec![rating, votes, runtime, budget],
    })
}

/// profit = revenue - budget, in the units of the source columns.
pub fn add_profit(df: &DataFrame) -> Result<DataFrame> {
    let revenue = table::ints(df, REVENUE)?;
    let budget = table::ints(df, BUDGET)?;
    let profit: Vec<Option<i64>> = revenue
        .into_iter()
        .zip(budget.into_iter())
        .map(|(r, b)| Some(r? - b?))
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new(PROFIT.into(), profit))?;
    Ok(out)
}

/// Divides each of `names` by `divisor`, producing Float64 columns.
pub fn rescale(df: &DataFrame, names: &[&str], divisor: f64) -> Result<DataFrame> {
    table::require_columns(df, names, "rescaling")?;
    let mut out = df.clone();
    for name in names {
        let scaled: Vec<Option<f64>> = table::floats(df, name)?
            .into_iter()
            .map(|v| v.map(|v| v / divisor))
            .collect();
        out.with_column(Series::new((*name).into(), scaled))?;
    }
    Ok(out)
}

pub fn reorder(df: &DataFrame) -> Result<DataFrame> {
    table::require_columns(df, &FINAL_ORDER, "final column order")?;
    Ok(df.select(FINAL_ORDER)?)
}

#[cfg(test)]
mod test_enricher {
    use super::*;

    #[test]
    fn test_profit_and_rescale() -> Result<()> {
        let df = df!(
            "revenue" => [3_000_000i64, 1_500_000],
            "budget" => [1_000_000i64, 2_000_000]
        )?;
        let df = add_profit(&df)?;
        let raw: Vec<Option<i64>> = df.column("profit")?.i64()?.into_iter().collect();
        assert_eq!(raw, vec![Some(2_000_000), Some(-500_000)]);

        let df = rescale(&df, &["revenue", "budget", "profit"], 1_000_000.0)?;
        let revenue = df.column("revenue")?.f64()?;
        let budget = df.column("budget")?.f64()?;
        let profit = df.column("profit")?.f64()?;
        for i in 0..df.height() {
            let expected = revenue.get(i).unwrap() - budget.get(i).unwrap();
            assert!((profit.get(i).unwrap() - expected).abs() < 1e-9);
        }
        assert_eq!(profit.get(1), Some(-0.5));
        Ok(())
    }

    #[test]
    fn test_reorder_requires_all_columns() -> Result<()> {
        let df = df!("id" => [1i64])?;
        assert!(matches!(
            reorder(&df),
            Err(crate::error::PipelineError::Schema { .. })
        ));
        Ok(())
    }
}
