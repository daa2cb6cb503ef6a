use polars::prelude::*;
use serde::Serialize;

use crate::error::AnalysisResult;
use crate::group::Grouped;
use crate::table;

/// Paired observations for a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedSeries {
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PairedSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// `x` against `y` row by row; rows missing either side are skipped.
pub fn paired(df: &DataFrame, x: &str, y: &str) -> AnalysisResult<PairedSeries> {
    table::require_query_columns(df, &[x, y])?;
    let xs = table::floats(df, x)?;
    let ys = table::floats(df, y)?;
    let mut series = PairedSeries {
        x_label: x.to_string(),
        y_label: y.to_string(),
        labels: Vec::new(),
        x: Vec::new(),
        y: Vec::new(),
    };
    for (row, (a, b)) in xs.into_iter().zip(ys.into_iter()).enumerate() {
        if let (Some(a), Some(b)) = (a, b) {
            series.labels.push(row.to_string());
            series.x.push(a);
            series.y.push(b);
        }
    }
    Ok(series)
}

/// Two of the per-group means of a `group_means` result, one point per group.
pub fn paired_groups(
    groups: &[Grouped<Vec<Option<f64>>>],
    x: (usize, &str),
    y: (usize, &str),
) -> PairedSeries {
    let mut series = PairedSeries {
        x_label: x.1.to_string(),
        y_label: y.1.to_string(),
        labels: Vec::new(),
        x: Vec::new(),
        y: Vec::new(),
    };
    for g in groups {
        let a = g.value.get(x.0).copied().flatten();
        let b = g.value.get(y.0).copied().flatten();
        if let (Some(a), Some(b)) = (a, b) {
            series.labels.push(g.label());
            series.x.push(a);
            series.y.push(b);
        }
    }
    series
}

/// Pearson's r; undefined below two points or without variance.
pub fn pearson(series: &PairedSeries) -> Option<f64> {
    let n = series.len();
    if n < 2 {
        return None;
    }
    let mean_x = series.x.iter().sum::<f64>() / n as f64;
    let mean_y = series.y.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in series.x.iter().zip(series.y.iter()) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod test_correlation {
    use super::*;
    use crate::group::group_means;

    #[test]
    fn test_paired_skips_missing() -> AnalysisResult<()> {
        let df = df!(
            "budget" => [Some(1.0), Some(2.0), None, Some(4.0)],
            "revenue" => [Some(2.0), Some(4.0), Some(5.0), Some(8.0)]
        )?;
        let series = paired(&df, "budget", "revenue")?;
        assert_eq!(series.x, vec![1.0, 2.0, 4.0]);
        assert_eq!(series.y, vec![2.0, 4.0, 8.0]);
        let r = pearson(&series).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_pearson_undefined() {
        let flat = PairedSeries {
            x_label: "x".into(),
            y_label: "y".into(),
            labels: vec!["a".into(), "b".into()],
            x: vec![1.0, 1.0],
            y: vec![2.0, 3.0],
        };
        assert_eq!(pearson(&flat), None);
    }

    #[test]
    fn test_paired_groups() -> AnalysisResult<()> {
        let df = df!(
            "genre" => ["Drama", "Action", "Drama"],
            "revenue" => [10.0, 30.0, 20.0],
            "profit" => [1.0, 3.0, 5.0]
        )?;
        let groups = group_means(&df, &["genre"], &["revenue", "profit"])?;
        let series = paired_groups(&groups, (0, "revenue"), (1, "profit"));
        assert_eq!(series.labels, vec!["Action", "Drama"]);
        assert_eq!(series.x, vec![30.0, 15.0]);
        assert_eq!(series.y, vec![3.0, 3.0]);
        Ok(())
    }
}
