use polars::prelude::*;
use serde::Serialize;

use crate::columns::{BUDGET, GENRES, PROFIT, REVENUE};
use crate::config::QuestionConfig;
use crate::correlation::{self, PairedSeries};
use crate::error::AnalysisResult;
use crate::filter;
use crate::group::{self, Grouped};
use crate::multivalue;
use crate::share;
use crate::table;

fn genre_mean(movies: &DataFrame, value: &str) -> AnalysisResult<Vec<Grouped<f64>>> {
    let genres = multivalue::explode(movies, GENRES)?;
    let item = multivalue::item_column(GENRES);
    let mut means = group::group_mean(&genres, &[item.as_str()], value)?;
    group::sort_desc(&mut means);
    Ok(means)
}

pub fn q3a(movies: &DataFrame) -> AnalysisResult<Vec<Grouped<f64>>> {
    genre_mean(movies, BUDGET)
}

pub fn q3b(movies: &DataFrame) -> AnalysisResult<Vec<Grouped<f64>>> {
    genre_mean(movies, REVENUE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreMoney {
    pub genre: String,
    pub revenue: f64,
    pub budget: f64,
    pub profit: f64,
}

/// Mean revenue, budget and profit per genre, highest revenue first.
pub fn q3c(movies: &DataFrame) -> AnalysisResult<Vec<GenreMoney>> {
    let genres = multivalue::explode(movies, GENRES)?;
    let item = multivalue::item_column(GENRES);
    let groups = group::group_means(&genres, &[item.as_str()], &[REVENUE, BUDGET, PROFIT])?;

    let mut rows: Vec<GenreMoney> = groups
        .iter()
        .filter_map(|g| {
            Some(GenreMoney {
                genre: g.label(),
                revenue: g.value[0]?,
                budget: g.value[1]?,
                profit: g.value[2]?,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreMargin {
    pub genre: String,
    pub revenue: f64,
    pub profit: f64,
    pub margin_pct: f64,
}

/// Mean profit as a share of mean revenue per genre, in `q3c` order.
pub fn q3d(movies: &DataFrame) -> AnalysisResult<Vec<GenreMargin>> {
    q3c(movies)?
        .into_iter()
        .map(|g| {
            let margin_pct = share::percent(g.profit, g.revenue, &format!("revenue of genre {}", g.genre))?;
            Ok(GenreMargin {
                genre: g.genre,
                revenue: g.revenue,
                profit: g.profit,
                margin_pct,
            })
        })
        .collect()
}

pub fn q3e(movies: &DataFrame) -> AnalysisResult<PairedSeries> {
    let genres = multivalue::explode(movies, GENRES)?;
    let item = multivalue::item_column(GENRES);
    let groups = group::group_means(&genres, &[item.as_str()], &[REVENUE, PROFIT])?;
    Ok(correlation::paired_groups(&groups, (0, REVENUE), (1, PROFIT)))
}

/// Total profit over total revenue of the focus genre. `None` when no movie
/// carries the genre.
pub fn q3f(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Option<f64>> {
    let genre = filter::with_component(movies, GENRES, &config.focus_genre)?;
    if genre.height() == 0 {
        return Ok(None);
    }
    let revenue: f64 = table::floats(&genre, REVENUE)?.into_iter().flatten().sum();
    let profit: f64 = table::floats(&genre, PROFIT)?.into_iter().flatten().sum();
    let context = format!("revenue of genre {}", config.focus_genre);
    Ok(Some(share::percent(profit, revenue, &context)?))
}

// 3. Which genres bring the most profit?
//   a) mean budget per genre
//   b) mean revenue per genre
//   c) mean budget and revenue per genre
//   d) mean profit and revenue per genre
//   e) revenue vs profit across genres
//   f) profit share of revenue for the focus genre ("TV Movie")

#[cfg(test)]
mod test_q3 {
    use super::*;
    use crate::error::AnalysisError;

    fn movies() -> PolarsResult<DataFrame> {
        df!(
            "genres" => ["Action|Drama", "Drama", "TV Movie"],
            "budget" => [100.0, 20.0, 2.0],
            "revenue" => [300.0, 10.0, 3.0],
            "profit" => [200.0, -10.0, 1.0]
        )
    }

    #[test]
    fn test_q3c_sorted_by_revenue() -> AnalysisResult<()> {
        let rows = q3c(&movies()?)?;
        let genres: Vec<&str> = rows.iter().map(|r| r.genre.as_str()).collect();
        assert_eq!(genres, vec!["Action", "Drama", "TV Movie"]);
        assert_eq!(rows[1].revenue, 155.0);
        assert_eq!(rows[1].profit, 95.0);
        Ok(())
    }

    #[test]
    fn test_q3f_margin() -> AnalysisResult<()> {
        let df = movies()?;
        let margin = q3f(&df, &QuestionConfig::default())?.unwrap();
        assert!((margin - 100.0 / 3.0).abs() < 1e-9);

        let config = QuestionConfig {
            focus_genre: "Western".to_string(),
            ..QuestionConfig::default()
        };
        assert_eq!(q3f(&df, &config)?, None);
        Ok(())
    }

    #[test]
    fn test_q3d_zero_revenue() -> AnalysisResult<()> {
        let df = df!(
            "genres" => ["Drama"],
            "budget" => [1.0],
            "revenue" => [0.0],
            "profit" => [-1.0]
        )?;
        assert!(matches!(q3d(&df), Err(AnalysisError::Arithmetic { .. })));
        Ok(())
    }
}
