use polars::prelude::*;
use serde::Serialize;

use crate::columns::{BUDGET, PROFIT, RELEASE_YEAR, REVENUE};
use crate::config::QuestionConfig;
use crate::correlation::{self, PairedSeries};
use crate::error::AnalysisResult;
use crate::group::{self, Grouped};
use crate::top_n::{self, Order, Ranked};

pub fn q1a(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Vec<Ranked>> {
    top_n::top_n(movies, BUDGET, config.top_n, Order::Descending)
}

pub fn q1b(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Vec<Ranked>> {
    top_n::top_n(movies, REVENUE, config.top_n, Order::Descending)
}

pub fn q1c(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Vec<Ranked>> {
    top_n::top_n(movies, PROFIT, config.top_n, Order::Descending)
}

pub fn q1d(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Vec<Ranked>> {
    top_n::top_n(movies, PROFIT, config.top_n, Order::Ascending)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMoney {
    pub year: String,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
}

pub fn q1e(movies: &DataFrame) -> AnalysisResult<Vec<YearMoney>> {
    let groups = group::group_means(movies, &[RELEASE_YEAR], &[BUDGET, REVENUE, PROFIT])?;
    Ok(groups.iter().map(year_money).collect())
}

fn year_money(g: &Grouped<Vec<Option<f64>>>) -> YearMoney {
    YearMoney {
        year: g.label(),
        budget: g.value[0],
        revenue: g.value[1],
        profit: g.value[2],
    }
}

pub fn q1f(movies: &DataFrame) -> AnalysisResult<PairedSeries> {
    correlation::paired(movies, BUDGET, REVENUE)
}

pub fn q1g(movies: &DataFrame) -> AnalysisResult<PairedSeries> {
    correlation::paired(movies, BUDGET, PROFIT)
}

pub fn q1h(movies: &DataFrame) -> AnalysisResult<PairedSeries> {
    correlation::paired(movies, REVENUE, PROFIT)
}

// 1. Do the films with the highest budgets also bring in a high revenue,
//    and what about the profit?
//   a) top 10 budgets
//   b) top 10 revenues
//   c) top 10 profits
//   d) 10 lowest profits
//   e) mean budget, revenue and profit per release year
//   f) budget vs revenue
//   g) budget vs profit
//   h) revenue vs profit
