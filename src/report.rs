use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

use crate::binning::BinEdges;
use crate::cleaner::ZeroValueReport;
use crate::config::QuestionConfig;
use crate::correlation::{self, PairedSeries};
use crate::error::AnalysisResult;
use crate::group::{Count, CrossTab, Grouped};
use crate::pipeline::Prepared;
use crate::q1::{self, YearMoney};
use crate::q2;
use crate::q3::{self, GenreMargin, GenreMoney};
use crate::q4::{self, ActorBudgets, ClassCounts};
use crate::share::Summary;
use crate::top_n::Ranked;

/// Result of one question. A failed question never stops the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Answer(T),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn answer(&self) -> Option<&T> {
        match self {
            Outcome::Answer(t) => Some(t),
            Outcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

fn run<T>(question: &str, f: impl FnOnce() -> AnalysisResult<T>) -> Outcome<T> {
    let start = Instant::now();
    match f() {
        Ok(answer) => {
            info!(question, elapsed = ?start.elapsed(), "answered");
            Outcome::Answer(answer)
        }
        Err(e) => {
            warn!(question, error = %e, "question failed");
            Outcome::Failed(e.to_string())
        }
    }
}

/// A scatter series with its correlation coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub series: PairedSeries,
    pub pearson: Option<f64>,
}

fn scatter(series: AnalysisResult<PairedSeries>) -> AnalysisResult<Scatter> {
    let series = series?;
    Ok(Scatter {
        pearson: correlation::pearson(&series),
        series,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answers {
    pub q1a_top_budget: Outcome<Vec<Ranked>>,
    pub q1b_top_revenue: Outcome<Vec<Ranked>>,
    pub q1c_top_profit: Outcome<Vec<Ranked>>,
    pub q1d_lowest_profit: Outcome<Vec<Ranked>>,
    pub q1e_money_by_year: Outcome<Vec<YearMoney>>,
    pub q1f_budget_revenue: Outcome<Scatter>,
    pub q1g_budget_profit: Outcome<Scatter>,
    pub q1h_revenue_profit: Outcome<Scatter>,
    pub q2a_runtime_by_year: Outcome<Vec<Grouped<f64>>>,
    pub q2b_genre_counts: Outcome<Vec<Count>>,
    pub q2c_runtime_by_genre: Outcome<Vec<Grouped<f64>>>,
    pub q3a_budget_by_genre: Outcome<Vec<Grouped<f64>>>,
    pub q3b_revenue_by_genre: Outcome<Vec<Grouped<f64>>>,
    pub q3c_money_by_genre: Outcome<Vec<GenreMoney>>,
    pub q3d_margin_by_genre: Outcome<Vec<GenreMargin>>,
    pub q3e_genre_revenue_profit: Outcome<Scatter>,
    pub q3f_focus_genre_margin: Outcome<Option<f64>>,
    pub q4a_top_actors: Outcome<Vec<Count>>,
    pub q4b_actor_budget_classes: Outcome<ActorBudgets>,
    pub q4c_actor_votes: Outcome<Option<Summary>>,
    pub q4d_actor_votes_by_budget: Outcome<Vec<Grouped<f64>>>,
    pub q4e_actor_budgets_by_date: Outcome<Scatter>,
    pub q4_2_runtime_classes: Outcome<Vec<Grouped<usize>>>,
    pub q4_3_class_counts: Outcome<ClassCounts>,
    pub q4_4_rating_by_votes: Outcome<CrossTab>,
    pub q4_5_top_companies: Outcome<Vec<Count>>,
}

impl Answers {
    pub fn failures(&self) -> usize {
        [
            self.q1a_top_budget.is_failed(),
            self.q1b_top_revenue.is_failed(),
            self.q1c_top_profit.is_failed(),
            self.q1d_lowest_profit.is_failed(),
            self.q1e_money_by_year.is_failed(),
            self.q1f_budget_revenue.is_failed(),
            self.q1g_budget_profit.is_failed(),
            self.q1h_revenue_profit.is_failed(),
            self.q2a_runtime_by_year.is_failed(),
            self.q2b_genre_counts.is_failed(),
            self.q2c_runtime_by_genre.is_failed(),
            self.q3a_budget_by_genre.is_failed(),
            self.q3b_revenue_by_genre.is_failed(),
            self.q3c_money_by_genre.is_failed(),
            self.q3d_margin_by_genre.is_failed(),
            self.q3e_genre_revenue_profit.is_failed(),
            self.q3f_focus_genre_margin.is_failed(),
            self.q4a_top_actors.is_failed(),
            self.q4b_actor_budget_classes.is_failed(),
            self.q4c_actor_votes.is_failed(),
            self.q4d_actor_votes_by_budget.is_failed(),
            self.q4e_actor_budgets_by_date.is_failed(),
            self.q4_2_runtime_classes.is_failed(),
            self.q4_3_class_counts.is_failed(),
            self.q4_4_rating_by_votes.is_failed(),
            self.q4_5_top_companies.is_failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

pub fn answer_all(movies: &DataFrame, config: &QuestionConfig) -> Answers {
    Answers {
        q1a_top_budget: run("q1a", || q1::q1a(movies, config)),
        q1b_top_revenue: run("q1b", || q1::q1b(movies, config)),
        q1c_top_profit: run("q1c", || q1::q1c(movies, config)),
        q1d_lowest_profit: run("q1d", || q1::q1d(movies, config)),
        q1e_money_by_year: run("q1e", || q1::q1e(movies)),
        q1f_budget_revenue: run("q1f", || scatter(q1::q1f(movies))),
        q1g_budget_profit: run("q1g", || scatter(q1::q1g(movies))),
        q1h_revenue_profit: run("q1h", || scatter(q1::q1h(movies))),
        q2a_runtime_by_year: run("q2a", || q2::q2a(movies)),
        q2b_genre_counts: run("q2b", || q2::q2b(movies)),
        q2c_runtime_by_genre: run("q2c", || q2::q2c(movies)),
        q3a_budget_by_genre: run("q3a", || q3::q3a(movies)),
        q3b_revenue_by_genre: run("q3b", || q3::q3b(movies)),
        q3c_money_by_genre: run("q3c", || q3::q3c(movies)),
        q3d_margin_by_genre: run("q3d", || q3::q3d(movies)),
        q3e_genre_revenue_profit: run("q3e", || scatter(q3::q3e(movies))),
        q3f_focus_genre_margin: run("q3f", || q3::q3f(movies, config)),
        q4a_top_actors: run("q4a", || q4::q4a(movies, config)),
        q4b_actor_budget_classes: run("q4b", || q4::q4b(movies, config)),
        q4c_actor_votes: run("q4c", || q4::q4c(movies, config)),
        q4d_actor_votes_by_budget: run("q4d", || q4::q4d(movies, config)),
        q4e_actor_budgets_by_date: run("q4e", || scatter(q4::q4e(movies, config))),
        q4_2_runtime_classes: run("q4.2", || q4::q4_2(movies)),
        q4_3_class_counts: run("q4.3", || q4::q4_3(movies)),
        q4_4_rating_by_votes: run("q4.4", || q4::q4_4(movies)),
        q4_5_top_companies: run("q4.5", || q4::q4_5(movies, config)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub loaded_rows: usize,
    pub duplicates_removed: usize,
    pub zero_values: ZeroValueReport,
    pub movies: usize,
    pub bins: Vec<BinEdges>,
    pub answers: Answers,
}

pub fn run_all(prepared: &Prepared, config: &QuestionConfig) -> Report {
    let answers = answer_all(&prepared.movies, config);
    let failures = answers.failures();
    if failures > 0 {
        warn!(failures, "some questions could not be answered");
    }
    Report {
        loaded_rows: prepared.loaded_rows,
        duplicates_removed: prepared.duplicates_removed,
        zero_values: prepared.zero_report.clone(),
        movies: prepared.movies.height(),
        bins: prepared.bins.clone(),
        answers,
    }
}

fn section<T>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    outcome: &Outcome<T>,
    body: impl FnOnce(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    writeln!(f, "\n== {title}")?;
    match outcome {
        Outcome::Answer(t) => body(f, t),
        Outcome::Failed(e) => writeln!(f, "  failed: {e}"),
    }
}

fn ranked(f: &mut fmt::Formatter<'_>, rows: &Vec<Ranked>) -> fmt::Result {
    for (i, r) in rows.iter().enumerate() {
        writeln!(f, "  {:>2}. {:<45} {:>10.2}", i + 1, r.title, r.value)?;
    }
    Ok(())
}

fn means(f: &mut fmt::Formatter<'_>, rows: &Vec<Grouped<f64>>) -> fmt::Result {
    for g in rows {
        writeln!(f, "  {:<25} {:>10.2}", g.label(), g.value)?;
    }
    Ok(())
}

fn counts(f: &mut fmt::Formatter<'_>, rows: &Vec<Count>) -> fmt::Result {
    for c in rows {
        writeln!(f, "  {:<40} {:>6}", c.value, c.count)?;
    }
    Ok(())
}

fn grouped_counts(f: &mut fmt::Formatter<'_>, rows: &Vec<Grouped<usize>>) -> fmt::Result {
    for g in rows {
        writeln!(f, "  {:<25} {:>6}", g.label(), g.value)?;
    }
    Ok(())
}

fn scatter_line(f: &mut fmt::Formatter<'_>, s: &Scatter) -> fmt::Result {
    let r = s
        .pearson
        .map_or_else(|| "undefined".to_string(), |r| format!("{r:.3}"));
    writeln!(
        f,
        "  {} points, {} vs {}, pearson r = {}",
        s.series.len(),
        s.series.x_label,
        s.series.y_label,
        r
    )
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let z = &self.zero_values;
        writeln!(f, "Loaded rows:              {}", self.loaded_rows)?;
        writeln!(f, "Duplicates removed:       {}", self.duplicates_removed)?;
        writeln!(f, "Zero budget:              {} ({})", z.zero_budget, pct(z.budget_pct()))?;
        writeln!(f, "Zero revenue:             {} ({})", z.zero_revenue, pct(z.revenue_pct()))?;
        writeln!(f, "Zero runtime:             {} ({})", z.zero_runtime, pct(z.runtime_pct()))?;
        writeln!(
            f,
            "  of which zero budget:   {} ({})",
            z.zero_runtime_and_budget,
            pct(z.runtime_and_budget_pct())
        )?;
        writeln!(f, "Movies analysed:          {}", self.movies)?;
        for b in &self.bins {
            let edges: Vec<String> = b.edges.iter().map(|e| format!("{e:.2}")).collect();
            writeln!(f, "Classes of {:<14} {} | {}", b.column, b.labels.join(", "), edges.join(", "))?;
        }

        let a = &self.answers;
        section(f, "1a top budgets [millions]", &a.q1a_top_budget, ranked)?;
        section(f, "1b top revenues [millions]", &a.q1b_top_revenue, ranked)?;
        section(f, "1c top profits [millions]", &a.q1c_top_profit, ranked)?;
        section(f, "1d lowest profits [millions]", &a.q1d_lowest_profit, ranked)?;
        section(f, "1e mean money by year [millions]", &a.q1e_money_by_year, |f, rows| {
            for y in rows {
                writeln!(
                    f,
                    "  {} budget {:>8} revenue {:>8} profit {:>8}",
                    y.year,
                    money(y.budget),
                    money(y.revenue),
                    money(y.profit)
                )?;
            }
            Ok(())
        })?;
        section(f, "1f budget vs revenue", &a.q1f_budget_revenue, scatter_line)?;
        section(f, "1g budget vs profit", &a.q1g_budget_profit, scatter_line)?;
        section(f, "1h revenue vs profit", &a.q1h_revenue_profit, scatter_line)?;
        section(f, "2a mean runtime by year [minutes]", &a.q2a_runtime_by_year, means)?;
        section(f, "2b movies per genre", &a.q2b_genre_counts, counts)?;
        section(f, "2c mean runtime by genre [minutes]", &a.q2c_runtime_by_genre, means)?;
        section(f, "3a mean budget by genre [millions]", &a.q3a_budget_by_genre, means)?;
        section(f, "3b mean revenue by genre [millions]", &a.q3b_revenue_by_genre, means)?;
        section(f, "3c money by genre [millions]", &a.q3c_money_by_genre, |f, rows| {
            for g in rows {
                writeln!(
                    f,
                    "  {:<18} revenue {:>8.2} budget {:>8.2} profit {:>8.2}",
                    g.genre, g.revenue, g.budget, g.profit
                )?;
            }
            Ok(())
        })?;
        section(f, "3d profit margin by genre", &a.q3d_margin_by_genre, |f, rows| {
            for g in rows {
                writeln!(f, "  {:<18} {:>7.2}%", g.genre, g.margin_pct)?;
            }
            Ok(())
        })?;
        section(f, "3e revenue vs profit by genre", &a.q3e_genre_revenue_profit, scatter_line)?;
        section(f, "3f profit share of focus genre", &a.q3f_focus_genre_margin, |f, m| {
            writeln!(f, "  {}", pct(*m))
        })?;
        section(f, "4a top actors", &a.q4a_top_actors, counts)?;
        section(f, "4b budget classes of focus actor", &a.q4b_actor_budget_classes, |f, b| {
            writeln!(f, "  {}: {} films", b.actor, b.films)?;
            for s in &b.shares {
                writeln!(f, "  {:<10} {:>4} {:>7.2}%", s.label, s.count, s.percent)?;
            }
            Ok(())
        })?;
        section(f, "4c vote average of focus actor", &a.q4c_actor_votes, |f, s| match s {
            Some(s) => writeln!(f, "  min {:.2} mean {:.2} max {:.2}", s.min, s.mean, s.max),
            None => writeln!(f, "  no films"),
        })?;
        section(f, "4d focus actor votes by budget class", &a.q4d_actor_votes_by_budget, means)?;
        section(f, "4e focus actor budgets over the years", &a.q4e_actor_budgets_by_date, scatter_line)?;
        section(f, "4.2 movies per runtime class", &a.q4_2_runtime_classes, grouped_counts)?;
        section(f, "4.3 movies per rating / vote-count class", &a.q4_3_class_counts, |f, c| {
            grouped_counts(f, &c.rating)?;
            grouped_counts(f, &c.vote_count)
        })?;
        section(f, "4.4 rating classes by vote-count class", &a.q4_4_rating_by_votes, |f, t| {
            for (row, counts) in t.rows.iter().zip(t.counts.iter()) {
                for (column, count) in t.columns.iter().zip(counts.iter()) {
                    writeln!(f, "  {:<14} {:<10} {:>6}", row.to_string(), column.to_string(), count)?;
                }
            }
            Ok(())
        })?;
        section(f, "4.5 top production companies", &a.q4_5_top_companies, counts)
    }
}

#[cfg(test)]
mod test_report {
    use super::*;

    #[test]
    fn test_missing_values_render_as_na() {
        assert_eq!(money(None), "n/a");
        assert_eq!(money(Some(1.5)), "1.50");
        assert_eq!(pct(None), "n/a");
    }

    #[test]
    fn test_failed_question_is_counted() {
        let failed: Outcome<Vec<Count>> = run("q0", || {
            Err(crate::error::AnalysisError::Schema("cast".to_string()))
        });
        assert!(failed.is_failed());
        assert_eq!(failed.answer(), None);
    }
}
