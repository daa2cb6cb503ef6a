use polars::prelude::*;
use serde::Serialize;

use crate::columns::*;
use crate::config::QuestionConfig;
use crate::correlation::PairedSeries;
use crate::dates;
use crate::error::AnalysisResult;
use crate::filter;
use crate::group::{self, Count, CrossTab, Grouped, KeyPart};
use crate::multivalue;
use crate::share::{self, Share, Summary};
use crate::table;

fn focus_actor(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<DataFrame> {
    filter::with_component(movies, CAST, &config.focus_actor)
}

/// Top actors by number of appearances.
pub fn q4a(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Vec<Count>> {
    let mut counts = multivalue::component_counts(movies, CAST)?;
    counts.truncate(config.top_n);
    Ok(counts)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorBudgets {
    pub actor: String,
    pub films: usize,
    pub shares: Vec<Share>,
}

/// Share of each budget class among the focus actor's films. Every class is
/// listed, empty ones at 0%; an actor without films is an arithmetic error.
pub fn q4b(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<ActorBudgets> {
    let films = focus_actor(movies, config)?;
    let observed = group::group_count(&films, &[BUDGET_CLASS])?;

    let counts: Vec<Grouped<usize>> = BUDGET_LABELS
        .iter()
        .enumerate()
        .map(|(rank, label)| {
            let value = observed
                .iter()
                .find(|g| g.key[0].as_text() == Some(*label))
                .map_or(0, |g| g.value);
            Grouped {
                key: vec![KeyPart::Label {
                    rank,
                    label: label.to_string(),
                }],
                value,
            }
        })
        .collect();

    let context = format!("no films with {}", config.focus_actor);
    Ok(ActorBudgets {
        actor: config.focus_actor.clone(),
        films: films.height(),
        shares: share::shares(&counts, &context)?,
    })
}

pub fn q4c(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Option<Summary>> {
    share::summary(&focus_actor(movies, config)?, VOTE_AVERAGE)
}

pub fn q4d(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Vec<Grouped<f64>>> {
    group::group_mean(&focus_actor(movies, config)?, &[BUDGET_CLASS], VOTE_AVERAGE)
}

/// Budgets of the focus actor's films over their release dates, the date as
/// a fractional year. Points are labelled with the title.
pub fn q4e(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<PairedSeries> {
    let films = focus_actor(movies, config)?;
    table::require_query_columns(&films, &[TITLE, RELEASE_DATE, BUDGET])?;
    let released = dates::date_values(&films, RELEASE_DATE)?;
    let budgets = table::floats(&films, BUDGET)?;
    let titles = table::texts(&films, TITLE)?;

    let mut series = PairedSeries {
        x_label: RELEASE_DATE.to_string(),
        y_label: BUDGET.to_string(),
        labels: Vec::new(),
        x: Vec::new(),
        y: Vec::new(),
    };
    let rows = released
        .into_iter()
        .zip(budgets.into_iter())
        .zip(titles.into_iter());
    for ((date, budget), title) in rows {
        if let (Some(date), Some(budget)) = (date, budget) {
            series.labels.push(title.unwrap_or_default().to_string());
            series.x.push(dates::fractional_year(date));
            series.y.push(budget);
        }
    }
    Ok(series)
}

pub fn q4_2(movies: &DataFrame) -> AnalysisResult<Vec<Grouped<usize>>> {
    group::group_count(movies, &[RUNTIME_CLASS])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCounts {
    pub rating: Vec<Grouped<usize>>,
    pub vote_count: Vec<Grouped<usize>>,
}

pub fn q4_3(movies: &DataFrame) -> AnalysisResult<ClassCounts> {
    Ok(ClassCounts {
        rating: group::group_count(movies, &[RATING_CLASS])?,
        vote_count: group::group_count(movies, &[VOTE_COUNT_CLASS])?,
    })
}

pub fn q4_4(movies: &DataFrame) -> AnalysisResult<CrossTab> {
    group::crosstab(movies, VOTE_COUNT_CLASS, RATING_CLASS)
}

/// Top production companies among movies of the focus vote-count and budget
/// classes.
pub fn q4_5(movies: &DataFrame, config: &QuestionConfig) -> AnalysisResult<Vec<Count>> {
    let selected = filter::filter_eq(
        movies,
        &[
            (VOTE_COUNT_CLASS, config.focus_vote_count_class.as_str()),
            (BUDGET_CLASS, config.focus_budget_class.as_str()),
        ],
    )?;
    let mut counts = multivalue::component_counts(&selected, PRODUCTION_COMPANIES)?;
    counts.truncate(config.top_companies);
    Ok(counts)
}

// 4. Bonus questions
//   4.1 the most casted actors
//     a) top 10 actors
//     b) budget classes of the focus actor's films
//     c) vote average of the focus actor's films
//     d) mean vote average per budget class for the focus actor
//     e) budgets of the focus actor's films over the years
//   4.2 movies per runtime class
//   4.3 movies per rating and vote-count class
//   4.4 rating classes by vote-count class
//   4.5 top 20 production companies with "many" votes and a "premium" budget
