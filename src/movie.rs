use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use crate::columns::*;
use crate::dates;
use crate::error::AnalysisResult;
use crate::multivalue::MultiValue;
use crate::table;

/// One row of the cleaned table. Money is in millions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_year: Option<i64>,
    pub release_date: Option<NaiveDate>,
    pub runtime: i64,
    pub runtime_class: Option<String>,
    pub director: String,
    pub cast: MultiValue,
    pub genres: MultiValue,
    pub vote_average: Option<f64>,
    pub rating_class: Option<String>,
    pub vote_count: Option<i64>,
    pub vote_count_class: Option<String>,
    pub revenue: f64,
    pub budget: f64,
    pub profit: f64,
    pub budget_class: Option<String>,
    pub production_companies: MultiValue,
    pub keywords: MultiValue,
}

fn owned(v: Option<&str>) -> Option<String> {
    v.map(str::to_string)
}

fn multi(v: Option<&str>) -> MultiValue {
    v.map(MultiValue::parse).unwrap_or_default()
}

/// Typed view of the cleaned table, in table order.
pub fn movies(df: &DataFrame) -> AnalysisResult<Vec<Movie>> {
    table::require_query_columns(df, &FINAL_ORDER)?;

    let id = table::ints(df, ID)?;
    let title = table::texts(df, TITLE)?;
    let release_year = table::ints(df, RELEASE_YEAR)?;
    let release_date = dates::date_values(df, RELEASE_DATE)?;
    let runtime = table::ints(df, RUNTIME)?;
    let runtime_class = table::texts(df, RUNTIME_CLASS)?;
    let director = table::texts(df, DIRECTOR)?;
    let cast = table::texts(df, CAST)?;
    let genres = table::texts(df, GENRES)?;
    let vote_average = table::floats(df, VOTE_AVERAGE)?;
    let rating_class = table::texts(df, RATING_CLASS)?;
    let vote_count = table::ints(df, VOTE_COUNT)?;
    let vote_count_class = table::texts(df, VOTE_COUNT_CLASS)?;
    let revenue = table::floats(df, REVENUE)?;
    let budget = table::floats(df, BUDGET)?;
    let profit = table::floats(df, PROFIT)?;
    let budget_class = table::texts(df, BUDGET_CLASS)?;
    let companies = table::texts(df, PRODUCTION_COMPANIES)?;
    let keywords = table::texts(df, KEYWORDS)?;

    Ok((0..df.height())
        .map(|i| Movie {
            id: id.get(i).unwrap_or_default(),
            title: title.get(i).unwrap_or_default().to_string(),
            release_year: release_year.get(i),
            release_date: release_date[i],
            runtime: runtime.get(i).unwrap_or_default(),
            runtime_class: owned(runtime_class.get(i)),
            director: director.get(i).unwrap_or_default().to_string(),
            cast: multi(cast.get(i)),
            genres: multi(genres.get(i)),
            vote_average: vote_average.get(i),
            rating_class: owned(rating_class.get(i)),
            vote_count: vote_count.get(i),
            vote_count_class: owned(vote_count_class.get(i)),
            revenue: revenue.get(i).unwrap_or_default(),
            budget: budget.get(i).unwrap_or_default(),
            profit: profit.get(i).unwrap_or_default(),
            budget_class: owned(budget_class.get(i)),
            production_companies: multi(companies.get(i)),
            keywords: multi(keywords.get(i)),
        })
        .collect())
}
