use polars::prelude::*;

use crate::columns::{GENRES, RELEASE_YEAR, RUNTIME};
use crate::error::AnalysisResult;
use crate::group::{self, Count, Grouped};
use crate::multivalue;

pub fn q2a(movies: &DataFrame) -> AnalysisResult<Vec<Grouped<f64>>> {
    group::group_mean(movies, &[RELEASE_YEAR], RUNTIME)
}

pub fn q2b(movies: &DataFrame) -> AnalysisResult<Vec<Count>> {
    multivalue::component_counts(movies, GENRES)
}

pub fn q2c(movies: &DataFrame) -> AnalysisResult<Vec<Grouped<f64>>> {
    let genres = multivalue::explode(movies, GENRES)?;
    let item = multivalue::item_column(GENRES);
    let mut means = group::group_mean(&genres, &[item.as_str()], RUNTIME)?;
    group::sort_desc(&mut means);
    Ok(means)
}

// 2. Does the genre of a movie affect its running time?
//   a) mean runtime per release year
//   b) number of movies per genre
//   c) mean runtime per genre
