use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table;

/// Release dates come as `m/d/yy` in the TMDB export; ISO dates are
/// accepted too.
pub struct DateParser {
    us: Regex,
    iso: Regex,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DateParser {
    pub fn new() -> Self {
        DateParser {
            us: Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").expect("static date pattern"),
            iso: Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("static date pattern"),
        }
    }

    /// Two-digit years take their century from `release_year` when the last
    /// two digits agree, otherwise 00-69 map to 20xx and 70-99 to 19xx.
    pub fn parse(&self, value: &str, release_year: Option<i64>) -> Option<NaiveDate> {
        let value = value.trim();
        if let Some(caps) = self.us.captures(value) {
            let month: u32 = caps[1].parse().ok()?;
            let day: u32 = caps[2].parse().ok()?;
            let year_str = &caps[3];
            let year: i32 = if year_str.len() == 4 {
                year_str.parse().ok()?
            } else {
                let yy: i64 = year_str.parse().ok()?;
                match release_year {
                    Some(ry) if ry.rem_euclid(100) == yy => ry as i32,
                    _ if yy < 70 => 2000 + yy as i32,
                    _ => 1900 + yy as i32,
                }
            };
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        if let Some(caps) = self.iso.captures(value) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        None
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

pub fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

pub fn from_days(days: i32) -> Option<NaiveDate> {
    epoch().checked_add_signed(chrono::Duration::days(days as i64))
}

/// Year plus the elapsed share of it, for plotting dates on a numeric axis.
pub fn fractional_year(date: NaiveDate) -> f64 {
    let year = date.year();
    let days = NaiveDate::from_ymd_opt(year, 12, 31).map_or(365, |last| last.ordinal());
    year as f64 + date.ordinal0() as f64 / days as f64
}

/// Replaces the text column `column` with a Date column. Nulls stay null;
/// anything else that does not parse is an error naming the row.
pub fn normalize_dates(df: &DataFrame, column: &str, year_column: Option<&str>) -> Result<DataFrame> {
    table::require_columns(df, &[column], "date normalization")?;
    if df.column(column)?.dtype() == &DataType::Date {
        return Ok(df.clone());
    }

    let parser = DateParser::new();
    let raw = table::texts(df, column)?;
    let years: Option<Int64Chunked> = match year_column {
        Some(year_column) if table::has_column(df, year_column) => {
            Some(table::ints(df, year_column)?)
        }
        _ => None,
    };

    let mut days: Vec<Option<i32>> = Vec::with_capacity(raw.len());
    for (row, value) in raw.into_iter().enumerate() {
        let Some(value) = value else {
            days.push(None);
            continue;
        };
        let year = years.as_ref().and_then(|y| y.get(row));
        match parser.parse(value, year) {
            Some(date) => days.push(Some(days_since_epoch(date))),
            None => {
                return Err(PipelineError::Parse {
                    row,
                    column: column.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    let dates = Series::new(column.into(), days).cast(&DataType::Date)?;
    let mut out = df.clone();
    out.with_column(dates)?;
    debug!(column, "parsed release dates");
    Ok(out)
}

/// Dates of `column` as chrono values.
pub fn date_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let days = df.column(column)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(from_days))
        .collect())
}
