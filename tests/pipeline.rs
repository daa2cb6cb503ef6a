use chrono::NaiveDate;
use polars::prelude::*;
use std::io::Write;
use tmdb_eda::columns::*;
use tmdb_eda::config::PipelineConfig;
use tmdb_eda::error::PipelineError;
use tmdb_eda::{filter, group, loader, movie, multivalue, pipeline, report};

const HEADER: &str = "id,imdb_id,popularity,budget,revenue,original_title,cast,homepage,director,tagline,keywords,overview,runtime,genres,production_companies,release_date,vote_count,vote_average,release_year,budget_adj,revenue_adj";

const ROWS: [&str; 5] = [
    "1,tt1,2.5,1000000,5000000,Alpha,Robert De Niro|Joe Pesci,,Martin Scorsese,A tagline,mob|crime,An overview,120,Crime|Drama,Paramount,9/12/90,500,7.5,1990,1500000.0,7500000.0",
    "1,tt1,2.5,1000000,5000000,Alpha,Robert De Niro|Joe Pesci,,Martin Scorsese,A tagline,mob|crime,An overview,120,Crime|Drama,Paramount,9/12/90,500,7.5,1990,1500000.0,7500000.0",
    "2,tt2,0.3,0,2000000,Beta,Someone,,Jane Doe,Tag,dog,Overview,90,Comedy,Unknown Films,3/1/99,20,5.5,1999,0.0,2500000.0",
    "3,tt3,1.0,2000000,1000000,Gamma,Al Pacino,,,,heist,Overview,95,Thriller,Unknown Films,1/5/05,100,6.0,2005,2000000.0,1000000.0",
    "4,tt4,4.0,3000000,9000000,Delta,Robert De Niro,,Michael Mann,Tag,heist|la,Overview,170,Crime|Thriller,Warner Bros.,12/15/95,900,7.9,1995,4000000.0,12000000.0",
];

fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

#[test]
fn test_clean_five_rows() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_csv(&ROWS);
    let prepared = pipeline::prepare_file(file.path(), &PipelineConfig::default())?;
    let movies = &prepared.movies;

    assert_eq!(prepared.loaded_rows, 5);
    assert_eq!(prepared.duplicates_removed, 1);
    assert_eq!(prepared.zero_report.zero_budget, 1);
    assert_eq!(movies.height(), 3);

    let names: Vec<&str> = movies
        .get_column_names()
        .iter()
        .map(|c| c.as_str())
        .collect();
    assert_eq!(names, FINAL_ORDER.to_vec());

    let ids: Vec<Option<i64>> = movies.column(ID)?.i64()?.into_iter().collect();
    assert_eq!(ids, vec![Some(1), Some(3), Some(4)]);

    let directors: Vec<Option<&str>> = movies.column(DIRECTOR)?.str()?.into_iter().collect();
    assert_eq!(
        directors,
        vec![Some("Martin Scorsese"), Some("Unknown"), Some("Michael Mann")]
    );

    let profit = movies.column(PROFIT)?.f64()?;
    let revenue = movies.column(REVENUE)?.f64()?;
    let budget = movies.column(BUDGET)?.f64()?;
    let expected = [4.0, -1.0, 6.0];
    for (i, want) in expected.iter().enumerate() {
        let (p, r, b) = (profit.get(i).unwrap(), revenue.get(i).unwrap(), budget.get(i).unwrap());
        assert!((p - want).abs() < 1e-9);
        assert!((p - (r - b)).abs() < 1e-9);
        assert!(b > 0.0 && r > 0.0);
    }
    Ok(())
}

#[test]
fn test_classes_and_typed_view() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_csv(&ROWS);
    let prepared = pipeline::prepare_file(file.path(), &PipelineConfig::default())?;
    assert_eq!(prepared.bins.len(), 4);

    let movies = movie::movies(&prepared.movies)?;
    assert_eq!(movies.len(), 3);
    assert_eq!(movies[0].release_date, NaiveDate::from_ymd_opt(1990, 9, 12));
    assert_eq!(movies[0].genres.len(), 2);
    assert!(movies[0].cast.contains("Robert De Niro"));
    assert_eq!(movies[1].director, "Unknown");

    // Lowest budget sits in the lowest class, the 170 minute film is over-length.
    assert_eq!(movies[0].budget_class.as_deref(), Some("low"));
    assert_eq!(movies[2].budget_class.as_deref(), Some("premium"));
    assert_eq!(movies[2].runtime_class.as_deref(), Some("over-length film"));
    assert_eq!(movies[1].rating_class.as_deref(), Some("very low"));
    for m in &movies {
        assert!(m.rating_class.is_some());
        assert!(m.vote_count_class.is_some());
    }
    Ok(())
}

#[test]
fn test_report_answers_everything() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_csv(&ROWS);
    let config = PipelineConfig::default();
    let prepared = pipeline::prepare_file(file.path(), &config)?;
    let report = report::run_all(&prepared, &config.questions);

    assert_eq!(report.answers.failures(), 0);
    let top = report.answers.q1a_top_budget.answer().unwrap();
    assert_eq!(top[0].title, "Delta");
    let actors = report.answers.q4a_top_actors.answer().unwrap();
    assert_eq!(actors[0].value, "Robert De Niro");
    assert_eq!(report.answers.q3f_focus_genre_margin.answer(), Some(&None));
    let budgets_by_date = report.answers.q4e_actor_budgets_by_date.answer().unwrap();
    assert_eq!(budgets_by_date.series.labels, vec!["Alpha".to_string(), "Delta".to_string()]);
    assert_eq!(budgets_by_date.series.y, vec![1.0, 3.0]);
    assert!((budgets_by_date.series.x[0] - 1990.7).abs() < 0.01);

    let text = report.to_string();
    assert!(text.contains("Movies analysed:          3"));
    assert!(text.contains("4e focus actor budgets over the years"));
    assert!(!text.contains("NaN"));
    let json = serde_json::to_value(&report)?;
    assert_eq!(json["movies"], 3);
    Ok(())
}

#[test]
fn test_one_failing_question_does_not_stop_the_rest() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_csv(&ROWS);
    let mut config = PipelineConfig::default();
    config.questions.focus_actor = "Nobody Famous".to_string();
    let prepared = pipeline::prepare_file(file.path(), &config)?;
    let report = report::run_all(&prepared, &config.questions);

    assert!(report.answers.q4b_actor_budget_classes.is_failed());
    assert_eq!(report.answers.failures(), 1);
    assert!(report.answers.q4_5_top_companies.answer().is_some());
    Ok(())
}

#[test]
fn test_missing_drop_column_is_schema_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "id,original_title,budget,revenue,runtime")?;
    writeln!(file, "1,Alpha,10,20,90")?;
    let raw = loader::load_csv(file.path(), &PipelineConfig::default())?;
    match pipeline::prepare(&raw, &PipelineConfig::default()) {
        Err(PipelineError::Schema { column, .. }) => assert_eq!(column, "imdb_id"),
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[test]
fn test_bad_date_aborts_with_row() -> Result<(), Box<dyn std::error::Error>> {
    let broken = ROWS[4].replace("12/15/95", "someday");
    let file = write_csv(&[ROWS[0], ROWS[3], broken.as_str()]);
    match pipeline::prepare_file(file.path(), &PipelineConfig::default()) {
        Err(PipelineError::Parse { row, column, value }) => {
            assert_eq!(row, 2);
            assert_eq!(column, RELEASE_DATE);
            assert_eq!(value, "someday");
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[test]
fn test_explode_genres() -> Result<(), Box<dyn std::error::Error>> {
    let df = df!(
        "id" => [1i64, 2, 3],
        "genres" => ["Action|Drama", "Action|Drama", "Western"]
    )?;
    let exploded = multivalue::explode(&df, GENRES)?;
    assert_eq!(exploded.height(), 5);

    let counts = group::value_counts(&exploded, &multivalue::item_column(GENRES))?;
    let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
    assert_eq!(pairs, vec![("Action", 2), ("Drama", 2), ("Western", 1)]);

    let sources: Vec<Option<u32>> = exploded
        .column(multivalue::SOURCE_ROW)?
        .cast(&DataType::UInt32)?
        .u32()?
        .into_iter()
        .collect();
    assert_eq!(sources, vec![Some(0), Some(0), Some(1), Some(1), Some(2)]);
    Ok(())
}

#[test]
fn test_filter_many_premium() -> Result<(), Box<dyn std::error::Error>> {
    let df = df!(
        "id" => [1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10],
        "vote_counts_class" => ["few", "many", "many", "middle", "many", "not relevant", "many", "few", "many", "many"],
        "budget_class" => ["premium", "low", "premium", "premium", "higher", "premium", "middle", "low", "premium", "low"]
    )?;
    let out = filter::filter_eq(&df, &[(VOTE_COUNT_CLASS, "many"), (BUDGET_CLASS, "premium")])?;
    let ids: Vec<Option<i64>> = out.column(ID)?.i64()?.into_iter().collect();
    assert_eq!(ids, vec![Some(3), Some(9)]);
    Ok(())
}
