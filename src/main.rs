use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tmdb_eda::*;
use tracing_subscriber::EnvFilter;

/// Cleans the TMDB movies export and answers the budget, genre and cast
/// questions over it.
#[derive(Parser, Debug)]
#[command(name = "tmdb-eda", version, about, long_about = None)]
struct Cli {
    /// Delimited movies export
    #[arg(default_value = "tmdb-movies.csv")]
    input: PathBuf,

    /// TOML file overriding the pipeline defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the cleaned table here (.parquet or .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tmdb_eda=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => config::PipelineConfig::default(),
    };

    let prepared = pipeline::prepare_file(&cli.input, &config)
        .with_context(|| format!("preparing {}", cli.input.display()))?;

    if let Some(output) = &cli.output {
        loader::write_table(&prepared.movies, output)
            .with_context(|| format!("writing {}", output.display()))?;
    }

    let report = report::run_all(&prepared, &config.questions);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
