use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

/// Reads the delimited movies export. Column types are inferred from the
/// first `infer_schema_length` rows.
pub fn load_csv(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<DataFrame> {
    let path = path.as_ref();
    let start = Instant::now();

    let file = File::open(path).map_err(|e| PipelineError::DataAccess {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(config.infer_schema_length))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| PipelineError::DataAccess {
            path: path.to_path_buf(),
            reason: format!("malformed input: {e}"),
        })?;

    info!(
        rows = df.height(),
        columns = df.width(),
        elapsed = ?start.elapsed(),
        "loaded {}",
        path.display()
    );
    Ok(df)
}

/// Writes the table as Parquet when the extension says so, CSV otherwise.
pub fn write_table(df: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut df = df.clone();
    let mut file = File::create(path).map_err(|e| PipelineError::DataAccess {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("parquet") => {
            ParquetWriter::new(file).finish(&mut df)?;
        }
        _ => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)?;
        }
    }

    info!(rows = df.height(), "wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod test_loader {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new().map_err(|e| PipelineError::Config(e.to_string()))?;
        writeln!(file, "id,original_title,budget,vote_average").unwrap();
        writeln!(file, "1,Alien,11000000,7.5").unwrap();
        writeln!(file, "2,\"Crouching Tiger, Hidden Dragon\",17000000,7.1").unwrap();

        let df = load_csv(file.path(), &PipelineConfig::default())?;
        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("budget")?.i64()?.get(0), Some(11_000_000));
        assert_eq!(
            df.column("original_title")?.str()?.get(1),
            Some("Crouching Tiger, Hidden Dragon")
        );
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let res = load_csv("does/not/exist.csv", &PipelineConfig::default());
        assert!(matches!(res, Err(PipelineError::DataAccess { .. })));
    }

    #[test]
    fn test_write_round_trip() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|e| PipelineError::Config(e.to_string()))?;
        let path = dir.path().join("clean.csv");
        let df = df!("id" => [1i64, 2], "title" => ["Alien", "Heat"])?;

        write_table(&df, &path)?;
        let back = load_csv(&path, &PipelineConfig::default())?;
        assert!(back.equals(&df));
        Ok(())
    }

    #[test]
    fn test_write_parquet_round_trip() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|e| PipelineError::Config(e.to_string()))?;
        let path = dir.path().join("clean.parquet");
        let df = df!(
            "id" => [1i64, 2],
            "title" => ["Alien", "Heat"],
            "budget" => [11.0, 60.0]
        )?;

        write_table(&df, &path)?;
        let file = File::open(&path).map_err(|e| PipelineError::Config(e.to_string()))?;
        let back = ParquetReader::new(file).finish()?;
        assert!(back.equals(&df));
        Ok(())
    }
}
