use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::columns;
use crate::error::{PipelineError, Result};

/// Knobs of the cleaning pipeline and of the question batch.
/// The defaults reproduce the original analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub drop_columns: Vec<String>,
    pub sentinel: String,
    pub money_divisor: f64,
    /// Lower edges of the runtime classes; the last edge is max(runtime).
    pub runtime_breakpoints: Vec<i64>,
    pub quantile_bins: usize,
    pub infer_schema_length: usize,
    pub questions: QuestionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionConfig {
    pub top_n: usize,
    pub focus_actor: String,
    pub focus_genre: String,
    pub focus_vote_count_class: String,
    pub focus_budget_class: String,
    pub top_companies: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            drop_columns: columns::NOT_RELEVANT.iter().map(|c| c.to_string()).collect(),
            sentinel: "Unknown".to_string(),
            money_divisor: 1_000_000.0,
            runtime_breakpoints: vec![0, 30, 60, 120],
            quantile_bins: 4,
            infer_schema_length: 10_000,
            questions: QuestionConfig::default(),
        }
    }
}

impl Default for QuestionConfig {
    fn default() -> Self {
        QuestionConfig {
            top_n: 10,
            focus_actor: "Robert De Niro".to_string(),
            focus_genre: "TV Movie".to_string(),
            focus_vote_count_class: "many".to_string(),
            focus_budget_class: "premium".to_string(),
            top_companies: 20,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| PipelineError::DataAccess {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(contents).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Every classification has four labels, so both the quantile bin count
    /// and the runtime breakpoints must describe four bins.
    pub fn validate(&self) -> Result<()> {
        if self.quantile_bins != 4 {
            return Err(PipelineError::Config(format!(
                "quantile_bins must be 4, got {}",
                self.quantile_bins
            )));
        }
        if self.runtime_breakpoints.len() != 4 {
            return Err(PipelineError::Config(format!(
                "runtime_breakpoints needs 4 lower edges, got {}",
                self.runtime_breakpoints.len()
            )));
        }
        if self.runtime_breakpoints.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PipelineError::Config(
                "runtime_breakpoints must be strictly increasing".to_string(),
            ));
        }
        if self.money_divisor == 0.0 {
            return Err(PipelineError::Config("money_divisor must not be 0".to_string()));
        }
        Ok(())
    }
}
