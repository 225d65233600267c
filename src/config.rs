//! Pipeline configuration, read from an optional JSON file.

use crate::data::DEFAULT_INFER_SCHEMA_LENGTH;
use crate::stats::DEFAULT_TOP_N;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub trade_path: PathBuf,
    pub reference_path: PathBuf,
    pub output_dir: PathBuf,
    pub top_n: usize,
    pub infer_schema_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trade_path: PathBuf::from("data/data_raw.csv"),
            reference_path: PathBuf::from("data/country_code_conversion.csv"),
            output_dir: PathBuf::from("output"),
            top_n: DEFAULT_TOP_N,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
