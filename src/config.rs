use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::delay_manager::DelayRange;
use crate::ranking::RankWeights;
use crate::search_engine::DEFAULT_EXCLUDED_DOMAINS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    // Company names in, best website out.
    #[default]
    Website,
    // Websites in, LinkedIn page out.
    Linkedin,
}

// Every field has a default so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: LookupMode,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    // `null` disables the not-found file.
    pub not_found_path: Option<PathBuf>,
    pub max_workers: usize,
    pub max_results: usize,
    pub search_delay: DelayRange,
    pub rank_weights: RankWeights,
    pub excluded_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: LookupMode::Website,
            input_path: PathBuf::from("companies.csv"),
            output_path: PathBuf::from("results.csv"),
            not_found_path: Some(PathBuf::from("not_found.csv")),
            max_workers: 5,
            max_results: 10,
            search_delay: DelayRange::default(),
            rank_weights: RankWeights::default(),
            excluded_domains: DEFAULT_EXCLUDED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid("max_workers must be at least 1".to_string()));
        }
        if self.max_results == 0 {
            return Err(ConfigError::Invalid("max_results must be at least 1".to_string()));
        }
        Ok(())
    }

    // LinkedIn lookups need linkedin.com results, so it is never filtered in that mode.
    pub fn search_exclusions(&self) -> Vec<String> {
        self.excluded_domains
            .iter()
            .filter(|d| self.mode != LookupMode::Linkedin || !d.eq_ignore_ascii_case("linkedin.com"))
            .cloned()
            .collect()
    }
}
