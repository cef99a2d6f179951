//! Configuration for the LCA pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LcaError, Result};
use crate::filter::FilterThresholds;

/// Default directory holding the raw and processed stores
pub const DEFAULT_DATA_DIR: &str = "data";
/// Fixed artifact name of the processed store
pub const PROCESSED_DATA_FILE: &str = "processed_h1b_data.parquet";
/// Fixed artifact name of the raw store
pub const RAW_DATA_FILE: &str = "raw_h1b_data.xlsx";
/// Remote location of the disclosure extract
pub const DATA_URL: &str =
    "https://www.dol.gov/sites/dolgov/files/ETA/oflc/pdfs/LCA_Disclosure_Data_FY2024_Q1.xlsx";
/// Minimum number of records a processed set must hold
pub const MIN_ROWS: usize = 100;
/// Upper bound on the single remote fetch
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the pipeline and its stores
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Directory holding both store files
    pub data_dir: PathBuf,
    /// File name of the raw store inside `data_dir`
    pub raw_file_name: String,
    /// File name of the processed store inside `data_dir`
    pub processed_file_name: String,
    /// URL the raw extract is downloaded from
    pub data_url: String,
    /// Timeout for the remote fetch
    pub download_timeout: Duration,
    /// Business-rule bounds applied by the record filter and the validator
    pub thresholds: FilterThresholds,
    /// Row-count floor for a processed record set
    pub min_rows: usize,
    /// Show spinners for long-running stages
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            raw_file_name: RAW_DATA_FILE.to_string(),
            processed_file_name: PROCESSED_DATA_FILE.to_string(),
            data_url: DATA_URL.to_string(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            thresholds: FilterThresholds::default(),
            min_rows: MIN_ROWS,
            show_progress: true,
        }
    }
}

/// On-disk form of [`PipelineConfig`]; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    raw_file_name: Option<String>,
    processed_file_name: Option<String>,
    data_url: Option<String>,
    download_timeout_secs: Option<u64>,
    min_wage: Option<f64>,
    max_wage: Option<f64>,
    min_ratio: Option<f64>,
    max_ratio: Option<f64>,
    min_rows: Option<usize>,
    show_progress: Option<bool>,
}

impl PipelineConfig {
    /// Create a configuration rooted at a specific data directory
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `LCA_*` environment variables
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("LCA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("LCA_DATA_URL") {
            config.data_url = url;
        }
        if let Some(rows) = env_number::<usize>("LCA_MIN_ROWS") {
            config.min_rows = rows;
        }
        if let Some(secs) = env_number::<u64>("LCA_DOWNLOAD_TIMEOUT_SECS") {
            config.download_timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Load a TOML file on top of `self`
    pub fn merge_toml_file(mut self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LcaError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| LcaError::Config(format!("invalid {}: {e}", path.display())))?;

        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(name) = file.raw_file_name {
            self.raw_file_name = name;
        }
        if let Some(name) = file.processed_file_name {
            self.processed_file_name = name;
        }
        if let Some(url) = file.data_url {
            self.data_url = url;
        }
        if let Some(secs) = file.download_timeout_secs {
            self.download_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = file.min_wage {
            self.thresholds.min_wage = v;
        }
        if let Some(v) = file.max_wage {
            self.thresholds.max_wage = v;
        }
        if let Some(v) = file.min_ratio {
            self.thresholds.min_ratio = v;
        }
        if let Some(v) = file.max_ratio {
            self.thresholds.max_ratio = v;
        }
        if let Some(rows) = file.min_rows {
            self.min_rows = rows;
        }
        if let Some(show) = file.show_progress {
            self.show_progress = show;
        }

        self.thresholds.check()?;
        Ok(self)
    }

    /// Defaults, then environment, then the given TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        Self::from_env().merge_toml_file(path)
    }

    /// Full path of the raw store
    #[must_use]
    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join(&self.raw_file_name)
    }

    /// Full path of the processed store
    #[must_use]
    pub fn processed_path(&self) -> PathBuf {
        self.data_dir.join(&self.processed_file_name)
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {name}={raw}: not a valid number");
            None
        }
    }
}
