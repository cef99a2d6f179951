//! Resolution of the published record set through the storage tiers.
//!
//! Tiers are tried in order: the processed store, the raw store, the remote
//! extract. A processed store that cannot be read or fails validation is
//! skipped with a warning. Past that point every failure stops the
//! resolution: a raw extract missing input columns, a failed download, or
//! pipeline output that breaks the published invariants. Invalid output is
//! never persisted.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::dataset::LcaDataset;
use crate::error::{LcaError, Result};
use crate::pipeline::Pipeline;
use crate::reader::{read_raw_extract, read_raw_file};
use crate::utils::logging::{create_spinner, finish_spinner, log_warning};
use crate::utils::{read_parquet, replace_file, write_parquet};
use crate::validation::{DatasetValidator, RecordSetValidator, ValidationMode};

/// Storage tier a record set was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    ProcessedStore,
    RawStore,
    RemoteFetch,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProcessedStore => f.write_str("processed store"),
            Self::RawStore => f.write_str("raw store"),
            Self::RemoteFetch => f.write_str("remote fetch"),
        }
    }
}

/// Where raw extract bytes come from when neither store can serve
pub trait RemoteSource: Send + Sync {
    /// Download the whole extract
    fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable location, for logging
    fn location(&self) -> &str;
}

/// Plain HTTP GET of a fixed URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
    show_progress: bool,
}

impl HttpSource {
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            show_progress: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            show_progress: config.show_progress,
            ..Self::new(config.data_url.clone(), config.download_timeout)
        }
    }

    fn download(&self) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.get(&self.url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

impl RemoteSource for HttpSource {
    fn fetch(&self) -> Result<Vec<u8>> {
        let pb = create_spinner(&format!("Downloading {}", self.url), self.show_progress);
        let result = self.download();
        finish_spinner(&pb, None);

        match &result {
            Ok(bytes) => log::info!("Downloaded {} bytes from {}", bytes.len(), self.url),
            Err(e) => log::error!("Download from {} failed: {e}", self.url),
        }
        result
    }

    fn location(&self) -> &str {
        &self.url
    }
}

/// Resolves and remembers the published record set
pub struct DataSource {
    config: PipelineConfig,
    remote: Box<dyn RemoteSource>,
    validator: Box<dyn RecordSetValidator>,
    pipeline: Pipeline,
    session: Mutex<Option<Arc<LcaDataset>>>,
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("config", &self.config)
            .field("remote", &self.remote.location())
            .field("pipeline", &self.pipeline)
            .field("resolved", &self.has_resolved())
            .finish_non_exhaustive()
    }
}

static GLOBAL: OnceLock<DataSource> = OnceLock::new();

impl DataSource {
    /// A source that downloads from the configured URL and validates with the
    /// configured rules
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            remote: Box::new(HttpSource::from_config(&config)),
            validator: Box::new(DatasetValidator::from_config(&config)),
            pipeline: Pipeline::from_config(&config),
            session: Mutex::new(None),
            config,
        }
    }

    /// The process-wide source, configured from the environment on first use
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| Self::new(PipelineConfig::from_env()))
    }

    #[must_use]
    pub fn with_remote(mut self, remote: impl RemoteSource + 'static) -> Self {
        self.remote = Box::new(remote);
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: impl RecordSetValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether a record set is remembered for this session
    #[must_use]
    pub fn has_resolved(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The session's record set, resolving it on first use
    pub fn load(&self) -> Result<Arc<LcaDataset>> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = session.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(self.resolve()?);
        *session = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget the session's record set; the stores are left alone
    pub fn invalidate(&self) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Rebuild the processed store from the raw store or a fresh download
    ///
    /// The processed store is not consulted and is only replaced once the
    /// rebuilt record set passes validation. On failure both the store and
    /// the session's record set are kept.
    pub fn refresh(&self) -> Result<Arc<LcaDataset>> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

        let dataset = Arc::new(self.rebuild()?);
        *session = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Walk the tiers once, ignoring the session memo
    pub fn resolve(&self) -> Result<LcaDataset> {
        if let Some(batch) = self.processed_store_hit() {
            log::info!("Resolved {} records from the processed store", batch.num_rows());
            return Ok(LcaDataset::new(batch, Tier::ProcessedStore));
        }
        self.rebuild()
    }

    /// Run the pipeline from the raw store, fetching the extract if there is none
    pub fn rebuild(&self) -> Result<LcaDataset> {
        let raw_path = self.config.raw_path();
        if raw_path.is_file() {
            let raw = read_raw_file(&raw_path).map_err(decode_error)?;
            return self.publish(&raw, Tier::RawStore);
        }

        log::info!(
            "No raw extract found, fetching it from {}",
            self.remote.location()
        );
        let bytes = self.remote.fetch().map_err(|e| {
            if e.is_fetch() {
                e
            } else {
                LcaError::Fetch(e.to_string())
            }
        })?;
        replace_file(&raw_path, &bytes)?;
        log::info!("Saved raw extract to {}", raw_path.display());

        let raw = read_raw_extract(&bytes).map_err(decode_error)?;
        self.publish(&raw, Tier::RemoteFetch)
    }

    fn processed_store_hit(&self) -> Option<RecordBatch> {
        let path = self.config.processed_path();
        if !path.is_file() {
            return None;
        }

        match read_parquet(&path) {
            Ok(batch) if self.validator.validate(&batch, ValidationMode::Processed) => Some(batch),
            Ok(_) => {
                log_warning("Processed store failed validation, rebuilding", Some(&path));
                None
            }
            Err(e) => {
                log_warning(&format!("Processed store unreadable ({e}), rebuilding"), Some(&path));
                None
            }
        }
    }

    /// Raw checks, pipeline, and persistence of valid output
    fn publish(&self, raw: &RecordBatch, origin: Tier) -> Result<LcaDataset> {
        if !self.validator.validate(raw, ValidationMode::Raw) {
            return Err(LcaError::Schema(format!(
                "raw extract from the {origin} is missing required columns"
            )));
        }

        let output = self.pipeline.transform(raw, self.validator.as_ref())?;
        if !output.valid {
            return Err(LcaError::Validation(format!(
                "{} processed records failed validation; processed store left untouched",
                output.batch.num_rows()
            )));
        }

        let processed = self.config.processed_path();
        write_parquet(&processed, &output.batch)?;
        log::info!(
            "Resolved {} records from the {origin}, saved to {}",
            output.batch.num_rows(),
            processed.display()
        );
        Ok(LcaDataset::new(output.batch, origin))
    }
}

/// Decoder failures surface as processing errors; I/O keeps its own kind
fn decode_error(error: LcaError) -> LcaError {
    match error {
        LcaError::Io(_) | LcaError::Processing(_) => error,
        other => LcaError::processing(other),
    }
}
