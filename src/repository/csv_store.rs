//! CSV-backed record store.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::models::{Column, PatentRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("dataset file is empty")]
    Empty,
    #[error("dataset is missing column: {0}")]
    MissingColumn(&'static str),
    #[error("dataset unavailable: {0}")]
    Unavailable(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A fully loaded dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<PatentRecord>,
    pub source: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Read and validate a dataset file. Blocking.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        let records = read_records(text.as_bytes())?;

        Ok(Self {
            records,
            source: path.to_path_buf(),
            loaded_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse patent records from CSV with a header row.
///
/// All ten columns must be present; extra columns are ignored.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<PatentRecord>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(StoreError::Empty);
    }
    for column in Column::ALL {
        if !headers.iter().any(|h| h == column.header()) {
            return Err(StoreError::MissingColumn(column.header()));
        }
    }

    let mut records = Vec::new();
    for row in rdr.deserialize::<PatentRecord>() {
        records.push(row?);
    }
    Ok(records)
}

/// Write records as CSV, header first, in canonical column order.
pub fn write_records<'a, W, I>(writer: W, records: I) -> Result<(), StoreError>
where
    W: Write,
    I: IntoIterator<Item = &'a PatentRecord>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(Column::ALL.map(|c| c.header()))?;
    for record in records {
        wtr.write_record(record.values())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Current state of the in-memory dataset.
#[derive(Debug, Clone)]
pub enum DatasetState {
    Loaded(Arc<Dataset>),
    /// The file does not exist yet.
    Missing(PathBuf),
    /// The file exists but could not be read.
    Failed(String),
}

impl DatasetState {
    fn from_result(path: &Path, result: Result<Dataset, StoreError>) -> Self {
        match result {
            Ok(dataset) => DatasetState::Loaded(Arc::new(dataset)),
            Err(StoreError::NotFound(_)) => DatasetState::Missing(path.to_path_buf()),
            Err(e) => DatasetState::Failed(e.to_string()),
        }
    }
}

/// Process-wide holder of the dataset snapshot.
pub struct RecordStore {
    path: PathBuf,
    state: RwLock<DatasetState>,
}

impl RecordStore {
    /// Create the store and attempt the initial load.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = Self {
            state: RwLock::new(DatasetState::Missing(path.clone())),
            path,
        };
        // Failures are kept in the state and surfaced on the dashboard.
        let _ = store.reload().await;
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone of the current snapshot.
    pub async fn snapshot(&self) -> DatasetState {
        self.state.read().await.clone()
    }

    /// The loaded dataset, or why there is none.
    pub async fn dataset(&self) -> Result<Arc<Dataset>, StoreError> {
        match self.snapshot().await {
            DatasetState::Loaded(dataset) => Ok(dataset),
            DatasetState::Missing(path) => Err(StoreError::NotFound(path)),
            DatasetState::Failed(message) => Err(StoreError::Unavailable(message)),
        }
    }

    /// Re-read the dataset file and swap the snapshot.
    ///
    /// On failure the previous snapshot is dropped so the error is visible.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || Dataset::load(&path)).await?;

        let outcome = match &result {
            Ok(dataset) => {
                info!(path = %self.path.display(), records = dataset.len(), "Loaded patent dataset");
                Ok(dataset.len())
            }
            Err(StoreError::NotFound(path)) => {
                warn!(path = %path.display(), "Patent dataset not found");
                Err(StoreError::NotFound(path.clone()))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load patent dataset");
                Err(StoreError::Unavailable(e.to_string()))
            }
        };

        *self.state.write().await = DatasetState::from_result(&self.path, result);
        outcome
    }

    /// Replace the dataset wholesale.
    ///
    /// Writes to a temporary file next to the target and renames it into
    /// place, then swaps the snapshot.
    pub async fn replace(&self, records: Vec<PatentRecord>) -> Result<usize, StoreError> {
        let path = self.path.clone();
        let dataset = tokio::task::spawn_blocking(move || -> Result<Dataset, StoreError> {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            fs::create_dir_all(&dir)?;

            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            write_records(&mut tmp, &records)?;
            tmp.persist(&path).map_err(|e| e.error)?;
            debug!(path = %path.display(), "Persisted replacement dataset");

            Ok(Dataset {
                records,
                source: path,
                loaded_at: Utc::now(),
            })
        })
        .await??;

        let count = dataset.len();
        info!(path = %self.path.display(), records = count, "Replaced patent dataset");
        *self.state.write().await = DatasetState::Loaded(Arc::new(dataset));
        Ok(count)
    }
}
