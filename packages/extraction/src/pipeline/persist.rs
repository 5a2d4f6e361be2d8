//! Persistence of a run's records as one timestamped JSON file.
//!
//! The file looks like:
//!
//! ```json
//! {
//!   "metadata": { "url": "...", "timestamp": "20240101_120000", "course_count": 1 },
//!   "results": { "courses": [ ... ] }
//! }
//! ```
//!
//! Key names come from the use case's [`BundleLayout`].

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::types::result::Record;
use crate::use_case::BundleLayout;

/// Timestamp format used in file names and metadata.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Upper bound on `_N` suffixes tried before giving up.
const MAX_SUFFIX: u32 = 10_000;

/// The persisted artifact of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBundle {
    pub url: String,
    pub timestamp: String,
    pub records: Vec<Record>,
    pub layout: BundleLayout,
}

impl ResultBundle {
    pub fn new(
        url: impl Into<String>,
        records: Vec<Record>,
        layout: BundleLayout,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            url: url.into(),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            records,
            layout,
        }
    }

    /// File name without any collision suffix.
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.layout.file_prefix, self.timestamp)
    }

    pub fn to_json(&self) -> Value {
        let mut metadata = Map::new();
        metadata.insert("url".into(), Value::String(self.url.clone()));
        metadata.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        metadata.insert(
            self.layout.count_field.clone(),
            Value::from(self.records.len()),
        );

        let mut results = Map::new();
        results.insert(
            self.layout.records_key.clone(),
            Value::Array(self.records.iter().cloned().map(Value::Object).collect()),
        );

        let mut root = Map::new();
        root.insert("metadata".into(), Value::Object(metadata));
        root.insert("results".into(), Value::Object(results));
        Value::Object(root)
    }
}

/// Write `bundle` under `dir` and return the path written.
///
/// The directory is created if missing. The document is fully serialized
/// before any file is created. An existing file is never replaced: a `_1`,
/// `_2`, ... suffix is added instead.
pub fn write_bundle(dir: &Path, bundle: &ResultBundle) -> Result<PathBuf> {
    let bytes = serde_json::to_vec_pretty(&bundle.to_json()).map_err(|e| ScrapeError::Persist {
        path: dir.join(bundle.file_name()),
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })?;

    fs::create_dir_all(dir).map_err(|source| ScrapeError::Persist {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = format!("{}_{}", bundle.layout.file_prefix, bundle.timestamp);
    for attempt in 0..=MAX_SUFFIX {
        let name = if attempt == 0 {
            format!("{stem}.json")
        } else {
            format!("{stem}_{attempt}.json")
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                if let Err(source) = file.write_all(&bytes).and_then(|_| file.flush()) {
                    drop(file);
                    let _ = fs::remove_file(&path);
                    return Err(ScrapeError::Persist { path, source });
                }
                info!(
                    path = %path.display(),
                    records = bundle.records.len(),
                    "Saved results"
                );
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Output file exists, trying next suffix");
            }
            Err(source) => return Err(ScrapeError::Persist { path, source }),
        }
    }

    Err(ScrapeError::Persist {
        path: dir.join(format!("{stem}.json")),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free file name"),
    })
}
