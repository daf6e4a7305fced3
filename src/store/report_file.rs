//! JSON report documents and the directory loader.
//!
//! One document per run: run metadata plus the per-signal aggregate samples
//! recorded for it. Filenames carry the run start timestamp
//! (`report-20260826T120000Z.json`), so lexicographic path order is
//! chronological and load-order report ids follow run order.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{MemoryStore, Sample, StoreError};

/// One run's report document as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Run start, epoch seconds. Absent or zero means the run never
    /// recorded a proper start.
    #[serde(default)]
    pub begin_sec: Option<f64>,
    #[serde(default)]
    pub end_sec: Option<f64>,
    #[serde(default)]
    pub samples: Vec<SampleDocument>,
}

/// One aggregated signal observation within a report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDocument {
    /// Signal display name, e.g. `"runtime (s)"`.
    pub signal: String,
    pub mean: f64,
    /// Sample standard deviation across the underlying observations.
    #[serde(default)]
    pub std: f64,
    /// Number of underlying observations.
    #[serde(default)]
    pub count: u64,
}

/// Load every `*.json` report document under `dir` into a fresh store.
///
/// Paths are globbed recursively and sorted lexicographically before loading,
/// so timestamped filenames yield chronological report ids. Documents are
/// parsed in parallel; any unreadable or malformed document fails the whole
/// load rather than seeding a partial store.
pub fn load_report_dir(dir: &Path) -> Result<MemoryStore, StoreError> {
    let pattern = format!("{}/**/*.json", dir.display());

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in glob(&pattern)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => tracing::warn!(error = %e, "Skipping unreadable directory entry"),
        }
    }
    paths.sort();

    let documents: Vec<(PathBuf, ReportDocument)> = paths
        .par_iter()
        .map(|path| {
            let content = fs::read_to_string(path)?;
            let doc: ReportDocument =
                serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                    path: path.clone(),
                    source,
                })?;
            Ok((path.clone(), doc))
        })
        .collect::<Result<_, StoreError>>()?;

    let store = MemoryStore::new();
    for (path, doc) in documents {
        let report_id =
            store.insert_report(doc.begin_sec, doc.end_sec, doc.profile, doc.host);
        tracing::debug!(
            report_id,
            path = %path.display(),
            samples = doc.samples.len(),
            "Loaded report document"
        );
        for sample in doc.samples {
            store.insert_sample(Sample {
                signal: sample.signal,
                report_id,
                mean: sample.mean,
                std: sample.std,
                count: sample.count,
            });
        }
    }

    Ok(store)
}

impl MemoryStore {
    /// Re-scan a report directory and atomically swap in its contents.
    ///
    /// On success returns the new (report, sample) counts. On failure the
    /// previous contents are kept untouched; the background refresh task
    /// logs and retries on its next tick.
    pub fn reload_from_dir(&self, dir: &Path) -> Result<(usize, usize), StoreError> {
        let fresh = load_report_dir(dir)?;
        let counts = (fresh.report_count(), fresh.sample_count());
        self.swap_contents(fresh);
        Ok(counts)
    }
}
