//! Read-only data source for reports and their per-signal samples.
//!
//! A "report" is one execution run; a "sample" is one aggregated observation
//! of a signal within a run (mean, standard deviation, observation count).
//! The aggregation core only ever reads, so the trait exposes three queries
//! and nothing else. Implementations must preserve insertion order for
//! `reports` and `samples`: time-series assembly relies on the per-signal
//! row sequence being stable across the fetches of one request.

pub mod memory;
pub mod report_file;

pub use memory::MemoryStore;
pub use report_file::{load_report_dir, ReportDocument, SampleDocument};

use std::path::PathBuf;

use async_trait::async_trait;

/// One execution run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Load-order id, stable for the lifetime of one store generation.
    pub id: i64,
    /// Run start, epoch seconds. `None` or `0.0` means unset.
    pub begin_sec: Option<f64>,
    /// Run end, epoch seconds. Same validity rule as `begin_sec`.
    pub end_sec: Option<f64>,
    /// Workload/profile label carried from the report document.
    pub profile: Option<String>,
    /// Host the run executed on.
    pub host: Option<String>,
}

impl Report {
    /// Start time, filtered for validity: a missing or zero `begin_sec`
    /// marks a run that never recorded a proper start.
    pub fn valid_begin(&self) -> Option<f64> {
        self.begin_sec.filter(|&b| b != 0.0)
    }

    /// End time under the same validity rule as [`Report::valid_begin`].
    pub fn valid_end(&self) -> Option<f64> {
        self.end_sec.filter(|&e| e != 0.0)
    }
}

/// One observation of a signal within a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Display name of the observed signal, e.g. `"runtime (s)"`.
    pub signal: String,
    /// Owning report. A sample does not own its report.
    pub report_id: i64,
    pub mean: f64,
    /// Sample standard deviation across the underlying observations.
    pub std: f64,
    /// Number of underlying observations; zero means no error estimate.
    pub count: u64,
}

/// The join row assembly consumes: a sample's aggregate stats together with
/// the owning report's start time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    /// Owning report's `begin_sec`. `None` or `0.0` means unset.
    pub begin_sec: Option<f64>,
    pub mean: f64,
    pub std: f64,
    pub count: u64,
}

impl SampleRow {
    /// Owning report's start time, filtered for validity.
    pub fn valid_begin(&self) -> Option<f64> {
        self.begin_sec.filter(|&b| b != 0.0)
    }
}

/// Store query failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse report {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Read-only query surface the aggregation core depends on.
///
/// An unknown signal yields empty rows, never an error: the dashboard renders
/// "no data" for it instead of a broken chart.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Distinct signal names in first-seen order.
    async fn signal_names(&self) -> Result<Vec<String>, StoreError>;

    /// All reports in insertion order.
    async fn reports(&self) -> Result<Vec<Report>, StoreError>;

    /// Sample rows for one signal in insertion order, each joined with its
    /// owning report's `begin_sec`.
    async fn samples(&self, signal: &str) -> Result<Vec<SampleRow>, StoreError>;
}
