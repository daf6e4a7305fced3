//! In-memory report store.
//!
//! Backs the dashboard server: the report-directory loader seeds one of these
//! at startup, and the background refresh task swaps in a freshly loaded
//! instance on each scan. Interior mutability keeps the swap invisible to
//! readers; a request that already fetched its rows keeps that snapshot.

use std::sync::RwLock;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use super::{Report, ReportStore, Sample, SampleRow, StoreError};

#[derive(Debug, Default)]
struct Inner {
    reports: Vec<Report>,
    /// Signal names in first-seen order.
    signal_order: Vec<String>,
    /// Per-signal sample rows in insertion order.
    rows_by_signal: FxHashMap<String, Vec<SampleRow>>,
    sample_count: usize,
}

/// In-memory store over reports and samples.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a report and return its load-order id.
    pub fn insert_report(
        &self,
        begin_sec: Option<f64>,
        end_sec: Option<f64>,
        profile: Option<String>,
        host: Option<String>,
    ) -> i64 {
        let mut inner = self.inner.write().unwrap();
        let id = inner.reports.len() as i64;
        inner.reports.push(Report {
            id,
            begin_sec,
            end_sec,
            profile,
            host,
        });
        id
    }

    /// Add a sample, joining it with its owning report's start time.
    ///
    /// A sample referencing an unknown report is kept with an unset
    /// `begin_sec`; the validity filter in assembly excludes it from the
    /// time axis the same way it excludes runs that never recorded a start.
    pub fn insert_sample(&self, sample: Sample) {
        let mut inner = self.inner.write().unwrap();
        let begin_sec = inner
            .reports
            .get(sample.report_id as usize)
            .filter(|r| r.id == sample.report_id)
            .and_then(|r| r.begin_sec);

        if !inner.rows_by_signal.contains_key(&sample.signal) {
            inner.signal_order.push(sample.signal.clone());
        }
        inner
            .rows_by_signal
            .entry(sample.signal)
            .or_default()
            .push(SampleRow {
                begin_sec,
                mean: sample.mean,
                std: sample.std,
                count: sample.count,
            });
        inner.sample_count += 1;
    }

    /// Atomically replace this store's contents with another's.
    ///
    /// Used by the background refresh task: a fresh store is loaded from the
    /// report directory off to the side, then swapped in here in one write.
    pub fn swap_contents(&self, fresh: MemoryStore) {
        let fresh_inner = fresh.inner.into_inner().unwrap();
        *self.inner.write().unwrap() = fresh_inner;
    }

    /// Number of reports currently held.
    pub fn report_count(&self) -> usize {
        self.inner.read().unwrap().reports.len()
    }

    /// Number of samples currently held, across all signals.
    pub fn sample_count(&self) -> usize {
        self.inner.read().unwrap().sample_count
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn signal_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.read().unwrap().signal_order.clone())
    }

    async fn reports(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.inner.read().unwrap().reports.clone())
    }

    async fn samples(&self, signal: &str) -> Result<Vec<SampleRow>, StoreError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .rows_by_signal
            .get(signal)
            .cloned()
            .unwrap_or_default())
    }
}
