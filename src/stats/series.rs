//! Time-series assembly over raw per-report samples.
//!
//! Every chart shares one time origin: the earliest valid run start across
//! all reports. Each signal's series is then three parallel sequences of
//! equal length, index-aligned to the same underlying samples: seconds since
//! the origin, per-sample mean, and the 95% confidence half-width
//! `1.96 * std / sqrt(count)`. The origin is recomputed on every assembly
//! rather than cached, so a refreshed store never mixes origins.

use serde::Serialize;

use super::AssemblyError;
use crate::store::{Report, ReportStore, SampleRow};

/// z-score for a 95% confidence interval under a normal approximation.
pub const Z_95: f64 = 1.96;

/// Earliest and latest valid run timestamps across all reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeBounds {
    /// Minimum valid `begin_sec`, the shared time origin.
    pub start: f64,
    /// Maximum valid `end_sec`; falls back to `start` when no run recorded
    /// a valid end.
    pub end: f64,
}

/// One signal's assembled series: three equal-length, index-aligned
/// sequences. Built fresh per request and discarded after handoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    /// Seconds since the global origin, in source order.
    pub time: Vec<f64>,
    pub mean: Vec<f64>,
    /// 95% confidence half-width per sample.
    pub error: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, rejecting unequal sequence lengths.
    pub fn new(
        time: Vec<f64>,
        mean: Vec<f64>,
        error: Vec<f64>,
    ) -> Result<Self, AssemblyError> {
        if time.len() != mean.len() || time.len() != error.len() {
            return Err(AssemblyError::MisalignedSeries {
                time_len: time.len(),
                mean_len: mean.len(),
                error_len: error.len(),
            });
        }
        Ok(Self { time, mean, error })
    }

    pub fn empty() -> Self {
        Self {
            time: Vec::new(),
            mean: Vec::new(),
            error: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// `mean + error` per point, for renderers that fill between two curves
    /// instead of filling a closed polygon.
    pub fn upper_bound(&self) -> Vec<f64> {
        self.mean
            .iter()
            .zip(&self.error)
            .map(|(m, e)| m + e)
            .collect()
    }

    /// `mean - error` per point.
    pub fn lower_bound(&self) -> Vec<f64> {
        self.mean
            .iter()
            .zip(&self.error)
            .map(|(m, e)| m - e)
            .collect()
    }
}

/// The shared time origin: minimum valid `begin_sec` over all reports.
///
/// `None` when no report has a valid start, in which case nothing can be
/// placed on a time axis.
pub fn global_origin(reports: &[Report]) -> Option<f64> {
    reports.iter().filter_map(Report::valid_begin).reduce(f64::min)
}

/// Earliest valid start and latest valid end across all reports.
pub fn time_bounds(reports: &[Report]) -> Option<TimeBounds> {
    let start = global_origin(reports)?;
    let end = reports
        .iter()
        .filter_map(Report::valid_end)
        .reduce(f64::max)
        .unwrap_or(start);
    Some(TimeBounds { start, end })
}

/// Seconds since `origin` for every row with a valid run start, in source
/// order. No sort is applied; callers must not assume chronological order
/// beyond what the store's insertion order provides.
pub fn time_offsets(rows: &[SampleRow], origin: f64) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| row.valid_begin().map(|begin| begin - origin))
        .collect()
}

/// Per-sample means for every row with a valid run start.
pub fn sample_means(rows: &[SampleRow]) -> Vec<f64> {
    rows.iter()
        .filter(|row| row.valid_begin().is_some())
        .map(|row| row.mean)
        .collect()
}

/// 95% confidence half-widths for every row with a valid run start and a
/// nonzero observation count. A `count == 0` row has no error estimate and
/// contributes nothing, which shows up as a misalignment rather than a
/// fabricated zero.
pub fn error_half_widths(rows: &[SampleRow]) -> Vec<f64> {
    rows.iter()
        .filter(|row| row.valid_begin().is_some() && row.count > 0)
        .map(|row| Z_95 * row.std / (row.count as f64).sqrt())
        .collect()
}

/// Keep the trailing `n` elements when a positive window smaller than the
/// sequence is requested; otherwise the full sequence.
pub fn window_tail(seq: &[f64], window: Option<usize>) -> Vec<f64> {
    match window {
        Some(n) if n > 0 && seq.len() > n => seq[seq.len() - n..].to_vec(),
        _ => seq.to_vec(),
    }
}

/// Assemble one signal's series from the store.
///
/// The report set is fetched first: the time axis depends on the origin
/// derived from it. The three raw sequences are then independent fetches
/// with no mutual ordering; all must succeed or the assembly aborts with
/// no partial result. Raw lengths are validated before windowing, since
/// equal-length inputs stay index-aligned through identical trailing-window
/// truncation.
///
/// An unknown signal and a store with no valid run start both yield an
/// empty series, not an error.
pub async fn assemble(
    store: &dyn ReportStore,
    signal: &str,
    window: Option<usize>,
) -> Result<TimeSeries, AssemblyError> {
    let reports = store.reports().await?;
    let Some(origin) = global_origin(&reports) else {
        return Ok(TimeSeries::empty());
    };

    let (time, mean, error) = tokio::try_join!(
        async {
            Ok::<_, AssemblyError>(time_offsets(&store.samples(signal).await?, origin))
        },
        async { Ok(sample_means(&store.samples(signal).await?)) },
        async { Ok(error_half_widths(&store.samples(signal).await?)) },
    )?;

    if time.len() != mean.len() || time.len() != error.len() {
        return Err(AssemblyError::MisalignedSeries {
            time_len: time.len(),
            mean_len: mean.len(),
            error_len: error.len(),
        });
    }

    TimeSeries::new(
        window_tail(&time, window),
        window_tail(&mean, window),
        window_tail(&error, window),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Sample};
    use proptest::prelude::*;

    fn make_report(id: i64, begin_sec: Option<f64>) -> Report {
        Report {
            id,
            begin_sec,
            end_sec: begin_sec.map(|b| b + 60.0),
            profile: None,
            host: None,
        }
    }

    fn make_row(begin_sec: Option<f64>, mean: f64, std: f64, count: u64) -> SampleRow {
        SampleRow {
            begin_sec,
            mean,
            std,
            count,
        }
    }

    /// Store with reports starting at 100, 200, ... and one sample of
    /// `signal` per report.
    fn seeded_store(signal: &str, n: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..n {
            let id = store.insert_report(Some(100.0 * (i + 1) as f64), None, None, None);
            store.insert_sample(Sample {
                signal: signal.to_string(),
                report_id: id,
                mean: 10.0 + i as f64,
                std: 2.0,
                count: 4,
            });
        }
        store
    }

    #[test]
    fn test_global_origin_skips_zero_and_unset() {
        let reports = vec![
            make_report(0, Some(0.0)),
            make_report(1, Some(100.0)),
            make_report(2, Some(200.0)),
            make_report(3, None),
        ];
        assert_eq!(global_origin(&reports), Some(100.0));
    }

    #[test]
    fn test_global_origin_empty() {
        assert_eq!(global_origin(&[]), None);
        assert_eq!(
            global_origin(&[make_report(0, None), make_report(1, Some(0.0))]),
            None
        );
    }

    #[test]
    fn test_time_bounds() {
        let reports = vec![
            make_report(0, Some(100.0)),
            make_report(1, Some(300.0)),
            make_report(2, None),
        ];
        let bounds = time_bounds(&reports).unwrap();
        assert_eq!(bounds.start, 100.0);
        assert_eq!(bounds.end, 360.0);
    }

    #[test]
    fn test_time_bounds_without_valid_end() {
        let reports = vec![Report {
            id: 0,
            begin_sec: Some(100.0),
            end_sec: Some(0.0),
            profile: None,
            host: None,
        }];
        let bounds = time_bounds(&reports).unwrap();
        assert_eq!(bounds.start, 100.0);
        assert_eq!(bounds.end, 100.0);
    }

    #[test]
    fn test_error_half_width_value() {
        let rows = vec![make_row(Some(100.0), 10.0, 2.0, 4)];
        assert_eq!(error_half_widths(&rows), vec![1.96]);
    }

    #[test]
    fn test_error_half_width_excludes_zero_count() {
        let rows = vec![
            make_row(Some(100.0), 10.0, 2.0, 4),
            make_row(Some(200.0), 11.0, 2.0, 0),
        ];
        // Absent, not zero.
        assert_eq!(error_half_widths(&rows), vec![1.96]);
    }

    #[test]
    fn test_derivations_filter_invalid_begin() {
        let rows = vec![
            make_row(Some(100.0), 10.0, 2.0, 4),
            make_row(Some(0.0), 11.0, 2.0, 4),
            make_row(None, 12.0, 2.0, 4),
            make_row(Some(250.0), 13.0, 2.0, 4),
        ];
        assert_eq!(time_offsets(&rows, 100.0), vec![0.0, 150.0]);
        assert_eq!(sample_means(&rows), vec![10.0, 13.0]);
        assert_eq!(error_half_widths(&rows).len(), 2);
    }

    #[test]
    fn test_window_tail() {
        let seq = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(window_tail(&seq, None), seq);
        assert_eq!(window_tail(&seq, Some(0)), seq);
        assert_eq!(window_tail(&seq, Some(5)), seq);
        assert_eq!(window_tail(&seq, Some(8)), seq);
        assert_eq!(window_tail(&seq, Some(2)), vec![4.0, 5.0]);
    }

    #[tokio::test]
    async fn test_assemble_full_series() {
        let store = seeded_store("runtime (s)", 3);
        let series = assemble(&store, "runtime (s)", None).await.unwrap();

        assert_eq!(series.time, vec![0.0, 100.0, 200.0]);
        assert_eq!(series.mean, vec![10.0, 11.0, 12.0]);
        assert_eq!(series.error, vec![1.96, 1.96, 1.96]);
    }

    #[tokio::test]
    async fn test_assemble_windowed_is_trailing_and_aligned() {
        let store = seeded_store("runtime (s)", 5);
        let series = assemble(&store, "runtime (s)", Some(2)).await.unwrap();

        assert_eq!(series.time, vec![300.0, 400.0]);
        assert_eq!(series.mean, vec![13.0, 14.0]);
        assert_eq!(series.error.len(), 2);
    }

    #[tokio::test]
    async fn test_assemble_window_at_least_length_is_identity() {
        let store = seeded_store("runtime (s)", 3);
        let full = assemble(&store, "runtime (s)", None).await.unwrap();
        let windowed = assemble(&store, "runtime (s)", Some(3)).await.unwrap();
        assert_eq!(full, windowed);
    }

    #[tokio::test]
    async fn test_assemble_unknown_signal_is_empty() {
        let store = seeded_store("runtime (s)", 3);
        let series = assemble(&store, "nonexistent", None).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_assemble_without_valid_origin_is_empty() {
        let store = MemoryStore::new();
        let id = store.insert_report(Some(0.0), None, None, None);
        store.insert_sample(Sample {
            signal: "runtime (s)".to_string(),
            report_id: id,
            mean: 10.0,
            std: 2.0,
            count: 4,
        });

        let series = assemble(&store, "runtime (s)", None).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_assemble_misaligned_by_zero_count() {
        // Five samples, one with count == 0: time and mean have 5 points,
        // error only 4. Must error, not silently truncate.
        let store = seeded_store("runtime (s)", 4);
        let id = store.insert_report(Some(600.0), None, None, None);
        store.insert_sample(Sample {
            signal: "runtime (s)".to_string(),
            report_id: id,
            mean: 14.0,
            std: 2.0,
            count: 0,
        });

        let err = assemble(&store, "runtime (s)", None).await.unwrap_err();
        match err {
            AssemblyError::MisalignedSeries {
                time_len,
                mean_len,
                error_len,
            } => {
                assert_eq!((time_len, mean_len, error_len), (5, 5, 4));
            }
            other => panic!("expected MisalignedSeries, got {other:?}"),
        }
    }

    #[test]
    fn test_time_series_new_rejects_mismatch() {
        let result = TimeSeries::new(vec![0.0, 1.0], vec![1.0], vec![0.1, 0.2]);
        assert!(matches!(
            result.unwrap_err(),
            AssemblyError::MisalignedSeries { .. }
        ));
    }

    #[test]
    fn test_upper_lower_bounds() {
        let series =
            TimeSeries::new(vec![0.0, 1.0], vec![10.0, 20.0], vec![1.0, 2.0]).unwrap();
        assert_eq!(series.upper_bound(), vec![11.0, 22.0]);
        assert_eq!(series.lower_bound(), vec![9.0, 18.0]);
    }

    proptest! {
        /// Windowing keeps exactly the trailing elements, never reorders.
        #[test]
        fn prop_window_tail_is_suffix(
            seq in proptest::collection::vec(-1e9..1e9f64, 0..64),
            n in 0usize..80,
        ) {
            let windowed = window_tail(&seq, Some(n));
            let expected_len = if n > 0 { seq.len().min(n) } else { seq.len() };
            prop_assert_eq!(windowed.len(), expected_len);
            prop_assert_eq!(&seq[seq.len() - windowed.len()..], &windowed[..]);
        }

        /// A window of at least the sequence length is the identity.
        #[test]
        fn prop_window_tail_identity(
            seq in proptest::collection::vec(-1e9..1e9f64, 0..64),
        ) {
            let n = seq.len();
            prop_assert_eq!(window_tail(&seq, Some(n)), seq.clone());
            prop_assert_eq!(window_tail(&seq, Some(n + 1)), seq);
        }
    }
}
