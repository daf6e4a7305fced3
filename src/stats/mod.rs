//! Statistics aggregation: time-series assembly and error-band geometry.
//!
//! The assembly path turns raw per-report samples into axis-aligned
//! (time, mean, error) triples: a shared time origin over all valid runs,
//! 95% confidence half-widths under a normal approximation, and optional
//! trailing-window truncation. The band path turns an assembled series into
//! the closed polygon a filled-area renderer draws as the confidence band.

pub mod band;
pub mod series;

pub use band::{error_band, ErrorBandPolygon};
pub use series::{
    assemble, error_half_widths, global_origin, sample_means, time_bounds, time_offsets,
    window_tail, TimeBounds, TimeSeries, Z_95,
};

use crate::store::StoreError;

/// Assembly failures.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The three raw sequences for a signal disagree in length, so index i
    /// no longer names the same sample in each. Surfaced instead of silently
    /// plotting misaligned points.
    #[error("misaligned series: time has {time_len} points, mean {mean_len}, error {error_len}")]
    MisalignedSeries {
        time_len: usize,
        mean_len: usize,
        error_len: usize,
    },
}
