//! Error-band polygon construction.
//!
//! Filled-area chart widgets with a "fill to self" convention draw a shaded
//! confidence band from one closed loop: the upper envelope walked forward
//! in time, then the lower envelope walked back. Renderers that fill between
//! two separate curves can skip this and use
//! [`TimeSeries::upper_bound`]/[`TimeSeries::lower_bound`] instead.

use serde::Serialize;

use super::{AssemblyError, TimeSeries};

/// Closed polygon outlining the confidence band of a series.
///
/// `x` and `y` have length `2N` for a series of `N` points: indices `0..N`
/// trace `(time[i], mean[i] + error[i])` forward, indices `N..2N` trace
/// `(time[i], mean[i] - error[i])` backward. Empty for an empty series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBandPolygon {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ErrorBandPolygon {
    /// Build the band for an assembled series. Infallible: a [`TimeSeries`]
    /// is equal-length by construction.
    pub fn from_series(series: &TimeSeries) -> Self {
        build(&series.time, &series.mean, &series.error)
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Build the closed error-band loop from three raw sequences.
///
/// Unequal input lengths are rejected with
/// [`AssemblyError::MisalignedSeries`]; indexing past the shorter sequence
/// would silently produce a malformed polygon.
pub fn error_band(
    time: &[f64],
    mean: &[f64],
    error: &[f64],
) -> Result<ErrorBandPolygon, AssemblyError> {
    if time.len() != mean.len() || time.len() != error.len() {
        return Err(AssemblyError::MisalignedSeries {
            time_len: time.len(),
            mean_len: mean.len(),
            error_len: error.len(),
        });
    }
    Ok(build(time, mean, error))
}

fn build(time: &[f64], mean: &[f64], error: &[f64]) -> ErrorBandPolygon {
    let n = time.len();
    let mut x = Vec::with_capacity(2 * n);
    let mut y = Vec::with_capacity(2 * n);

    for i in 0..n {
        x.push(time[i]);
        y.push(mean[i] + error[i]);
    }
    for i in (0..n).rev() {
        x.push(time[i]);
        y.push(mean[i] - error[i]);
    }

    ErrorBandPolygon { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_polygon_shape() {
        let band = error_band(&[0.0, 1.0, 2.0], &[10.0, 10.0, 10.0], &[1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(band.x, vec![0.0, 1.0, 2.0, 2.0, 1.0, 0.0]);
        assert_eq!(band.y, vec![11.0, 11.0, 11.0, 9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_empty_series_gives_empty_polygon() {
        let band = error_band(&[], &[], &[]).unwrap();
        assert!(band.is_empty());
        assert!(band.y.is_empty());
    }

    #[test]
    fn test_single_point() {
        let band = error_band(&[5.0], &[10.0], &[0.5]).unwrap();
        assert_eq!(band.x, vec![5.0, 5.0]);
        assert_eq!(band.y, vec![10.5, 9.5]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = error_band(&[0.0, 1.0], &[10.0, 10.0], &[1.0]);
        match result.unwrap_err() {
            AssemblyError::MisalignedSeries {
                time_len,
                mean_len,
                error_len,
            } => assert_eq!((time_len, mean_len, error_len), (2, 2, 1)),
            other => panic!("expected MisalignedSeries, got {other:?}"),
        }
    }

    #[test]
    fn test_from_series_matches_error_band() {
        let series = TimeSeries::new(
            vec![0.0, 1.0, 2.0],
            vec![10.0, 12.0, 11.0],
            vec![0.5, 0.25, 1.0],
        )
        .unwrap();
        let from_series = ErrorBandPolygon::from_series(&series);
        let direct = error_band(&series.time, &series.mean, &series.error).unwrap();
        assert_eq!(from_series, direct);
    }

    proptest! {
        /// The polygon always has 2N vertices and its second half mirrors the
        /// time axis of the first.
        #[test]
        fn prop_polygon_is_closed_loop(
            points in proptest::collection::vec(
                (-1e6..1e6f64, -1e6..1e6f64, 0.0..1e3f64),
                0..32,
            ),
        ) {
            let time: Vec<f64> = points.iter().map(|p| p.0).collect();
            let mean: Vec<f64> = points.iter().map(|p| p.1).collect();
            let error: Vec<f64> = points.iter().map(|p| p.2).collect();

            let band = error_band(&time, &mean, &error).unwrap();
            let n = time.len();
            prop_assert_eq!(band.x.len(), 2 * n);
            prop_assert_eq!(band.y.len(), 2 * n);
            for i in 0..n {
                prop_assert_eq!(band.x[i], band.x[2 * n - 1 - i]);
                prop_assert_eq!(band.y[i], mean[i] + error[i]);
                prop_assert_eq!(band.y[2 * n - 1 - i], mean[i] - error[i]);
            }
        }
    }
}
