//! Statistics aggregation and time-series assembly for the run-report dashboard.
//!
//! This crate serves aggregated run statistics (mean, 95% confidence half-width,
//! time axis) from a directory of JSON report documents over HTTP, ready for a
//! charting front end to plot as time series with shaded confidence bands.
//!
//! ## Architecture
//!
//! The crate consists of four layers:
//!
//! 1. **Store** (`store` module) - Read-only query surface over reports and
//!    their per-signal samples, backed by an in-memory store loaded from a
//!    directory of JSON report documents.
//!
//! 2. **Signal Discovery** (`signal` module) - Enumerates the signals present
//!    in the store and maps each display name to a DOM-safe identifier with a
//!    validated, reversible transform.
//!
//! 3. **Statistics** (`stats` module) - Derives the shared time origin,
//!    computes confidence half-widths, applies trailing-window truncation,
//!    and builds the closed error-band polygon for shaded-region rendering.
//!
//! 4. **Server** (`server` module) - Thin axum routes exposing the above as
//!    plain GET/JSON endpoints.
//!
//! ## Usage
//!
//! Run the server against a directory of report documents:
//!
//! ```bash
//! report-stats-viewer /data/reports --port 8060 --refresh-secs 30
//! ```

pub mod server;
pub mod signal;
pub mod stats;
pub mod store;
