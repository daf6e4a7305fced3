//! HTTP query surface for the dashboard.
//!
//! Thin axum routes over the aggregation core, all GET returning JSON:
//! signal discovery, the three raw per-signal sequences, the full assembled
//! series with its error-band polygon, and the global time bounds. A signal
//! with no samples answers with empty arrays, never an error: the front end
//! renders "no data" instead of a broken chart.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tower_http::cors::CorsLayer;

use crate::signal::{self, Signal};
use crate::stats::{
    self, assemble, time_bounds, AssemblyError, ErrorBandPolygon, TimeBounds,
};
use crate::store::{ReportStore, StoreError};

/// Application state shared across handlers.
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
}

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8060,
            open_browser: true,
        }
    }
}

/// Build the application router over a store.
pub fn build_router(store: Arc<dyn ReportStore>) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/signals", get(signals_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/timeseries", get(timeseries_handler))
        .route("/api/bounds", get(bounds_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn run_server(store: Arc<dyn ReportStore>, config: ServerConfig) -> anyhow::Result<()> {
    let app = build_router(store);

    // Bind to 0.0.0.0 so the dashboard is reachable from other hosts
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    if config.open_browser {
        let url = format!("http://127.0.0.1:{}", config.port);
        eprintln!("\nOpening browser at {}", url);
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
    }

    eprintln!("Server running at http://0.0.0.0:{}", config.port);
    eprintln!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Errors ---

/// API failures mapped to HTTP status codes.
enum ApiError {
    /// The backing store could not be queried.
    Store(StoreError),
    /// The three raw sequences for a signal disagree in length.
    Misaligned {
        time_len: usize,
        mean_len: usize,
        error_len: usize,
    },
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<AssemblyError> for ApiError {
    fn from(e: AssemblyError) -> Self {
        match e {
            AssemblyError::Store(e) => ApiError::Store(e),
            AssemblyError::MisalignedSeries {
                time_len,
                mean_len,
                error_len,
            } => ApiError::Misaligned {
                time_len,
                mean_len,
                error_len,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Data source unavailable: {}", e),
            ),
            ApiError::Misaligned {
                time_len,
                mean_len,
                error_len,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Misaligned series: time has {} points, mean {}, error {}",
                    time_len, mean_len, error_len
                ),
            ),
        };
        (status, message).into_response()
    }
}

// --- Handlers ---

/// Embedded index page listing the available endpoints.
const EMBEDDED_INDEX_HTML: &str = include_str!("static/index.html");

/// Serve the endpoint listing.
async fn index_handler() -> Html<&'static str> {
    Html(EMBEDDED_INDEX_HTML)
}

/// GET /api/health - health check endpoint for dev tooling.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// GET /api/signals - list available signals.
/// Source order; names failing identifier validation are skipped.
async fn signals_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Signal>>, ApiError> {
    let signals = signal::list_signals(state.store.as_ref()).await?;
    Ok(Json(signals))
}

/// Which of the three raw sequences a stats query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatKind {
    Time,
    Mean,
    Error,
}

/// Custom deserialize for the query form: "time", "mean", "error".
impl<'de> Deserialize<'de> for StatKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "time" => Ok(StatKind::Time),
            "mean" => Ok(StatKind::Mean),
            "error" => Ok(StatKind::Error),
            _ => Err(serde::de::Error::custom(format!(
                "unknown stat kind: {}, expected time, mean, or error",
                s
            ))),
        }
    }
}

/// GET /api/stats - one raw sequence for a signal, optionally windowed.
#[derive(Deserialize)]
struct StatsQuery {
    signal: String,
    kind: StatKind,
    /// Keep only the trailing N samples.
    #[serde(default)]
    limit: Option<usize>,
}

async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Vec<f64>>, ApiError> {
    let seq = match query.kind {
        StatKind::Time => {
            // The time axis depends on the origin over the whole report set.
            let reports = state.store.reports().await?;
            let rows = state.store.samples(&query.signal).await?;
            match stats::global_origin(&reports) {
                Some(origin) => stats::time_offsets(&rows, origin),
                None => Vec::new(),
            }
        }
        StatKind::Mean => stats::sample_means(&state.store.samples(&query.signal).await?),
        StatKind::Error => {
            stats::error_half_widths(&state.store.samples(&query.signal).await?)
        }
    };

    Ok(Json(stats::window_tail(&seq, query.limit)))
}

/// GET /api/timeseries - the full rendering handoff for one signal.
#[derive(Deserialize)]
struct TimeseriesQuery {
    signal: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct TimeseriesResponse {
    /// Display name, used by the front end as series label and axis title.
    signal: String,
    /// DOM-safe identifier; absent when the name fails validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    time: Vec<f64>,
    mean: Vec<f64>,
    error: Vec<f64>,
    band: ErrorBandPolygon,
}

async fn timeseries_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimeseriesQuery>,
) -> Result<Json<TimeseriesResponse>, ApiError> {
    let series = assemble(state.store.as_ref(), &query.signal, query.limit).await?;
    let band = ErrorBandPolygon::from_series(&series);
    let id = signal::to_identifier(&query.signal).ok();

    Ok(Json(TimeseriesResponse {
        signal: query.signal,
        id,
        time: series.time,
        mean: series.mean,
        error: series.error,
        band,
    }))
}

/// GET /api/bounds - earliest valid start and latest valid end over all
/// reports. `null` when no report has a valid start.
async fn bounds_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<TimeBounds>>, ApiError> {
    let reports = state.store.reports().await?;
    Ok(Json(time_bounds(&reports)))
}
