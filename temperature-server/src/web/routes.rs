//! HTTP route handlers.

use std::path::Path;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::dataset::{DatasetError, QueryEngine, Summary, YearRange};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// API routes live under `/api`. When a static directory is configured,
/// every other path is served from it.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations))
        .route("/analytics/summary", get(analytics_summary))
        .route("/data/range", get(data_range))
        .route("/data/monthly", get(monthly_data))
        .route("/data/annual", get(annual_data));

    let mut router = Router::new().nest("/api", api);
    if let Some(dir) = &state.settings.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Run a dataset operation against the configured file on the blocking pool.
async fn with_engine<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&QueryEngine, &Path) -> Result<T, DatasetError> + Send + 'static,
{
    let engine = state.engine.clone();
    let path = state.csv_path().to_path_buf();

    tokio::task::spawn_blocking(move || op(&engine, &path))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("dataset task failed: {e}"),
        })?
        .map_err(AppError::from)
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// List every station in the dataset.
async fn list_stations(State(state): State<AppState>) -> Result<Json<StationsResponse>, AppError> {
    let stations = with_engine(&state, |engine, path| engine.unique_stations(path)).await?;

    Ok(Json(StationsResponse {
        count: stations.len(),
        stations,
    }))
}

/// Earliest and latest year in the dataset.
async fn data_range(State(state): State<AppState>) -> Result<Json<YearRange>, AppError> {
    let range = with_engine(&state, |engine, path| engine.data_year_range(path)).await?;
    Ok(Json(range))
}

/// Summary statistics over the selected stations and years.
async fn analytics_summary(
    State(state): State<AppState>,
    params: Result<Query<StationParams>, QueryRejection>,
) -> Result<Json<Summary>, AppError> {
    let Query(params) = params?;
    let query = params.to_query()?;

    let summary = with_engine(&state, move |engine, path| {
        engine.ensure_stations_exist(path, &query)?;
        engine.analytics_summary(path, &query)
    })
    .await?;

    Ok(Json(summary))
}

/// Monthly readings for the selected stations and years.
async fn monthly_data(
    State(state): State<AppState>,
    params: Result<Query<StationParams>, QueryRejection>,
) -> Result<Json<MonthlyResponse>, AppError> {
    let Query(params) = params?;
    let query = params.to_query()?;

    let stations = with_engine(&state, move |engine, path| {
        engine.ensure_stations_exist(path, &query)?;
        engine.monthly_data(path, &query)
    })
    .await?;

    Ok(Json(MonthlyResponse { stations }))
}

/// Yearly means for the selected stations and years.
async fn annual_data(
    State(state): State<AppState>,
    params: Result<Query<AnnualParams>, QueryRejection>,
) -> Result<Json<AnnualResponse>, AppError> {
    let Query(params) = params?;
    let query = params.to_query()?;
    let include_std = params.include_std;

    let stations = with_engine(&state, move |engine, path| {
        engine.ensure_stations_exist(path, &query)?;
        engine.annual_data(path, &query, include_std)
    })
    .await?;

    Ok(Json(AnnualResponse { stations }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Unprocessable { message: String },
    MissingStations { stations: Vec<String> },
    Internal { message: String },
}

impl From<DatasetError> for AppError {
    fn from(e: DatasetError) -> Self {
        match e {
            DatasetError::InvalidRequest(message) => AppError::Unprocessable { message },
            DatasetError::UnknownStations(stations) => AppError::MissingStations { stations },
            DatasetError::NotFound { path } => AppError::Internal {
                message: format!("CSV_PATH not found: {}", path.display()),
            },
            other => AppError::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Unprocessable {
            message: e.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unprocessable { message } => {
                warn!("[422] {message}");
                let body = Json(ErrorResponse { detail: message });
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            AppError::MissingStations { stations } => {
                warn!("[404] unknown stations: {}", stations.join(", "));
                let body = Json(MissingStationsResponse {
                    missing_stations: stations,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            AppError::Internal { message } => {
                error!("[500] {message}");
                let body = Json(ErrorResponse { detail: message });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
