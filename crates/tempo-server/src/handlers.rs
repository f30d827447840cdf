//! Tempo Request Handlers
//!
//! HTTP request handlers for the REST API. Implements series CRUD, point
//! ingestion, and query endpoints, translating between wire payloads and
//! the core's typed operations.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tempo_common::{format_timestamp, parse_timestamp, Result, TempoError};
use tempo_series::{
    AggregateFunction, CreateSeries, DataPoint, MetadataUpdate, PointId, PointQuery, PointUpdate,
    QueryEngine, SeriesFilter, SeriesId,
};

// =============================================================================
// Error Mapping
// =============================================================================

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn status_for(err: &TempoError) -> StatusCode {
    match err {
        TempoError::Validation(_) => StatusCode::BAD_REQUEST,
        TempoError::NotFound(_) => StatusCode::NOT_FOUND,
        TempoError::Conflict(_) => StatusCode::CONFLICT,
        TempoError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: TempoError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("request failed: {}", err);
    }
    (status, Json(ErrorBody { error: err.to_string() })).into_response()
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Series Endpoints
// =============================================================================

/// Series creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateSeriesRequest {
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub units: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Create a new time series.
pub async fn create_series(
    State(state): State<AppState>,
    Json(request): Json<CreateSeriesRequest>,
) -> Response {
    let result = state.store.create_series(CreateSeries {
        name: request.name,
        description: request.description,
        frequency: request.frequency,
        units: request.units,
        tags: request.tags.into_iter().collect(),
    });

    match result {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    /// Comma-separated tag list; a series matches when it carries any of them.
    pub tags: Option<String>,
}

/// List series metadata matching the filter.
pub async fn list_series(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    let mut filter = SeriesFilter::new();
    if let Some(name) = params.name {
        filter = filter.with_name(name);
    }
    if let Some(ref tags) = params.tags {
        filter = filter.with_tags(split_tags(tags));
    }

    match state.store.list_series(&filter) {
        Ok(summaries) => Json(summaries).into_response(),
        Err(err) => error_response(err),
    }
}

/// Get series metadata by id.
pub async fn get_series(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get_series(&SeriesId::new(id)) {
        Ok(series) => Json(series.summary()).into_response(),
        Err(err) => error_response(err),
    }
}

/// Update series metadata.
pub async fn update_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<MetadataUpdate>,
) -> Response {
    match state.store.update_series(&SeriesId::new(id), &update) {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => error_response(err),
    }
}

/// Delete a series and all owned points.
pub async fn delete_series(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete_series(&SeriesId::new(id)) {
        Ok(0) => error_response(TempoError::NotFound("time series".to_string())),
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

// =============================================================================
// Data Point Endpoints
// =============================================================================

/// A single incoming data point.
#[derive(Debug, Deserialize)]
pub struct IncomingPoint {
    pub timestamp: String,
    pub value: f64,
}

/// Batch append response.
#[derive(Debug, Serialize)]
pub struct BatchAppendResponse {
    pub added: usize,
    pub point_count: usize,
}

/// Append a batch of points, all-or-nothing.
pub async fn append_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(batch): Json<Vec<IncomingPoint>>,
) -> Response {
    let pairs: Vec<(String, f64)> = batch.into_iter().map(|p| (p.timestamp, p.value)).collect();
    let added = pairs.len();

    match state.store.append_points(&SeriesId::new(id), &pairs) {
        Ok(series) => (
            StatusCode::CREATED,
            Json(BatchAppendResponse { added, point_count: series.point_count() }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// Point serialization for responses: timestamps go out as ISO 8601 text.
#[derive(Debug, Serialize)]
pub struct PointDto {
    pub id: String,
    pub timestamp: String,
    pub value: f64,
}

impl From<&DataPoint> for PointDto {
    fn from(point: &DataPoint) -> Self {
        Self {
            id: point.id.to_string(),
            timestamp: format_timestamp(&point.timestamp),
            value: point.value,
        }
    }
}

/// Query parameters for reading points.
#[derive(Debug, Default, Deserialize)]
pub struct DataQueryParams {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub limit: Option<String>,
    pub aggregation: Option<String>,
    pub interval: Option<String>,
}

/// Point listing response.
#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub data_points: Vec<PointDto>,
}

/// Aggregation response.
#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub aggregated_value: Option<f64>,
    pub aggregation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_points: Option<Vec<PointDto>>,
}

/// Read a series' points with optional range, limit, and aggregation.
pub async fn query_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DataQueryParams>,
) -> Response {
    let series = match state.store.get_series(&SeriesId::new(id)) {
        Ok(series) => series,
        Err(err) => return error_response(err),
    };

    let query = match build_point_query(&params) {
        Ok(query) => query,
        Err(err) => return error_response(err),
    };

    let result = match QueryEngine::execute(&series.points, &query) {
        Ok(result) => result,
        Err(err) => return error_response(err),
    };

    let points: Vec<PointDto> = result.points.iter().map(PointDto::from).collect();

    match result.aggregate {
        Some(outcome) => {
            let message = outcome.spans_full_range.then(|| {
                format!(
                    "interval-based aggregation is not implemented; \
                     returning an aggregate over the entire filtered range \
                     instead of '{}' buckets",
                    params.interval.as_deref().unwrap_or_default()
                )
            });
            let data_points = outcome.spans_full_range.then_some(points);
            Json(AggregateResponse {
                aggregated_value: outcome.value,
                aggregation_type: outcome.function.as_str().to_string(),
                message,
                data_points,
            })
            .into_response()
        }
        None => Json(PointsResponse { data_points: points }).into_response(),
    }
}

/// Get a single point by identity.
pub async fn get_point(
    State(state): State<AppState>,
    Path((id, point_id)): Path<(String, String)>,
) -> Response {
    let series = match state.store.get_series(&SeriesId::new(id)) {
        Ok(series) => series,
        Err(err) => return error_response(err),
    };

    match series.point(&PointId::new(point_id)) {
        Some(point) => Json(PointDto::from(point)).into_response(),
        None => error_response(TempoError::NotFound("data point".to_string())),
    }
}

/// Apply a partial update to a point.
pub async fn update_point(
    State(state): State<AppState>,
    Path((id, point_id)): Path<(String, String)>,
    Json(update): Json<PointUpdate>,
) -> Response {
    match state
        .store
        .update_point(&SeriesId::new(id), &PointId::new(point_id), &update)
    {
        Ok(point) => Json(PointDto::from(&point)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Delete a point by identity.
pub async fn delete_point(
    State(state): State<AppState>,
    Path((id, point_id)): Path<(String, String)>,
) -> Response {
    match state
        .store
        .delete_point(&SeriesId::new(id), &PointId::new(point_id))
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(TempoError::NotFound(
            "time series or data point".to_string(),
        )),
        Err(err) => error_response(err),
    }
}

// =============================================================================
// Parameter Parsing
// =============================================================================

fn build_point_query(params: &DataQueryParams) -> Result<PointQuery> {
    let mut query = PointQuery::new();

    if let Some(ref text) = params.start_time {
        query = query.with_start(parse_timestamp(text)?);
    }
    if let Some(ref text) = params.end_time {
        query = query.with_end(parse_timestamp(text)?);
    }
    if let Some(ref text) = params.limit {
        query = query.with_limit(parse_limit(text)?);
    }
    if let Some(ref text) = params.aggregation {
        query = query.with_aggregation(AggregateFunction::parse(text)?);
    }
    if let Some(ref interval) = params.interval {
        query = query.with_interval(interval.clone());
    }

    Ok(query)
}

fn parse_limit(text: &str) -> Result<usize> {
    let parsed: i64 = text
        .parse()
        .map_err(|_| TempoError::Validation("invalid limit: must be a positive integer".to_string()))?;
    if parsed <= 0 {
        return Err(TempoError::Validation(
            "invalid limit: must be a positive integer".to_string(),
        ));
    }
    Ok(parsed as usize)
}

fn split_tags(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
