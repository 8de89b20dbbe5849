//! HTTP handlers for the REST API.
//!
//! Each handler validates its parameters, fetches a row window through the
//! repository, and delegates to the service layer for the actual
//! computation. Malformed dates and measure codes are rejected here; the
//! core below assumes well-formed input.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;

use super::csv;
use super::dto::{
    CadenceQuery, ChartQuery, DashboardQuery, ForecastMonthsQuery, FullViewExportQuery,
    FullViewRequest, FullViewResponse, GeoIdsQuery, HealthResponse, SkuIdDto, SkuInfoQuery,
    SkuInfoResponse, SkusQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    Cadence, ChartPoint, EntityFilter, GroupResult, LocationSummary, MeasureType, ProductLevel,
};
use crate::calendar;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Geography level meaning "no geography filter"; its only id is `ALL`.
const ALL_LOCATIONS: &str = "all_locations";

fn parse_week(week: &str) -> Result<NaiveDate, AppError> {
    week.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid week date: {}", week)))
}

fn parse_measure(code: &str) -> Result<MeasureType, AppError> {
    MeasureType::from_code(code)
        .ok_or_else(|| AppError::BadRequest(format!("invalid measure code: {}", code)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the data
/// store is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Week and Geography Listings
// =============================================================================

/// GET /v1/weeks
///
/// Week-ending Saturdays covered by the stored date range for a cadence.
pub async fn get_weeks(
    State(state): State<AppState>,
    Query(query): Query<CadenceQuery>,
) -> HandlerResult<Vec<String>> {
    let cadence = Cadence::from_param(&query.cadence);
    let weeks = match state.repository.date_range(cadence).await? {
        Some((start, end)) => calendar::weeks_in_range(start, end)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        None => Vec::new(),
    };
    Ok(Json(weeks))
}

/// GET /v1/geo-ids
///
/// Geographic ids stored for a level.
pub async fn get_geo_ids(
    State(state): State<AppState>,
    Query(query): Query<GeoIdsQuery>,
) -> HandlerResult<Vec<String>> {
    if query.geo_level == ALL_LOCATIONS {
        return Ok(Json(vec!["ALL".to_string()]));
    }
    let cadence = Cadence::from_param(&query.cadence);
    let ids = state.repository.geo_ids(cadence, &query.geo_level).await?;
    Ok(Json(ids))
}

// =============================================================================
// Hierarchy Band Breaks
// =============================================================================

async fn hierarchy_breaks(
    state: &AppState,
    query: &DashboardQuery,
    product_level: ProductLevel,
    entity_filter: EntityFilter,
) -> Result<Vec<GroupResult>, AppError> {
    let week = parse_week(&query.week)?;
    let cadence = Cadence::from_param(&query.cadence);
    let (start, end) = calendar::evaluation_window(week, cadence);

    let rows = state
        .repository
        .fetch_hierarchy_rows(
            cadence,
            &query.geo_level,
            &query.geo_id,
            product_level,
            &entity_filter,
            start,
            end,
        )
        .await?;

    Ok(services::aggregate(&rows, week))
}

/// GET /v1/departments
///
/// Band breaks per department, ascending by department id.
pub async fn get_departments(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<Vec<GroupResult>> {
    let results =
        hierarchy_breaks(&state, &query, ProductLevel::Department, EntityFilter::All).await?;
    Ok(Json(results))
}

/// GET /v1/categories
///
/// Band breaks per category, optionally narrowed to one department's
/// categories via their id prefix.
pub async fn get_categories(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<Vec<GroupResult>> {
    let filter = match query.department_id.as_deref() {
        Some(dept) if !dept.is_empty() => EntityFilter::Prefix(format!("{}_", dept)),
        _ => EntityFilter::All,
    };
    let results = hierarchy_breaks(&state, &query, ProductLevel::Category, filter).await?;
    Ok(Json(results))
}

/// GET /v1/location-summary
///
/// Band breaks for the location total, with summed revenue.
pub async fn get_location_summary(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<LocationSummary> {
    let week = parse_week(&query.week)?;
    let cadence = Cadence::from_param(&query.cadence);
    let (start, end) = calendar::evaluation_window(week, cadence);

    let rows = state
        .repository
        .fetch_hierarchy_rows(
            cadence,
            &query.geo_level,
            &query.geo_id,
            ProductLevel::Total,
            &EntityFilter::Exact("ALL".to_string()),
            start,
            end,
        )
        .await?;

    Ok(Json(services::location_summary(&rows, week)))
}

// =============================================================================
// SKU Endpoints
// =============================================================================

/// GET /v1/skus
///
/// Top-N SKUs of a category ranked by breach score.
pub async fn get_skus(
    State(state): State<AppState>,
    Query(query): Query<SkusQuery>,
) -> HandlerResult<Vec<GroupResult>> {
    let week = parse_week(&query.week)?;
    let cadence = Cadence::from_param(&query.cadence);
    let (start, end) = calendar::evaluation_window(week, cadence);

    let rows = state
        .repository
        .fetch_sku_rows(cadence, &query.category_id, start, end)
        .await?;

    Ok(Json(services::rank(&rows, week, query.limit)))
}

/// GET /v1/sku-list
///
/// List of known SKU ids.
pub async fn get_sku_list(
    State(state): State<AppState>,
    Query(query): Query<CadenceQuery>,
) -> HandlerResult<Vec<SkuIdDto>> {
    let cadence = Cadence::from_param(&query.cadence);
    let ids = state.repository.sku_ids(cadence, 1000).await?;
    Ok(Json(ids.into_iter().map(|sku_id| SkuIdDto { sku_id }).collect()))
}

/// GET /v1/sku-info
///
/// Band breaks for a single SKU.
pub async fn get_sku_info(
    State(state): State<AppState>,
    Query(query): Query<SkuInfoQuery>,
) -> HandlerResult<SkuInfoResponse> {
    let week = parse_week(&query.week)?;
    let cadence = Cadence::from_param(&query.cadence);
    let (start, end) = calendar::evaluation_window(week, cadence);

    let rows = state
        .repository
        .fetch_sku_rows_by_id(cadence, &query.sku_id, start, end)
        .await?;

    let (units, revenue) = services::measure_reports(&rows, week);
    Ok(Json(SkuInfoResponse {
        sku_id: query.sku_id,
        units,
        revenue,
    }))
}

// =============================================================================
// Chart Endpoints
// =============================================================================

async fn hierarchy_chart(
    state: &AppState,
    query: &ChartQuery,
    product_level: ProductLevel,
    entity_id: &str,
) -> Result<Vec<ChartPoint>, AppError> {
    let week = parse_week(&query.week)?;
    let cadence = Cadence::from_param(&query.cadence);
    let measure = parse_measure(&query.measure)?;
    let (start, end) = calendar::chart_window(week, cadence);

    let rows = state
        .repository
        .fetch_chart_rows(
            cadence,
            &query.geo_level,
            &query.geo_id,
            product_level,
            entity_id,
            measure,
            start,
            end,
        )
        .await?;

    Ok(services::project(&rows, week))
}

/// GET /v1/chart/location
///
/// Chart points for the location total.
pub async fn get_chart_location(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<Vec<ChartPoint>> {
    let points = hierarchy_chart(&state, &query, ProductLevel::Total, "ALL").await?;
    Ok(Json(points))
}

/// GET /v1/chart/department
///
/// Chart points for one department.
pub async fn get_chart_department(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<Vec<ChartPoint>> {
    let entity_id = query.entity_id.clone();
    let points = hierarchy_chart(&state, &query, ProductLevel::Department, &entity_id).await?;
    Ok(Json(points))
}

/// GET /v1/chart/category
///
/// Chart points for one category.
pub async fn get_chart_category(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<Vec<ChartPoint>> {
    let entity_id = query.entity_id.clone();
    let points = hierarchy_chart(&state, &query, ProductLevel::Category, &entity_id).await?;
    Ok(Json(points))
}

/// GET /v1/chart/sku
///
/// Chart points for one SKU.
pub async fn get_chart_sku(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<Vec<ChartPoint>> {
    let week = parse_week(&query.week)?;
    let cadence = Cadence::from_param(&query.cadence);
    let measure = parse_measure(&query.measure)?;
    let (start, end) = calendar::chart_window(week, cadence);

    let rows = state
        .repository
        .fetch_sku_chart_rows(cadence, &query.entity_id, measure, start, end)
        .await?;

    Ok(Json(services::project(&rows, week)))
}

// =============================================================================
// Full View Query and Export
// =============================================================================

/// GET /v1/views/forecasts
///
/// Distinct forecast names in the full view.
pub async fn get_forecast_names(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    let names = state.repository.forecast_names().await?;
    Ok(Json(names))
}

/// GET /v1/views/months
///
/// Months (`YYYY-MM`) with data for a forecast.
pub async fn get_forecast_months(
    State(state): State<AppState>,
    Query(query): Query<ForecastMonthsQuery>,
) -> HandlerResult<Vec<String>> {
    let months = state
        .repository
        .forecast_months(&query.forecast_name)
        .await?;
    Ok(Json(months))
}

fn full_view_range(month: &str, span: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    calendar::month_span_range(month, span)
        .ok_or_else(|| AppError::BadRequest(format!("invalid month: {}", month)))
}

/// POST /v1/views/query
///
/// Full-view rows for a forecast over a month+span range.
pub async fn query_full_view(
    State(state): State<AppState>,
    Json(request): Json<FullViewRequest>,
) -> HandlerResult<FullViewResponse> {
    if request.forecast_name.is_empty() || request.month.is_empty() {
        return Err(AppError::BadRequest(
            "forecast_name and month are required".to_string(),
        ));
    }

    let (start, stop) = full_view_range(&request.month, request.span)?;
    let rows = state
        .repository
        .fetch_full_view_rows(&request.forecast_name, start, stop)
        .await?;

    Ok(Json(FullViewResponse {
        total: rows.len(),
        rows,
    }))
}

/// GET /v1/views/export
///
/// Full-view rows as a CSV attachment.
pub async fn export_full_view(
    State(state): State<AppState>,
    Query(query): Query<FullViewExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, stop) = full_view_range(&query.month, query.span)?;
    let rows = state
        .repository
        .fetch_full_view_rows(&query.forecast_name, start, stop)
        .await?;

    let body = csv::render_full_view(&rows);
    let filename = format!(
        "full_view_{}_{}_x{}.csv",
        query.forecast_name, query.month, query.span
    )
    .replace(' ', "_");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
