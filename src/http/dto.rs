//! Data Transfer Objects for the HTTP API.
//!
//! Query-parameter structs for request parsing plus the few response
//! shapes that are not already defined in [`crate::api`]. Computed types
//! (`GroupResult`, `LocationSummary`, `ChartPoint`, ...) serialize as-is.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    ChartPoint, ExceedanceReport, FullViewRow, GroupResult, LocationSummary, RevenueSummary,
};

fn default_cadence() -> String {
    "monthly".to_string()
}

fn default_geo_level() -> String {
    "all_locations".to_string()
}

fn default_geo_id() -> String {
    "ALL".to_string()
}

fn default_measure() -> String {
    "U".to_string()
}

fn default_limit() -> usize {
    50
}

fn default_span() -> u32 {
    1
}

/// Query parameters for endpoints scoped only by cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct CadenceQuery {
    #[serde(default = "default_cadence")]
    pub cadence: String,
}

/// Query parameters for the geo-id listing.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoIdsQuery {
    #[serde(default = "default_cadence")]
    pub cadence: String,
    #[serde(default = "default_geo_level")]
    pub geo_level: String,
}

/// Query parameters shared by the hierarchy band-break endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardQuery {
    /// Reference date (a week-ending Saturday), `YYYY-MM-DD`.
    pub week: String,
    #[serde(default = "default_cadence")]
    pub cadence: String,
    #[serde(default = "default_geo_level")]
    pub geo_level: String,
    #[serde(default = "default_geo_id")]
    pub geo_id: String,
    /// Optional department filter for the category listing.
    #[serde(default)]
    pub department_id: Option<String>,
}

/// Query parameters for the ranked SKU listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SkusQuery {
    pub week: String,
    #[serde(default = "default_cadence")]
    pub cadence: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Query parameters for single-SKU band breaks.
#[derive(Debug, Clone, Deserialize)]
pub struct SkuInfoQuery {
    pub week: String,
    #[serde(default = "default_cadence")]
    pub cadence: String,
    #[serde(default)]
    pub sku_id: String,
}

/// Query parameters shared by the chart endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuery {
    pub week: String,
    #[serde(default = "default_cadence")]
    pub cadence: String,
    /// Measure code, `U` or `R`.
    #[serde(default = "default_measure")]
    pub measure: String,
    #[serde(default = "default_geo_level")]
    pub geo_level: String,
    #[serde(default = "default_geo_id")]
    pub geo_id: String,
    /// Department, category or SKU id, depending on the endpoint.
    #[serde(default)]
    pub entity_id: String,
}

/// Query parameters for the forecast month listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMonthsQuery {
    pub forecast_name: String,
}

/// Request body for the full-view query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullViewRequest {
    pub forecast_name: String,
    /// `YYYY-MM` month selecting the start of the range.
    pub month: String,
    /// Number of months (1-3) to include.
    #[serde(default = "default_span")]
    pub span: u32,
}

/// Query parameters for the full-view CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct FullViewExportQuery {
    pub forecast_name: String,
    pub month: String,
    #[serde(default = "default_span")]
    pub span: u32,
}

/// Response for the full-view query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullViewResponse {
    pub total: usize,
    pub rows: Vec<FullViewRow>,
}

/// One SKU id in the SKU listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuIdDto {
    pub sku_id: String,
}

/// Band breaks for a single SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuInfoResponse {
    pub sku_id: String,
    pub units: ExceedanceReport,
    pub revenue: ExceedanceReport,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
