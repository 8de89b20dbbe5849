//! Repository trait for forecast series data.
//!
//! The core computation layer places no constraint on how rows are stored;
//! it only needs already-fetched, possibly unsorted collections with the
//! known field shape. Implementations fetch per cadence (monthly/weekly
//! tables), geography, product level and date range.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::api::{Cadence, EntityFilter, FullViewRow, MeasureType, ProductLevel, SeriesRow, TimeSeriesPoint};

/// Repository for forecast-vs-actual series and the wide full view.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Minimum and maximum dates present for a cadence, or `None` when the
    /// table is empty. Drives the selectable week list.
    async fn date_range(&self, cadence: Cadence) -> RepositoryResult<Option<(NaiveDate, NaiveDate)>>;

    /// Distinct geography ids stored for a level, ascending.
    async fn geo_ids(&self, cadence: Cadence, geo_level: &str) -> RepositoryResult<Vec<String>>;

    /// Hierarchy rows for one product level and geography within
    /// `[start, end]`, both measures, optionally narrowed by entity id.
    #[allow(clippy::too_many_arguments)]
    async fn fetch_hierarchy_rows(
        &self,
        cadence: Cadence,
        geo_level: &str,
        geo_id: &str,
        product_level: ProductLevel,
        entity_filter: &EntityFilter,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>>;

    /// Chart rows for one hierarchy entity and measure within `[start, end]`.
    #[allow(clippy::too_many_arguments)]
    async fn fetch_chart_rows(
        &self,
        cadence: Cadence,
        geo_level: &str,
        geo_id: &str,
        product_level: ProductLevel,
        entity_id: &str,
        measure: MeasureType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<TimeSeriesPoint>>;

    /// Distinct SKU ids, ascending, capped by `limit`.
    async fn sku_ids(&self, cadence: Cadence, limit: usize) -> RepositoryResult<Vec<String>>;

    /// SKU rows for every SKU of a category within `[start, end]`.
    async fn fetch_sku_rows(
        &self,
        cadence: Cadence,
        category_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>>;

    /// Rows for one SKU within `[start, end]`, both measures.
    async fn fetch_sku_rows_by_id(
        &self,
        cadence: Cadence,
        sku_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>>;

    /// Chart rows for one SKU and measure within `[start, end]`.
    async fn fetch_sku_chart_rows(
        &self,
        cadence: Cadence,
        sku_id: &str,
        measure: MeasureType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<TimeSeriesPoint>>;

    /// Distinct forecast names in the full view, ascending.
    async fn forecast_names(&self) -> RepositoryResult<Vec<String>>;

    /// Distinct `YYYY-MM` months with data for a forecast, ascending.
    async fn forecast_months(&self, forecast_name: &str) -> RepositoryResult<Vec<String>>;

    /// Full-view rows for a forecast within `[start, stop)`, date ascending.
    async fn fetch_full_view_rows(
        &self,
        forecast_name: &str,
        start: NaiveDate,
        stop: NaiveDate,
    ) -> RepositoryResult<Vec<FullViewRow>>;
}
