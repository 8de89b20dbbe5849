//! In-memory repository for unit testing and local development.
//!
//! Holds seeded row vectors behind a `parking_lot` lock and answers the
//! same questions the Postgres implementation answers with SQL. Filtering
//! is linear; the datasets this backend is meant for are tiny.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use parking_lot::RwLock;
use std::collections::BTreeSet;

use crate::api::{
    Cadence, EntityFilter, FullViewRow, MeasureType, ProductLevel, SeriesRow, TimeSeriesPoint,
};
use crate::db::repository::{RepositoryResult, SeriesRepository};

/// One stored row of a per-cadence aggregate table.
#[derive(Debug, Clone)]
pub struct AggregateRecord {
    pub geo_level: String,
    pub geo_id: String,
    pub product_level: ProductLevel,
    pub product_id: String,
    pub measure: MeasureType,
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub ci85_low: Option<f64>,
    pub ci85_high: Option<f64>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,
}

/// One stored row of a per-cadence SKU table.
#[derive(Debug, Clone)]
pub struct SkuRecord {
    pub sku_id: String,
    pub category_id: String,
    pub measure: MeasureType,
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub ci85_low: Option<f64>,
    pub ci85_high: Option<f64>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,
}

#[derive(Debug, Default)]
struct CadenceStore {
    aggregate: Vec<AggregateRecord>,
    sku: Vec<SkuRecord>,
}

#[derive(Debug, Default)]
struct Store {
    monthly: CadenceStore,
    weekly: CadenceStore,
    full_view: Vec<FullViewRow>,
}

impl Store {
    fn cadence(&self, cadence: Cadence) -> &CadenceStore {
        match cadence {
            Cadence::Monthly => &self.monthly,
            Cadence::Weekly => &self.weekly,
        }
    }

    fn cadence_mut(&mut self, cadence: Cadence) -> &mut CadenceStore {
        match cadence {
            Cadence::Monthly => &mut self.monthly,
            Cadence::Weekly => &mut self.weekly,
        }
    }
}

/// In-memory implementation of [`SeriesRepository`].
#[derive(Debug, Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed aggregate rows for a cadence.
    pub fn insert_aggregate(&self, cadence: Cadence, rows: impl IntoIterator<Item = AggregateRecord>) {
        self.store.write().cadence_mut(cadence).aggregate.extend(rows);
    }

    /// Seed SKU rows for a cadence.
    pub fn insert_sku(&self, cadence: Cadence, rows: impl IntoIterator<Item = SkuRecord>) {
        self.store.write().cadence_mut(cadence).sku.extend(rows);
    }

    /// Seed full-view rows.
    pub fn insert_full_view(&self, rows: impl IntoIterator<Item = FullViewRow>) {
        self.store.write().full_view.extend(rows);
    }
}

fn aggregate_to_series(record: &AggregateRecord) -> SeriesRow {
    SeriesRow {
        entity_id: record.product_id.clone(),
        measure: record.measure,
        date: record.date,
        actual: record.actual,
        forecast: record.forecast,
        ci85_low: record.ci85_low,
        ci85_high: record.ci85_high,
        ci95_low: record.ci95_low,
        ci95_high: record.ci95_high,
    }
}

fn sku_to_series(record: &SkuRecord) -> SeriesRow {
    SeriesRow {
        entity_id: record.sku_id.clone(),
        measure: record.measure,
        date: record.date,
        actual: record.actual,
        forecast: record.forecast,
        ci85_low: record.ci85_low,
        ci85_high: record.ci85_high,
        ci95_low: record.ci95_low,
        ci95_high: record.ci95_high,
    }
}

fn series_to_point(row: SeriesRow) -> TimeSeriesPoint {
    row.point()
}

/// Match SQL's `ORDER BY product_id, type_id, date` so both backends hand
/// the aggregation layer rows in the same encounter order.
fn sort_series_rows(rows: &mut [SeriesRow]) {
    rows.sort_by(|a, b| {
        a.entity_id
            .cmp(&b.entity_id)
            .then(a.measure.code().cmp(b.measure.code()))
            .then(a.date.cmp(&b.date))
    });
}

#[async_trait]
impl SeriesRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn date_range(
        &self,
        cadence: Cadence,
    ) -> RepositoryResult<Option<(NaiveDate, NaiveDate)>> {
        let store = self.store.read();
        let dates = store.cadence(cadence).aggregate.iter().map(|r| r.date);
        let min = dates.clone().min();
        let max = dates.max();
        Ok(min.zip(max))
    }

    async fn geo_ids(&self, cadence: Cadence, geo_level: &str) -> RepositoryResult<Vec<String>> {
        let store = self.store.read();
        let ids: BTreeSet<String> = store
            .cadence(cadence)
            .aggregate
            .iter()
            .filter(|r| r.geo_level == geo_level)
            .map(|r| r.geo_id.clone())
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn fetch_hierarchy_rows(
        &self,
        cadence: Cadence,
        geo_level: &str,
        geo_id: &str,
        product_level: ProductLevel,
        entity_filter: &EntityFilter,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>> {
        let store = self.store.read();
        let mut rows: Vec<SeriesRow> = store
            .cadence(cadence)
            .aggregate
            .iter()
            .filter(|r| {
                r.geo_level == geo_level
                    && r.geo_id == geo_id
                    && r.product_level == product_level
                    && r.date >= start
                    && r.date <= end
                    && entity_filter.matches(&r.product_id)
            })
            .map(aggregate_to_series)
            .collect();
        sort_series_rows(&mut rows);
        Ok(rows)
    }

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
    ) -> RepositoryResult<Vec<TimeSeriesPoint>> {
        let filter = EntityFilter::Exact(entity_id.to_string());
        let rows = self
            .fetch_hierarchy_rows(cadence, geo_level, geo_id, product_level, &filter, start, end)
            .await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.measure == measure)
            .map(series_to_point)
            .collect())
    }

    async fn sku_ids(&self, cadence: Cadence, limit: usize) -> RepositoryResult<Vec<String>> {
        let store = self.store.read();
        let ids: BTreeSet<String> = store
            .cadence(cadence)
            .sku
            .iter()
            .map(|r| r.sku_id.clone())
            .collect();
        Ok(ids.into_iter().take(limit).collect())
    }

    async fn fetch_sku_rows(
        &self,
        cadence: Cadence,
        category_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>> {
        let store = self.store.read();
        let mut rows: Vec<SeriesRow> = store
            .cadence(cadence)
            .sku
            .iter()
            .filter(|r| r.category_id == category_id && r.date >= start && r.date <= end)
            .map(sku_to_series)
            .collect();
        sort_series_rows(&mut rows);
        Ok(rows)
    }

    async fn fetch_sku_rows_by_id(
        &self,
        cadence: Cadence,
        sku_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>> {
        let store = self.store.read();
        let mut rows: Vec<SeriesRow> = store
            .cadence(cadence)
            .sku
            .iter()
            .filter(|r| r.sku_id == sku_id && r.date >= start && r.date <= end)
            .map(sku_to_series)
            .collect();
        sort_series_rows(&mut rows);
        Ok(rows)
    }

    async fn fetch_sku_chart_rows(
        &self,
        cadence: Cadence,
        sku_id: &str,
        measure: MeasureType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<TimeSeriesPoint>> {
        let rows = self.fetch_sku_rows_by_id(cadence, sku_id, start, end).await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.measure == measure)
            .map(series_to_point)
            .collect())
    }

    async fn forecast_names(&self) -> RepositoryResult<Vec<String>> {
        let store = self.store.read();
        let names: BTreeSet<String> = store
            .full_view
            .iter()
            .map(|r| r.forecast_name.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn forecast_months(&self, forecast_name: &str) -> RepositoryResult<Vec<String>> {
        let store = self.store.read();
        let months: BTreeSet<String> = store
            .full_view
            .iter()
            .filter(|r| r.forecast_name == forecast_name)
            .map(|r| format!("{:04}-{:02}", r.date.year(), r.date.month()))
            .collect();
        Ok(months.into_iter().collect())
    }

    async fn fetch_full_view_rows(
        &self,
        forecast_name: &str,
        start: NaiveDate,
        stop: NaiveDate,
    ) -> RepositoryResult<Vec<FullViewRow>> {
        let store = self.store.read();
        let mut rows: Vec<FullViewRow> = store
            .full_view
            .iter()
            .filter(|r| r.forecast_name == forecast_name && r.date >= start && r.date < stop)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}
