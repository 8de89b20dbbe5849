//! Row structs for `sql_query` results.
//!
//! The per-cadence tables are produced by an external ETL, so there is no
//! Diesel schema to own here; queries go through `sql_query` and these
//! `QueryableByName` shapes, then convert into the api types.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{Date, Float8, Nullable, Text};

use crate::api::{FullViewRow, MeasureType, SeriesRow, TimeSeriesPoint};

/// Series row as selected from an aggregate or SKU table. The entity
/// column (`product_id` or `sku_id`) is aliased to `entity_id` in SQL.
#[derive(Debug, QueryableByName)]
pub struct SeriesRowSql {
    #[diesel(sql_type = Text)]
    pub entity_id: String,
    #[diesel(sql_type = Text)]
    pub type_id: String,
    #[diesel(sql_type = Date)]
    pub date: NaiveDate,
    #[diesel(sql_type = Nullable<Float8>)]
    pub value: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub fv: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci85_low: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci85_high: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci95_low: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci95_high: Option<f64>,
}

impl SeriesRowSql {
    /// Convert to the api row; `None` for rows with an unknown measure
    /// code, which callers skip.
    pub fn into_series_row(self) -> Option<SeriesRow> {
        let measure = MeasureType::from_code(&self.type_id)?;
        Some(SeriesRow {
            entity_id: self.entity_id,
            measure,
            date: self.date,
            actual: self.value,
            forecast: self.fv,
            ci85_low: self.ci85_low,
            ci85_high: self.ci85_high,
            ci95_low: self.ci95_low,
            ci95_high: self.ci95_high,
        })
    }
}

/// Chart row: one entity+measure already fixed by the query.
#[derive(Debug, QueryableByName)]
pub struct ChartRowSql {
    #[diesel(sql_type = Date)]
    pub date: NaiveDate,
    #[diesel(sql_type = Nullable<Float8>)]
    pub actual: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub forecast: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci85_low: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci85_high: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci95_low: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci95_high: Option<f64>,
}

impl From<ChartRowSql> for TimeSeriesPoint {
    fn from(row: ChartRowSql) -> Self {
        TimeSeriesPoint {
            date: row.date,
            actual: row.actual,
            forecast: row.forecast,
            ci85_low: row.ci85_low,
            ci85_high: row.ci85_high,
            ci95_low: row.ci95_low,
            ci95_high: row.ci95_high,
        }
    }
}

#[derive(Debug, QueryableByName)]
pub struct DateRangeSql {
    #[diesel(sql_type = Nullable<Date>)]
    pub min_date: Option<NaiveDate>,
    #[diesel(sql_type = Nullable<Date>)]
    pub max_date: Option<NaiveDate>,
}

#[derive(Debug, QueryableByName)]
pub struct IdSql {
    #[diesel(sql_type = Text)]
    pub id: String,
}

#[derive(Debug, QueryableByName)]
pub struct FullViewRowSql {
    #[diesel(sql_type = Text)]
    pub forecast_name: String,
    #[diesel(sql_type = Date)]
    pub date: NaiveDate,
    #[diesel(sql_type = Nullable<Float8>)]
    pub value: Option<f64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub model_name: Option<String>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub fv: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub fv_mape: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub fv_mean_mape: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub fv_mean_mape_c: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci85_low: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci85_high: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci90_low: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci90_high: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci95_low: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub ci95_high: Option<f64>,
}

impl From<FullViewRowSql> for FullViewRow {
    fn from(row: FullViewRowSql) -> Self {
        FullViewRow {
            forecast_name: row.forecast_name,
            date: row.date,
            value: row.value,
            model_name: row.model_name,
            fv: row.fv,
            fv_mape: row.fv_mape,
            fv_mean_mape: row.fv_mean_mape,
            fv_mean_mape_c: row.fv_mean_mape_c,
            ci85_low: row.ci85_low,
            ci85_high: row.ci85_high,
            ci90_low: row.ci90_low,
            ci90_high: row.ci90_high,
            ci95_low: row.ci95_low,
            ci95_high: row.ci95_high,
        }
    }
}
