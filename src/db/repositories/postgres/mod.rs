//! Postgres repository implementation using Diesel.
//!
//! The per-cadence tables and the wide forecast view are owned by an
//! external ETL, so this module runs parameterized `sql_query` statements
//! against table names supplied by [`TableConfig`] instead of owning a
//! Diesel schema. Table names only ever come from configuration, never
//! from request input.
//!
//! ## Configuration
//!
//! Environment variables (read by the `from_env` constructors, which the
//! server binary uses; library callers pass the structs explicitly):
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `TABLE_AGGREGATE_MONTHLY` / `TABLE_AGGREGATE_WEEKLY`
//! - `TABLE_SKU_MONTHLY` / `TABLE_SKU_WEEKLY`
//! - `FULL_VIEW_NAME` (may be schema-qualified)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Text};
use std::time::Duration;

use crate::api::{
    Cadence, EntityFilter, FullViewRow, MeasureType, ProductLevel, SeriesRow, TimeSeriesPoint,
    FULL_VIEW_COLUMNS,
};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, SeriesRepository};

mod models;

use models::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let parse_var = |name: &str, default: u64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            database_url,
            max_pool_size: parse_var("PG_POOL_MAX", 10) as u32,
            min_pool_size: parse_var("PG_POOL_MIN", 1) as u32,
            connection_timeout_sec: parse_var("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: parse_var("PG_IDLE_TIMEOUT_SEC", 600),
        })
    }
}

/// Table and view names, per cadence. Passed explicitly so the core and
/// its tests never read table names from ambient process state.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub aggregate_monthly: String,
    pub aggregate_weekly: String,
    pub sku_monthly: String,
    pub sku_weekly: String,
    /// Wide forecast view; may be schema-qualified and is therefore not
    /// identifier-quoted in SQL.
    pub full_view: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            aggregate_monthly: "forecast_aggregate_monthly".to_string(),
            aggregate_weekly: "forecast_aggregate_weekly".to_string(),
            sku_monthly: "forecast_sku_monthly".to_string(),
            sku_weekly: "forecast_sku_weekly".to_string(),
            full_view: "engine.tsf_vw_full".to_string(),
        }
    }
}

impl TableConfig {
    /// Defaults overridden by environment variables where present.
    pub fn from_env() -> Self {
        let mut tables = Self::default();
        let overrides = [
            ("TABLE_AGGREGATE_MONTHLY", &mut tables.aggregate_monthly),
            ("TABLE_AGGREGATE_WEEKLY", &mut tables.aggregate_weekly),
            ("TABLE_SKU_MONTHLY", &mut tables.sku_monthly),
            ("TABLE_SKU_WEEKLY", &mut tables.sku_weekly),
            ("FULL_VIEW_NAME", &mut tables.full_view),
        ];
        for (name, slot) in overrides {
            if let Ok(value) = std::env::var(name) {
                *slot = value;
            }
        }
        tables
    }

    fn aggregate(&self, cadence: Cadence) -> &str {
        match cadence {
            Cadence::Monthly => &self.aggregate_monthly,
            Cadence::Weekly => &self.aggregate_weekly,
        }
    }

    fn sku(&self, cadence: Cadence) -> &str {
        match cadence {
            Cadence::Monthly => &self.sku_monthly,
            Cadence::Weekly => &self.sku_weekly,
        }
    }
}

const SERIES_COLUMNS: &str =
    "type_id, date, value, fv, ci85_low, ci85_high, ci95_low, ci95_high";
const CHART_COLUMNS: &str =
    "date, value AS actual, fv AS forecast, ci85_low, ci85_high, ci95_low, ci95_high";

/// Postgres implementation of [`SeriesRepository`].
pub struct PostgresRepository {
    pool: PgPool,
    tables: TableConfig,
}

impl PostgresRepository {
    /// Build the connection pool and verify nothing is obviously wrong
    /// with the URL.
    pub fn connect(config: &PostgresConfig, tables: TableConfig) -> RepositoryResult<Self> {
        if config.database_url.is_empty() {
            return Err(RepositoryError::configuration("database_url is empty"));
        }

        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection(
                    e.to_string(),
                    ErrorContext::new("build_pool").retryable(),
                )
            })?;

        Ok(Self { pool, tables })
    }

    /// Run a blocking Diesel closure on the pool from async context.
    async fn run<T, F>(&self, op: &'static str, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection(e.to_string(), ErrorContext::new(op).retryable())
            })?;
            f(&mut conn).map_err(|e| RepositoryError::query(e.to_string(), ErrorContext::new(op)))
        })
        .await
        .map_err(|e| {
            RepositoryError::connection(format!("task join error: {}", e), ErrorContext::new(op))
        })?
    }
}

fn collect_series_rows(rows: Vec<SeriesRowSql>) -> Vec<SeriesRow> {
    rows.into_iter()
        .filter_map(|row| {
            let entity_id = row.entity_id.clone();
            let type_id = row.type_id.clone();
            let converted = row.into_series_row();
            if converted.is_none() {
                log::warn!(
                    "skipping row with unknown measure code {:?} for entity {}",
                    type_id,
                    entity_id
                );
            }
            converted
        })
        .collect()
}

#[async_trait]
impl SeriesRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.run("health_check", |conn| {
            sql_query("SELECT 1").execute(conn).map(|_| true)
        })
        .await
    }

    async fn date_range(
        &self,
        cadence: Cadence,
    ) -> RepositoryResult<Option<(NaiveDate, NaiveDate)>> {
        let sql = format!(
            r#"SELECT MIN(date) AS min_date, MAX(date) AS max_date FROM "{}""#,
            self.tables.aggregate(cadence)
        );
        let range: DateRangeSql = self
            .run("date_range", move |conn| sql_query(sql).get_result(conn))
            .await?;
        Ok(range.min_date.zip(range.max_date))
    }

    async fn geo_ids(&self, cadence: Cadence, geo_level: &str) -> RepositoryResult<Vec<String>> {
        let sql = format!(
            r#"SELECT DISTINCT geo_id AS id FROM "{}" WHERE geo_level = $1 ORDER BY id"#,
            self.tables.aggregate(cadence)
        );
        let geo_level = geo_level.to_string();
        let ids: Vec<IdSql> = self
            .run("geo_ids", move |conn| {
                sql_query(sql).bind::<Text, _>(geo_level).load(conn)
            })
            .await?;
        Ok(ids.into_iter().map(|r| r.id).collect())
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
        let base = format!(
            r#"SELECT product_id AS entity_id, {SERIES_COLUMNS}
               FROM "{}"
               WHERE date >= $1 AND date <= $2
                 AND geo_level = $3
                 AND geo_id = $4
                 AND product_level = $5"#,
            self.tables.aggregate(cadence)
        );
        let order = " ORDER BY product_id, type_id, date";
        let geo_level = geo_level.to_string();
        let geo_id = geo_id.to_string();
        let level = product_level.column_value().to_string();
        let entity_filter = entity_filter.clone();

        let rows: Vec<SeriesRowSql> = self
            .run("fetch_hierarchy_rows", move |conn| match entity_filter {
                EntityFilter::All => sql_query(format!("{base}{order}"))
                    .bind::<Date, _>(start)
                    .bind::<Date, _>(end)
                    .bind::<Text, _>(geo_level)
                    .bind::<Text, _>(geo_id)
                    .bind::<Text, _>(level)
                    .load(conn),
                EntityFilter::Exact(entity_id) => {
                    sql_query(format!("{base} AND product_id = $6{order}"))
                        .bind::<Date, _>(start)
                        .bind::<Date, _>(end)
                        .bind::<Text, _>(geo_level)
                        .bind::<Text, _>(geo_id)
                        .bind::<Text, _>(level)
                        .bind::<Text, _>(entity_id)
                        .load(conn)
                }
                EntityFilter::Prefix(prefix) => {
                    sql_query(format!("{base} AND product_id LIKE $6{order}"))
                        .bind::<Date, _>(start)
                        .bind::<Date, _>(end)
                        .bind::<Text, _>(geo_level)
                        .bind::<Text, _>(geo_id)
                        .bind::<Text, _>(level)
                        .bind::<Text, _>(format!("{prefix}%"))
                        .load(conn)
                }
            })
            .await?;
        Ok(collect_series_rows(rows))
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
        let sql = format!(
            r#"SELECT {CHART_COLUMNS}
               FROM "{}"
               WHERE date >= $1 AND date <= $2
                 AND type_id = $3
                 AND geo_level = $4
                 AND geo_id = $5
                 AND product_level = $6
                 AND product_id = $7
               ORDER BY date"#,
            self.tables.aggregate(cadence)
        );
        let geo_level = geo_level.to_string();
        let geo_id = geo_id.to_string();
        let level = product_level.column_value().to_string();
        let entity_id = entity_id.to_string();
        let code = measure.code().to_string();

        let rows: Vec<ChartRowSql> = self
            .run("fetch_chart_rows", move |conn| {
                sql_query(sql)
                    .bind::<Date, _>(start)
                    .bind::<Date, _>(end)
                    .bind::<Text, _>(code)
                    .bind::<Text, _>(geo_level)
                    .bind::<Text, _>(geo_id)
                    .bind::<Text, _>(level)
                    .bind::<Text, _>(entity_id)
                    .load(conn)
            })
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn sku_ids(&self, cadence: Cadence, limit: usize) -> RepositoryResult<Vec<String>> {
        let sql = format!(
            r#"SELECT DISTINCT sku_id AS id FROM "{}" ORDER BY id LIMIT $1"#,
            self.tables.sku(cadence)
        );
        let ids: Vec<IdSql> = self
            .run("sku_ids", move |conn| {
                sql_query(sql).bind::<BigInt, _>(limit as i64).load(conn)
            })
            .await?;
        Ok(ids.into_iter().map(|r| r.id).collect())
    }

    async fn fetch_sku_rows(
        &self,
        cadence: Cadence,
        category_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>> {
        let sql = format!(
            r#"SELECT sku_id AS entity_id, {SERIES_COLUMNS}
               FROM "{}"
               WHERE date >= $1 AND date <= $2
                 AND category_id = $3
               ORDER BY sku_id, type_id, date"#,
            self.tables.sku(cadence)
        );
        let category_id = category_id.to_string();
        let rows: Vec<SeriesRowSql> = self
            .run("fetch_sku_rows", move |conn| {
                sql_query(sql)
                    .bind::<Date, _>(start)
                    .bind::<Date, _>(end)
                    .bind::<Text, _>(category_id)
                    .load(conn)
            })
            .await?;
        Ok(collect_series_rows(rows))
    }

    async fn fetch_sku_rows_by_id(
        &self,
        cadence: Cadence,
        sku_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SeriesRow>> {
        let sql = format!(
            r#"SELECT sku_id AS entity_id, {SERIES_COLUMNS}
               FROM "{}"
               WHERE date >= $1 AND date <= $2
                 AND sku_id = $3
               ORDER BY type_id, date"#,
            self.tables.sku(cadence)
        );
        let sku_id = sku_id.to_string();
        let rows: Vec<SeriesRowSql> = self
            .run("fetch_sku_rows_by_id", move |conn| {
                sql_query(sql)
                    .bind::<Date, _>(start)
                    .bind::<Date, _>(end)
                    .bind::<Text, _>(sku_id)
                    .load(conn)
            })
            .await?;
        Ok(collect_series_rows(rows))
    }

    async fn fetch_sku_chart_rows(
        &self,
        cadence: Cadence,
        sku_id: &str,
        measure: MeasureType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<TimeSeriesPoint>> {
        let sql = format!(
            r#"SELECT {CHART_COLUMNS}
               FROM "{}"
               WHERE date >= $1 AND date <= $2
                 AND type_id = $3
                 AND sku_id = $4
               ORDER BY date"#,
            self.tables.sku(cadence)
        );
        let sku_id = sku_id.to_string();
        let code = measure.code().to_string();
        let rows: Vec<ChartRowSql> = self
            .run("fetch_sku_chart_rows", move |conn| {
                sql_query(sql)
                    .bind::<Date, _>(start)
                    .bind::<Date, _>(end)
                    .bind::<Text, _>(code)
                    .bind::<Text, _>(sku_id)
                    .load(conn)
            })
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn forecast_names(&self) -> RepositoryResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT forecast_name AS id FROM {} ORDER BY 1",
            self.tables.full_view
        );
        let ids: Vec<IdSql> = self
            .run("forecast_names", move |conn| sql_query(sql).load(conn))
            .await?;
        Ok(ids.into_iter().map(|r| r.id).collect())
    }

    async fn forecast_months(&self, forecast_name: &str) -> RepositoryResult<Vec<String>> {
        let sql = format!(
            "SELECT to_char(date_trunc('month', date), 'YYYY-MM') AS id
             FROM {}
             WHERE forecast_name = $1
             GROUP BY id
             ORDER BY id",
            self.tables.full_view
        );
        let forecast_name = forecast_name.to_string();
        let ids: Vec<IdSql> = self
            .run("forecast_months", move |conn| {
                sql_query(sql).bind::<Text, _>(forecast_name).load(conn)
            })
            .await?;
        Ok(ids.into_iter().map(|r| r.id).collect())
    }

    async fn fetch_full_view_rows(
        &self,
        forecast_name: &str,
        start: NaiveDate,
        stop: NaiveDate,
    ) -> RepositoryResult<Vec<FullViewRow>> {
        let sql = format!(
            "SELECT {}
             FROM {}
             WHERE forecast_name = $1
               AND date >= $2 AND date < $3
             ORDER BY date ASC",
            FULL_VIEW_COLUMNS.join(", "),
            self.tables.full_view
        );
        let forecast_name = forecast_name.to_string();
        let rows: Vec<FullViewRowSql> = self
            .run("fetch_full_view_rows", move |conn| {
                sql_query(sql)
                    .bind::<Text, _>(forecast_name)
                    .bind::<Date, _>(start)
                    .bind::<Date, _>(stop)
                    .load(conn)
            })
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
