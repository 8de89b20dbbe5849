//! Data model for the band-break dashboard.
//!
//! Everything here is request-scoped plain data: rows as fetched by the
//! repository layer, reports as produced by the exceedance engine, and the
//! chart/summary shapes consumed by the presentation layer. All types derive
//! `Serialize` so handlers can return them without framework-specific
//! wrapping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reporting cadence, which determines evaluation and chart window lengths.
///
/// Anything that is not `monthly` is treated as weekly-oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Monthly,
    Weekly,
}

impl Cadence {
    /// Parse a cadence from a request parameter. Unknown values fall back
    /// to weekly.
    pub fn from_param(s: &str) -> Self {
        if s.eq_ignore_ascii_case("monthly") {
            Cadence::Monthly
        } else {
            Cadence::Weekly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Monthly => "monthly",
            Cadence::Weekly => "weekly",
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Monthly
    }
}

/// Measure type of a series: unit counts or revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureType {
    #[serde(rename = "U")]
    Units,
    #[serde(rename = "R")]
    Revenue,
}

impl MeasureType {
    /// Parse the single-letter wire code used by the data store.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "U" => Some(MeasureType::Units),
            "R" => Some(MeasureType::Revenue),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MeasureType::Units => "U",
            MeasureType::Revenue => "R",
        }
    }
}

/// Level of the product hierarchy a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductLevel {
    Total,
    Department,
    Category,
}

impl ProductLevel {
    /// Column value used by the data store for this level.
    pub fn column_value(&self) -> &'static str {
        match self {
            ProductLevel::Total => "total",
            ProductLevel::Department => "department_id",
            ProductLevel::Category => "category_id",
        }
    }
}

/// Entity-id filter applied when fetching hierarchy rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityFilter {
    /// No entity filter; all entities at the level.
    All,
    /// Exact entity id (e.g. the `ALL` total row).
    Exact(String),
    /// Id prefix (e.g. categories belonging to one department).
    Prefix(String),
}

impl EntityFilter {
    pub fn matches(&self, entity_id: &str) -> bool {
        match self {
            EntityFilter::All => true,
            EntityFilter::Exact(id) => entity_id == id,
            EntityFilter::Prefix(prefix) => entity_id.starts_with(prefix.as_str()),
        }
    }
}

/// One observation of a series: a calendar date with an optional realized
/// actual, an optional forecast, and independently optional confidence
/// bounds. Within one series, dates are unique and analysis happens in
/// ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub ci85_low: Option<f64>,
    pub ci85_high: Option<f64>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,
}

impl TimeSeriesPoint {
    /// Bare observation with no forecast or bounds attached.
    pub fn observed(date: NaiveDate, actual: Option<f64>) -> Self {
        Self {
            date,
            actual,
            forecast: None,
            ci85_low: None,
            ci85_high: None,
            ci95_low: None,
            ci95_high: None,
        }
    }
}

/// A repository row: an observation tagged with the entity and measure it
/// belongs to. Rows sharing (entity, measure) form one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub entity_id: String,
    pub measure: MeasureType,
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub ci85_low: Option<f64>,
    pub ci85_high: Option<f64>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,
}

impl SeriesRow {
    /// Strip the series key, leaving just the observation.
    pub fn point(&self) -> TimeSeriesPoint {
        TimeSeriesPoint {
            date: self.date,
            actual: self.actual,
            forecast: self.forecast,
            ci85_low: self.ci85_low,
            ci85_high: self.ci85_high,
            ci95_low: self.ci95_low,
            ci95_high: self.ci95_high,
        }
    }
}

/// Exceedance statistics for one series as of a reference date.
///
/// Counts are days whose actual breached the respective bound; the
/// `_consec` fields are the longest runs of consecutive breaching days on
/// the 85% band (no streaks are tracked for the 95% band). `total_days`
/// counts days with a realized actual. Computed fresh per request, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceedanceReport {
    pub upper_85: u32,
    pub upper_95: u32,
    pub lower_85: u32,
    pub lower_95: u32,
    pub upper_85_consec: u32,
    pub lower_85_consec: u32,
    pub total_days: u32,
}

/// Aggregated band breaks for one entity: its units report and its revenue
/// report side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    pub entity_id: String,
    pub units: ExceedanceReport,
    pub revenue: ExceedanceReport,
}

/// Revenue report enriched with the summed actual revenue over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    #[serde(flatten)]
    pub breaks: ExceedanceReport,
    pub total: f64,
}

/// Summary metrics for a location total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub units: ExceedanceReport,
    pub revenue: RevenueSummary,
}

/// One chart-ready point. Dates are ISO strings; the actual is suppressed
/// for dates after the reference date; every numeric field is
/// independently null-propagated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub ci85_low: Option<f64>,
    pub ci85_high: Option<f64>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,
}

/// One row of the wide forecast view used by the full-view query/export
/// feature. Carries model metadata and the 90% bounds that the exceedance
/// engine never consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullViewRow {
    pub forecast_name: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub model_name: Option<String>,
    pub fv: Option<f64>,
    pub fv_mape: Option<f64>,
    pub fv_mean_mape: Option<f64>,
    pub fv_mean_mape_c: Option<f64>,
    pub ci85_low: Option<f64>,
    pub ci85_high: Option<f64>,
    pub ci90_low: Option<f64>,
    pub ci90_high: Option<f64>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,
}

/// Column order of the full view, shared by the JSON and CSV outputs.
pub const FULL_VIEW_COLUMNS: &[&str] = &[
    "forecast_name",
    "date",
    "value",
    "model_name",
    "fv",
    "fv_mape",
    "fv_mean_mape",
    "fv_mean_mape_c",
    "ci85_low",
    "ci85_high",
    "ci90_low",
    "ci90_high",
    "ci95_low",
    "ci95_high",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_from_param() {
        assert_eq!(Cadence::from_param("monthly"), Cadence::Monthly);
        assert_eq!(Cadence::from_param("Monthly"), Cadence::Monthly);
        assert_eq!(Cadence::from_param("weekly"), Cadence::Weekly);
        assert_eq!(Cadence::from_param("anything-else"), Cadence::Weekly);
    }

    #[test]
    fn test_measure_type_codes() {
        assert_eq!(MeasureType::from_code("U"), Some(MeasureType::Units));
        assert_eq!(MeasureType::from_code("R"), Some(MeasureType::Revenue));
        assert_eq!(MeasureType::from_code("X"), None);
        assert_eq!(MeasureType::Units.code(), "U");
        assert_eq!(MeasureType::Revenue.code(), "R");
    }

    #[test]
    fn test_entity_filter_matching() {
        assert!(EntityFilter::All.matches("anything"));
        assert!(EntityFilter::Exact("ALL".to_string()).matches("ALL"));
        assert!(!EntityFilter::Exact("ALL".to_string()).matches("ALLX"));
        assert!(EntityFilter::Prefix("D1_".to_string()).matches("D1_C3"));
        assert!(!EntityFilter::Prefix("D1_".to_string()).matches("D2_C3"));
    }

    #[test]
    fn test_exceedance_report_default_is_zero() {
        let report = ExceedanceReport::default();
        assert_eq!(report.upper_85, 0);
        assert_eq!(report.lower_95, 0);
        assert_eq!(report.total_days, 0);
    }

    #[test]
    fn test_measure_type_serde_codes() {
        let json = serde_json::to_string(&MeasureType::Units).unwrap();
        assert_eq!(json, "\"U\"");
        let back: MeasureType = serde_json::from_str("\"R\"").unwrap();
        assert_eq!(back, MeasureType::Revenue);
    }
}
