//! Series projection: reshape a row window into chart-ready points.

use chrono::NaiveDate;

use crate::api::{ChartPoint, TimeSeriesPoint};

/// Project a chart window of points for one entity+measure series.
///
/// One output point per input row, ordered by date ascending, with no gap
/// filling for missing dates. Actuals dated strictly after `reference` are
/// suppressed even when present in storage (backfill must not leak future
/// values onto the chart); forecast and bounds pass through with
/// independent null propagation.
pub fn project(rows: &[TimeSeriesPoint], reference: NaiveDate) -> Vec<ChartPoint> {
    let mut sorted: Vec<&TimeSeriesPoint> = rows.iter().collect();
    sorted.sort_by_key(|p| p.date);

    sorted
        .into_iter()
        .map(|p| ChartPoint {
            date: p.date.format("%Y-%m-%d").to_string(),
            actual: if p.date > reference { None } else { p.actual },
            forecast: p.forecast,
            ci85_low: p.ci85_low,
            ci85_high: p.ci85_high,
            ci95_low: p.ci95_low,
            ci95_high: p.ci95_high,
        })
        .collect()
}
