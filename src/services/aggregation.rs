//! Hierarchical aggregation and ranking of band breaks.
//!
//! Groups raw repository rows by entity and measure, runs the exceedance
//! engine per group, and produces the per-level dashboard shapes: plain
//! entity listings, the ranked SKU view, and the location summary.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::api::{
    ExceedanceReport, GroupResult, LocationSummary, MeasureType, RevenueSummary, SeriesRow,
    TimeSeriesPoint,
};
use crate::services::exceedance;

/// Units and revenue series for one entity.
#[derive(Debug, Default)]
struct MeasureSeries {
    units: Vec<TimeSeriesPoint>,
    revenue: Vec<TimeSeriesPoint>,
}

impl MeasureSeries {
    fn push(&mut self, row: &SeriesRow) {
        match row.measure {
            MeasureType::Units => self.units.push(row.point()),
            MeasureType::Revenue => self.revenue.push(row.point()),
        }
    }
}

/// Group rows by entity id, preserving first-sight encounter order.
///
/// The encounter order matters: ranking breaks score ties by it. A plain
/// hash map would lose it, so the groups live in a `Vec` with a side index.
fn group_rows(rows: &[SeriesRow]) -> Vec<(String, MeasureSeries)> {
    let mut groups: Vec<(String, MeasureSeries)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let slot = match index.get(&row.entity_id) {
            Some(&i) => i,
            None => {
                index.insert(row.entity_id.clone(), groups.len());
                groups.push((row.entity_id.clone(), MeasureSeries::default()));
                groups.len() - 1
            }
        };
        groups[slot].1.push(row);
    }

    groups
}

/// Split a single entity's rows by measure and evaluate both series.
///
/// A measure with no rows gets an all-zero report from the engine rather
/// than being omitted.
pub fn measure_reports(
    rows: &[SeriesRow],
    reference: NaiveDate,
) -> (ExceedanceReport, ExceedanceReport) {
    let mut series = MeasureSeries::default();
    for row in rows {
        series.push(row);
    }
    (
        exceedance::evaluate(&series.units, reference),
        exceedance::evaluate(&series.revenue, reference),
    )
}

/// Aggregate rows into one `GroupResult` per entity, sorted ascending by
/// entity id.
pub fn aggregate(rows: &[SeriesRow], reference: NaiveDate) -> Vec<GroupResult> {
    let mut results: Vec<GroupResult> = group_rows(rows)
        .into_iter()
        .map(|(entity_id, series)| GroupResult {
            entity_id,
            units: exceedance::evaluate(&series.units, reference),
            revenue: exceedance::evaluate(&series.revenue, reference),
        })
        .collect();

    results.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
    results
}

/// Breach score used to rank SKUs.
///
/// `revenue.upper_85` is deliberately excluded: revenue running above its
/// band is not treated as a planning problem. Do not generalize this
/// score to other views.
fn breach_score(units: &ExceedanceReport, revenue: &ExceedanceReport) -> u32 {
    units.upper_85 + units.lower_85 + revenue.lower_85
}

/// Rank entities by breach score, descending, and keep the top `limit`.
///
/// The score is transient: it exists only to order the results and is
/// dropped before returning. The sort is stable, so entities with equal
/// scores keep their input encounter order.
pub fn rank(rows: &[SeriesRow], reference: NaiveDate, limit: usize) -> Vec<GroupResult> {
    struct Scored {
        score: u32,
        result: GroupResult,
    }

    let mut scored: Vec<Scored> = group_rows(rows)
        .into_iter()
        .map(|(entity_id, series)| {
            let units = exceedance::evaluate(&series.units, reference);
            let revenue = exceedance::evaluate(&series.revenue, reference);
            Scored {
                score: breach_score(&units, &revenue),
                result: GroupResult {
                    entity_id,
                    units,
                    revenue,
                },
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored.into_iter().map(|s| s.result).collect()
}

/// Summary for a location total: both reports plus the summed revenue
/// actuals across the window.
pub fn location_summary(rows: &[SeriesRow], reference: NaiveDate) -> LocationSummary {
    let (units, revenue_breaks) = measure_reports(rows, reference);

    let total: f64 = rows
        .iter()
        .filter(|r| r.measure == MeasureType::Revenue)
        .filter_map(|r| r.actual)
        .sum();

    LocationSummary {
        units,
        revenue: RevenueSummary {
            breaks: revenue_breaks,
            total,
        },
    }
}
