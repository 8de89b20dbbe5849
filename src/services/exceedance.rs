//! Band-break exceedance engine.
//!
//! Given one entity+measure series and a reference date, counts the days
//! whose actual value breached the 85%/95% confidence bounds and tracks
//! the longest consecutive breach runs on the 85% band. The engine is
//! total: any input shape, including empty series and internally
//! inconsistent bounds, yields a well-formed report.

use chrono::NaiveDate;

use crate::api::{ExceedanceReport, TimeSeriesPoint};

/// Evaluate a series as of `reference`.
///
/// The input may be unsorted: points dated after `reference` are dropped
/// (future actuals must not count) and the remainder is sorted ascending
/// by date, so the result is independent of input order.
///
/// Days with an absent actual are removed before the streak tracker runs:
/// they neither count toward `total_days` nor reset a running streak, so a
/// streak continues across a gap.
pub fn evaluate(series: &[TimeSeriesPoint], reference: NaiveDate) -> ExceedanceReport {
    let mut points: Vec<&TimeSeriesPoint> = series.iter().filter(|p| p.date <= reference).collect();
    points.sort_by_key(|p| p.date);

    let mut report = ExceedanceReport::default();
    let mut upper_streak: u32 = 0;
    let mut lower_streak: u32 = 0;

    for point in points {
        let actual = match point.actual {
            Some(v) => v,
            None => continue,
        };

        report.total_days += 1;

        // A missing bound disables that check for the day. The bounds are
        // trusted as-is: inconsistent bounds can put one day on both sides.
        if point.ci85_high.is_some_and(|high| actual > high) {
            report.upper_85 += 1;
            upper_streak += 1;
            report.upper_85_consec = report.upper_85_consec.max(upper_streak);
        } else {
            upper_streak = 0;
        }

        if point.ci95_high.is_some_and(|high| actual > high) {
            report.upper_95 += 1;
        }

        if point.ci85_low.is_some_and(|low| actual < low) {
            report.lower_85 += 1;
            lower_streak += 1;
            report.lower_85_consec = report.lower_85_consec.max(lower_streak);
        } else {
            lower_streak = 0;
        }

        if point.ci95_low.is_some_and(|low| actual < low) {
            report.lower_95 += 1;
        }
    }

    report
}
