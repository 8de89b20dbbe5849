//! Calendar windowing: pure date-range computation for the dashboard.
//!
//! No I/O and no side effects. Window lengths depend on the reporting
//! cadence: the evaluation window bounds the statistical evaluation to a
//! recent, stable period, while the chart window deliberately shows more
//! context around the reference date.

use chrono::{Datelike, Duration, NaiveDate};

use crate::api::Cadence;

/// Evaluation window length in days, inclusive of the reference date.
fn evaluation_days(cadence: Cadence) -> i64 {
    match cadence {
        Cadence::Monthly => 30,
        Cadence::Weekly => 90,
    }
}

/// Parse a `YYYY-MM` string into the first day of that month.
fn first_of_month(year_month: &str) -> Option<NaiveDate> {
    let (year, month) = year_month.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Advance to the first day of the month `n` months after `date`'s month.
fn add_months(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    let months0 = date.year() * 12 + date.month0() as i32 + n as i32;
    NaiveDate::from_ymd_opt(months0.div_euclid(12), months0.rem_euclid(12) as u32 + 1, 1)
}

/// Compute the `[start, stop)` range selected by a month and a span.
///
/// `start` is the first day of `year_month`; `span` is clamped to 1..=3
/// (anything else defaults to 1); `stop` is `start` advanced by `span`
/// calendar months, exclusive. Returns `None` when `year_month` is not a
/// valid `YYYY-MM` string, which callers reject at the request boundary.
pub fn month_span_range(year_month: &str, span: u32) -> Option<(NaiveDate, NaiveDate)> {
    let span = if (1..=3).contains(&span) { span } else { 1 };
    let start = first_of_month(year_month)?;
    let stop = add_months(start, span)?;
    Some((start, stop))
}

/// Iterator over week-ending Saturdays, stepping 7 days at a time.
#[derive(Debug, Clone)]
pub struct Saturdays {
    next: NaiveDate,
    end: NaiveDate,
}

impl Iterator for Saturdays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.next > self.end {
            return None;
        }
        let current = self.next;
        self.next += Duration::days(7);
        Some(current)
    }
}

/// All week-ending Saturdays within `[start, end]`.
///
/// Anchors at the first Saturday on or after `start` (`start` itself when
/// it is a Saturday). The anchor is always the next Saturday; callers that
/// need week-aligned reference dates must pass one.
pub fn weeks_in_range(start: NaiveDate, end: NaiveDate) -> Saturdays {
    // Monday = 0 .. Saturday = 5.
    let days_until_saturday = (5 + 7 - start.weekday().num_days_from_monday() as i64) % 7;
    Saturdays {
        next: start + Duration::days(days_until_saturday),
        end,
    }
}

/// Inclusive `[window_start, reference]` window evaluated by the
/// exceedance engine: 30 days for monthly cadence, 90 otherwise.
pub fn evaluation_window(reference: NaiveDate, cadence: Cadence) -> (NaiveDate, NaiveDate) {
    let start = reference - Duration::days(evaluation_days(cadence) - 1);
    (start, reference)
}

/// Inclusive `[period_start, period_end]` window shown on charts. Wider
/// than the evaluation window and extending past the reference date so the
/// forecast tail stays visible.
pub fn chart_window(reference: NaiveDate, cadence: Cadence) -> (NaiveDate, NaiveDate) {
    match cadence {
        Cadence::Monthly => (reference - Duration::days(45), reference + Duration::days(15)),
        Cadence::Weekly => (reference - Duration::days(120), reference + Duration::days(30)),
    }
}
