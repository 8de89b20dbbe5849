#[cfg(test)]
mod tests {
    use crate::api::TimeSeriesPoint;
    use crate::services::exceedance::evaluate;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Point with an 85% band of [low, high] around the actual and no 95% band.
    fn banded_point(day: &str, actual: f64, low: f64, high: f64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            date: date(day),
            actual: Some(actual),
            forecast: None,
            ci85_low: Some(low),
            ci85_high: Some(high),
            ci95_low: None,
            ci95_high: None,
        }
    }

    fn upper_only(day: &str, actual: Option<f64>, ci85_high: f64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            date: date(day),
            actual,
            forecast: None,
            ci85_low: None,
            ci85_high: Some(ci85_high),
            ci95_low: None,
            ci95_high: None,
        }
    }

    #[test]
    fn test_empty_series_is_all_zero() {
        let report = evaluate(&[], date("2024-06-15"));
        assert_eq!(report, Default::default());
    }

    #[test]
    fn test_all_inside_bands_counts_only_total_days() {
        let series = vec![
            banded_point("2024-06-01", 5.0, 1.0, 10.0),
            banded_point("2024-06-02", 6.0, 1.0, 10.0),
            banded_point("2024-06-03", 7.0, 1.0, 10.0),
        ];
        let report = evaluate(&series, date("2024-06-03"));
        assert_eq!(report.total_days, 3);
        assert_eq!(report.upper_85, 0);
        assert_eq!(report.upper_95, 0);
        assert_eq!(report.lower_85, 0);
        assert_eq!(report.lower_95, 0);
        assert_eq!(report.upper_85_consec, 0);
        assert_eq!(report.lower_85_consec, 0);
    }

    #[test]
    fn test_breach_reset_breach_gives_streak_of_one() {
        // d1 breaches, d2 resets, d3 breaches again: count 2, longest run 1.
        let series = vec![
            upper_only("2024-06-01", Some(12.0), 10.0),
            upper_only("2024-06-02", Some(9.0), 10.0),
            upper_only("2024-06-03", Some(11.0), 10.0),
        ];
        let report = evaluate(&series, date("2024-06-03"));
        assert_eq!(report.upper_85, 2);
        assert_eq!(report.upper_85_consec, 1);
        assert_eq!(report.total_days, 3);
    }

    #[test]
    fn test_consecutive_breaches_extend_streak() {
        let series = vec![
            upper_only("2024-06-01", Some(12.0), 10.0),
            upper_only("2024-06-02", Some(13.0), 10.0),
            upper_only("2024-06-03", Some(9.0), 10.0),
        ];
        let report = evaluate(&series, date("2024-06-03"));
        assert_eq!(report.upper_85, 2);
        assert_eq!(report.upper_85_consec, 2);
    }

    #[test]
    fn test_absent_actual_skipped_without_resetting_streak() {
        // Breach, gap, breach: the gap row is removed before streak
        // tracking, so the run continues across it.
        let series = vec![
            upper_only("2024-06-01", Some(12.0), 10.0),
            upper_only("2024-06-02", None, 10.0),
            upper_only("2024-06-03", Some(11.0), 10.0),
        ];
        let report = evaluate(&series, date("2024-06-03"));
        assert_eq!(report.total_days, 2);
        assert_eq!(report.upper_85, 2);
        assert_eq!(report.upper_85_consec, 2);
    }

    #[test]
    fn test_points_after_reference_are_excluded() {
        let series = vec![
            upper_only("2024-06-01", Some(12.0), 10.0),
            upper_only("2024-06-02", Some(12.0), 10.0),
            upper_only("2024-06-09", Some(12.0), 10.0),
        ];
        let report = evaluate(&series, date("2024-06-02"));
        assert_eq!(report.total_days, 2);
        assert_eq!(report.upper_85, 2);
        assert_eq!(report.upper_85_consec, 2);
    }

    #[test]
    fn test_unsorted_input_yields_identical_report() {
        let sorted = vec![
            upper_only("2024-06-01", Some(12.0), 10.0),
            upper_only("2024-06-02", Some(9.0), 10.0),
            upper_only("2024-06-03", Some(11.0), 10.0),
            upper_only("2024-06-04", Some(13.0), 10.0),
        ];
        let shuffled = vec![
            sorted[2].clone(),
            sorted[0].clone(),
            sorted[3].clone(),
            sorted[1].clone(),
        ];
        let reference = date("2024-06-04");
        assert_eq!(evaluate(&sorted, reference), evaluate(&shuffled, reference));
        // And calling twice on the same input is idempotent.
        assert_eq!(evaluate(&sorted, reference), evaluate(&sorted, reference));
    }

    #[test]
    fn test_streak_monotonic_as_history_is_prepended() {
        let reference = date("2024-06-10");
        let recent = vec![
            upper_only("2024-06-08", Some(12.0), 10.0),
            upper_only("2024-06-09", Some(12.0), 10.0),
            upper_only("2024-06-10", Some(9.0), 10.0),
        ];
        let mut with_history = vec![
            upper_only("2024-06-06", Some(12.0), 10.0),
            upper_only("2024-06-07", Some(12.0), 10.0),
        ];
        with_history.extend(recent.iter().cloned());

        let short = evaluate(&recent, reference);
        let long = evaluate(&with_history, reference);
        assert!(long.upper_85_consec >= short.upper_85_consec);
        assert!(long.upper_85 >= short.upper_85);
        assert_eq!(long.upper_85_consec, 4);
    }

    #[test]
    fn test_streak_never_exceeds_count() {
        let series = vec![
            upper_only("2024-06-01", Some(12.0), 10.0),
            upper_only("2024-06-02", Some(9.0), 10.0),
            upper_only("2024-06-03", Some(12.0), 10.0),
            upper_only("2024-06-04", Some(12.0), 10.0),
            upper_only("2024-06-05", Some(9.0), 10.0),
        ];
        let report = evaluate(&series, date("2024-06-05"));
        assert!(report.upper_85_consec <= report.upper_85);
        assert!(report.lower_85_consec <= report.lower_85);
    }

    #[test]
    fn test_lower_band_mirrors_upper_logic() {
        let series = vec![
            banded_point("2024-06-01", 0.5, 1.0, 10.0),
            banded_point("2024-06-02", 0.4, 1.0, 10.0),
            banded_point("2024-06-03", 5.0, 1.0, 10.0),
            banded_point("2024-06-04", 0.3, 1.0, 10.0),
        ];
        let report = evaluate(&series, date("2024-06-04"));
        assert_eq!(report.lower_85, 3);
        assert_eq!(report.lower_85_consec, 2);
        assert_eq!(report.upper_85, 0);
    }

    #[test]
    fn test_95_band_counted_without_streaks() {
        let mut point = banded_point("2024-06-01", 20.0, 1.0, 10.0);
        point.ci95_high = Some(15.0);
        let mut point2 = banded_point("2024-06-02", 21.0, 1.0, 10.0);
        point2.ci95_high = Some(15.0);
        let report = evaluate(&[point, point2], date("2024-06-02"));
        assert_eq!(report.upper_85, 2);
        assert_eq!(report.upper_95, 2);
        assert_eq!(report.upper_85_consec, 2);
    }

    #[test]
    fn test_missing_bound_disables_that_check() {
        // No bounds at all: only total_days moves.
        let series = vec![TimeSeriesPoint::observed(date("2024-06-01"), Some(100.0))];
        let report = evaluate(&series, date("2024-06-01"));
        assert_eq!(report.total_days, 1);
        assert_eq!(report.upper_85, 0);
        assert_eq!(report.lower_85, 0);
    }

    #[test]
    fn test_value_on_bound_is_not_a_breach() {
        let series = vec![banded_point("2024-06-01", 10.0, 10.0, 10.0)];
        let report = evaluate(&series, date("2024-06-01"));
        assert_eq!(report.upper_85, 0);
        assert_eq!(report.lower_85, 0);
    }

    #[test]
    fn test_inconsistent_bounds_count_both_sides() {
        // ci85_high < ci85_low: the engine trusts the input, so one day
        // can breach both sides at once.
        let series = vec![banded_point("2024-06-01", 5.0, 8.0, 3.0)];
        let report = evaluate(&series, date("2024-06-01"));
        assert_eq!(report.upper_85, 1);
        assert_eq!(report.lower_85, 1);
        assert_eq!(report.total_days, 1);
    }

    #[test]
    fn test_all_absent_actuals_is_all_zero() {
        let series = vec![
            upper_only("2024-06-01", None, 10.0),
            upper_only("2024-06-02", None, 10.0),
        ];
        let report = evaluate(&series, date("2024-06-02"));
        assert_eq!(report, Default::default());
    }
}
