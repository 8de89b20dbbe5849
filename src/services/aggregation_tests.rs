#[cfg(test)]
mod tests {
    use crate::api::{MeasureType, SeriesRow};
    use crate::services::aggregation::{aggregate, location_summary, rank};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Row with an 85% upper bound of 10 and no other bounds.
    fn row(entity: &str, measure: MeasureType, day: &str, actual: f64) -> SeriesRow {
        SeriesRow {
            entity_id: entity.to_string(),
            measure,
            date: date(day),
            actual: Some(actual),
            forecast: None,
            ci85_low: Some(0.0),
            ci85_high: Some(10.0),
            ci95_low: None,
            ci95_high: None,
        }
    }

    /// Rows giving `entity` exactly `breaches` upper-85 unit breaches.
    fn breaching_rows(entity: &str, measure: MeasureType, breaches: u32) -> Vec<SeriesRow> {
        (0..breaches)
            .map(|i| {
                row(
                    entity,
                    measure,
                    &format!("2024-06-{:02}", i + 1),
                    12.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_aggregate_groups_by_entity_and_measure() {
        let rows = vec![
            row("D2", MeasureType::Units, "2024-06-01", 12.0),
            row("D1", MeasureType::Units, "2024-06-01", 5.0),
            row("D1", MeasureType::Revenue, "2024-06-01", 15.0),
        ];
        let results = aggregate(&rows, date("2024-06-15"));

        // Sorted ascending by entity id regardless of encounter order.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entity_id, "D1");
        assert_eq!(results[1].entity_id, "D2");

        assert_eq!(results[0].units.total_days, 1);
        assert_eq!(results[0].units.upper_85, 0);
        assert_eq!(results[0].revenue.upper_85, 1);
        assert_eq!(results[1].units.upper_85, 1);
    }

    #[test]
    fn test_aggregate_missing_measure_yields_zero_report() {
        let rows = vec![row("D1", MeasureType::Units, "2024-06-01", 12.0)];
        let results = aggregate(&rows, date("2024-06-15"));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].units.upper_85, 1);
        // No revenue rows: the entity still appears, with an all-zero report.
        assert_eq!(results[0].revenue, Default::default());
    }

    #[test]
    fn test_aggregate_empty_input() {
        assert!(aggregate(&[], date("2024-06-15")).is_empty());
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let mut rows = Vec::new();
        rows.extend(breaching_rows("low", MeasureType::Units, 1));
        rows.extend(breaching_rows("high", MeasureType::Units, 5));
        rows.extend(breaching_rows("mid", MeasureType::Units, 3));

        let ranked = rank(&rows, date("2024-06-15"), 50);
        let ids: Vec<&str> = ranked.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let mut rows = Vec::new();
        for (i, entity) in ["a", "b", "c", "d"].iter().enumerate() {
            rows.extend(breaching_rows(entity, MeasureType::Units, (4 - i) as u32));
        }
        let ranked = rank(&rows, date("2024-06-15"), 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entity_id, "a");
        assert_eq!(ranked[1].entity_id, "b");
    }

    #[test]
    fn test_rank_ties_keep_encounter_order() {
        let mut rows = Vec::new();
        rows.extend(breaching_rows("second", MeasureType::Units, 2));
        rows.extend(breaching_rows("third", MeasureType::Units, 2));
        rows.extend(breaching_rows("first", MeasureType::Units, 3));

        let ranked = rank(&rows, date("2024-06-15"), 50);
        let ids: Vec<&str> = ranked.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_score_excludes_revenue_upper() {
        // "quiet" has 3 revenue upper breaches, which do not score.
        // "noisy" has 1 unit upper breach, which does.
        let mut rows = Vec::new();
        rows.extend(breaching_rows("quiet", MeasureType::Revenue, 3));
        rows.extend(breaching_rows("noisy", MeasureType::Units, 1));

        let ranked = rank(&rows, date("2024-06-15"), 50);
        assert_eq!(ranked[0].entity_id, "noisy");
        assert_eq!(ranked[1].entity_id, "quiet");
        // The revenue breaches still show up in the report itself.
        assert_eq!(ranked[1].revenue.upper_85, 3);
    }

    #[test]
    fn test_rank_scores_revenue_lower_breaches() {
        let mut low_revenue = Vec::new();
        for i in 0..3 {
            low_revenue.push(SeriesRow {
                actual: Some(-1.0),
                ..row("dropper", MeasureType::Revenue, &format!("2024-06-{:02}", i + 1), 0.0)
            });
        }
        let mut rows = low_revenue;
        rows.extend(breaching_rows("bumper", MeasureType::Units, 2));

        let ranked = rank(&rows, date("2024-06-15"), 50);
        assert_eq!(ranked[0].entity_id, "dropper");
        assert_eq!(ranked[0].revenue.lower_85, 3);
    }

    #[test]
    fn test_rank_output_has_no_score_field() {
        let rows = breaching_rows("only", MeasureType::Units, 1);
        let ranked = rank(&rows, date("2024-06-15"), 10);
        let json = serde_json::to_value(&ranked).unwrap();
        let keys: Vec<&String> = json[0].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(json[0].get("entity_id").is_some());
        assert!(json[0].get("units").is_some());
        assert!(json[0].get("revenue").is_some());
    }

    #[test]
    fn test_location_summary_totals_revenue() {
        let rows = vec![
            row("ALL", MeasureType::Units, "2024-06-01", 12.0),
            row("ALL", MeasureType::Revenue, "2024-06-01", 100.0),
            row("ALL", MeasureType::Revenue, "2024-06-02", 50.5),
            SeriesRow {
                actual: None,
                ..row("ALL", MeasureType::Revenue, "2024-06-03", 0.0)
            },
        ];
        let summary = location_summary(&rows, date("2024-06-15"));

        assert_eq!(summary.units.upper_85, 1);
        assert_eq!(summary.revenue.breaks.upper_85, 2);
        assert_eq!(summary.revenue.breaks.total_days, 2);
        assert!((summary.revenue.total - 150.5).abs() < 1e-9);
    }

    #[test]
    fn test_location_summary_serializes_flat_revenue() {
        let rows = vec![row("ALL", MeasureType::Revenue, "2024-06-01", 5.0)];
        let summary = location_summary(&rows, date("2024-06-15"));
        let json = serde_json::to_value(&summary).unwrap();
        // The revenue report fields sit next to `total`, not nested under it.
        assert!(json["revenue"]["upper_85"].is_number());
        assert!(json["revenue"]["total"].is_number());
    }
}
