//! End-to-end dashboard flows: seeded repository rows through the calendar
//! windowing and the service layer, the same path the HTTP handlers take.

use chrono::NaiveDate;

use bandbreak::api::{Cadence, EntityFilter, MeasureType, ProductLevel};
use bandbreak::calendar;
use bandbreak::db::repositories::local::{AggregateRecord, SkuRecord};
use bandbreak::db::repositories::LocalRepository;
use bandbreak::db::repository::SeriesRepository;
use bandbreak::services;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A day inside both bands unless nudged outside.
fn department_day(
    product_id: &str,
    measure: MeasureType,
    day: NaiveDate,
    actual: f64,
) -> AggregateRecord {
    AggregateRecord {
        geo_level: "all_locations".to_string(),
        geo_id: "ALL".to_string(),
        product_level: ProductLevel::Department,
        product_id: product_id.to_string(),
        measure,
        date: day,
        actual: Some(actual),
        forecast: Some(10.0),
        ci85_low: Some(8.0),
        ci85_high: Some(12.0),
        ci95_low: Some(6.0),
        ci95_high: Some(14.0),
    }
}

fn sku_day(sku_id: &str, measure: MeasureType, day: NaiveDate, actual: f64) -> SkuRecord {
    SkuRecord {
        sku_id: sku_id.to_string(),
        category_id: "D1_C1".to_string(),
        measure,
        date: day,
        actual: Some(actual),
        forecast: Some(10.0),
        ci85_low: Some(8.0),
        ci85_high: Some(12.0),
        ci95_low: Some(6.0),
        ci95_high: Some(14.0),
    }
}

#[tokio::test]
async fn test_department_breaks_through_evaluation_window() {
    let repo = LocalRepository::new();
    let week = date(2024, 3, 2);
    let (start, end) = calendar::evaluation_window(week, Cadence::Monthly);
    assert_eq!(start, date(2024, 2, 2));
    assert_eq!(end, week);

    repo.insert_aggregate(
        Cadence::Monthly,
        [
            // Two consecutive upper breaks inside the window
            department_day("D1", MeasureType::Units, date(2024, 2, 10), 13.0),
            department_day("D1", MeasureType::Units, date(2024, 2, 11), 13.5),
            // Inside both bands
            department_day("D1", MeasureType::Units, date(2024, 2, 12), 10.0),
            // Before the window, must not count
            department_day("D1", MeasureType::Units, date(2024, 1, 15), 20.0),
            // Revenue breaks the lower 85% band once
            department_day("D1", MeasureType::Revenue, date(2024, 2, 10), 7.5),
        ],
    );

    let rows = repo
        .fetch_hierarchy_rows(
            Cadence::Monthly,
            "all_locations",
            "ALL",
            ProductLevel::Department,
            &EntityFilter::All,
            start,
            end,
        )
        .await
        .unwrap();

    let results = services::aggregate(&rows, week);
    assert_eq!(results.len(), 1);

    let d1 = &results[0];
    assert_eq!(d1.entity_id, "D1");
    assert_eq!(d1.units.upper_85, 2);
    assert_eq!(d1.units.upper_85_consec, 2);
    assert_eq!(d1.units.upper_95, 0);
    assert_eq!(d1.units.total_days, 3);
    assert_eq!(d1.revenue.lower_85, 1);
    assert_eq!(d1.revenue.total_days, 1);
}

#[tokio::test]
async fn test_sku_ranking_orders_by_breach_score() {
    let repo = LocalRepository::new();
    let week = date(2024, 3, 2);
    let (start, end) = calendar::evaluation_window(week, Cadence::Monthly);

    repo.insert_sku(
        Cadence::Monthly,
        [
            // S1: one unit upper break
            sku_day("S1", MeasureType::Units, date(2024, 2, 10), 13.0),
            // S2: two unit upper breaks and one revenue lower break
            sku_day("S2", MeasureType::Units, date(2024, 2, 10), 13.0),
            sku_day("S2", MeasureType::Units, date(2024, 2, 11), 13.0),
            sku_day("S2", MeasureType::Revenue, date(2024, 2, 10), 7.0),
            // S3: quiet
            sku_day("S3", MeasureType::Units, date(2024, 2, 10), 10.0),
        ],
    );

    let rows = repo
        .fetch_sku_rows(Cadence::Monthly, "D1_C1", start, end)
        .await
        .unwrap();

    let ranked = services::rank(&rows, week, 2);
    let ids: Vec<&str> = ranked.iter().map(|r| r.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["S2", "S1"]);
}

#[tokio::test]
async fn test_location_summary_totals_revenue() {
    let repo = LocalRepository::new();
    let week = date(2024, 3, 2);
    let (start, end) = calendar::evaluation_window(week, Cadence::Monthly);

    repo.insert_aggregate(
        Cadence::Monthly,
        [
            AggregateRecord {
                product_level: ProductLevel::Total,
                product_id: "ALL".to_string(),
                ..department_day("ALL", MeasureType::Revenue, date(2024, 2, 10), 100.0)
            },
            AggregateRecord {
                product_level: ProductLevel::Total,
                product_id: "ALL".to_string(),
                ..department_day("ALL", MeasureType::Revenue, date(2024, 2, 11), 50.5)
            },
        ],
    );

    let rows = repo
        .fetch_hierarchy_rows(
            Cadence::Monthly,
            "all_locations",
            "ALL",
            ProductLevel::Total,
            &EntityFilter::Exact("ALL".to_string()),
            start,
            end,
        )
        .await
        .unwrap();

    let summary = services::location_summary(&rows, week);
    assert_eq!(summary.revenue.total, 150.5);
    assert_eq!(summary.units.total_days, 0);
}

#[tokio::test]
async fn test_chart_projection_suppresses_future_actuals() {
    let repo = LocalRepository::new();
    let week = date(2024, 3, 2);
    let (start, end) = calendar::chart_window(week, Cadence::Monthly);
    assert_eq!(start, date(2024, 1, 17));
    assert_eq!(end, date(2024, 3, 17));

    repo.insert_aggregate(
        Cadence::Monthly,
        [
            department_day("D1", MeasureType::Units, date(2024, 2, 28), 9.0),
            department_day("D1", MeasureType::Units, date(2024, 3, 10), 9.0),
        ],
    );

    let points = repo
        .fetch_chart_rows(
            Cadence::Monthly,
            "all_locations",
            "ALL",
            ProductLevel::Department,
            "D1",
            MeasureType::Units,
            start,
            end,
        )
        .await
        .unwrap();

    let chart = services::project(&points, week);
    assert_eq!(chart.len(), 2);
    assert_eq!(chart[0].date, "2024-02-28");
    assert_eq!(chart[0].actual, Some(9.0));
    // After the reference date only the forecast survives
    assert_eq!(chart[1].date, "2024-03-10");
    assert_eq!(chart[1].actual, None);
    assert_eq!(chart[1].forecast, Some(10.0));
}

#[tokio::test]
async fn test_weeks_listing_from_stored_range() {
    let repo = LocalRepository::new();
    repo.insert_aggregate(
        Cadence::Weekly,
        [
            department_day("D1", MeasureType::Units, date(2024, 1, 3), 10.0),
            department_day("D1", MeasureType::Units, date(2024, 1, 21), 10.0),
        ],
    );

    let (range_start, range_end) = repo.date_range(Cadence::Weekly).await.unwrap().unwrap();
    let weeks: Vec<String> = calendar::weeks_in_range(range_start, range_end)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    assert_eq!(weeks, vec!["2024-01-06".to_string(), "2024-01-13".to_string(), "2024-01-20".to_string()]);
}

#[tokio::test]
async fn test_sku_info_reports_both_measures() {
    let repo = LocalRepository::new();
    let week = date(2024, 3, 2);
    let (start, end) = calendar::evaluation_window(week, Cadence::Monthly);

    repo.insert_sku(
        Cadence::Monthly,
        [
            sku_day("S1", MeasureType::Units, date(2024, 2, 10), 15.0),
            sku_day("S1", MeasureType::Revenue, date(2024, 2, 10), 5.0),
        ],
    );

    let rows = repo
        .fetch_sku_rows_by_id(Cadence::Monthly, "S1", start, end)
        .await
        .unwrap();
    let (units, revenue) = services::measure_reports(&rows, week);

    // 15.0 clears both upper bands, 5.0 clears both lower bands
    assert_eq!(units.upper_85, 1);
    assert_eq!(units.upper_95, 1);
    assert_eq!(revenue.lower_85, 1);
    assert_eq!(revenue.lower_95, 1);
}
