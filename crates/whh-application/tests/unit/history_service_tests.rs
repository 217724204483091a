//! Tests for the weather history service

use crate::test_utils::RecordingRepository;
use chrono::NaiveDate;
use std::sync::Arc;
use whh_application::HistoryService;
use whh_domain::entities::WeatherData;
use whh_domain::error::Error;

fn service() -> HistoryService {
    HistoryService::new(Arc::new(RecordingRepository::default()))
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).expect("valid date")
}

#[tokio::test]
async fn test_add_then_get_last() {
    let service = service();
    let stored = service
        .add_data_point(WeatherData::new(day(1), 21.5, "clear"))
        .await
        .expect("stored");
    assert!(stored.id > 0);

    let last = service.get_last_data_point().await.expect("last");
    assert_eq!(last.date, day(1));
    assert_eq!(last.summary, "clear");
}

#[tokio::test]
async fn test_get_last_returns_most_recent() {
    let service = service();
    for d in 1..=3 {
        service
            .add_data_point(WeatherData::new(day(d), d as f64, format!("day {d}")))
            .await
            .expect("stored");
    }
    let last = service.get_last_data_point().await.expect("last");
    assert_eq!(last.summary, "day 3");
    assert_eq!(service.count().await.expect("count"), 3);
}

#[tokio::test]
async fn test_get_last_on_empty_store_is_not_found() {
    let error = service()
        .get_last_data_point()
        .await
        .expect_err("empty store");
    assert!(matches!(error, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_invalid_rows_are_rejected_before_storage() {
    let service = service();
    let error = service
        .add_data_point(WeatherData::new(day(1), 10.0, "x".repeat(101)))
        .await
        .expect_err("summary too long");
    assert!(matches!(error, Error::Validation { .. }));
    assert_eq!(service.count().await.expect("count"), 0);
}
