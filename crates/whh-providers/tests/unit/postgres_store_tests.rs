//! Tests for the Postgres history store
//!
//! Need a reachable server in `WHH_TEST_POSTGRES_URL`.

use chrono::NaiveDate;
use whh_application::ports::registry::HistoryStoreProviderConfig;
use whh_domain::entities::WeatherData;
use whh_domain::repositories::HistoryStoreProvider;
use whh_providers::database::PostgresHistoryStore;

#[tokio::test]
async fn test_lazy_pool_does_not_connect_on_creation() {
    let store = PostgresHistoryStore::connect(&HistoryStoreProviderConfig::new(
        "postgres://nobody@127.0.0.1:1/nothing",
    ))
    .expect("pool is built lazily");
    assert_eq!(store.provider_name(), "postgres");
    store.close().await.expect("close");
    assert!(store.open().await.is_err());
}

#[tokio::test]
#[ignore = "requires a running Postgres server (WHH_TEST_POSTGRES_URL)"]
async fn test_round_trip_against_server() {
    let url = std::env::var("WHH_TEST_POSTGRES_URL").expect("WHH_TEST_POSTGRES_URL");
    let store =
        PostgresHistoryStore::connect(&HistoryStoreProviderConfig::new(url)).expect("pool");
    store.migrate().await.expect("migrate");

    let repo = store.open().await.expect("open");
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date");
    let stored = repo
        .insert(WeatherData::new(date, -2.0, "snow"))
        .await
        .expect("insert");
    let last = repo.last().await.expect("last").expect("row");
    assert_eq!(last.id, stored.id);
    assert_eq!(last.date, date);
    store.close().await.expect("close");
}
