//! Suite fixture tests

use crate::test_utils::{
    ProbeEntryPoint, harness_config, isolated_loader, weather_topology,
    weather_topology_with_hanging,
};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::{Duration, Instant};
use whh_application::HistoryService;
use whh_domain::entities::WeatherData;
use whh_domain::error::Error;
use whh_domain::ports::OrchestratedRuntime;
use whh_domain::value_objects::{ReadinessFailureReason, ResourceState};
use whh_infrastructure::config::{AppConfig, TimeoutPolicy};
use whh_infrastructure::di::WeatherFrontend;
use whh_infrastructure::harness::{SubjectLifecycle, SuiteFixture};
use whh_providers::LocalRuntime;

#[tokio::test]
async fn test_weather_frontend_round_trip() {
    let mut fixture = SuiteFixture::builder(WeatherFrontend)
        .declarations(weather_topology())
        .harness_config(harness_config(20))
        .subject_config_loader(isolated_loader::<AppConfig>())
        .start()
        .await
        .expect("fixture starts");

    assert!(fixture.readiness().all_ready());
    assert_eq!(fixture.readiness().waits.len(), 4);
    assert!(fixture.snapshot().contains_key("CONNECTION_STRINGS:applicationDb"));
    assert!(fixture.snapshot().contains_key("SERVICES:apiservice:URL"));
    assert!(!fixture.snapshot().contains_key("SERVER:URLS"));
    let stages: Vec<&str> = fixture
        .startup_timings()
        .stages()
        .iter()
        .map(|(name, _)| *name)
        .collect();
    assert_eq!(stages, ["runtime", "readiness", "harvest", "subject"]);

    let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
    let last = fixture
        .with_scope(|scope| async move {
            let history = scope.get::<HistoryService>()?;
            history
                .add_data_point(WeatherData::new(date, 18.0, "overcast"))
                .await?;
            history.get_last_data_point().await
        })
        .await
        .expect("scope body");
    assert_eq!(last.date, date);
    assert_eq!(last.summary, "overcast");

    fixture.teardown().await.expect("teardown");
    fixture.teardown().await.expect("second teardown is a no-op");
    assert!(fixture.is_torn_down());
    assert_eq!(fixture.subject().lifecycle(), SubjectLifecycle::Disposed);
    assert_eq!(
        fixture.runtime().current_state("PostgresServer").expect("declared"),
        ResourceState::Stopped
    );
}

#[tokio::test]
async fn test_never_ready_resource_aborts_and_tears_down() {
    let runtime = Arc::new(LocalRuntime::new());
    let probe = ProbeEntryPoint::default();
    let started = Instant::now();

    let result = SuiteFixture::builder(probe.clone())
        .runtime(runtime.clone())
        .declarations(weather_topology_with_hanging("slowpoke"))
        .harness_config(harness_config(1))
        .subject_config_loader(isolated_loader())
        .start()
        .await;

    let Err(Error::Readiness(failure)) = result else {
        panic!("Expected readiness failure");
    };
    assert_eq!(failure.failed_resources(), ["slowpoke"]);
    assert!(matches!(
        failure.failures[0].reason,
        ReadinessFailureReason::TimedOut { .. }
    ));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(probe.start_count(), 0);
    assert_eq!(
        runtime.current_state("slowpoke").expect("declared"),
        ResourceState::Stopped
    );
}

#[tokio::test]
async fn test_proceed_policy_tolerates_timeouts() {
    let mut config = harness_config(1);
    config.readiness.on_timeout = TimeoutPolicy::Proceed;

    let mut fixture = SuiteFixture::builder(ProbeEntryPoint::default())
        .declarations(weather_topology_with_hanging("slowpoke"))
        .harness_config(config)
        .subject_config_loader(isolated_loader())
        .start()
        .await
        .expect("proceeds");

    assert!(!fixture.readiness().all_ready());
    assert_eq!(fixture.readiness().tolerated[0].resource, "slowpoke");
    let waited: Vec<&str> = fixture
        .readiness()
        .waits
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        waited,
        ["PostgresServer", "applicationDb", "webfrontend"],
        "ready resources keep their waits under the proceed policy"
    );
    assert_eq!(fixture.subject().lifecycle(), SubjectLifecycle::Running);
    fixture.teardown().await.expect("teardown");
}

#[tokio::test]
async fn test_required_subset_is_the_only_gate() {
    let mut fixture = SuiteFixture::builder(ProbeEntryPoint::default())
        .declarations(weather_topology_with_hanging("slowpoke"))
        .harness_config(harness_config(1))
        .require("applicationDb")
        .require("webfrontend")
        .subject_config_loader(isolated_loader())
        .start()
        .await
        .expect("slowpoke is not required");

    assert!(fixture.readiness().all_ready());
    assert_eq!(fixture.readiness().waits.len(), 2);
    fixture.teardown().await.expect("teardown");
}

#[tokio::test]
async fn test_unknown_subject_resource_fails_before_subject_starts() {
    let probe = ProbeEntryPoint::default();
    let result = SuiteFixture::builder(probe.clone())
        .declarations(weather_topology())
        .subject_resource("frontend-that-does-not-exist")
        .subject_config_loader(isolated_loader())
        .start()
        .await;

    let Err(err) = result else {
        panic!("Expected unknown subject resource");
    };
    assert!(matches!(err, Error::ResourceNotFound { ref name } if name == "frontend-that-does-not-exist"));
    assert!(err.is_fatal_to_suite());
    assert_eq!(probe.start_count(), 0);
}

#[tokio::test]
async fn test_subject_failure_tears_down_runtime() {
    let runtime = Arc::new(LocalRuntime::new());
    let result = SuiteFixture::builder(ProbeEntryPoint::failing_start())
        .runtime(runtime.clone())
        .declarations(weather_topology())
        .harness_config(harness_config(20))
        .subject_config_loader(isolated_loader())
        .start()
        .await;

    assert!(matches!(result, Err(Error::SubjectInitialization { .. })));
    assert_eq!(
        runtime.current_state("webfrontend").expect("declared"),
        ResourceState::Stopped
    );
}

#[tokio::test]
async fn test_builder_exclusions_are_applied() {
    let mut fixture = SuiteFixture::builder(ProbeEntryPoint::default())
        .declarations(weather_topology())
        .harness_config(harness_config(20))
        .exclude_key("SERVICES__apiservice__URL")
        .subject_config_loader(isolated_loader())
        .start()
        .await
        .expect("fixture starts");

    assert!(!fixture.snapshot().contains_key("SERVICES:apiservice:URL"));
    assert!(fixture.snapshot().contains_key("CONNECTION_STRINGS:applicationDb"));
    fixture.teardown().await.expect("teardown");
}
