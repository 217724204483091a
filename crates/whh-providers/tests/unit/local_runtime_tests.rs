//! Tests for the local orchestrated runtime

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use whh_application::{AppHostBuilder, ReadinessGate};
use whh_domain::constants::{OUTPUT_CONNECTION_STRING, OUTPUT_URL};
use whh_domain::error::{Error, Result};
use whh_domain::ports::{LaunchContext, OrchestratedRuntime, ResourceLauncher};
use whh_domain::value_objects::{DatabaseEngine, DeclarationSet, ResourceState};
use whh_providers::LocalRuntime;

const WAIT: Duration = Duration::from_secs(5);

/// Launcher that never finishes
struct Hanging;

#[async_trait]
impl ResourceLauncher for Hanging {
    async fn launch(&self, _context: &LaunchContext) -> Result<()> {
        futures::future::pending::<()>().await;
        Ok(())
    }
}

/// Launcher that always fails
struct Broken;

#[async_trait]
impl ResourceLauncher for Broken {
    async fn launch(&self, _context: &LaunchContext) -> Result<()> {
        Err(Error::infrastructure("image pull failed"))
    }
}

/// Launcher counting shutdowns
#[derive(Default)]
struct Counting {
    shutdowns: AtomicUsize,
}

#[async_trait]
impl ResourceLauncher for Counting {
    async fn launch(&self, context: &LaunchContext) -> Result<()> {
        context.outputs.publish(OUTPUT_CONNECTION_STRING, "custom://ok");
        Ok(())
    }

    async fn shutdown(&self, _context: &LaunchContext) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn weather_topology() -> DeclarationSet {
    let mut host = AppHostBuilder::new();
    let api = host.add_project("apiservice").reference();
    let server = host
        .add_database_server("PostgresServer", DatabaseEngine::InMemory)
        .reference();
    let db = host.add_database(&server, "applicationDb").reference();
    host.add_project("webfrontend")
        .with_external_http_endpoints()
        .with_reference(&api)
        .with_reference(&db)
        .wait_for(&api);
    host.build().expect("valid topology")
}

async fn started(set: DeclarationSet) -> Arc<LocalRuntime> {
    let runtime = Arc::new(LocalRuntime::new());
    runtime.declare_resources(set).await.expect("declare");
    runtime.start().await.expect("start");
    runtime
}

#[tokio::test]
async fn test_all_resources_reach_running() {
    let runtime = started(weather_topology()).await;
    for name in ["apiservice", "PostgresServer", "applicationDb", "webfrontend"] {
        let state = runtime
            .await_state(name, ResourceState::Running, WAIT)
            .await
            .expect("running");
        assert_eq!(state, ResourceState::Running);
    }

    let set = runtime.declarations().expect("declared");
    let db = set.get("applicationDb").expect("db");
    let connection = db.outputs().get(OUTPUT_CONNECTION_STRING).expect("published");
    assert!(connection.starts_with("memory://"));
    assert!(connection.ends_with("/applicationDb"));

    let web = set.get("webfrontend").expect("web");
    assert!(web.outputs().get(OUTPUT_URL).expect("url").starts_with("http://"));

    runtime.stop().await.expect("stop");
}

#[tokio::test]
async fn test_start_before_declare_is_invalid_state() {
    let runtime = LocalRuntime::new();
    let error = runtime.start().await.expect_err("nothing declared");
    assert!(matches!(error, Error::InvalidState { .. }));
}

#[tokio::test]
async fn test_unknown_resource() {
    let runtime = started(weather_topology()).await;
    assert!(matches!(
        runtime.current_state("cache"),
        Err(Error::ResourceNotFound { .. })
    ));
    let error = runtime
        .await_state("cache", ResourceState::Running, WAIT)
        .await
        .expect_err("not declared");
    assert!(matches!(error, Error::ResourceNotFound { ref name } if name == "cache"));
    runtime.stop().await.expect("stop");
}

#[tokio::test]
async fn test_await_state_times_out_without_cancelling_startup() {
    let mut host = AppHostBuilder::new();
    host.add_resource("slow", Arc::new(Hanging));
    let runtime = started(host.build().expect("valid")).await;

    let error = runtime
        .await_state("slow", ResourceState::Running, Duration::from_millis(100))
        .await
        .expect_err("never ready");
    match error {
        Error::ReadinessTimeout {
            resource,
            last_state,
            waited,
            ..
        } => {
            assert_eq!(resource, "slow");
            assert_eq!(last_state, ResourceState::Starting);
            assert!(waited >= Duration::from_millis(100));
        }
        other => panic!("Expected ReadinessTimeout, got {other:?}"),
    }
    assert_eq!(
        runtime.current_state("slow").expect("declared"),
        ResourceState::Starting
    );

    runtime.stop().await.expect("stop tolerates mid-startup resources");
    assert_eq!(
        runtime.current_state("slow").expect("declared"),
        ResourceState::Stopped
    );
}

#[tokio::test]
async fn test_failed_launch_and_dependents() {
    let mut host = AppHostBuilder::new();
    let broken = host.add_resource("broken", Arc::new(Broken)).reference();
    host.add_project("webfrontend").wait_for(&broken);
    let runtime = started(host.build().expect("valid")).await;

    let error = runtime
        .await_state("broken", ResourceState::Running, WAIT)
        .await
        .expect_err("launch fails");
    assert!(matches!(
        error,
        Error::ResourceFailed {
            state: ResourceState::FailedToStart,
            ..
        }
    ));

    let error = runtime
        .await_state("webfrontend", ResourceState::Running, WAIT)
        .await
        .expect_err("dependency failed");
    assert!(matches!(error, Error::ResourceFailed { .. }));
    runtime.stop().await.expect("stop");
}

#[tokio::test]
async fn test_gate_over_local_runtime_reports_only_failures() {
    let mut host = AppHostBuilder::new();
    host.add_project("apiservice");
    host.add_resource("broken", Arc::new(Broken));
    let runtime = started(host.build().expect("valid")).await;

    let gate = ReadinessGate::new(runtime.clone());
    let error = gate
        .await_ready(["apiservice", "broken"], WAIT)
        .await
        .expect_err("broken fails");
    assert_eq!(error.failed_resources(), vec!["broken"]);
    runtime.stop().await.expect("stop");
}

#[tokio::test]
async fn test_stop_is_idempotent_and_shuts_down_once() {
    let counting = Arc::new(Counting::default());
    let mut host = AppHostBuilder::new();
    host.add_resource("custom", counting.clone());
    let runtime = started(host.build().expect("valid")).await;
    runtime
        .await_state("custom", ResourceState::Running, WAIT)
        .await
        .expect("running");

    runtime.stop().await.expect("first stop");
    runtime.stop().await.expect("second stop");
    assert_eq!(counting.shutdowns.load(Ordering::SeqCst), 1);
    assert_eq!(
        runtime.current_state("custom").expect("declared"),
        ResourceState::Stopped
    );

    let error = runtime.start().await.expect_err("stopped runtimes do not restart");
    assert!(matches!(error, Error::InvalidState { .. }));
}

#[tokio::test]
async fn test_stop_releases_in_memory_server() {
    let runtime = started(weather_topology()).await;
    runtime
        .await_state("applicationDb", ResourceState::Running, WAIT)
        .await
        .expect("running");
    let db = runtime
        .declarations()
        .and_then(|set| set.get("applicationDb").cloned())
        .expect("declared");
    let connection = db.outputs().get(OUTPUT_CONNECTION_STRING).expect("published");
    let (engine_id, _) =
        whh_providers::database::engine::parse_connection_string(&connection).expect("memory url");
    assert!(whh_providers::database::MemoryEngine::lookup(engine_id).is_some());

    runtime.stop().await.expect("stop");
    assert!(whh_providers::database::MemoryEngine::lookup(engine_id).is_none());
    assert!(db.outputs().get(OUTPUT_CONNECTION_STRING).is_none());
}

#[tokio::test]
async fn test_drop_without_stop_releases_in_memory_server() {
    let runtime = started(weather_topology()).await;
    runtime
        .await_state("PostgresServer", ResourceState::Running, WAIT)
        .await
        .expect("running");
    let server = runtime
        .declarations()
        .and_then(|set| set.get("PostgresServer").cloned())
        .expect("declared");
    let connection = server
        .outputs()
        .get(OUTPUT_CONNECTION_STRING)
        .expect("published");
    let engine_id = connection
        .strip_prefix("memory://")
        .expect("memory url")
        .to_string();
    assert!(whh_providers::database::MemoryEngine::lookup(&engine_id).is_some());

    drop(runtime);

    assert!(whh_providers::database::MemoryEngine::lookup(&engine_id).is_none());
    assert!(server.outputs().get(OUTPUT_CONNECTION_STRING).is_none());
}
