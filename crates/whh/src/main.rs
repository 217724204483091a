//! Weather History Harness - Entry Point
//!
//! Runs the weather app host on the local runtime until Ctrl-C.
//!
//! | Flag | Description |
//! |------|-------------|
//! | `--config` | Harness configuration file (default: `whh.toml` lookup) |
//! | `--postgres-url` | Admin URL of a Postgres server; switches the database server to Postgres |
//! | `--timeout` | Per-resource readiness timeout in seconds |

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use whh::apphost::weather_app_host;
use whh_application::ReadinessGate;
use whh_domain::ports::OrchestratedRuntime;
use whh_domain::value_objects::{DatabaseEngine, DeclarationSet};
use whh_infrastructure::config::{ConfigLoader, HarnessConfig, TimeoutPolicy};
use whh_infrastructure::logging::init_logging;
use whh_providers::{LocalRuntime, LocalRuntimeOptions};

/// Command line interface for the weather app host
#[derive(Parser, Debug)]
#[command(name = "whh")]
#[command(about = "Weather History Harness - runs the weather app host locally")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Admin URL of a Postgres server to provision databases on
    #[arg(long)]
    pub postgres_url: Option<String>,

    /// Per-resource readiness timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

fn load_config(cli: &Cli) -> anyhow::Result<HarnessConfig> {
    let mut loader = ConfigLoader::<HarnessConfig>::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("Failed to load harness configuration")?;
    if let Some(url) = &cli.postgres_url {
        config.runtime.postgres_url = Some(url.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.readiness.timeout_secs = timeout;
    }
    Ok(config)
}

fn print_resources(runtime: &LocalRuntime, declarations: &DeclarationSet) {
    let states = runtime.states();
    for declaration in declarations.iter() {
        let state = states
            .iter()
            .find(|(name, _)| name == declaration.name())
            .map_or_else(|| "unknown".to_string(), |(_, state)| state.to_string());
        let outputs = declaration
            .outputs()
            .snapshot()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<16} {:<14} {}", declaration.name(), state, outputs);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    let engine = if config.runtime.postgres_url.is_some() {
        DatabaseEngine::Postgres
    } else {
        DatabaseEngine::InMemory
    };
    let declarations = weather_app_host(engine)?;

    let runtime = Arc::new(LocalRuntime::with_options(LocalRuntimeOptions {
        bind_host: config.runtime.bind_host.clone(),
        postgres_url: config.runtime.postgres_url.clone(),
    }));
    runtime.declare_resources(declarations.clone()).await?;
    let handle = runtime.start().await?;
    info!(run_id = %handle.run_id, engine = ?engine, "App host started");

    let gate = ReadinessGate::new(runtime.clone());
    let readiness = gate
        .await_ready(declarations.names(), config.readiness.timeout())
        .await;
    print_resources(&runtime, &declarations);

    if let Err(failure) = readiness {
        match config.readiness.on_timeout {
            TimeoutPolicy::Abort => {
                runtime.stop().await?;
                return Err(failure.into());
            }
            TimeoutPolicy::Proceed => warn!("{failure}"),
        }
    }

    println!("App host running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    runtime.stop().await?;
    info!("App host stopped");
    Ok(())
}
