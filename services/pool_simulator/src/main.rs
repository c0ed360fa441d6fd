//! Pool simulator entry point

use anyhow::{Context, Result};
use clap::Parser;
use driftswap_pool_simulator::{simulate, SimulatorConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file path
    #[arg(short, long, default_value = "services/pool_simulator/config/simulator.toml")]
    config: PathBuf,

    /// Environment override file under `environments/` next to the scenario
    #[arg(short, long)]
    environment: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pool_simulator=info,driftswap_pool_simulator=info,driftswap_amm=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    // Logs go to stderr so stdout carries only the report
    if args.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    info!("Starting pool simulator");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = SimulatorConfig::load(&args.config, args.environment.as_deref())
        .with_context(|| format!("Failed to load scenario {:?}", args.config))?;
    info!(
        pool = %config.meta.name,
        steps = config.steps.len(),
        "Scenario loaded"
    );

    let report = simulate(&config)?;
    let failed = report.steps.iter().filter(|s| s.error.is_some()).count();

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize report")?;
    println!("{}", json);

    info!(steps = report.steps.len(), failed, "Simulation complete");
    Ok(())
}
