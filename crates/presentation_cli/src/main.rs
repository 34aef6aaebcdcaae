//! Resilience simulator CLI
//!
//! Drives the REST and gRPC backends through a fault window and reports how
//! each protocol's circuit breaker and fallback path held up.

#![allow(clippy::print_stdout)]

mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use application::{LoadDriver, RunSummary};
use clap::{Parser, Subcommand};
use domain::Protocol;
use infrastructure::{
    SimulationConfig, SystemClock, build_probe, init_telemetry, install_prometheus_exporter,
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::report::{Comparison, render_comparison, render_summary};

/// Resilience simulator CLI
#[derive(Parser)]
#[command(name = "resilience-sim")]
#[command(author, version, about = "REST vs gRPC resilience simulator", long_about = None)]
struct Cli {
    /// Verbosity level (overrides the configured log filter)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./resilience.toml when present)
    #[arg(short, long, env = "RESILIENCE_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fault scenario against one protocol
    Run {
        /// Protocol under test (rest or grpc)
        #[arg(short, long, default_value = "rest")]
        protocol: Protocol,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Run REST then gRPC with the same settings and compare them
    Compare {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// What to do once the configuration is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Run(Protocol),
    Compare,
    PrintConfig,
}

/// Per-invocation overrides of the loaded configuration
#[derive(clap::Args, Debug, Default)]
struct Overrides {
    /// Concurrent workers
    #[arg(long)]
    vus: Option<u32>,

    /// Test duration in seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Backend base URL
    #[arg(long)]
    base_url: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut SimulationConfig) {
        if let Some(vus) = self.vus {
            config.vus = vus;
        }
        if let Some(duration_secs) = self.duration_secs {
            config.duration_secs = duration_secs;
        }
        if let Some(base_url) = self.base_url {
            config.backend.base_url = base_url;
        }
    }
}

/// Determine log filter from verbosity count, `None` keeps the configured one
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Flag set once on Ctrl-C, shared by every run of this invocation
fn listen_for_interrupt() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, stopping workers");
                tx.send_replace(true);
            },
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                // keep the sender so runs still last their full duration
                std::future::pending::<()>().await;
            },
        }
    });
    rx
}

/// Resolves after `duration` or once `interrupted` is set
async fn stop_signal(duration: Duration, mut interrupted: watch::Receiver<bool>) {
    tokio::select! {
        () = tokio::time::sleep(duration) => {},
        _ = interrupted.wait_for(|stop| *stop) => {},
    }
}

async fn run_protocol(
    config: &SimulationConfig,
    protocol: Protocol,
    interrupted: watch::Receiver<bool>,
) -> anyhow::Result<RunSummary> {
    let probe = build_probe(config, protocol, Arc::new(SystemClock))
        .with_context(|| format!("failed to build {protocol} probe"))?;
    let settings = config.load_settings();
    let duration = settings.duration;

    info!(
        protocol = %protocol,
        vus = settings.vus,
        duration_secs = duration.as_secs(),
        "Starting run"
    );
    let driver = LoadDriver::new(Arc::new(probe), settings);
    let summary = driver.run_until(stop_signal(duration, interrupted)).await;
    info!(
        protocol = %protocol,
        iterations = summary.iterations,
        errors = summary.metrics.errors,
        fallbacks = summary.metrics.fallbacks,
        "Run finished"
    );
    Ok(summary)
}

fn load_config(
    path: Option<&Path>,
    verbose: u8,
    overrides: Option<Overrides>,
) -> anyhow::Result<SimulationConfig> {
    let mut config = SimulationConfig::load(path)?;
    if let Some(overrides) = overrides {
        overrides.apply(&mut config);
        config.validate()?;
    }
    if let Some(filter) = log_filter_from_verbosity(verbose) {
        config.telemetry.log_filter = filter.to_string();
    }
    Ok(config)
}

fn print_output<T: serde::Serialize>(json: bool, value: &T, text: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{text}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        verbose,
        config: config_path,
        json,
        command,
    } = Cli::parse();

    let (action, overrides) = match command {
        Commands::Run {
            protocol,
            overrides,
        } => (Action::Run(protocol), Some(overrides)),
        Commands::Compare { overrides } => (Action::Compare, Some(overrides)),
        Commands::Config => (Action::PrintConfig, None),
    };
    let config = load_config(config_path.as_deref(), verbose, overrides)?;

    if action == Action::PrintConfig {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    init_telemetry(&config.telemetry_config())?;
    if let Some(address) = config.metrics.prometheus_address {
        install_prometheus_exporter(address)?;
    }

    let interrupted = listen_for_interrupt();
    match action {
        Action::Run(protocol) => {
            let summary = run_protocol(&config, protocol, interrupted).await?;
            print_output(json, &summary, &render_summary(&summary))?;
        },
        Action::Compare => {
            let rest = run_protocol(&config, Protocol::Rest, interrupted.clone()).await?;
            if *interrupted.borrow() {
                warn!("Interrupted during the REST run, skipping gRPC");
                print_output(json, &rest, &render_summary(&rest))?;
                return Ok(());
            }
            let grpc = run_protocol(&config, Protocol::Grpc, interrupted).await?;
            let comparison = Comparison { rest, grpc };
            print_output(json, &comparison, &render_comparison(&comparison))?;
        },
        Action::PrintConfig => {},
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_zero_keeps_config() {
        assert_eq!(log_filter_from_verbosity(0), None);
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), Some("info"));
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), Some("debug"));
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), Some("trace"));
        assert_eq!(log_filter_from_verbosity(10), Some("trace"));
    }

    #[test]
    fn run_parses_protocol() {
        let cli = Cli::try_parse_from(["resilience-sim", "run", "--protocol", "grpc"]).unwrap();
        match cli.command {
            Commands::Run { protocol, .. } => assert_eq!(protocol, Protocol::Grpc),
            _ => unreachable!("Expected Run command"),
        }
    }

    #[test]
    fn run_defaults_to_rest() {
        let cli = Cli::try_parse_from(["resilience-sim", "run"]).unwrap();
        match cli.command {
            Commands::Run { protocol, .. } => assert_eq!(protocol, Protocol::Rest),
            _ => unreachable!("Expected Run command"),
        }
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        assert!(Cli::try_parse_from(["resilience-sim", "run", "--protocol", "soap"]).is_err());
    }

    #[test]
    fn overrides_replace_loaded_values() {
        let mut config = SimulationConfig::default();
        Overrides {
            vus: Some(10),
            duration_secs: Some(5),
            base_url: Some("http://backend:9000".to_string()),
        }
        .apply(&mut config);

        assert_eq!(config.vus, 10);
        assert_eq!(config.duration_secs, 5);
        assert_eq!(config.backend.base_url, "http://backend:9000");
    }

    #[test]
    fn empty_overrides_change_nothing() {
        let mut config = SimulationConfig::default();
        Overrides::default().apply(&mut config);
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn compare_accepts_overrides() {
        let cli =
            Cli::try_parse_from(["resilience-sim", "--json", "compare", "--vus", "20"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Compare { overrides } => assert_eq!(overrides.vus, Some(20)),
            _ => unreachable!("Expected Compare command"),
        }
    }

    #[test]
    fn load_config_applies_file_overrides_and_verbosity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resilience.toml");
        std::fs::write(&path, "vus = 3\nduration_secs = 4\n").unwrap();

        let config = load_config(
            Some(&path),
            2,
            Some(Overrides {
                duration_secs: Some(9),
                ..Overrides::default()
            }),
        )
        .unwrap();

        assert_eq!(config.vus, 3);
        assert_eq!(config.duration_secs, 9);
        assert_eq!(config.telemetry.log_filter, "debug");
    }

    #[test]
    fn load_config_rejects_invalid_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resilience.toml");
        std::fs::write(&path, "vus = 3\n").unwrap();

        let result = load_config(
            Some(&path),
            0,
            Some(Overrides {
                vus: Some(0),
                ..Overrides::default()
            }),
        );

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn stop_signal_waits_for_duration() {
        let (_tx, rx) = watch::channel(false);
        let started = std::time::Instant::now();
        stop_signal(Duration::from_millis(30), rx).await;
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn interrupt_ends_every_later_run() {
        let (tx, rx) = watch::channel(false);
        tx.send_replace(true);

        // runs started after the interrupt stop straight away
        let first = tokio::time::timeout(
            Duration::from_secs(5),
            stop_signal(Duration::from_secs(3_600), rx.clone()),
        );
        assert!(first.await.is_ok());
        let second = tokio::time::timeout(
            Duration::from_secs(5),
            stop_signal(Duration::from_secs(3_600), rx),
        );
        assert!(second.await.is_ok());
    }

    #[tokio::test]
    async fn interrupt_mid_run_stops_it() {
        let (tx, rx) = watch::channel(false);
        let run = tokio::spawn(stop_signal(Duration::from_secs(3_600), rx));
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send_replace(true);
        assert!(tokio::time::timeout(Duration::from_secs(5), run).await.is_ok());
    }
}
