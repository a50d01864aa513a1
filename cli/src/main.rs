use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use liveview_core::gateway::serve;
use liveview_core::{CommandGateway, Config, EventBus, GatewayFactory, ViewShell};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, Level};

/// Live view control panel
#[derive(Parser, Debug)]
#[command(name = "liveview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal control panel for a live view backend", long_about = None)]
struct Cli {
    /// Path to the config file (defaults to ~/.liveview/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend program to spawn instead of the in-process backend
    #[arg(short, long, value_name = "PROGRAM")]
    backend: Option<String>,

    /// Argument passed to the backend program (repeatable)
    #[arg(long = "backend-arg", value_name = "ARG", allow_hyphen_values = true)]
    backend_arg: Vec<String>,

    /// Simulated latency of the in-process backend
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,

    /// Write logs to this file (TUI mode defaults to ~/.liveview/liveview.log)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Serve the in-process backend as JSON lines on stdin/stdout
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    init_tracing(&cli)?;
    info!("Starting liveview");

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_overrides()?;
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    match cli.command {
        Some(Mode::Serve) => {
            let gateway = GatewayFactory::create_local(&config);
            info!("Serving {} on stdio", gateway.info().name);
            serve(gateway, tokio::io::stdin(), tokio::io::stdout())
                .await
                .context("Backend stream failed")?;
        }
        None => run_tui(&config).await?,
    }

    info!("liveview shutting down");
    Ok(())
}

async fn run_tui(config: &Config) -> Result<()> {
    let gateway = GatewayFactory::from_config(config).context("Failed to start the backend")?;
    info!("Using gateway: {}", gateway.info().name);

    // Create event bus for communication
    let event_bus = EventBus::new();
    let shell = ViewShell::new(gateway, event_bus.sender())
        .with_thresholds(config.thresholds.clone())
        .with_notice_ttl(config.ui.notice_ttl());

    liveview_tui::utils::terminal::install_panic_hook();

    let mut app = liveview_tui::App::new(shell, event_bus.into_receiver()).with_tick(config.ui.tick());
    app.run().await
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(backend) = &cli.backend {
        config.gateway.backend = Some(backend.clone());
    }
    if !cli.backend_arg.is_empty() {
        config.gateway.backend_args = cli.backend_arg.clone();
    }
    if let Some(latency) = cli.latency_ms {
        config.gateway.latency_ms = latency;
    }
}

/// Where log output goes
#[derive(Debug, PartialEq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// The TUI owns the terminal, so it logs to a file unless told otherwise.
/// `serve` keeps stderr because stdout carries the protocol.
fn log_target(cli: &Cli) -> LogTarget {
    match (&cli.log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, Some(Mode::Serve)) => LogTarget::Stderr,
        (None, None) => LogTarget::File(Config::config_path().with_file_name("liveview.log")),
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };

    match log_target(cli) {
        LogTarget::File(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            }
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
