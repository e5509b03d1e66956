//! athenacore: runs the AthenaCore periodic tasks until SIGINT/SIGTERM.
//!
//! Startup: load `.env`, read and validate config, build the LLM client,
//! initialize Lilith and Dreamscape, register the tasks and start the
//! TaskMatrix. Any startup failure is logged and exits with status 1.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use athena_core::config::load_dotenv;
use athena_core::Config;
use athena_host::{
    register_all, Dreamscape, Lilith, PlaceholderDreamscape, PlaceholderLilith, PlaceholderMemory,
    PlaceholderTrading, TaskContext,
};
use athena_llm::LlmClient;
use athena_taskmatrix::{MatrixConfig, TaskMatrix};

// ── CLI ─────────────────────────────────────────────────────────────

/// AthenaCore periodic task runtime.
#[derive(Parser, Debug)]
#[command(name = "athenacore", version, about)]
struct Cli {
    /// Config profile; keys are looked up as `{PROFILE}_{KEY}` first.
    #[arg(long, env = "ATHENA_PROFILE", default_value = "")]
    profile: String,

    /// Heartbeat interval in milliseconds (overrides HEARTBEAT_INTERVAL_MS).
    #[arg(long)]
    heartbeat_ms: Option<u64>,

    /// Status log interval in seconds; 0 disables it.
    #[arg(long, env = "ATHENA_STATUS_INTERVAL", default_value_t = 60)]
    status_interval: u64,
}

// ── Main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %format!("{:#}", e), "Failed to start AthenaCore");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::for_profile(&cli.profile);
    if let Some(ms) = cli.heartbeat_ms {
        config.scheduler.heartbeat_interval_ms = ms;
    }
    config.validate().context("invalid configuration")?;
    config.log_summary();

    let llm = LlmClient::from_config(&config).context("failed to create LLM provider")?;
    info!(provider = %llm.provider_name(), "LLM client ready");

    let lilith: Arc<dyn Lilith> = Arc::new(PlaceholderLilith::new(config.lilith.clone()));
    if config.lilith.enabled {
        lilith.initialize().await.context("failed to initialize Lilith")?;
    }
    let dreamscape: Arc<dyn Dreamscape> = Arc::new(PlaceholderDreamscape::new(config.dreamscape.clone()));
    if config.dreamscape.enabled {
        dreamscape.initialize().await.context("failed to initialize Dreamscape")?;
    }

    let matrix = TaskMatrix::new(MatrixConfig {
        heartbeat_interval_ms: config.scheduler.heartbeat_interval_ms,
    });
    let ctx = TaskContext {
        llm,
        lilith,
        dreamscape,
        memory: Arc::new(PlaceholderMemory),
        trading: Arc::new(PlaceholderTrading),
        heartbeat: matrix.heartbeat(),
    };
    let registered = register_all(&matrix, &ctx, &config)?;

    matrix.start().context("failed to start TaskMatrix")?;
    info!(tasks = registered, "AthenaCore is operational");

    wait_for_shutdown(&matrix, Duration::from_secs(cli.status_interval))
        .await
        .context("failed to listen for shutdown signals")?;

    info!("Shutting down AthenaCore...");
    matrix.stop();
    match serde_json::to_string(&matrix.snapshot()) {
        Ok(json) => info!(snapshot = %json, "final task status"),
        Err(e) => warn!(error = %e, "failed to serialize final task status"),
    }
    Ok(())
}

/// Block until a shutdown signal arrives, logging a status line every
/// `status_every` meanwhile.
async fn wait_for_shutdown(matrix: &TaskMatrix, status_every: Duration) -> std::io::Result<()> {
    let signal = os_signal();
    tokio::pin!(signal);

    if status_every.is_zero() {
        return signal.await;
    }

    let mut ticker = tokio::time::interval(status_every);
    // Skip the immediate first tick
    ticker.tick().await;

    loop {
        tokio::select! {
            res = &mut signal => return res,
            _ = ticker.tick() => log_status(matrix),
        }
    }
}

fn log_status(matrix: &TaskMatrix) {
    let snapshot = matrix.snapshot();
    let runs: u64 = snapshot.tasks.iter().map(|t| t.status.runs).sum();
    info!(
        state = ?snapshot.state,
        tasks = snapshot.tasks.len(),
        runs,
        last_heartbeat = ?snapshot.last_heartbeat,
        "status"
    );
    for task in snapshot.failing_tasks() {
        if let Some(err) = &task.status.last_error {
            warn!(task_id = %task.id, failures = task.status.failures, error = %err.message, "task failing");
        }
    }
}

/// Wait for SIGINT or SIGTERM (Unix) or Ctrl+C (cross-platform fallback).
async fn os_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
