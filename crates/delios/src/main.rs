mod cli;
mod error;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use delios_config::{config_path, load_config};
use delios_core::{Cycle, Poller, PollerConfig, Scheduler};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_json);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout carries only readings.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_poller_config(&cli.global)?;
    debug!(command = ?cli.command, "dispatching command");

    match cli.command {
        Command::Run => run_forever(config, &cli.global).await,
        Command::Once => run_once(config, &cli.global).await,
    }
}

/// Load the config file and environment, then validate into a `PollerConfig`.
fn build_poller_config(global: &GlobalOpts) -> Result<PollerConfig, CliError> {
    let path: PathBuf = global.config.clone().unwrap_or_else(config_path);
    let display = path.display().to_string();

    let cfg = load_config(Some(path.as_path()))
        .map_err(|e| CliError::from_config(e, display.clone()))?;
    debug!(?cfg, "configuration loaded");
    cfg.to_poller_config()
        .map_err(|e| CliError::from_config(e, display))
}

fn new_poller(config: PollerConfig) -> Result<Poller, CliError> {
    Poller::new(config).map_err(|source| CliError::Client { source })
}

async fn run_once(config: PollerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let poller = new_poller(config)?;
    let outcome = poller.refresh_all().await;

    let rendered = output::render_readings(global.output, &poller.store().snapshot())?;
    output::print_output(&rendered, global.quiet)?;

    if outcome.is_ok() {
        return Ok(());
    }
    let summary = outcome
        .failures()
        .map(|(cycle, err)| format!("{cycle}: {err}"))
        .collect::<Vec<_>>()
        .join("; ");
    Err(CliError::Refresh { summary })
}

async fn run_forever(config: PollerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let daily_interval = config.daily_interval;
    let annual_interval = config.annual_interval;
    let poller = Arc::new(new_poller(config)?);

    let mut daily_rx = poller.store().subscribe(Cycle::Daily);
    let mut annual_rx = poller.store().subscribe(Cycle::Annual);
    let scheduler = Scheduler::spawn(Arc::clone(&poller), daily_interval, annual_interval);
    info!(
        daily_secs = daily_interval.as_secs(),
        annual_secs = annual_interval.as_secs(),
        "polling started"
    );

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for Ctrl-C; shutting down");
                }
                break;
            }
            Ok(()) = daily_rx.changed() => report(&poller, global)?,
            Ok(()) = annual_rx.changed() => report(&poller, global)?,
        }
    }

    info!("shutting down");
    scheduler.shutdown().await;
    Ok(())
}

fn report(poller: &Poller, global: &GlobalOpts) -> Result<(), CliError> {
    let rendered = output::render_readings(global.output, &poller.store().snapshot())?;
    output::print_output(&rendered, global.quiet)
}
