use std::path::PathBuf;
use std::sync::Arc;

use admin_client::{AdminApi, AdminClient, ClientConfig};
use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use report_core::RangePreset;
use report_state::{
    CallLogReportLoader, Clock, DashboardLoader, LoadOutcome, NoticeBus, Orchestrator,
    ReportLoader, Selection, SystemClock,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod render;

const NOTICE_CAPACITY: usize = 16;
const DEFAULT_SERVICE_ID: u64 = 1;

#[derive(Parser)]
#[command(name = "repair-report")]
#[command(about = "Dashboard and call-log reports for the repair admin API")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./repair-console.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Admin API base URL, overrides config and environment
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token, overrides config and environment
    #[arg(long, global = true)]
    token: Option<String>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Order, user and catalog overview
    Dashboard {
        /// 7d, 30d, 3m, 1y or all
        #[arg(long, default_value = "7d")]
        range: RangePreset,
    },
    /// Daily call-log counts reported by the server
    CallLogs {
        #[arg(long, default_value = "7d")]
        range: RangePreset,

        #[arg(long, default_value_t = DEFAULT_SERVICE_ID)]
        service_id: u64,
    },
    /// List the range presets and the windows they resolve to now
    Presets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Presets = cli.command {
        render::presets(SystemClock.now());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "configuration resolved");
    let api: Arc<dyn AdminApi> =
        Arc::new(AdminClient::new(&config).context("failed to create admin client")?);

    match cli.command {
        Commands::Dashboard { range } => {
            let loader = DashboardLoader::new(api, Local);
            let report = load_once(loader, Selection::new(range)).await?;
            if cli.json {
                print_json(&*report)
            } else {
                render::dashboard(&report);
                Ok(())
            }
        }
        Commands::CallLogs { range, service_id } => {
            let loader = CallLogReportLoader::new(api, Local);
            let selection = Selection::new(range).with_service_id(service_id);
            let series = load_once(loader, selection).await?;
            if cli.json {
                print_json(&*series)
            } else {
                render::call_logs(&series, service_id);
                Ok(())
            }
        }
        Commands::Presets => Ok(()),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    // stdout carries the report, logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(verbose)
                .with_file(false),
        )
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.api_base = base_url.clone();
    }
    if let Some(token) = &cli.token {
        config.auth_token = Some(token.clone());
    }
    Ok(config)
}

/// One load for `selection`; notices are printed and a failed load is an
/// error so the process exits non-zero.
async fn load_once<L: ReportLoader>(
    loader: L,
    selection: Selection,
) -> anyhow::Result<Arc<L::Output>> {
    let (selection_tx, selection_rx) = watch::channel(selection);
    let (bus, mut notices) = NoticeBus::new(NOTICE_CAPACITY);
    let mut orchestrator = Orchestrator::new(loader, Arc::new(SystemClock), selection_rx, bus);

    let outcome = orchestrator.refresh().await;
    while let Ok(notice) = notices.try_recv() {
        render::notice(&notice);
    }
    drop(selection_tx);

    match (outcome, orchestrator.output()) {
        (LoadOutcome::Applied, Some(output)) => Ok(output),
        (outcome, _) => bail!(
            "report could not be loaded ({}, {outcome:?})",
            orchestrator.state().description()
        ),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
