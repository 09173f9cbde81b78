use crate::{
    conn::{ClickHousePinger, ConnectionPinger},
    env::EnvManager,
    error::CliError,
    output::LocateReport,
    shutdown::ShutdownCoordinator,
};
use clap::Parser;
use commands::Commands;
use connectors::{clickhouse::ClickHouseClient, stream::StreamClient};
use engine_config::{Settings, SettingsBuilder};
use engine_core::{
    cancel::CancelCause, connectors::sink::clickhouse::ClickHouseSink, metrics::Metrics,
};
use engine_runtime::{exporter::MetricsServer, pipeline, telemetry};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "pskhouse",
    version,
    about = "Loads PSKReporter reception reports into ClickHouse"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            env_file,
            flush_interval_ms,
            queue_capacity,
            metrics_port,
        } => {
            let mut builder = settings_builder(env_file.as_deref())?;
            if let Some(ms) = flush_interval_ms {
                builder = builder.flush_interval(Duration::from_millis(ms));
            }
            if let Some(capacity) = queue_capacity {
                builder = builder.queue_capacity(capacity);
            }
            if let Some(port) = metrics_port {
                builder = builder.metrics_port(port);
            }
            run(builder.build()?).await?;
        }
        Commands::TestConn { env_file } => {
            let settings = settings_builder(env_file.as_deref())?.build()?;
            ClickHousePinger {
                settings: settings.clickhouse,
            }
            .ping()
            .await?;
        }
        Commands::Locate { from, to, json } => {
            let report = LocateReport::new(&from, &to)?;
            output::print_locate(&report, json)?;
        }
    }

    Ok(())
}

fn settings_builder(env_file: Option<&str>) -> Result<SettingsBuilder, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }
    Ok(SettingsBuilder::from_vars(env.all())?)
}

async fn run(settings: Settings) -> Result<(), CliError> {
    info!(settings = ?settings, "Starting pskhouse");

    let source = StreamClient::new(&settings.stream.url, settings.stream.token.expose())?;
    let clickhouse = &settings.clickhouse;
    let client = ClickHouseClient::new(
        &clickhouse.url,
        &clickhouse.database,
        &clickhouse.username,
        clickhouse.password.expose(),
    );
    let sink = ClickHouseSink::new(client, clickhouse.table.clone());

    let metrics = Metrics::new()?;
    let shutdown = CancelCause::new();

    let exporter = match settings.metrics_addr() {
        Some(addr) => Some(MetricsServer::bind(addr, metrics.clone())?.spawn(shutdown.token())),
        None => None,
    };

    let coordinator = ShutdownCoordinator::new(shutdown.clone());
    coordinator.register_handlers();

    let reporter =
        telemetry::spawn_reporter(metrics.clone(), settings.metrics_interval(), shutdown.token());

    let result = pipeline::run(&settings, source, sink, metrics, shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = reporter.await {
        warn!(error = %e, "Telemetry reporter did not complete");
    }
    if let Some(exporter) = exporter {
        if let Err(e) = exporter.await {
            warn!(error = %e, "Metrics exporter did not complete");
        }
    }

    result?;
    if coordinator.is_shutdown_requested() {
        info!("Shutdown complete");
    }
    Ok(())
}
