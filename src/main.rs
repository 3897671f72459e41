//! Jasminer Exporter CLI
//!
//! Serves Prometheus metrics for a single Jasminer device.

use clap::Parser;
use jasminer_exporter::{
    config::{Cli, ExporterConfig},
    device::Device,
    digest::DigestClient,
    metrics::{MetricAdapter, MetricTable, MetricsServer, MetricsServerConfig},
    Exporter,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = match ExporterConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Jasminer Exporter v{}", jasminer_exporter::VERSION);
    info!("Jasminer Uri: {}", config.device_uri);
    info!("Metrics Path: {}", config.metrics_path);

    let client = match DigestClient::with_options(
        config.credentials.clone(),
        config.timeout,
        config.nonce_count_format,
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Error initializing exporter: {}", e);
            std::process::exit(1);
        }
    };

    let device = Device::new(config.device_uri.clone(), client);
    let exporter = Exporter::new(device, MetricAdapter::new(MetricTable::default()));
    let server = MetricsServer::new(
        MetricsServerConfig {
            bind_addr: config.listen_addr,
            metrics_path: config.metrics_path.clone(),
        },
        exporter,
    );

    if let Err(e) = server.run(shutdown_signal()).await {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Shut down");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
