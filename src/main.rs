//! ipd binary entry point.

use clap::Parser;
use tokio::net::TcpListener;

use ipd::cli::Cli;
use ipd::http::HttpServer;
use ipd::lifecycle::{build_server, signals, Shutdown};
use ipd::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability.log_level);

    tracing::info!("ipd v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        reverse_lookup = config.lookup.reverse_lookup,
        port_lookup = config.lookup.port_lookup,
        request_timeout_secs = config.http.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated already.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let server = build_server(&config)?;
    let http = HttpServer::new(&config, server);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown.trigger_on(signals::shutdown_signal()).await;
    });

    http.run(listener, rx).await?;

    tracing::info!("ipd stopped");
    Ok(())
}
