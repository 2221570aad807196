use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use batch_logger::config::loader::load_or_default;
use batch_logger::config::ObservabilityConfig;
use batch_logger::lifecycle::{self, signals, Shutdown};
use batch_logger::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "batch-logger")]
#[command(about = "Forward batch requests to a CloudWatch Logs stream", long_about = None)]
struct Args {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // No usable observability settings yet, so report through the defaults.
            let _ = logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration. Exiting.");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "batch-logger starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        sink_kind = ?config.sink.kind,
        endpoint = %config.sink.endpoint,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = match lifecycle::start(&config).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "Failed to set up log sink. Exiting.");
            std::process::exit(1);
        }
    };

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    service.run(receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
