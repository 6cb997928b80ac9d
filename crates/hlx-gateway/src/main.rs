//! hlx gateway - Entry Point
//!
//! Reads one request document from stdin, writes one result document to
//! stdout and exits 0 on success, 1 on any failure. Logs go to stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use hlx_gateway::{startup_failure, Application, GatewayConfig};
use tracing::{info, warn};

/// Hyperliquid order gateway
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via HLX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

fn startup(args: &Args) -> Result<Application> {
    let config = GatewayConfig::load(args.config.as_deref()).context("loading configuration")?;
    Application::new(&config).context("building exchange client")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = hlx_telemetry::init_logging() {
        eprintln!("{e}");
    }

    info!("Starting hlx-gateway v{}", env!("CARGO_PKG_VERSION"));

    let envelope = match startup(&args) {
        Ok(app) => app.handle_reader(&mut tokio::io::stdin()).await,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Startup failed");
            startup_failure(format!("{e:#}"))
        }
    };

    println!("{}", envelope.to_json());
    ExitCode::from(envelope.exit_code() as u8)
}
