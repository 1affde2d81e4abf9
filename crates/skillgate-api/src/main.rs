//! Skillgate gateway entry point.
//!
//! Binary name: `skillgate`
//!
//! Loads configuration and secrets, wires the application state, and
//! serves the REST API.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use skillgate_api::http;
use skillgate_api::state::AppState;
use skillgate_infra::config::{load_config, Secrets};

#[derive(Parser)]
#[command(
    name = "skillgate",
    version,
    about = "Edge request gateway: auth, quotas, KYC sessions, and per-request tracing"
)]
struct Cli {
    /// Listen port; overrides the config file.
    #[arg(long)]
    port: Option<u16>,

    /// Path to the gateway config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Bridge tracing spans to an OpenTelemetry exporter.
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    skillgate_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let mut config = load_config(&cli.config).await;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let port = config.server.port;

    let secrets = Secrets::from_env()?;
    let state = AppState::init(config, secrets)?;
    let router = http::router::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "skillgate gateway listening");
    axum::serve(listener, router).await?;

    skillgate_observe::tracing_setup::shutdown_tracing();
    Ok(())
}
