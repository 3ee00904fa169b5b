//! roomsign daemon entry point.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use roomsign_core::{TracingConfig, init_tracing};
use roomsign_providers::{
    CalendarSource, GoogleCalendarSource, ServiceAccountCredentials, StaticTokenSource,
};
use roomsign_server::config::ServerConfig;
use roomsign_server::error::{ServerError, ServerResult};
use roomsign_server::http::{AppState, create_router};
use roomsign_server::surface::{RoomSurface, SurfaceConfig};

/// Environment variable holding a pre-minted Calendar API access token.
const ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

#[derive(Debug, Parser)]
#[command(name = "roomsign", about = "Room booking status daemon")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "ROOMSIGN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Verbose logging to stderr instead of JSON output.
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::daemon()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "daemon failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServerResult<()> {
    let mut config = match cli.config {
        Some(ref path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    config.validate()?;

    if config.rooms.is_empty() {
        return Err(ServerError::config(
            "no rooms configured; add at least one [[rooms]] entry",
        ));
    }

    let source = build_source(&config)?;

    let mut surfaces = HashMap::new();
    for room in &config.rooms {
        let surface_config = SurfaceConfig::for_room(&config, room);
        let handle = RoomSurface::spawn(surface_config, source.clone());
        surfaces.insert(room.name.clone(), handle);
    }

    let addr = config.bind_addr()?;
    let state = AppState::new(source, surfaces.clone());
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, rooms = config.rooms.len(), "roomsign listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for (room, handle) in &surfaces {
        info!(room = %room, "stopping surface");
        handle.shutdown().await;
    }

    Ok(())
}

/// Builds the calendar source from configured credentials.
///
/// Token minting happens outside the process; the daemon reads a
/// pre-minted access token from the environment.
fn build_source(config: &ServerConfig) -> ServerResult<Arc<dyn CalendarSource>> {
    let credentials = match config.credentials_file {
        Some(ref path) => ServiceAccountCredentials::from_file(path)?,
        None => ServiceAccountCredentials::from_env()?,
    };

    let token = std::env::var(ACCESS_TOKEN_ENV).map_err(|_| {
        ServerError::config(format!("{} is not set", ACCESS_TOKEN_ENV))
    })?;
    let tokens = Arc::new(StaticTokenSource::new(token));

    let source = GoogleCalendarSource::new(credentials, tokens)?;
    Ok(Arc::new(source))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown requested");
}
