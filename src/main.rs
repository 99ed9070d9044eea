use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use tripmate::{AppState, PlanningAgent, SessionStore, TripMateConfig, config, telemetry, terminal, web};

/// Conversational travel planning assistant
#[derive(Debug, Parser)]
#[command(name = "tripmate", version, about)]
struct Cli {
    /// Configuration file (defaults to <config dir>/tripmate/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the web server to
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the web server to
    #[arg(short, long)]
    port: Option<u16>,

    /// Chat on stdin/stdout instead of serving the web UI
    #[arg(long)]
    terminal: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = config::load_env_file(None) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    let cli = Cli::parse();

    let mut config = match TripMateConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _telemetry = telemetry::init(&config.logging)?;
    info!(version = tripmate::VERSION, model = %config.llm.model, "starting TripMate");

    let agent = PlanningAgent::from_config(&config).context("Failed to set up planning agent")?;
    if !agent.events_enabled() {
        info!("TICKETMASTER_API_KEY not set, event search disabled");
    }

    if cli.terminal {
        terminal::run_stdio(&agent).await?;
        return Ok(());
    }

    let sessions = SessionStore::new(config.server.max_sessions, config.server.session_idle_minutes);
    let state = AppState::new(agent, sessions);
    if let Err(e) = web::run(&config.server, state).await {
        error!("Server error: {:#}", e);
        return Err(e);
    }

    Ok(())
}
