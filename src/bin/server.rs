//! ventsim Server Binary
//!
//! Starts the simulation ticker and the Modbus-TCP listener.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use ventsim::config::CommitMode;
use ventsim::network::Server;
use ventsim::simulation::{Simulation, Ticker};
use ventsim::{Config, Engine};

/// ventsim Server
#[derive(Parser, Debug)]
#[command(name = "ventsim-server")]
#[command(about = "Modbus-TCP simulator for an Atrea RD5 ventilation unit")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:502")]
    listen: String,

    /// Simulation tick period in milliseconds (at least 1)
    #[arg(short, long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Hold control registers at 0 (single-step write variant)
    #[arg(long)]
    simple: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ventsim=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let commit_mode = if args.simple {
        CommitMode::AlwaysArmed
    } else {
        CommitMode::Handshake
    };

    let config = Config::builder()
        .listen_addr(&args.listen)
        .tick_interval_ms(args.tick_ms)
        .commit_mode(commit_mode)
        .build();

    tracing::info!("ventsim Server v{}", ventsim::VERSION);
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Commit mode: {:?}", config.commit_mode);
    for triple in config.register_map.triples() {
        tracing::info!(
            "{}: reported {}, control {} -> target {}",
            triple.quantity.name(),
            triple.reported,
            triple.control,
            triple.target
        );
    }

    let engine = match Engine::new(&config) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Invalid register map: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(&config, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            tracing::error!("Ports below 1024 (Modbus uses 502) usually need elevated privileges");
            std::process::exit(1);
        }
    };

    let ticker = Ticker::new(
        Simulation::new(&config),
        Arc::clone(engine.store()),
        config.tick_interval(),
    );
    if let Err(e) = ticker.spawn(server.shutdown_handle()) {
        tracing::error!("Failed to start simulation ticker: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
