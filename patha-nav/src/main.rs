//! PathaNav - Wall-Following Exploration Controller
//!
//! Drives a robot along the walls of an unknown space, records the traversed
//! path as dead-reckoned waypoints, and streams them to the PathaViz
//! visualizer.
//!
//! ## Multi-Threaded Architecture
//!
//! Two threads share the path graph:
//!
//! - **Control Thread** (10Hz tick): sensing, the wall-following state
//!   machine, corner handling, node recording
//! - **Stream Thread** (1Hz flush): outbound connection upkeep, encoding and
//!   sending of unsent path nodes

mod config;
mod error;
mod estimator;
mod exploration;
mod hardware;
mod sensing;
mod shared;
mod streaming;
mod threads;

use config::NavConfig;
use error::{NavError, Result};
use hardware::create_hardware;
use shared::{SharedPath, SharedState};
use threads::spawn_threads;

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{error, info, warn};

use patha_core::PathGraph;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patha_nav=info".parse().unwrap()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let config = if args.len() > 1 && !args[1].starts_with("--") {
        // Load config from file
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        NavConfig::load(config_path)?
    } else if Path::new("patha.toml").exists() {
        info!("Loading configuration from patha.toml");
        NavConfig::load(Path::new("patha.toml"))?
    } else {
        info!("Using default configuration");
        NavConfig::default()
    };

    info!("PathaNav v{}", env!("CARGO_PKG_VERSION"));
    info!("Hardware driver: {}", config.hardware.driver);
    for peer in &config.stream.peers {
        info!("Stream peer candidate: {}", peer.address());
    }

    // The path graph starts at the origin; everything is relative to the
    // robot's starting position
    let hardware = create_hardware(&config.hardware)?;
    let shared = Arc::new(SharedState::new());
    let path: SharedPath = Arc::new(RwLock::new(PathGraph::new()));

    // Set up shutdown signal handler
    let ctrlc_state = Arc::clone(&shared);
    ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal");
        ctrlc_state.signal_shutdown();
    })
    .map_err(|e| NavError::Config(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Spawn worker threads
    info!("Starting wall-following exploration...");
    let handles = spawn_threads(
        config.clone(),
        Arc::clone(&shared),
        Arc::clone(&path),
        hardware,
    )?;

    // Main thread: Monitor and wait for completion
    let check_interval = Duration::from_millis(500);
    let mut checks = 0u32;

    loop {
        std::thread::sleep(check_interval);

        if shared.should_shutdown() {
            break;
        }

        // Periodic status line
        checks += 1;
        if checks % 20 == 0 {
            let recorded = path
                .read()
                .map(|g| g.len())
                .unwrap_or(0);
            info!(
                "Status: {} nodes, {} corners, stream {}",
                recorded,
                shared.corners(),
                if shared.is_connected() {
                    "connected"
                } else {
                    "disconnected"
                }
            );
        }

        // Check for navigation fault
        if shared.is_fault() {
            warn!(
                "Navigation fault: {}",
                shared
                    .fault_reason()
                    .unwrap_or_else(|| "unknown".to_string())
            );
            break;
        }

        // Check if threads are still alive
        if handles.control.is_finished() || handles.stream.is_finished() {
            warn!("A worker thread exited unexpectedly");
            break;
        }
    }

    // Signal shutdown to all threads
    shared.signal_shutdown();
    info!("Waiting for threads to finish...");

    if let Err(e) = handles.control.join() {
        error!("Control thread panicked: {:?}", e);
    }
    if let Err(e) = handles.stream.join() {
        error!("Stream thread panicked: {:?}", e);
    }

    // Final summary
    let (recorded, sent) = {
        let graph = path
            .read()
            .map_err(|e| NavError::Lock(format!("path graph: {}", e)))?;
        (graph.len(), graph.sent())
    };
    info!(
        "Path summary: {} nodes recorded, {} streamed, {} corners",
        recorded,
        sent,
        shared.corners()
    );

    info!("PathaNav finished");
    Ok(())
}
