//! PathaViz - Path Visualizer
//!
//! Receives the node stream from PathaNav, normalizes the growing path into
//! a fixed-size canvas, and feeds canvas-space frames to the render sink.
//!
//! ## Architecture
//!
//! - **Receiver Thread**: accepts one sender at a time, decodes 16-byte node
//!   records, ingests batches into the shared viewport
//! - **Render Loop** (main thread, fixed tick rate): snapshots the viewport
//!   and hands frames to the SVG sink

mod config;
mod error;
mod receiver;
mod render;
mod shared;
mod viewport;

use config::VizConfig;
use error::{Result, VizError};
use receiver::NodeStreamReceiver;
use render::{RenderLoop, SvgSink};
use shared::SharedViewport;
use viewport::ViewportNormalizer;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{error, info};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patha_viz=info".parse().unwrap()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let config = if args.len() > 1 && !args[1].starts_with("--") {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        VizConfig::load(config_path)?
    } else if Path::new("pathaviz.toml").exists() {
        info!("Loading configuration from pathaviz.toml");
        VizConfig::load(Path::new("pathaviz.toml"))?
    } else {
        info!("Using default configuration");
        VizConfig::default()
    };

    info!("PathaViz v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Canvas {}x{}, {} fps, listening on {}",
        config.canvas.width,
        config.canvas.height,
        config.render.fps,
        config.listen.address()
    );

    let viewport: SharedViewport = Arc::new(Mutex::new(ViewportNormalizer::new(
        config.canvas.width,
        config.canvas.height,
    )));
    let shutdown = Arc::new(AtomicBool::new(false));

    // Set up shutdown signal handler
    let ctrlc_shutdown = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal");
        ctrlc_shutdown.store(true, Ordering::Relaxed);
    })
    .map_err(|e| VizError::Config(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Create the snapshot output directory if needed
    let svg_path = Path::new(&config.render.svg_path);
    if let Some(parent) = svg_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Spawn the receiver thread; a bind failure takes the process down with
    // it, since a visualizer that cannot listen has nothing to show
    let recv_viewport = Arc::clone(&viewport);
    let recv_shutdown = Arc::clone(&shutdown);
    let bind_address = config.listen.address();
    let receiver_handle = thread::Builder::new()
        .name("receiver".into())
        .spawn(move || {
            let receiver = NodeStreamReceiver::new(bind_address);
            if let Err(e) = receiver.run(&recv_viewport, &recv_shutdown) {
                tracing::error!("Receiver error: {}", e);
                recv_shutdown.store(true, Ordering::Relaxed);
            }
        })?;

    // Render loop on the main thread
    let mut sink = SvgSink::new(svg_path, config.canvas.width, config.canvas.height);
    RenderLoop::new(config.render.fps).run(&viewport, &mut sink, &shutdown);

    info!("Waiting for receiver to finish...");
    if let Err(e) = receiver_handle.join() {
        error!("Receiver thread panicked: {:?}", e);
    }

    let rendered = viewport
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .canvas_nodes()
        .len();
    info!("PathaViz finished ({} nodes rendered)", rendered);
    Ok(())
}
