//! Fixed-rate render loop and frame sinks.
//!
//! The render loop samples the shared viewport at the configured tick rate
//! and hands each snapshot to a `FrameSink`. Sinks draw; they never mutate
//! the node list. The shipped sink writes an SVG snapshot of the path.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use svg::Document;
use svg::node::element::{Circle, Line, Rectangle};
use tracing::warn;

use patha_core::Node;

use crate::error::Result;
use crate::shared::SharedViewport;

/// Render collaborator: receives the canvas-space node list each frame tick.
pub trait FrameSink {
    fn frame(&mut self, nodes: &[Node]) -> Result<()>;
}

/// Writes each frame as an SVG snapshot: circles at the waypoints, dashed
/// lines between consecutive ones.
pub struct SvgSink {
    path: PathBuf,
    width: f64,
    height: f64,
}

impl SvgSink {
    pub fn new<P: Into<PathBuf>>(path: P, width: f64, height: f64) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }

    fn document(&self, nodes: &[Node]) -> Document {
        let mut doc = Document::new()
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", format!("0 0 {} {}", self.width, self.height));

        doc = doc.add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "black"),
        );

        for pair in nodes.windows(2) {
            doc = doc.add(
                Line::new()
                    .set("x1", pair[0].x)
                    .set("y1", pair[0].y)
                    .set("x2", pair[1].x)
                    .set("y2", pair[1].y)
                    .set("stroke", "green")
                    .set("stroke-width", 1)
                    .set("stroke-dasharray", "20 20"),
            );
        }

        for node in nodes {
            doc = doc.add(
                Circle::new()
                    .set("cx", node.x)
                    .set("cy", node.y)
                    .set("r", 16)
                    .set("fill", "none")
                    .set("stroke", "green")
                    .set("stroke-width", 4),
            );
        }

        doc
    }
}

impl FrameSink for SvgSink {
    fn frame(&mut self, nodes: &[Node]) -> Result<()> {
        svg::save(&self.path, &self.document(nodes))?;
        Ok(())
    }
}

/// Fixed-rate loop feeding viewport snapshots to a frame sink.
pub struct RenderLoop {
    interval: Duration,
}

impl RenderLoop {
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
        }
    }

    /// Run until shutdown. Each tick copies a snapshot out under the
    /// viewport lock, so a re-projection pass never runs concurrently with
    /// a draw.
    pub fn run(&self, viewport: &SharedViewport, sink: &mut dyn FrameSink, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            let snapshot = viewport
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .snapshot();

            if let Err(e) = sink.frame(&snapshot) {
                warn!("Frame sink error: {}", e);
            }

            std::thread::sleep(self.interval);
        }
    }
}
