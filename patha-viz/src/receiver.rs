//! Inbound node stream listener and decoder.

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use patha_core::NodeDecoder;

use crate::error::Result;
use crate::shared::SharedViewport;

/// Read chunk size
const READ_BUFFER_SIZE: usize = 4096;

/// Accepts one sender at a time and feeds decoded node batches into the
/// shared viewport. The listener is long-lived: when the sender disconnects,
/// it loops back to accepting, tolerating any number of reconnects.
pub struct NodeStreamReceiver {
    bind_address: String,
}

impl NodeStreamReceiver {
    pub fn new(bind_address: String) -> Self {
        Self { bind_address }
    }

    /// Run the accept loop until shutdown. Only the initial bind can fail;
    /// per-connection errors are logged and the loop re-accepts.
    pub fn run(&self, viewport: &SharedViewport, shutdown: &AtomicBool) -> Result<()> {
        let listener = TcpListener::bind(&self.bind_address)?;
        listener.set_nonblocking(true)?;
        info!("Listening on {}", self.bind_address);

        while !shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    info!("Sender connected: {}", addr);
                    if let Err(e) = self.serve(stream, viewport, shutdown) {
                        warn!("Stream error: {}", e);
                    }
                    info!("Sender disconnected: {}", addr);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No connection pending
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }

        info!("Receiver shutting down");
        Ok(())
    }

    /// Drain one connection: read chunks, decode complete records, ingest
    /// each batch. Returns on peer close or shutdown.
    fn serve(
        &self,
        mut stream: TcpStream,
        viewport: &SharedViewport,
        shutdown: &AtomicBool,
    ) -> Result<()> {
        stream.set_nonblocking(false)?;
        // Read timeout so the shutdown flag is checked periodically
        stream.set_read_timeout(Some(Duration::from_millis(500)))?;

        let mut decoder = NodeDecoder::new();
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(());
            }

            match stream.read(&mut buf) {
                // Zero-length read: the sender closed the connection
                Ok(0) => return Ok(()),
                Ok(n) => {
                    let nodes = decoder.push(&buf[..n]);
                    if !nodes.is_empty() {
                        let mut guard = viewport.lock().unwrap_or_else(|e| e.into_inner());
                        guard.ingest(&nodes);
                        debug!(
                            "Ingested {} nodes (total {}, shift ({:.0}, {:.0}), scale {:.3})",
                            nodes.len(),
                            guard.canvas_nodes().len(),
                            guard.shift().x,
                            guard.shift().y,
                            guard.scale()
                        );
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}
