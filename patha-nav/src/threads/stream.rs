//! Stream thread: outbound connection upkeep and periodic node flushes.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::NavConfig;
use crate::shared::{SharedPath, SharedState};
use crate::streaming::NodeStreamSender;

/// Stream thread state and logic.
pub struct StreamThread {
    shared: Arc<SharedState>,
    path: SharedPath,
    sender: NodeStreamSender,
    retry_interval: Duration,
    flush_interval: Duration,
}

impl StreamThread {
    pub fn new(config: &NavConfig, shared: Arc<SharedState>, path: SharedPath) -> Self {
        Self {
            shared,
            path,
            sender: NodeStreamSender::new(config.stream.peers.clone()),
            retry_interval: Duration::from_millis(config.stream.retry_ms),
            flush_interval: Duration::from_millis(config.stream.flush_ms),
        }
    }

    /// Run the stream loop until shutdown. Connectivity failures never leave
    /// this loop; they are logged and retried on the fixed interval.
    pub fn run(&mut self) {
        info!("Stream thread started");

        while !self.shared.should_shutdown() {
            if !self.sender.is_connected() {
                if self.sender.try_connect() {
                    self.shared.set_connected(true);
                } else {
                    thread::sleep(self.retry_interval);
                    continue;
                }
            }

            if let Err(e) = self.sender.flush(&self.path) {
                warn!("Flush failed: {}", e);
                self.sender.disconnect();
                self.shared.set_connected(false);
                continue;
            }

            thread::sleep(self.flush_interval);
        }

        info!("Stream thread shutting down");
    }
}
