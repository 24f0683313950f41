//! Shared state for the control and stream threads.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use patha_core::PathGraph;

/// Thread-safe path storage: the control thread appends, the stream thread
/// reads the unsent tail and advances the high-water mark.
pub type SharedPath = Arc<RwLock<PathGraph>>;

/// State shared between all threads.
#[derive(Debug)]
pub struct SharedState {
    /// Shutdown signal for graceful termination
    shutdown: AtomicBool,

    /// Fatal navigation fault flag
    fault: AtomicBool,

    /// Fault reason (if any)
    fault_reason: RwLock<Option<String>>,

    /// Whether the stream thread currently holds a connection
    connected: AtomicBool,

    /// Corners confirmed so far (for status reporting)
    corners: AtomicU32,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            shutdown: AtomicBool::new(false),
            fault: AtomicBool::new(false),
            fault_reason: RwLock::new(None),
            connected: AtomicBool::new(false),
            corners: AtomicU32::new(0),
        }
    }

    /// Signal shutdown.
    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Check if shutdown is signaled.
    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Trigger a fatal fault with reason.
    pub fn trigger_fault(&self, reason: String) {
        if let Ok(mut guard) = self.fault_reason.write() {
            *guard = Some(reason);
        }
        self.fault.store(true, Ordering::Release);
    }

    /// Check if a fault is triggered.
    pub fn is_fault(&self) -> bool {
        self.fault.load(Ordering::Acquire)
    }

    /// Get the fault reason.
    pub fn fault_reason(&self) -> Option<String> {
        self.fault_reason.read().ok().and_then(|g| g.clone())
    }

    /// Record the stream connection status.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Count a confirmed corner.
    pub fn increment_corners(&self) {
        self.corners.fetch_add(1, Ordering::Relaxed);
    }

    pub fn corners(&self) -> u32 {
        self.corners.load(Ordering::Relaxed)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
