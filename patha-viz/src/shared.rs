//! Shared state between the receiver thread and the render loop.

use std::sync::{Arc, Mutex};

use crate::viewport::ViewportNormalizer;

/// Thread-safe viewport storage.
///
/// A `Mutex` rather than an `RwLock`: ingest may re-project the entire
/// rendered history, so readers and the writer alike need exclusive access,
/// and the render loop copies a snapshot out under the same lock.
pub type SharedViewport = Arc<Mutex<ViewportNormalizer>>;
