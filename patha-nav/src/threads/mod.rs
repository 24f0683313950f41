//! Multi-threaded architecture for PathaNav.
//!
//! Two threads share the path graph:
//! - Control thread: sensing, the wall-following state machine, node appends
//! - Stream thread: outbound connection upkeep and periodic node flushes

mod control;
mod stream;

pub use control::ControlThread;
pub use stream::StreamThread;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::NavConfig;
use crate::error::Result;
use crate::hardware::Hardware;
use crate::shared::{SharedPath, SharedState};

/// Thread handles for the running system.
pub struct ThreadHandles {
    pub control: JoinHandle<()>,
    pub stream: JoinHandle<()>,
}

/// Spawn both threads and return their handles.
pub fn spawn_threads(
    config: NavConfig,
    shared: Arc<SharedState>,
    path: SharedPath,
    hardware: Hardware,
) -> Result<ThreadHandles> {
    let control_state = Arc::clone(&shared);
    let control_path = Arc::clone(&path);
    let control_config = config.clone();

    let control_handle = thread::Builder::new().name("control".into()).spawn(move || {
        let mut control =
            ControlThread::new(control_config, Arc::clone(&control_state), control_path, hardware);
        if let Err(e) = control.run() {
            tracing::error!("Control thread error: {}", e);
            control_state.trigger_fault(e.to_string());
        }
    })?;

    let stream_handle = thread::Builder::new().name("stream".into()).spawn(move || {
        let mut stream = StreamThread::new(&config, shared, path);
        stream.run();
    })?;

    Ok(ThreadHandles {
        control: control_handle,
        stream: stream_handle,
    })
}
