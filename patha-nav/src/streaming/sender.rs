//! Outbound node stream connection and flushing.
//!
//! One connection attempt loop: each candidate peer is tried in order, first
//! success wins, and total failure means waiting a fixed interval and trying
//! the whole list again — forever. An exploration session outlives any
//! visualizer restart, so the sender never gives up.

use std::io::Write;
use std::net::TcpStream;

use tracing::{debug, info, warn};

use patha_core::wire::encode_nodes;

use crate::config::PeerConfig;
use crate::error::{NavError, Result};
use crate::shared::SharedPath;

/// Maintains the outbound connection and flushes unsent path nodes.
pub struct NodeStreamSender {
    peers: Vec<PeerConfig>,
    stream: Option<TcpStream>,
}

impl NodeStreamSender {
    pub fn new(peers: Vec<PeerConfig>) -> Self {
        Self {
            peers,
            stream: None,
        }
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Try each candidate peer in order; true on first success.
    pub fn try_connect(&mut self) -> bool {
        for peer in &self.peers {
            let address = peer.address();
            match TcpStream::connect(&address) {
                Ok(stream) => {
                    info!("Connected to {}", address);
                    self.stream = Some(stream);
                    return true;
                }
                Err(e) => {
                    debug!("Failed to connect to {}: {}", address, e);
                }
            }
        }
        false
    }

    /// Flush the unsent tail of the path graph over the held connection.
    ///
    /// The high-water mark advances only after the bytes are written, so a
    /// peer that vanished mid-session costs nothing: the connection is
    /// dropped and the same tail goes out after the next reconnect.
    pub fn flush(&mut self, path: &SharedPath) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| NavError::Config("Flush without a connection".to_string()))?;

        match Self::write_unsent(path, stream)? {
            0 => {}
            sent => debug!("Flushed {} nodes", sent),
        }
        Ok(())
    }

    /// Drop the held connection after a send failure.
    pub fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            warn!("Stream connection lost; unsent nodes retained");
        }
    }

    /// Encode and write the unsent tail to `sink` as one write, advancing
    /// the high-water mark only on success. Returns the node count sent.
    fn write_unsent<W: Write>(path: &SharedPath, sink: &mut W) -> Result<usize> {
        // Snapshot the tail and the length it runs to; nodes appended after
        // this point belong to the next flush
        let (tail, upto) = {
            let graph = path
                .read()
                .map_err(|e| NavError::Lock(format!("path graph: {}", e)))?;
            (graph.unsent().to_vec(), graph.len())
        };

        if tail.is_empty() {
            return Ok(0);
        }

        sink.write_all(&encode_nodes(&tail))?;

        path.write()
            .map_err(|e| NavError::Lock(format!("path graph: {}", e)))?
            .mark_sent(upto);
        Ok(tail.len())
    }
}
