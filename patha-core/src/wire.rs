//! Node wire codec.
//!
//! The stream is headerless: each node is one 16-byte record, two
//! little-endian IEEE-754 doubles `(x, y)` in that order. Batches are plain
//! concatenations of records, so stream boundaries carry no meaning — only
//! total length matters, modulo the record size. Receivers buffer partial
//! records across read boundaries until 16 bytes are available.

use crate::path::Node;

/// Bytes per encoded node.
pub const RECORD_SIZE: usize = 16;

/// Encode a node batch as concatenated 16-byte records.
pub fn encode_nodes(nodes: &[Node]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(nodes.len() * RECORD_SIZE);
    for node in nodes {
        buf.extend_from_slice(&node.x.to_le_bytes());
        buf.extend_from_slice(&node.y.to_le_bytes());
    }
    buf
}

/// Incremental decoder that tolerates records split across read boundaries.
///
/// Feed raw chunks in arrival order; complete records come back immediately,
/// incomplete tails stay buffered for the next chunk. Records that decode to
/// non-finite values are a protocol violation and are dropped with a log
/// line rather than crashing the receiver.
#[derive(Debug, Default)]
pub struct NodeDecoder {
    pending: Vec<u8>,
}

impl NodeDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns every node completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Node> {
        self.pending.extend_from_slice(chunk);

        let complete = self.pending.len() / RECORD_SIZE * RECORD_SIZE;
        let mut nodes = Vec::with_capacity(complete / RECORD_SIZE);

        for record in self.pending[..complete].chunks_exact(RECORD_SIZE) {
            let x = f64::from_le_bytes(record[..8].try_into().unwrap());
            let y = f64::from_le_bytes(record[8..].try_into().unwrap());
            let node = Node::new(x, y);
            if node.is_finite() {
                nodes.push(node);
            } else {
                log::warn!("Dropping malformed node record: ({}, {})", x, y);
            }
        }

        self.pending.drain(..complete);
        nodes
    }

    /// Bytes buffered awaiting completion of a record (always < 16).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
