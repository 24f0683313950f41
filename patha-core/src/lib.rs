//! PathaCore - shared vocabulary for the Patha wall-following explorer
//!
//! This library holds the types the navigator (patha-nav) and the visualizer
//! (patha-viz) agree on: 2-D vector math, the append-only path graph with its
//! send cursor, and the 16-byte node wire codec.

pub mod geometry;
pub mod path;
pub mod wire;

// Re-export commonly used types
pub use geometry::Vec2;
pub use path::{Node, PathGraph};
pub use wire::{NodeDecoder, RECORD_SIZE, encode_nodes};
