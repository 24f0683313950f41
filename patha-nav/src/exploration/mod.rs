//! Wall acquisition and tracking.

mod aligner;
mod follower;

pub use aligner::WallAligner;
pub use follower::{TickOutcome, TrackState, WallFollower};
