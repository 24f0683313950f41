//! Dead-reckoning position estimator.
//!
//! Decomposes the motion accumulated since the last odometry reset into a
//! displacement and appends it to the last known absolute position. The
//! caller resets odometry immediately after reading, so each increment of
//! motion is consumed exactly once.

use patha_core::{Node, Vec2};

use crate::error::Result;
use crate::hardware::DriveBase;

/// Displace `last` by the arc described by `distance` (mm) and `heading`
/// (radians since the segment's odometry reset).
///
/// The lateral offset is `distance * sin(heading)`; the forward offset is
/// the remaining leg of the arc, with the radicand clamped at zero so
/// degenerate inputs cannot produce NaN.
pub fn estimate(distance: f64, heading: f64, last: Node) -> Node {
    let y = distance * heading.sin();
    let x = (distance * distance - y * y).max(0.0).sqrt();
    last + Vec2::new(x, y)
}

/// Read the accumulated motion from the drive base, reset its odometry, and
/// return the new position estimate.
pub fn advance<D: DriveBase + ?Sized>(drive: &mut D, last: Node) -> Result<Node> {
    let distance = drive.traveled_distance()?;
    let heading = drive.heading()?;
    drive.reset_odometry()?;
    Ok(estimate(distance, heading, last))
}
