//! Hardware trait seams.
//!
//! The navigator consumes distance sensors and the drive base through these
//! traits; real drivers live outside this crate. The shipped `mock` driver
//! stands in for hardware-free runs and tests.

pub mod mock;

use crate::config::HardwareConfig;
use crate::error::{NavError, Result};

/// Ranging sensor seam.
pub trait Ranger: Send {
    /// One raw distance reading in millimeters. Readings cap at
    /// `max_range()`, which doubles as the out-of-range sentinel.
    fn distance(&mut self) -> Result<f64>;

    /// The sensor's max-range sentinel value.
    fn max_range(&self) -> f64;
}

/// Drive base seam.
///
/// Odometry is consumed read-then-reset: `traveled_distance` and `heading`
/// accumulate since the last `reset_odometry`, and the caller resets
/// immediately after reading so each motion increment is consumed exactly
/// once.
pub trait DriveBase: Send {
    /// Drive with the given speed (mm/s) and turn rate (deg/s).
    fn drive(&mut self, speed: f64, turn_rate: f64) -> Result<()>;

    /// Stop both motors.
    fn stop(&mut self) -> Result<()>;

    /// Rotate in place by `degrees` (positive = counter-clockwise); blocks
    /// until the rotation completes.
    fn turn(&mut self, degrees: f64) -> Result<()>;

    /// Zero the accumulated distance and heading.
    fn reset_odometry(&mut self) -> Result<()>;

    /// Distance traveled since the last reset, millimeters.
    fn traveled_distance(&mut self) -> Result<f64>;

    /// Heading change since the last reset, radians.
    fn heading(&mut self) -> Result<f64>;
}

/// The sensor/actuator set the control loop runs against.
pub struct Hardware {
    /// Short-range side-facing sensor used for wall tracking
    pub short_ranger: Box<dyn Ranger>,
    /// Long-range forward sensor used for wall acquisition
    pub long_ranger: Box<dyn Ranger>,
    pub drive: Box<dyn DriveBase>,
}

/// Create the hardware set named by the configuration.
pub fn create_hardware(config: &HardwareConfig) -> Result<Hardware> {
    match config.driver.as_str() {
        "mock" => Ok(Hardware {
            short_ranger: Box::new(mock::FixedRanger::open_space(mock::SHORT_MAX_RANGE)),
            long_ranger: Box::new(mock::FixedRanger::open_space(mock::LONG_MAX_RANGE)),
            drive: Box::new(mock::MockDrive::new()),
        }),
        other => Err(NavError::Config(format!(
            "Unknown hardware driver: {}",
            other
        ))),
    }
}
