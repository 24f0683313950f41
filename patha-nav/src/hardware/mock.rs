//! Mock hardware for hardware-free runs and deterministic tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{DriveBase, Ranger};
use crate::error::Result;

/// Short-range sensor cap (mm)
pub const SHORT_MAX_RANGE: f64 = 100.0;
/// Long-range sensor cap (mm)
pub const LONG_MAX_RANGE: f64 = 255.0;

/// Ranger that always returns the same reading.
pub struct FixedRanger {
    value: f64,
    max_range: f64,
}

impl FixedRanger {
    pub fn new(value: f64, max_range: f64) -> Self {
        Self { value, max_range }
    }

    /// Ranger that never sees a surface.
    pub fn open_space(max_range: f64) -> Self {
        Self::new(max_range, max_range)
    }
}

impl Ranger for FixedRanger {
    fn distance(&mut self) -> Result<f64> {
        Ok(self.value.min(self.max_range))
    }

    fn max_range(&self) -> f64 {
        self.max_range
    }
}

/// Ranger that replays a scripted sequence of readings, then reads
/// out-of-range once the script is exhausted.
pub struct ScriptedRanger {
    readings: VecDeque<f64>,
    max_range: f64,
}

impl ScriptedRanger {
    pub fn new<I: IntoIterator<Item = f64>>(readings: I, max_range: f64) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            max_range,
        }
    }
}

impl Ranger for ScriptedRanger {
    fn distance(&mut self) -> Result<f64> {
        Ok(self
            .readings
            .pop_front()
            .unwrap_or(self.max_range)
            .min(self.max_range))
    }

    fn max_range(&self) -> f64 {
        self.max_range
    }
}

/// A drive command as observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCommand {
    Drive { speed: f64, turn_rate: f64 },
    Stop,
    Turn(f64),
}

/// Drive base that records every command and serves scripted odometry.
///
/// The command log lives behind an `Arc` so tests can keep a handle to it
/// after the drive moves into a boxed `Hardware` set.
pub struct MockDrive {
    commands: Arc<Mutex<Vec<DriveCommand>>>,
    traveled: f64,
    heading: f64,
    resets: u32,
}

impl MockDrive {
    pub fn new() -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            traveled: 0.0,
            heading: 0.0,
            resets: 0,
        }
    }

    /// Stage the odometry the next read will report.
    pub fn set_motion(&mut self, traveled: f64, heading: f64) {
        self.traveled = traveled;
        self.heading = heading;
    }

    /// Number of odometry resets observed.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Handle onto the command log, valid after the drive is boxed.
    pub fn log_handle(&self) -> Arc<Mutex<Vec<DriveCommand>>> {
        Arc::clone(&self.commands)
    }

    /// Every command in issue order.
    pub fn commands(&self) -> Vec<DriveCommand> {
        self.commands.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Total degrees of in-place rotation commanded.
    pub fn total_turned(&self) -> f64 {
        self.commands()
            .iter()
            .filter_map(|c| match c {
                DriveCommand::Turn(deg) => Some(*deg),
                _ => None,
            })
            .sum()
    }

    fn record(&self, command: DriveCommand) {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command);
    }
}

impl Default for MockDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveBase for MockDrive {
    fn drive(&mut self, speed: f64, turn_rate: f64) -> Result<()> {
        self.record(DriveCommand::Drive { speed, turn_rate });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.record(DriveCommand::Stop);
        Ok(())
    }

    fn turn(&mut self, degrees: f64) -> Result<()> {
        self.record(DriveCommand::Turn(degrees));
        Ok(())
    }

    fn reset_odometry(&mut self) -> Result<()> {
        self.traveled = 0.0;
        self.heading = 0.0;
        self.resets += 1;
        Ok(())
    }

    fn traveled_distance(&mut self) -> Result<f64> {
        Ok(self.traveled)
    }

    fn heading(&mut self) -> Result<f64> {
        Ok(self.heading)
    }
}
