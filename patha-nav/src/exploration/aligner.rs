//! Sweep-based wall alignment.
//!
//! Executed once before following a new wall segment: rotate until a surface
//! is detected, overshoot past the perpendicular while tracking the minimum
//! distance, then rotate back until the measurement matches that minimum.

use tracing::{debug, info};

use crate::config::AlignerConfig;
use crate::error::{NavError, Result};
use crate::hardware::{DriveBase, Ranger};
use crate::sensing::DistanceFilter;

/// Per-alignment-pass minimum tracker: the lowest measurement seen and how
/// many consecutive steps have failed to improve on it.
struct AlignmentState {
    lowest: f64,
    stale_steps: u32,
}

impl AlignmentState {
    fn new(start: f64) -> Self {
        Self {
            lowest: start,
            stale_steps: 0,
        }
    }

    /// Record one measurement; returns true if it improved the minimum.
    fn observe(&mut self, measurement: f64) -> bool {
        if measurement < self.lowest {
            self.lowest = measurement;
            self.stale_steps = 0;
            true
        } else {
            self.stale_steps += 1;
            false
        }
    }
}

/// Three-phase blocking search that faces the robot at a wall surface.
pub struct WallAligner {
    config: AlignerConfig,
}

impl WallAligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    /// Rotate until squarely facing the nearest wall surface.
    ///
    /// The sweeps rotate clockwise and the converge phase rotates back
    /// counter-clockwise. Each phase aborts with `NavError::Fault` once its
    /// total rotation passes the configured ceiling, so an unreachable wall
    /// cannot spin the robot forever.
    pub fn align(
        &self,
        filter: &DistanceFilter,
        short_ranger: &mut dyn Ranger,
        long_ranger: &mut dyn Ranger,
        drive: &mut dyn DriveBase,
    ) -> Result<()> {
        self.coarse_sweep(filter, long_ranger, drive)?;
        let lowest = self.fine_sweep(short_ranger, drive)?;
        self.converge(short_ranger, drive, lowest)?;
        info!("Aligned to wall at {:.1}mm", lowest);
        Ok(())
    }

    /// Phase 1: rotate in coarse steps until any surface is detected.
    fn coarse_sweep(
        &self,
        filter: &DistanceFilter,
        long_ranger: &mut dyn Ranger,
        drive: &mut dyn DriveBase,
    ) -> Result<()> {
        let sentinel = long_ranger.max_range();
        let mut rotated = 0.0;

        while filter.measure(long_ranger)? >= sentinel {
            self.step(drive, -self.config.coarse_step, &mut rotated, "coarse sweep")?;
        }
        debug!("Coarse sweep found a surface after {:.0} deg", rotated);
        Ok(())
    }

    /// Phase 2: keep rotating past the surface, tracking the minimum
    /// short-range distance; stop once the minimum has gone stale for the
    /// configured number of consecutive steps. Returns the minimum.
    fn fine_sweep(&self, short_ranger: &mut dyn Ranger, drive: &mut dyn DriveBase) -> Result<f64> {
        let mut state = AlignmentState::new(short_ranger.max_range());
        let mut rotated = 0.0;

        while state.stale_steps < self.config.settle_steps {
            state.observe(short_ranger.distance()?);
            self.step(drive, -self.config.fine_step, &mut rotated, "fine sweep")?;
        }
        debug!(
            "Fine sweep minimum {:.1}mm after {:.0} deg",
            state.lowest, rotated
        );
        Ok(state.lowest)
    }

    /// Phase 3: rotate back until the measurement is within tolerance of the
    /// recorded minimum, compensating for the fine sweep's overshoot.
    fn converge(
        &self,
        short_ranger: &mut dyn Ranger,
        drive: &mut dyn DriveBase,
        lowest: f64,
    ) -> Result<()> {
        let mut rotated = 0.0;

        while short_ranger.distance()? > lowest + self.config.tolerance {
            self.step(drive, self.config.fine_step, &mut rotated, "converge")?;
        }
        Ok(())
    }

    /// One rotation step, charged against the phase's fault ceiling.
    fn step(
        &self,
        drive: &mut dyn DriveBase,
        degrees: f64,
        rotated: &mut f64,
        phase: &str,
    ) -> Result<()> {
        drive.turn(degrees)?;
        *rotated += degrees.abs();
        if *rotated > self.config.max_rotation {
            return Err(NavError::Fault(format!(
                "Wall alignment {} exceeded {:.0} deg of rotation",
                phase, self.config.max_rotation
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{DriveCommand, MockDrive, ScriptedRanger, SHORT_MAX_RANGE};

    fn test_config() -> AlignerConfig {
        AlignerConfig::default()
    }

    /// A filter over a single sample keeps the scripted traces readable.
    fn single_sample() -> DistanceFilter {
        DistanceFilter::new(1)
    }

    #[test]
    fn test_coarse_sweep_rotates_until_surface_seen() {
        let aligner = WallAligner::new(test_config());
        // Two out-of-range reads, then a surface at 120mm
        let mut long = ScriptedRanger::new([255.0, 255.0, 120.0], 255.0);
        let mut drive = MockDrive::new();

        aligner
            .coarse_sweep(&single_sample(), &mut long, &mut drive)
            .unwrap();

        assert_eq!(
            drive.commands(),
            vec![DriveCommand::Turn(-5.0), DriveCommand::Turn(-5.0)]
        );
    }

    #[test]
    fn test_fine_sweep_settles_past_minimum() {
        let aligner = WallAligner::new(test_config());
        // Improving until 22mm, then three non-improving reads settle it
        let mut short = ScriptedRanger::new([40.0, 30.0, 22.0, 25.0, 28.0, 31.0], SHORT_MAX_RANGE);
        let mut drive = MockDrive::new();

        let lowest = aligner.fine_sweep(&mut short, &mut drive).unwrap();

        assert_eq!(lowest, 22.0);
        assert_eq!(drive.commands().len(), 6);
        assert!(drive.commands().iter().all(|c| *c == DriveCommand::Turn(-5.0)));
    }

    #[test]
    fn test_converge_turns_back_to_minimum() {
        let aligner = WallAligner::new(test_config());
        // Overshot by three steps; distances walk back down to the minimum
        let mut short = ScriptedRanger::new([31.0, 28.0, 25.0, 22.0], SHORT_MAX_RANGE);
        let mut drive = MockDrive::new();

        aligner.converge(&mut short, &mut drive, 22.0).unwrap();

        assert_eq!(drive.commands().len(), 3);
        assert!(drive.commands().iter().all(|c| *c == DriveCommand::Turn(5.0)));
    }

    #[test]
    fn test_full_alignment_pass() {
        let aligner = WallAligner::new(test_config());
        let mut long = ScriptedRanger::new([255.0, 130.0], 255.0);
        let mut short = ScriptedRanger::new(
            [35.0, 24.0, 26.0, 27.0, 28.0, 28.0, 26.0, 24.0],
            SHORT_MAX_RANGE,
        );
        let mut drive = MockDrive::new();

        aligner
            .align(&single_sample(), &mut short, &mut long, &mut drive)
            .unwrap();

        // 1 coarse step, 5 fine steps, 2 converge steps; net heading change
        // reflects the converge backtrack
        assert_eq!(drive.commands().len(), 8);
        assert_eq!(drive.total_turned(), -5.0 - 25.0 + 10.0);
    }

    #[test]
    fn test_unreachable_wall_faults_instead_of_spinning() {
        let aligner = WallAligner::new(test_config());
        // Never sees a surface
        let mut long = ScriptedRanger::new(std::iter::empty(), 255.0);
        let mut drive = MockDrive::new();

        let err = aligner
            .coarse_sweep(&single_sample(), &mut long, &mut drive)
            .unwrap_err();

        assert!(matches!(err, NavError::Fault(_)));
        // Stopped right past the ceiling, not unbounded
        assert!(drive.total_turned().abs() <= 720.0 + 5.0);
    }
}
