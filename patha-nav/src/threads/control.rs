//! Control thread: sensing, wall tracking, and node recording.
//!
//! One iteration of the outer loop is one wall segment: acquire a wall
//! (seek, record a node, align), then track it tick by tick until a corner
//! is confirmed or a wall appears ahead.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::NavConfig;
use crate::error::{NavError, Result};
use crate::estimator;
use crate::exploration::{TickOutcome, TrackState, WallAligner, WallFollower};
use crate::hardware::Hardware;
use crate::sensing::DistanceFilter;
use crate::shared::{SharedPath, SharedState};

/// Control thread state and logic.
pub struct ControlThread {
    config: NavConfig,
    shared: Arc<SharedState>,
    path: SharedPath,
    hardware: Hardware,
    filter: DistanceFilter,
    aligner: WallAligner,
    follower: WallFollower,
}

impl ControlThread {
    pub fn new(
        config: NavConfig,
        shared: Arc<SharedState>,
        path: SharedPath,
        hardware: Hardware,
    ) -> Self {
        let filter = DistanceFilter::new(config.sensing.samples);
        let aligner = WallAligner::new(config.aligner.clone());
        let follower = WallFollower::new(&config.wall, &config.robot);

        Self {
            config,
            shared,
            path,
            hardware,
            filter,
            aligner,
            follower,
        }
    }

    /// Run the control loop until shutdown. The drive is stopped on every
    /// exit path, including errors.
    pub fn run(&mut self) -> Result<()> {
        info!("Control thread started");

        let result = self.run_segments();
        let _ = self.hardware.drive.stop();

        if result.is_ok() {
            info!("Control thread shutting down");
        }
        result
    }

    fn run_segments(&mut self) -> Result<()> {
        loop {
            if self.shared.should_shutdown() {
                return Ok(());
            }
            self.acquire_wall()?;

            if self.shared.should_shutdown() {
                return Ok(());
            }
            self.track_segment()?;
        }
    }

    /// Seek until a wall is ahead, record the segment-start node, and align
    /// square to the surface.
    fn acquire_wall(&mut self) -> Result<()> {
        self.seek_wall()?;
        if self.shared.should_shutdown() {
            return Ok(());
        }

        self.record_node()?;
        self.aligner.align(
            &self.filter,
            &mut *self.hardware.short_ranger,
            &mut *self.hardware.long_ranger,
            &mut *self.hardware.drive,
        )?;
        self.follower.begin_segment();
        Ok(())
    }

    /// Drive straight until the long-range sensor confirms a wall within
    /// acquisition distance.
    fn seek_wall(&mut self) -> Result<()> {
        self.follower.begin_seek();
        debug!("Seeking wall");

        let tick = Duration::from_millis(self.config.wall.tick_ms);
        loop {
            if self.shared.should_shutdown() {
                return Ok(());
            }
            if self.hardware.long_ranger.distance()? <= self.config.wall.max_wall_distance {
                return Ok(());
            }
            self.hardware.drive.drive(self.config.robot.speed, 0.0)?;
            thread::sleep(tick);
        }
    }

    /// Track the current segment until it ends.
    fn track_segment(&mut self) -> Result<()> {
        let tick = Duration::from_millis(self.config.wall.tick_ms);
        self.hardware
            .drive
            .drive(self.config.robot.speed, 0.0)?;

        loop {
            if self.shared.should_shutdown() {
                return Ok(());
            }

            // A wall ahead ends the segment: stop and let the outer loop
            // start the next one against the new surface
            if self.hardware.long_ranger.distance()? <= self.config.wall.max_wall_distance {
                info!("Wall ahead; ending segment");
                self.hardware.drive.stop()?;
                thread::sleep(Duration::from_millis(self.config.wall.settle_ms));
                return Ok(());
            }

            let distance = self.hardware.short_ranger.distance()?;
            match self.follower.tick(distance, Instant::now()) {
                TickOutcome::Steer { turn_rate } => {
                    if self.follower.state() == TrackState::CornerPending {
                        debug!("Suspected wall end at {:.1}mm; debouncing", distance);
                    }
                    self.hardware.drive.drive(self.config.robot.speed, turn_rate)?;
                }
                TickOutcome::Hold => {}
                TickOutcome::Corner => {
                    self.corner_sequence()?;
                    return Ok(());
                }
            }

            thread::sleep(tick);
        }
    }

    /// Confirmed corner: stop, record the corner node, and turn into the
    /// next segment. Realignment happens when the outer loop re-acquires.
    fn corner_sequence(&mut self) -> Result<()> {
        info!(
            "Corner confirmed; turning {:.0} deg",
            self.config.wall.turn_degrees
        );
        self.hardware.drive.stop()?;
        thread::sleep(Duration::from_millis(self.config.wall.corner_settle_ms));

        self.record_node()?;
        self.shared.increment_corners();

        self.hardware.drive.turn(self.config.wall.turn_degrees)?;
        Ok(())
    }

    /// Append the current dead-reckoned position to the path graph.
    fn record_node(&mut self) -> Result<()> {
        let last = self
            .path
            .read()
            .map_err(|e| NavError::Lock(format!("path graph: {}", e)))?
            .last();

        let node = estimator::advance(&mut *self.hardware.drive, last)?;
        if !node.is_finite() {
            return Err(NavError::Fault(format!(
                "Non-finite position estimate: ({}, {})",
                node.x, node.y
            )));
        }

        self.path
            .write()
            .map_err(|e| NavError::Lock(format!("path graph: {}", e)))?
            .append(node);
        info!("Recorded node ({:.0}, {:.0})", node.x, node.y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{
        DriveCommand, FixedRanger, MockDrive, ScriptedRanger, LONG_MAX_RANGE, SHORT_MAX_RANGE,
    };
    use patha_core::{Node, PathGraph};
    use std::sync::RwLock;

    fn build_thread(hardware: Hardware) -> (ControlThread, SharedPath, Arc<SharedState>) {
        let mut config = NavConfig::default();
        // Keep the scripted tests fast
        config.wall.tick_ms = 1;
        config.wall.settle_ms = 1;
        config.wall.corner_settle_ms = 1;

        let shared = Arc::new(SharedState::new());
        let path: SharedPath = Arc::new(RwLock::new(PathGraph::new()));
        let thread = ControlThread::new(config, Arc::clone(&shared), Arc::clone(&path), hardware);
        (thread, path, shared)
    }

    #[test]
    fn test_seek_drives_until_wall_within_range() {
        let drive = MockDrive::new();
        let log = drive.log_handle();

        let hardware = Hardware {
            short_ranger: Box::new(FixedRanger::open_space(SHORT_MAX_RANGE)),
            long_ranger: Box::new(ScriptedRanger::new([250.0, 200.0, 120.0], LONG_MAX_RANGE)),
            drive: Box::new(drive),
        };
        let (mut thread, _path, _shared) = build_thread(hardware);

        thread.seek_wall().unwrap();

        // Two readings beyond range produced two straight drive commands;
        // the third reading (120 <= 140) ended the seek
        let commands = log.lock().unwrap().clone();
        assert_eq!(
            commands,
            vec![
                DriveCommand::Drive {
                    speed: 50.0,
                    turn_rate: 0.0
                };
                2
            ]
        );
    }

    #[test]
    fn test_record_node_appends_estimate() {
        let mut drive = MockDrive::new();
        drive.set_motion(100.0, 0.0);

        let hardware = Hardware {
            short_ranger: Box::new(FixedRanger::open_space(SHORT_MAX_RANGE)),
            long_ranger: Box::new(FixedRanger::open_space(LONG_MAX_RANGE)),
            drive: Box::new(drive),
        };
        let (mut thread, path, _shared) = build_thread(hardware);

        thread.record_node().unwrap();

        let graph = path.read().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.last(), Node::new(100.0, 0.0));
    }

    #[test]
    fn test_corner_sequence_stops_records_and_turns() {
        let mut drive = MockDrive::new();
        drive.set_motion(500.0, 0.0);
        let log = drive.log_handle();

        let hardware = Hardware {
            short_ranger: Box::new(FixedRanger::open_space(SHORT_MAX_RANGE)),
            long_ranger: Box::new(FixedRanger::open_space(LONG_MAX_RANGE)),
            drive: Box::new(drive),
        };
        let (mut thread, path, shared) = build_thread(hardware);

        thread.corner_sequence().unwrap();

        let commands = log.lock().unwrap().clone();
        assert_eq!(
            commands,
            vec![DriveCommand::Stop, DriveCommand::Turn(90.0)]
        );
        assert_eq!(path.read().unwrap().last(), Node::new(500.0, 0.0));
        assert_eq!(shared.corners(), 1);
    }

    #[test]
    fn test_track_segment_confirms_corner_after_debounce() {
        let mut drive = MockDrive::new();
        drive.set_motion(300.0, 0.0);
        let log = drive.log_handle();

        // Baseline at 20mm, then a persistent 20mm gap
        let mut readings = vec![20.0];
        readings.extend([40.0; 10]);

        let hardware = Hardware {
            short_ranger: Box::new(ScriptedRanger::new(readings, SHORT_MAX_RANGE)),
            long_ranger: Box::new(FixedRanger::open_space(LONG_MAX_RANGE)),
            drive: Box::new(drive),
        };
        let (mut thread, path, shared) = build_thread(hardware);
        thread.follower.begin_segment();

        thread.track_segment().unwrap();

        // Exactly one corner: one turn command, one appended node
        let commands = log.lock().unwrap().clone();
        let turns: Vec<_> = commands
            .iter()
            .filter(|c| matches!(c, DriveCommand::Turn(_)))
            .collect();
        assert_eq!(turns, vec![&DriveCommand::Turn(90.0)]);
        assert_eq!(path.read().unwrap().len(), 2);
        assert_eq!(path.read().unwrap().last(), Node::new(300.0, 0.0));
        assert_eq!(shared.corners(), 1);
    }

    #[test]
    fn test_track_segment_ends_on_wall_ahead() {
        let drive = MockDrive::new();
        let log = drive.log_handle();

        let hardware = Hardware {
            short_ranger: Box::new(FixedRanger::new(30.0, SHORT_MAX_RANGE)),
            // Clear for two ticks, then a wall ahead at 100mm
            long_ranger: Box::new(ScriptedRanger::new([250.0, 250.0, 100.0], LONG_MAX_RANGE)),
            drive: Box::new(drive),
        };
        let (mut thread, path, _shared) = build_thread(hardware);
        thread.follower.begin_segment();

        thread.track_segment().unwrap();

        // Ended by stopping, not by a corner turn
        let commands = log.lock().unwrap().clone();
        assert_eq!(commands.last(), Some(&DriveCommand::Stop));
        assert!(!commands.iter().any(|c| matches!(c, DriveCommand::Turn(_))));
        // No corner node was recorded
        assert_eq!(path.read().unwrap().len(), 1);
    }
}
