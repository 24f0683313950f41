//! Wall tracking state machine.
//!
//! Per-tick control decisions while driving along a wall: hold the stand-off
//! distance captured at segment start, debounce suspected wall-ends, and
//! confirm corners. Seeking and turning are blocking operations owned by the
//! control loop; the states exist here so the machine reads as one unit.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{RobotConfig, WallConfig};

/// Wall follower state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    /// Driving straight until a wall is within acquisition range
    SeekingWall,
    /// Steering to hold the stand-off distance captured at segment start
    Tracking,
    /// Debouncing a suspected wall-end
    CornerPending,
    /// Executing the corner turn
    Turning,
}

/// Decision for one tracking tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Keep driving with the given turn rate (deg/s); positive steers toward
    /// the wall, negative away, zero straight
    Steer { turn_rate: f64 },
    /// Hold course without a steering decision (baseline not yet captured)
    Hold,
    /// The wall is confirmed gone; execute the corner sequence
    Corner,
}

/// Per-segment tracking state, reset at the start of each wall segment.
#[derive(Debug, Default)]
struct WallTrackingState {
    /// Stand-off distance captured from the first in-range reading
    baseline: Option<f64>,
    /// Consecutive ticks whose delta exceeded the gap threshold
    gap_ticks: u32,
    /// Start of the false-corner grace period, if running
    grace_started: Option<Instant>,
}

impl WallTrackingState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The wall-following state machine.
pub struct WallFollower {
    gap_threshold: f64,
    gap_limit: u32,
    too_far: f64,
    grace: Duration,
    turn_rate: f64,
    state: TrackState,
    tracking: WallTrackingState,
}

impl WallFollower {
    pub fn new(wall: &WallConfig, robot: &RobotConfig) -> Self {
        Self {
            gap_threshold: wall.gap_threshold,
            gap_limit: wall.gap_ticks,
            too_far: wall.too_far,
            grace: Duration::from_secs_f64(wall.grace_secs),
            turn_rate: robot.turn_rate,
            state: TrackState::SeekingWall,
            tracking: WallTrackingState::default(),
        }
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Enter wall acquisition.
    pub fn begin_seek(&mut self) {
        self.state = TrackState::SeekingWall;
        self.tracking.reset();
    }

    /// Enter tracking for a fresh wall segment.
    pub fn begin_segment(&mut self) {
        self.state = TrackState::Tracking;
        self.tracking.reset();
    }

    /// One tracking tick against the current short-range distance (mm).
    pub fn tick(&mut self, distance: f64, now: Instant) -> TickOutcome {
        match self.tracking.baseline {
            None => self.capture_baseline(distance, now),
            Some(baseline) => self.track(distance, baseline),
        }
    }

    /// No baseline yet: adopt the reading, unless it is already too far — a
    /// reading that far at segment start is more likely a false corner than
    /// a real stand-off, so wait it out under the grace timer.
    fn capture_baseline(&mut self, distance: f64, now: Instant) -> TickOutcome {
        if distance > self.too_far {
            let started = *self.tracking.grace_started.get_or_insert(now);
            if now.duration_since(started) >= self.grace {
                debug!("Grace period expired at {:.1}mm; wall is gone", distance);
                self.confirm_corner();
                return TickOutcome::Corner;
            }
            return TickOutcome::Hold;
        }

        debug!("Segment baseline {:.1}mm", distance);
        self.tracking.baseline = Some(distance);
        self.tracking.grace_started = None;
        TickOutcome::Hold
    }

    /// Baseline held: count gap ticks and steer by the sign of the delta.
    fn track(&mut self, distance: f64, baseline: f64) -> TickOutcome {
        let delta = distance - baseline;

        if delta > self.gap_threshold {
            self.tracking.gap_ticks += 1;
            if self.tracking.gap_ticks >= self.gap_limit {
                self.confirm_corner();
                return TickOutcome::Corner;
            }
            self.state = TrackState::CornerPending;
        } else {
            self.tracking.gap_ticks = 0;
            self.state = TrackState::Tracking;
        }

        // Fixed-magnitude correction by sign only; a proportional gain would
        // change the tracking behavior and belongs to a separate tuning pass
        let turn_rate = if delta > 0.0 {
            self.turn_rate
        } else if delta < 0.0 {
            -self.turn_rate
        } else {
            0.0
        };
        TickOutcome::Steer { turn_rate }
    }

    fn confirm_corner(&mut self) {
        self.tracking.reset();
        self.state = TrackState::Turning;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn test_follower() -> WallFollower {
        let mut follower = WallFollower::new(&WallConfig::default(), &RobotConfig::default());
        follower.begin_segment();
        follower
    }

    #[test]
    fn test_baseline_captured_from_first_in_range_reading() {
        let mut follower = test_follower();
        let now = Instant::now();

        assert_eq!(follower.tick(30.0, now), TickOutcome::Hold);
        assert_eq!(
            follower.tick(30.0, now),
            TickOutcome::Steer { turn_rate: 0.0 }
        );
        assert_eq!(follower.state(), TrackState::Tracking);
    }

    #[test]
    fn test_steering_follows_sign_of_delta() {
        let mut follower = test_follower();
        let now = Instant::now();
        follower.tick(30.0, now);

        // Drifting away: steer toward the wall
        assert_eq!(
            follower.tick(35.0, now),
            TickOutcome::Steer { turn_rate: 1.0 }
        );
        // Drifting in: steer away
        assert_eq!(
            follower.tick(25.0, now),
            TickOutcome::Steer { turn_rate: -1.0 }
        );
        // On baseline: straight
        assert_eq!(
            follower.tick(30.0, now),
            TickOutcome::Steer { turn_rate: 0.0 }
        );
    }

    #[test]
    fn test_gap_debounce_requires_full_count() {
        let mut follower = test_follower();
        let now = Instant::now();
        follower.tick(20.0, now);

        // Nine gap ticks steer but do not confirm
        for _ in 0..9 {
            let outcome = follower.tick(40.0, now);
            assert_eq!(outcome, TickOutcome::Steer { turn_rate: 1.0 });
        }
        assert_eq!(follower.state(), TrackState::CornerPending);

        // The tenth consecutive gap tick confirms exactly one corner
        assert_eq!(follower.tick(40.0, now), TickOutcome::Corner);
        assert_eq!(follower.state(), TrackState::Turning);
    }

    #[test]
    fn test_gap_counter_resets_on_recovered_reading() {
        let mut follower = test_follower();
        let now = Instant::now();
        follower.tick(20.0, now);

        for _ in 0..9 {
            follower.tick(40.0, now);
        }
        // Back within range: the streak is broken
        follower.tick(21.0, now);
        assert_eq!(follower.state(), TrackState::Tracking);

        // Nine more gap ticks still do not confirm
        for _ in 0..9 {
            assert_ne!(follower.tick(40.0, now), TickOutcome::Corner);
        }
    }

    #[test]
    fn test_too_far_first_reading_waits_out_grace() {
        let mut follower = test_follower();
        let t0 = Instant::now();

        assert_eq!(follower.tick(90.0, t0), TickOutcome::Hold);
        assert_eq!(
            follower.tick(90.0, t0 + Duration::from_secs(3)),
            TickOutcome::Hold
        );
        // Persisted past the 5s grace period: wall is gone
        assert_eq!(
            follower.tick(90.0, t0 + Duration::from_millis(5100)),
            TickOutcome::Corner
        );
    }

    #[test]
    fn test_grace_recovers_when_wall_reappears() {
        let mut follower = test_follower();
        let t0 = Instant::now();

        assert_eq!(follower.tick(90.0, t0), TickOutcome::Hold);
        // Wall reappears within the grace period: adopted as baseline
        assert_eq!(
            follower.tick(30.0, t0 + Duration::from_secs(2)),
            TickOutcome::Hold
        );
        // Well past the old grace deadline, tracking continues normally
        assert_eq!(
            follower.tick(30.0, t0 + Duration::from_secs(60)),
            TickOutcome::Steer { turn_rate: 0.0 }
        );
    }

    #[test]
    fn test_jitter_below_threshold_never_corners() {
        let mut follower = test_follower();
        let now = Instant::now();
        follower.tick(30.0, now);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let jitter: f64 = rng.gen_range(-9.9..9.9);
            let outcome = follower.tick(30.0 + jitter, now);
            assert_ne!(outcome, TickOutcome::Corner);
        }
    }
}
