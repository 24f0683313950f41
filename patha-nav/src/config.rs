//! Configuration loading for PathaNav

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub sensing: SensingConfig,
    #[serde(default)]
    pub aligner: AlignerConfig,
    #[serde(default)]
    pub wall: WallConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Hardware driver selection
#[derive(Clone, Debug, Deserialize)]
pub struct HardwareConfig {
    /// Driver name; only "mock" is compiled in
    #[serde(default = "default_driver")]
    pub driver: String,
}

/// Robot drive parameters
#[derive(Clone, Debug, Deserialize)]
pub struct RobotConfig {
    /// Cruise speed in mm/s
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Fixed steering correction magnitude in deg/s
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f64,
}

/// Distance filtering parameters
#[derive(Clone, Debug, Deserialize)]
pub struct SensingConfig {
    /// Raw readings averaged per measurement
    #[serde(default = "default_samples")]
    pub samples: usize,
}

/// Wall alignment sweep parameters
#[derive(Clone, Debug, Deserialize)]
pub struct AlignerConfig {
    /// Coarse sweep step in degrees
    #[serde(default = "default_coarse_step")]
    pub coarse_step: f64,

    /// Fine sweep / converge step in degrees
    #[serde(default = "default_fine_step")]
    pub fine_step: f64,

    /// Consecutive non-improving fine steps before the minimum is accepted
    #[serde(default = "default_settle_steps")]
    pub settle_steps: u32,

    /// Converge tolerance above the recorded minimum (mm)
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Fatal-fault ceiling on total rotation per phase (degrees)
    #[serde(default = "default_max_rotation")]
    pub max_rotation: f64,
}

/// Wall tracking parameters
#[derive(Clone, Debug, Deserialize)]
pub struct WallConfig {
    /// Stand-off delta beyond which a tick counts toward a gap (mm)
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: f64,

    /// Consecutive gap ticks confirming a corner
    #[serde(default = "default_gap_ticks")]
    pub gap_ticks: u32,

    /// First-reading distance above which the baseline is not adopted (mm)
    #[serde(default = "default_too_far")]
    pub too_far: f64,

    /// Grace period before a too-far first reading means the wall is gone
    #[serde(default = "default_grace_secs")]
    pub grace_secs: f64,

    /// Long-range distance within which a wall counts as acquired (mm)
    #[serde(default = "default_max_wall_distance")]
    pub max_wall_distance: f64,

    /// Tracking tick interval (ms)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Pause after stopping at a wall ahead (ms)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause before recording the node at a confirmed corner (ms)
    #[serde(default = "default_corner_settle_ms")]
    pub corner_settle_ms: u64,

    /// Turn executed at a confirmed corner (degrees)
    #[serde(default = "default_turn_degrees")]
    pub turn_degrees: f64,
}

/// Node streaming parameters
#[derive(Clone, Debug, Deserialize)]
pub struct StreamConfig {
    /// Candidate peers tried in order on every reconnect attempt
    #[serde(default = "default_peers")]
    pub peers: Vec<PeerConfig>,

    /// Wait between full-list reconnect attempts (ms)
    #[serde(default = "default_retry_ms")]
    pub retry_ms: u64,

    /// Interval between flushes of the unsent tail (ms)
    #[serde(default = "default_flush_ms")]
    pub flush_ms: u64,
}

/// One candidate visualizer address
#[derive(Clone, Debug, Deserialize)]
pub struct PeerConfig {
    pub host: String,
    pub port: u16,
}

impl PeerConfig {
    /// Full address string for connection
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Default value functions
fn default_driver() -> String {
    "mock".to_string()
}
fn default_speed() -> f64 {
    50.0
}
fn default_turn_rate() -> f64 {
    1.0
}
fn default_samples() -> usize {
    5
}
fn default_coarse_step() -> f64 {
    5.0
}
fn default_fine_step() -> f64 {
    5.0
}
fn default_settle_steps() -> u32 {
    3
}
fn default_tolerance() -> f64 {
    0.0
}
fn default_max_rotation() -> f64 {
    720.0
}
fn default_gap_threshold() -> f64 {
    10.0
}
fn default_gap_ticks() -> u32 {
    10
}
fn default_too_far() -> f64 {
    40.0
}
fn default_grace_secs() -> f64 {
    5.0
}
fn default_max_wall_distance() -> f64 {
    140.0
}
fn default_tick_ms() -> u64 {
    100
}
fn default_settle_ms() -> u64 {
    200
}
fn default_corner_settle_ms() -> u64 {
    1000
}
fn default_turn_degrees() -> f64 {
    90.0
}
fn default_peers() -> Vec<PeerConfig> {
    vec![PeerConfig {
        host: "127.0.0.1".to_string(),
        port: 4242,
    }]
}
fn default_retry_ms() -> u64 {
    1000
}
fn default_flush_ms() -> u64 {
    1000
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            turn_rate: default_turn_rate(),
        }
    }
}

impl Default for SensingConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
        }
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            coarse_step: default_coarse_step(),
            fine_step: default_fine_step(),
            settle_steps: default_settle_steps(),
            tolerance: default_tolerance(),
            max_rotation: default_max_rotation(),
        }
    }
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            gap_threshold: default_gap_threshold(),
            gap_ticks: default_gap_ticks(),
            too_far: default_too_far(),
            grace_secs: default_grace_secs(),
            max_wall_distance: default_max_wall_distance(),
            tick_ms: default_tick_ms(),
            settle_ms: default_settle_ms(),
            corner_settle_ms: default_corner_settle_ms(),
            turn_degrees: default_turn_degrees(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            peers: default_peers(),
            retry_ms: default_retry_ms(),
            flush_ms: default_flush_ms(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            hardware: HardwareConfig::default(),
            robot: RobotConfig::default(),
            sensing: SensingConfig::default(),
            aligner: AlignerConfig::default(),
            wall: WallConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::NavError::Config(format!("Failed to read config file: {}", e))
        })?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_field_defaults() {
        let config = NavConfig::default();
        assert_eq!(config.wall.gap_threshold, 10.0);
        assert_eq!(config.wall.gap_ticks, 10);
        assert_eq!(config.wall.max_wall_distance, 140.0);
        assert_eq!(config.sensing.samples, 5);
        assert_eq!(config.stream.peers.len(), 1);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: NavConfig = toml::from_str(
            r#"
            [wall]
            gap_threshold = 25.0

            [[stream.peers]]
            host = "10.0.0.7"
            port = 9000

            [[stream.peers]]
            host = "10.0.0.8"
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.wall.gap_threshold, 25.0);
        // Untouched fields keep their defaults
        assert_eq!(config.wall.gap_ticks, 10);
        assert_eq!(config.stream.peers.len(), 2);
        assert_eq!(config.stream.peers[0].address(), "10.0.0.7:9000");
    }
}
