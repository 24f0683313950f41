//! Configuration loading for PathaViz

use crate::error::{Result, VizError};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct VizConfig {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Inbound stream settings
#[derive(Clone, Debug, Deserialize)]
pub struct ListenConfig {
    /// Bind host for the node stream listener
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ListenConfig {
    /// Full bind address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Display region dimensions
#[derive(Clone, Debug, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,
}

/// Render loop settings
#[derive(Clone, Debug, Deserialize)]
pub struct RenderConfig {
    /// Frame ticks per second
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Path of the SVG snapshot written each frame
    #[serde(default = "default_svg_path")]
    pub svg_path: String,
}

// Default value functions
fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    4242
}
fn default_width() -> f64 {
    1280.0
}
fn default_height() -> f64 {
    720.0
}
fn default_fps() -> u32 {
    20
}
fn default_svg_path() -> String {
    "output/path.svg".to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            svg_path: default_svg_path(),
        }
    }
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            canvas: CanvasConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl VizConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VizError::Config(format!("Failed to read config file: {}", e)))?;
        let config: VizConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
