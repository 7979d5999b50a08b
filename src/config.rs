//! Tunable parameters for decoding and scanning
//!
//! Every struct deserialises from JSON with missing fields filled from
//! `Default`. A handful of defaults can be overridden from the environment
//! (`DM_CLOSE_RADIUS`, `DM_MIN_SIDE`, `DM_MIN_CONTRAST`, `DM_MAX_FRAMES`);
//! the variables are read once per process.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Point;
use crate::plate::PlateGeometry;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

static CLOSE_RADIUS: OnceLock<usize> = OnceLock::new();

pub(crate) fn close_radius() -> usize {
    *CLOSE_RADIUS.get_or_init(|| parse_env_usize("DM_CLOSE_RADIUS", 3).clamp(1, 16))
}

static MIN_SIDE: OnceLock<f32> = OnceLock::new();

pub(crate) fn min_side() -> f32 {
    *MIN_SIDE.get_or_init(|| parse_env_f32("DM_MIN_SIDE", 16.0).max(4.0))
}

static MIN_CONTRAST: OnceLock<f32> = OnceLock::new();

pub(crate) fn min_contrast() -> f32 {
    *MIN_CONTRAST.get_or_init(|| parse_env_f32("DM_MIN_CONTRAST", 20.0).max(0.0))
}

static MAX_FRAMES: OnceLock<usize> = OnceLock::new();

pub(crate) fn max_frames() -> usize {
    *MAX_FRAMES.get_or_init(|| parse_env_usize("DM_MAX_FRAMES", 200).max(1))
}

/// Candidate search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Dilation radius (pixels) joining a symbol's modules into one blob
    pub close_radius: usize,
    /// Shortest accepted candidate side (pixels)
    pub min_side: f32,
    /// Longest over shortest side
    pub max_aspect: f32,
    /// Minimum hull area over enclosing rectangle area
    pub min_fill: f32,
    /// Components with fewer dark pixels are ignored
    pub min_component_pixels: usize,
    /// Window radius (pixels) of the local-mean pass run after the global
    /// threshold; 0 disables it
    pub adaptive_radius: usize,
    /// Grey levels below the local mean a pixel must fall to count as dark
    pub adaptive_offset: f32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            close_radius: close_radius(),
            min_side: min_side(),
            max_aspect: 1.25,
            min_fill: 0.85,
            min_component_pixels: 40,
            adaptive_radius: 15,
            adaptive_offset: 8.0,
        }
    }
}

/// Grid sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Required light-minus-dark reference separation (grey levels)
    pub min_contrast: f32,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            min_contrast: min_contrast(),
        }
    }
}

/// Per-frame decoding parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Locator settings
    pub locator: LocatorConfig,
    /// Aligner settings
    pub aligner: AlignerConfig,
}

impl DecoderConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Termination budgets for a scan session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Stop after this many frames
    pub max_frames: usize,
    /// Stop after this much wall-clock time
    pub max_duration_ms: u64,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_frames: max_frames(),
            max_duration_ms: 30_000,
        }
    }
}

impl ScanLimits {
    /// Duration budget
    pub fn max_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.max_duration_ms)
    }
}

/// Holder layout as stored in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryConfig {
    /// Standard 16-slot puck seen from above
    Unipuck {
        /// Puck centre in image pixels
        center: Point,
        /// Puck radius in pixels
        radius: f32,
        /// Angle (radians, clockwise on screen from +x) of slot 0
        #[serde(default)]
        rotation: f32,
    },
    /// Rectangular rack
    Grid {
        /// Centre of slot 0
        origin: Point,
        /// Rows
        rows: usize,
        /// Columns
        cols: usize,
        /// Centre-to-centre spacing in pixels
        pitch: f32,
        /// Assignment tolerance in pixels
        tolerance: f32,
    },
    /// Explicit slot centres
    Slots {
        /// Slot centres in index order
        centers: Vec<Point>,
        /// Assignment tolerance in pixels
        tolerance: f32,
    },
}

impl Default for GeometryConfig {
    fn default() -> Self {
        GeometryConfig::Unipuck {
            center: Point::new(320.0, 240.0),
            radius: 200.0,
            rotation: 0.0,
        }
    }
}

impl GeometryConfig {
    /// Build the geometry, rejecting layouts that would panic
    pub fn build(&self) -> Result<PlateGeometry, ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::InvalidGeometry(msg.to_string()));
        match self {
            GeometryConfig::Unipuck {
                center,
                radius,
                rotation,
            } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return invalid("unipuck radius must be positive");
                }
                Ok(PlateGeometry::unipuck(*center, *radius, *rotation))
            }
            GeometryConfig::Grid {
                origin,
                rows,
                cols,
                pitch,
                tolerance,
            } => {
                if *rows == 0 || *cols == 0 {
                    return invalid("grid needs at least one row and column");
                }
                if !(tolerance.is_finite() && *tolerance >= 0.0) || !pitch.is_finite() {
                    return invalid("grid pitch and tolerance must be finite, tolerance >= 0");
                }
                Ok(PlateGeometry::grid(*origin, *rows, *cols, *pitch, *tolerance))
            }
            GeometryConfig::Slots { centers, tolerance } => {
                PlateGeometry::try_new(centers.clone(), *tolerance)
            }
        }
    }
}

/// Everything a scan needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Frame decoding
    pub decoder: DecoderConfig,
    /// Session budgets
    pub limits: ScanLimits,
    /// Holder layout
    pub geometry: GeometryConfig,
}

/// Read a JSON scan configuration
pub fn load_config(path: impl AsRef<Path>) -> Result<ScanConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let config: ScanConfig = serde_json::from_str(&text)?;
    config.geometry.build()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "decoder": { "locator": { "max_aspect": 1.5 } },
            "geometry": { "kind": "grid", "origin": {"x": 10.0, "y": 10.0},
                          "rows": 2, "cols": 3, "pitch": 50.0, "tolerance": 12.0 }
        }"#;
        let config: ScanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.decoder.locator.max_aspect, 1.5);
        assert_eq!(config.decoder.locator.min_fill, 0.85);
        assert_eq!(config.limits, ScanLimits::default());
        let geometry = config.geometry.build().unwrap();
        assert_eq!(geometry.num_slots(), 6);
    }

    #[test]
    fn test_invalid_geometry() {
        let slots = GeometryConfig::Slots {
            centers: vec![],
            tolerance: 1.0,
        };
        assert!(matches!(slots.build(), Err(ConfigError::InvalidGeometry(_))));

        let puck = GeometryConfig::Unipuck {
            center: Point::new(0.0, 0.0),
            radius: -3.0,
            rotation: 0.0,
        };
        assert!(puck.build().is_err());
    }

    #[test]
    fn test_load_config_errors() {
        let dir = std::env::temp_dir().join(format!("puck_scan_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.json");
        assert!(matches!(load_config(&missing), Err(ConfigError::Io(_))));

        let bad = dir.join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(load_config(&bad), Err(ConfigError::Json(_))));

        let good = dir.join("good.json");
        std::fs::write(
            &good,
            r#"{"geometry": {"kind": "unipuck", "center": {"x": 100, "y": 100}, "radius": 80}}"#,
        )
        .unwrap();
        let config = load_config(&good).unwrap();
        assert_eq!(config.geometry.build().unwrap().num_slots(), 16);

        std::fs::remove_dir_all(&dir).ok();
    }
}
