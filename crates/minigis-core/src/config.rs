//! Viewer configuration.

use crate::error::{MapError, MapResult};
use crate::selection::SelectionPolicy;
use crate::style::Rgba;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for the map viewer. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Surface width in pixels.
    pub width: f64,
    /// Surface height in pixels.
    pub height: f64,
    pub initial_scale: f64,
    /// Minimum time between two recomposes of the render buffer.
    pub throttle_ms: u64,
    /// Minimum time between two handled pointer moves.
    pub pointer_move_interval_ms: u64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Largest pan per pointer move, in world units per axis.
    pub pan_clamp: f64,
    pub plain_click_selects: bool,
    pub background: Rgba,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 800.0,
            initial_scale: 1.0,
            throttle_ms: 16,
            pointer_move_interval_ms: 16,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            pan_clamp: 10.0,
            plain_click_selects: false,
            background: Rgba::white(),
        }
    }
}

impl ViewerConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| MapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| MapError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> MapResult<()> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("initial_scale", self.initial_scale),
            ("zoom_in_factor", self.zoom_in_factor),
            ("zoom_out_factor", self.zoom_out_factor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(MapError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.pan_clamp.is_finite() || self.pan_clamp < 0.0 {
            return Err(MapError::Config(format!("pan_clamp must not be negative, got {}", self.pan_clamp)));
        }
        Ok(())
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn pointer_move_interval(&self) -> Duration {
        Duration::from_millis(self.pointer_move_interval_ms)
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            plain_click_selects: self.plain_click_selects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert!((config.width - 1440.0).abs() < f64::EPSILON);
        assert!((config.height - 800.0).abs() < f64::EPSILON);
        assert_eq!(config.throttle_interval(), Duration::from_millis(16));
        assert!(!config.selection_policy().plain_click_selects);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(r##"{"width": 640, "plain_click_selects": true, "background": "#000"}"##).unwrap();
        assert!((config.width - 640.0).abs() < f64::EPSILON);
        assert!((config.height - 800.0).abs() < f64::EPSILON);
        assert!(config.plain_click_selects);
        assert_eq!(config.background, Rgba::black());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(ViewerConfig::from_json("{not json"), Err(MapError::Config(_))));
        assert!(matches!(ViewerConfig::from_json(r#"{"zoom_in_factor": 0}"#), Err(MapError::Config(_))));
        assert!(matches!(ViewerConfig::from_json(r#"{"background": "nope"}"#), Err(MapError::Config(_))));
        assert!(matches!(ViewerConfig::from_json(r##"{"background": "#a\u00e9"}"##), Err(MapError::Config(_))));
        assert!(matches!(ViewerConfig::from_json("{\"background\": \"#a\u{e9}\"}"), Err(MapError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"throttle_ms": 33, "pan_clamp": 2.5}}"#).unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.throttle_ms, 33);
        assert!((config.pan_clamp - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2").unwrap();
        assert!(matches!(ViewerConfig::load(file.path()), Err(MapError::Config(_))));
    }
}
