//! Viewer configuration.
//!
//! All sections deserialize with defaults, so a partial JSON document only
//! overrides what it names.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Timing and distance thresholds for the main gesture recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A release within this time after the press counts as a click.
    pub click_timeout_ms: u64,
    /// Holding still for this long fires a long press.
    pub long_press_ms: u64,
    /// A second click within this time after the first is a double click.
    pub double_click_window_ms: u64,
    /// Displacement (px) past which a press turns into a drag.
    pub drag_threshold: f64,
    /// Finger movement (px) below this counts as stationary.
    pub touch_stationary_epsilon: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_timeout_ms: 250,
            long_press_ms: 750,
            double_click_window_ms: 250,
            drag_threshold: 5.0,
            touch_stationary_epsilon: 0.5,
        }
    }
}

impl GestureConfig {
    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_timeout_ms)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_window_ms)
    }
}

/// Thresholds for per-element drag handles (scrollbar thumb, popup grip, resize corners).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    /// Window after a click in which a second click is a double click.
    pub click_window_ms: u64,
    /// Holding a handle this long starts a drag without movement.
    pub drag_intent_ms: u64,
    /// Displacement (px) past which a press turns into a drag.
    pub drag_threshold: f64,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            click_window_ms: 250,
            drag_intent_ms: 300,
            drag_threshold: 5.0,
        }
    }
}

impl HandleConfig {
    pub fn click_window(&self) -> Duration {
        Duration::from_millis(self.click_window_ms)
    }

    pub fn drag_intent(&self) -> Duration {
        Duration::from_millis(self.drag_intent_ms)
    }
}

/// On-canvas object manipulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    /// Smallest width/height (px) a resize may produce.
    pub min_size: f64,
    /// Hit radius (px) around resize handles.
    pub handle_hit_tolerance: f64,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            min_size: 24.0,
            handle_hit_tolerance: 8.0,
        }
    }
}

/// Document zoom limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub initial: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 8.0,
            initial: 1.0,
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub gesture: GestureConfig,
    pub handle: HandleConfig,
    pub manipulation: ManipulationConfig,
    pub zoom: ZoomConfig,
}

impl ViewerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gesture;
        if g.long_press_ms <= g.click_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "long_press_ms ({}) must exceed click_timeout_ms ({})",
                g.long_press_ms, g.click_timeout_ms
            )));
        }
        if !(g.drag_threshold >= 0.0) || !(self.handle.drag_threshold >= 0.0) {
            return Err(ConfigError::Invalid("drag thresholds must be non-negative".into()));
        }
        if !(self.manipulation.min_size > 0.0) {
            return Err(ConfigError::Invalid("min_size must be positive".into()));
        }
        let z = &self.zoom;
        if !(z.min > 0.0) || z.min > z.max || z.initial < z.min || z.initial > z.max {
            return Err(ConfigError::Invalid(format!(
                "zoom limits out of order: min {} initial {} max {}",
                z.min, z.initial, z.max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.gesture.click_timeout(), Duration::from_millis(250));
        assert_eq!(config.gesture.long_press(), Duration::from_millis(750));
        assert_eq!(config.handle.drag_intent(), Duration::from_millis(300));
        assert!((config.manipulation.min_size - 24.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ViewerConfig::from_json(r#"{"gesture": {"long_press_ms": 900}}"#).unwrap();
        assert_eq!(config.gesture.long_press_ms, 900);
        assert_eq!(config.gesture.click_timeout_ms, 250);
        assert_eq!(config.zoom, ZoomConfig::default());
    }

    #[test]
    fn test_invalid_zoom() {
        let result = ViewerConfig::from_json(r#"{"zoom": {"min": 2.0, "max": 1.0}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = ViewerConfig::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ViewerConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(ViewerConfig::from_json(&json).unwrap(), config);
    }
}
