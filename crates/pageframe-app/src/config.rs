//! Application configuration.

use pageframe_core::{ConfigError, ViewerConfig};
use pageframe_render::RenderConfig;
use serde::{Deserialize, Serialize};

/// Everything the viewer shell can be configured with, as one JSON document.
///
/// ```json
/// { "viewer": { "zoom": { "max": 4.0 } }, "render": { "scrollbar_width": 12.0 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.viewer.validate()?;
        config.render.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_default_independently() {
        let config = AppConfig::from_json(r#"{"render": {"note_size": 40.0}}"#).unwrap();
        assert_eq!(config.viewer, ViewerConfig::default());
        assert!((config.render.note_size - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_section_is_rejected() {
        let result = AppConfig::from_json(r#"{"viewer": {"zoom": {"min": 2.0, "max": 1.0}}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = AppConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }
}
