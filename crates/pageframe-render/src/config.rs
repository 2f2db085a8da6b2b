//! Visual settings for the built-in layers.

use pageframe_core::ConfigError;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// RGBA bytes, stored this way so the config stays plain JSON.
pub type Rgba = [u8; 4];

fn color([r, g, b, a]: Rgba) -> Color {
    Color::from_rgba8(r, g, b, a)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub selection: Rgba,
    pub handle_fill: Rgba,
    pub manipulation_preview: Rgba,
    pub text_selection: Rgba,
    pub search_hit: Rgba,
    pub search_active: Rgba,
    pub scrollbar_thumb: Rgba,
    /// Side of a resize handle square (CSS px).
    pub handle_size: f64,
    pub scrollbar_width: f64,
    pub scrollbar_min_thumb: f64,
    pub popup_width: f64,
    pub popup_height: f64,
    pub popup_grip_height: f64,
    /// Side of a note created by the note tool (document units).
    pub note_size: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            selection: [59, 130, 246, 255],
            handle_fill: [255, 255, 255, 255],
            manipulation_preview: [59, 130, 246, 160],
            text_selection: [70, 130, 180, 128],
            search_hit: [250, 204, 21, 110],
            search_active: [249, 115, 22, 160],
            scrollbar_thumb: [100, 100, 100, 200],
            handle_size: 8.0,
            scrollbar_width: 10.0,
            scrollbar_min_thumb: 24.0,
            popup_width: 240.0,
            popup_height: 160.0,
            popup_grip_height: 20.0,
            note_size: 32.0,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("handle_size", self.handle_size),
            ("scrollbar_width", self.scrollbar_width),
            ("scrollbar_min_thumb", self.scrollbar_min_thumb),
            ("popup_width", self.popup_width),
            ("popup_height", self.popup_height),
            ("note_size", self.note_size),
        ];
        for (name, value) in sizes {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        if self.popup_grip_height >= self.popup_height {
            return Err(ConfigError::Invalid(
                "popup_grip_height must be smaller than popup_height".into(),
            ));
        }
        Ok(())
    }

    pub fn selection_color(&self) -> Color {
        color(self.selection)
    }

    pub fn handle_color(&self) -> Color {
        color(self.handle_fill)
    }

    pub fn preview_color(&self) -> Color {
        color(self.manipulation_preview)
    }

    pub fn text_selection_color(&self) -> Color {
        color(self.text_selection)
    }

    pub fn search_hit_color(&self) -> Color {
        color(self.search_hit)
    }

    pub fn search_active_color(&self) -> Color {
        color(self.search_active)
    }

    pub fn scrollbar_color(&self) -> Color {
        color(self.scrollbar_thumb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let config = RenderConfig::from_json(r#"{"scrollbar_width": 14.0}"#).unwrap();
        assert!((config.scrollbar_width - 14.0).abs() < f64::EPSILON);
        assert_eq!(config.selection, RenderConfig::default().selection);
    }

    #[test]
    fn test_rejects_zero_sizes() {
        assert!(matches!(
            RenderConfig::from_json(r#"{"handle_size": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
