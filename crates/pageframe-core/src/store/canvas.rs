//! Canvas surface slice: pixel ratio, surface size and cursor affordance.

use serde::{Deserialize, Serialize};

use super::{ChangeTracked, ViewerState};
use crate::pixels::{PixelValue, sanitize_ratio};

/// Cursor affordance applied to the host surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    Move,
    Text,
    Crosshair,
    ResizeNs,
    ResizeEw,
    ResizeNwse,
    ResizeNesw,
    NotAllowed,
    Wait,
}

impl CursorStyle {
    /// CSS `cursor` keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Move => "move",
            Self::Text => "text",
            Self::Crosshair => "crosshair",
            Self::ResizeNs => "ns-resize",
            Self::ResizeEw => "ew-resize",
            Self::ResizeNwse => "nwse-resize",
            Self::ResizeNesw => "nesw-resize",
            Self::NotAllowed => "not-allowed",
            Self::Wait => "wait",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasState {
    pub pixel_ratio: f64,
    pub width: PixelValue,
    pub height: PixelValue,
    /// Desired cursor; the scheduler applies it to the host when it differs.
    pub cursor: CursorStyle,
    pub size_changed: bool,
    pub ratio_changed: bool,
    pub cursor_changed: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            width: PixelValue::ZERO,
            height: PixelValue::ZERO,
            cursor: CursorStyle::Default,
            size_changed: false,
            ratio_changed: false,
            cursor_changed: false,
        }
    }
}

impl CanvasState {
    /// Surface size in CSS pixels.
    pub fn css_size(&self) -> kurbo::Size {
        kurbo::Size::new(self.width.css, self.height.css)
    }
}

impl ChangeTracked for CanvasState {
    fn any_changed(&self) -> bool {
        self.size_changed || self.ratio_changed || self.cursor_changed
    }

    fn cleared(&self) -> Self {
        Self {
            size_changed: false,
            ratio_changed: false,
            cursor_changed: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// New container size from the host's resize observer, in CSS pixels.
    Resize { width: f64, height: f64 },
    SetPixelRatio(f64),
    SetCursor(CursorStyle),
}

pub fn reduce(state: &CanvasState, action: &CanvasAction, _root: &ViewerState) -> Option<CanvasState> {
    match *action {
        CanvasAction::Resize { width, height } => {
            let width = PixelValue::from_css(width.max(0.0), state.pixel_ratio);
            let height = PixelValue::from_css(height.max(0.0), state.pixel_ratio);
            if width == state.width && height == state.height {
                return None;
            }
            Some(CanvasState {
                width,
                height,
                size_changed: true,
                ..state.clone()
            })
        }
        CanvasAction::SetPixelRatio(ratio) => {
            let ratio = sanitize_ratio(ratio);
            if ratio == state.pixel_ratio {
                return None;
            }
            // Layout size is unchanged; the backing store follows the ratio.
            Some(CanvasState {
                pixel_ratio: ratio,
                width: PixelValue::from_css(state.width.css, ratio),
                height: PixelValue::from_css(state.height.css, ratio),
                ratio_changed: true,
                size_changed: true,
                ..state.clone()
            })
        }
        CanvasAction::SetCursor(cursor) => {
            if cursor == state.cursor {
                return None;
            }
            Some(CanvasState {
                cursor,
                cursor_changed: true,
                ..state.clone()
            })
        }
    }
}
