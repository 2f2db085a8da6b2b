//! Scroll position and scrollable extent.

use kurbo::Vec2;
use serde::Serialize;

use super::{ChangeTracked, ViewerState};
use crate::pixels::PixelValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrollState {
    pub left: PixelValue,
    pub top: PixelValue,
    /// Size of the laid-out document at the current zoom.
    pub content_width: PixelValue,
    pub content_height: PixelValue,
    pub position_changed: bool,
    pub extent_changed: bool,
}

impl ScrollState {
    /// Scroll offset in CSS pixels.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.left.css, self.top.css)
    }

    /// Largest scroll offset (CSS) for a viewport of the given CSS size.
    pub fn max_offset(&self, viewport_width: f64, viewport_height: f64) -> Vec2 {
        Vec2::new(
            (self.content_width.css - viewport_width).max(0.0),
            (self.content_height.css - viewport_height).max(0.0),
        )
    }
}

impl ChangeTracked for ScrollState {
    fn any_changed(&self) -> bool {
        self.position_changed || self.extent_changed
    }

    fn cleared(&self) -> Self {
        Self {
            position_changed: false,
            extent_changed: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrollAction {
    /// Absolute offset in CSS pixels.
    ScrollTo { left: f64, top: f64 },
    /// Relative offset in CSS pixels.
    ScrollBy { dx: f64, dy: f64 },
    /// Content size in CSS pixels.
    SetExtent { width: f64, height: f64 },
    /// Re-derive every pair for a new pixel ratio.
    Rescale(f64),
}

fn clamped_position(state: &ScrollState, root: &ViewerState, left: f64, top: f64) -> (PixelValue, PixelValue) {
    let canvas = &root.canvas;
    let max = state.max_offset(canvas.width.css, canvas.height.css);
    let ratio = canvas.pixel_ratio;
    (
        PixelValue::from_css(left.clamp(0.0, max.x), ratio),
        PixelValue::from_css(top.clamp(0.0, max.y), ratio),
    )
}

fn with_position(state: &ScrollState, root: &ViewerState, left: f64, top: f64) -> Option<ScrollState> {
    if !left.is_finite() || !top.is_finite() {
        return None;
    }
    let (left, top) = clamped_position(state, root, left, top);
    if left == state.left && top == state.top {
        return None;
    }
    Some(ScrollState {
        left,
        top,
        position_changed: true,
        ..state.clone()
    })
}

pub fn reduce(state: &ScrollState, action: &ScrollAction, root: &ViewerState) -> Option<ScrollState> {
    match *action {
        ScrollAction::ScrollTo { left, top } => with_position(state, root, left, top),
        ScrollAction::ScrollBy { dx, dy } => {
            with_position(state, root, state.left.css + dx, state.top.css + dy)
        }
        ScrollAction::SetExtent { width, height } => {
            let ratio = root.canvas.pixel_ratio;
            let mut next = ScrollState {
                content_width: PixelValue::from_css(width.max(0.0), ratio),
                content_height: PixelValue::from_css(height.max(0.0), ratio),
                ..state.clone()
            };
            if next.content_width == state.content_width && next.content_height == state.content_height {
                return None;
            }
            next.extent_changed = true;
            let (left, top) = clamped_position(&next, root, state.left.css, state.top.css);
            if left != state.left || top != state.top {
                next.left = left;
                next.top = top;
                next.position_changed = true;
            }
            Some(next)
        }
        ScrollAction::Rescale(ratio) => {
            let next = ScrollState {
                left: PixelValue::from_css(state.left.css, ratio),
                top: PixelValue::from_css(state.top.css, ratio),
                content_width: PixelValue::from_css(state.content_width.css, ratio),
                content_height: PixelValue::from_css(state.content_height.css, ratio),
                position_changed: true,
                extent_changed: true,
            };
            let unchanged = next.left == state.left
                && next.top == state.top
                && next.content_width == state.content_width
                && next.content_height == state.content_height;
            (!unchanged).then_some(next)
        }
    }
}
