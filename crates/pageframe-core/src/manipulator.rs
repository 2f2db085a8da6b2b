//! Constrained move/resize of on-canvas objects.
//!
//! All rectangles are in host-surface pixels. Resizing clamps the pointer to
//! the bounds first, never shrinks below the minimum size and, with a fixed
//! aspect ratio, keeps `width / height` exact at every step. Moving clamps
//! the origin so the whole rectangle stays inside the bounds.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::store::CursorStyle;

/// Resize handle around a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Right,
    Bottom,
    Left,
}

impl HandleKind {
    /// Corners first, so they win hit tests over the edges they touch.
    pub const ALL: [HandleKind; 8] = [
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomLeft,
        HandleKind::BottomRight,
        HandleKind::Top,
        HandleKind::Right,
        HandleKind::Bottom,
        HandleKind::Left,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }

    /// Where the handle sits on `rect`.
    pub fn position(self, rect: Rect) -> Point {
        let center = rect.center();
        match self {
            Self::TopLeft => Point::new(rect.x0, rect.y0),
            Self::TopRight => Point::new(rect.x1, rect.y0),
            Self::BottomLeft => Point::new(rect.x0, rect.y1),
            Self::BottomRight => Point::new(rect.x1, rect.y1),
            Self::Top => Point::new(center.x, rect.y0),
            Self::Right => Point::new(rect.x1, center.y),
            Self::Bottom => Point::new(center.x, rect.y1),
            Self::Left => Point::new(rect.x0, center.y),
        }
    }

    /// Cursor affordance while hovering or dragging this handle.
    pub fn cursor(self) -> CursorStyle {
        match self {
            Self::TopLeft | Self::BottomRight => CursorStyle::ResizeNwse,
            Self::TopRight | Self::BottomLeft => CursorStyle::ResizeNesw,
            Self::Top | Self::Bottom => CursorStyle::ResizeNs,
            Self::Left | Self::Right => CursorStyle::ResizeEw,
        }
    }

    fn horizontal(self) -> AxisGrip {
        match self {
            Self::TopLeft | Self::BottomLeft | Self::Left => AxisGrip::Low,
            Self::TopRight | Self::BottomRight | Self::Right => AxisGrip::High,
            Self::Top | Self::Bottom => AxisGrip::Fixed,
        }
    }

    fn vertical(self) -> AxisGrip {
        match self {
            Self::TopLeft | Self::TopRight | Self::Top => AxisGrip::Low,
            Self::BottomLeft | Self::BottomRight | Self::Bottom => AxisGrip::High,
            Self::Left | Self::Right => AxisGrip::Fixed,
        }
    }
}

/// Which edge of one axis the handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisGrip {
    Fixed,
    Low,
    High,
}

/// Span of one axis being resized: the anchored edge and the direction of growth.
#[derive(Debug, Clone, Copy)]
struct AxisSpan {
    anchor: f64,
    sign: f64,
    /// Room between the anchor and the bounds in the growth direction.
    room: f64,
}

impl AxisSpan {
    fn new(grip: AxisGrip, low: f64, high: f64, bound_low: f64, bound_high: f64) -> Option<Self> {
        match grip {
            AxisGrip::Fixed => None,
            AxisGrip::Low => Some(Self {
                anchor: high,
                sign: -1.0,
                room: high - bound_low,
            }),
            AxisGrip::High => Some(Self {
                anchor: low,
                sign: 1.0,
                room: bound_high - low,
            }),
        }
    }

    /// Extent implied by a pointer coordinate (negative once it crosses the anchor).
    fn extent_to(&self, coordinate: f64) -> f64 {
        self.sign * (coordinate - self.anchor)
    }

    fn edges(&self, extent: f64) -> (f64, f64) {
        if self.sign > 0.0 {
            (self.anchor, self.anchor + extent)
        } else {
            (self.anchor - extent, self.anchor)
        }
    }
}

/// A handle placed on a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

impl Handle {
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// All eight handles of `rect`.
pub fn handles(rect: Rect) -> Vec<Handle> {
    HandleKind::ALL
        .iter()
        .map(|&kind| Handle {
            kind,
            position: kind.position(rect),
        })
        .collect()
}

/// Handle under `point`, if any.
pub fn hit_test_handles(rect: Rect, point: Point, tolerance: f64) -> Option<HandleKind> {
    handles(rect)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// Limits applied to a resize or move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    /// Containing rectangle, usually the page.
    pub bounds: Rect,
    /// Fixed `width / height`, if the object keeps its proportions.
    pub aspect_ratio: Option<f64>,
    /// Smallest width and height a resize may produce.
    pub min_size: f64,
}

impl Constraints {
    pub fn new(bounds: Rect, min_size: f64) -> Self {
        Self {
            bounds,
            aspect_ratio: None,
            min_size,
        }
    }

    pub fn with_aspect_ratio(mut self, ratio: Option<f64>) -> Self {
        self.aspect_ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
        self
    }
}

fn clamp_point(point: Point, bounds: Rect) -> Point {
    Point::new(
        point.x.max(bounds.x0).min(bounds.x1),
        point.y.max(bounds.y0).min(bounds.y1),
    )
}

/// Resize `original` by dragging `handle` to `pointer`.
pub fn resize(original: Rect, handle: HandleKind, pointer: Point, constraints: &Constraints) -> Rect {
    let bounds = constraints.bounds;
    let pointer = clamp_point(pointer, bounds);
    let horizontal = AxisSpan::new(handle.horizontal(), original.x0, original.x1, bounds.x0, bounds.x1);
    let vertical = AxisSpan::new(handle.vertical(), original.y0, original.y1, bounds.y0, bounds.y1);

    match constraints.aspect_ratio {
        None => resize_free(original, horizontal, vertical, pointer, constraints.min_size),
        Some(ratio) => resize_fixed_ratio(original, horizontal, vertical, pointer, ratio, constraints),
    }
}

fn resize_free(
    original: Rect,
    horizontal: Option<AxisSpan>,
    vertical: Option<AxisSpan>,
    pointer: Point,
    min_size: f64,
) -> Rect {
    let (x0, x1) = match horizontal {
        Some(span) => span.edges(span.extent_to(pointer.x).max(min_size)),
        None => (original.x0, original.x1),
    };
    let (y0, y1) = match vertical {
        Some(span) => span.edges(span.extent_to(pointer.y).max(min_size)),
        None => (original.y0, original.y1),
    };
    Rect::new(x0, y0, x1, y1)
}

fn resize_fixed_ratio(
    original: Rect,
    horizontal: Option<AxisSpan>,
    vertical: Option<AxisSpan>,
    pointer: Point,
    ratio: f64,
    constraints: &Constraints,
) -> Rect {
    let bounds = constraints.bounds;
    let center = original.center();
    // Room for a dimension that grows symmetrically around the center.
    let centered_room_x = 2.0 * (center.x - bounds.x0).min(bounds.x1 - center.x);
    let centered_room_y = 2.0 * (center.y - bounds.y0).min(bounds.y1 - center.y);

    let (candidate, room_w, room_h) = match (horizontal, vertical) {
        (Some(h), Some(v)) => {
            let from_x = h.extent_to(pointer.x);
            let from_y = v.extent_to(pointer.y) * ratio;
            (from_x.max(from_y), h.room, v.room)
        }
        (Some(h), None) => (h.extent_to(pointer.x), h.room, centered_room_y),
        (None, Some(v)) => (v.extent_to(pointer.y) * ratio, centered_room_x, v.room),
        (None, None) => (original.width(), original.width(), original.height()),
    };

    let floor = constraints.min_size.max(constraints.min_size * ratio);
    let ceiling = room_w.min(room_h * ratio);
    // The floor wins over the bounds, as in a free resize.
    let width = if ceiling > 0.0 { candidate.min(ceiling) } else { candidate };
    let width = width.max(floor);
    let height = width / ratio;

    let (x0, x1) = match horizontal {
        Some(span) => span.edges(width),
        None => (center.x - width / 2.0, center.x + width / 2.0),
    };
    let (y0, y1) = match vertical {
        Some(span) => span.edges(height),
        None => (center.y - height / 2.0, center.y + height / 2.0),
    };
    Rect::new(x0, y0, x1, y1)
}

/// Move `original` by `delta`, keeping the whole rectangle inside `bounds`.
pub fn translate(original: Rect, delta: Vec2, bounds: Rect) -> Rect {
    let size = original.size();
    let max_x = (bounds.x1 - size.width).max(bounds.x0);
    let max_y = (bounds.y1 - size.height).max(bounds.y0);
    let x = (original.x0 + delta.x).max(bounds.x0).min(max_x);
    let y = (original.y0 + delta.y).max(bounds.y0).min(max_y);
    Rect::from_origin_size(Point::new(x, y), size)
}

/// One move or resize gesture on a selected object.
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulationSession {
    original: Rect,
    start: Point,
    /// `None` moves the whole rectangle.
    handle: Option<HandleKind>,
    constraints: Constraints,
    current: Rect,
}

impl ManipulationSession {
    pub fn new(original: Rect, handle: Option<HandleKind>, start: Point, constraints: Constraints) -> Self {
        Self {
            original,
            start,
            handle,
            constraints,
            current: original,
        }
    }

    pub fn original(&self) -> Rect {
        self.original
    }

    pub fn current(&self) -> Rect {
        self.current
    }

    pub fn handle(&self) -> Option<HandleKind> {
        self.handle
    }

    /// Recompute the live rectangle for the latest pointer position.
    pub fn update(&mut self, pointer: Point) -> Rect {
        self.current = match self.handle {
            Some(handle) => resize(self.original, handle, pointer, &self.constraints),
            None => translate(self.original, pointer - self.start, self.constraints.bounds),
        };
        self.current
    }

    /// End the gesture. The final rectangle is reported only when the gesture
    /// moved and actually changed the rectangle.
    pub fn finish(mut self, pointer: Point, moved: bool) -> Option<Rect> {
        if !moved {
            return None;
        }
        let result = self.update(pointer);
        (result != self.original).then_some(result)
    }
}
