//! Raw host input and the normalized pointer shape.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Kind of device that produced a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    #[default]
    Mouse,
    Pen,
    Touch,
    /// Synthesized from a two-finger touch gesture.
    TwoFinger,
}

/// Common pointer currency between the recognizer and the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPointer {
    pub client_x: f64,
    pub client_y: f64,
    pub movement_x: f64,
    pub movement_y: f64,
    /// Pressed buttons bitmask (1 = primary, 2 = secondary, 4 = auxiliary).
    pub buttons: u16,
    pub device_class: DeviceClass,
}

impl NormalizedPointer {
    /// Create a pointer at a position with no movement.
    pub fn at(position: Point, buttons: u16, device_class: DeviceClass) -> Self {
        Self {
            client_x: position.x,
            client_y: position.y,
            movement_x: 0.0,
            movement_y: 0.0,
            buttons,
            device_class,
        }
    }

    /// Set the movement delta.
    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement_x = movement.x;
        self.movement_y = movement.y;
        self
    }

    /// Position in host-surface CSS pixels.
    pub fn position(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }

    /// Movement since the previous event.
    pub fn movement(&self) -> Vec2 {
        Vec2::new(self.movement_x, self.movement_y)
    }

    /// Whether the primary button is held.
    pub fn is_primary_down(&self) -> bool {
        self.buttons & 1 != 0
    }
}

/// Phase of a mouse/pen pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A single finger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: i64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Raw input primitive as delivered by the host surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawInput {
    Pointer {
        phase: PointerPhase,
        position: Point,
        buttons: u16,
        device: DeviceClass,
    },
    Touch {
        phase: TouchPhase,
        /// Fingers still on the surface after this event.
        touches: Vec<TouchPoint>,
        /// Fingers this event is about.
        changed: Vec<TouchPoint>,
    },
}

impl RawInput {
    /// Primary-button mouse event.
    pub fn mouse(phase: PointerPhase, x: f64, y: f64) -> Self {
        let buttons = match phase {
            PointerPhase::Down | PointerPhase::Move => 1,
            PointerPhase::Up | PointerPhase::Cancel => 0,
        };
        Self::Pointer {
            phase,
            position: Point::new(x, y),
            buttons,
            device: DeviceClass::Mouse,
        }
    }

    /// Mouse move with no button held.
    pub fn hover(x: f64, y: f64) -> Self {
        Self::Pointer {
            phase: PointerPhase::Move,
            position: Point::new(x, y),
            buttons: 0,
            device: DeviceClass::Mouse,
        }
    }

    /// Position the event is about (first changed finger for touch).
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Pointer { position, .. } => Some(*position),
            Self::Touch { changed, touches, .. } => changed
                .first()
                .or_else(|| touches.first())
                .map(|t| t.position),
        }
    }

    /// Whether this event begins a pointer chain.
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            Self::Pointer { phase: PointerPhase::Down, .. }
                | Self::Touch { phase: TouchPhase::Start, .. }
        )
    }

    /// Whether this event ends a pointer chain.
    pub fn is_end(&self) -> bool {
        match self {
            Self::Pointer { phase, .. } => {
                matches!(phase, PointerPhase::Up | PointerPhase::Cancel)
            }
            Self::Touch { phase, touches, .. } => {
                matches!(phase, TouchPhase::End | TouchPhase::Cancel) && touches.is_empty()
            }
        }
    }
}
