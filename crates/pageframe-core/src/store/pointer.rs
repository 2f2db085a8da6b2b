//! Pointer slice: the latest normalized pointer and this frame's gestures.

use serde::Serialize;

use super::{ChangeTracked, ViewerState};
use crate::input::{GestureEvent, HandleEvent, NormalizedPointer};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointerState {
    pub current: NormalizedPointer,
    pub pressed: bool,
    pub dragging: bool,
    /// Gestures recognized since the last flag reset, in order.
    pub gestures: Vec<GestureEvent>,
    /// Drag-handle events since the last flag reset, in order.
    pub handle_events: Vec<HandleEvent>,
    pub position_changed: bool,
    pub gesture_changed: bool,
}

impl PointerState {
    /// First gesture of this frame matching `f`.
    pub fn find_gesture<T>(&self, f: impl FnMut(&GestureEvent) -> Option<T>) -> Option<T> {
        self.gestures.iter().find_map(f)
    }
}

impl ChangeTracked for PointerState {
    fn any_changed(&self) -> bool {
        self.position_changed || self.gesture_changed
    }

    fn cleared(&self) -> Self {
        Self {
            current: self.current,
            pressed: self.pressed,
            dragging: self.dragging,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerAction {
    Gesture(GestureEvent),
    Handle(HandleEvent),
    /// Forget the pointer and everything queued for the next frame.
    Reset,
}

pub fn reduce(state: &PointerState, action: &PointerAction, _root: &ViewerState) -> Option<PointerState> {
    let mut next = state.clone();
    match action {
        PointerAction::Gesture(event) => {
            let pointer = event.pointer();
            match event {
                GestureEvent::Down(_) => next.pressed = true,
                GestureEvent::Up(_) => {
                    next.pressed = false;
                    next.dragging = false;
                }
                GestureEvent::DragStart { .. } => next.dragging = true,
                GestureEvent::DragEnd { .. } => next.dragging = false,
                _ => {}
            }
            if pointer.position() != state.current.position() {
                next.position_changed = true;
            }
            next.current = pointer;
            next.gestures.push(*event);
            next.gesture_changed = true;
        }
        PointerAction::Handle(event) => {
            next.handle_events.push(*event);
            next.gesture_changed = true;
        }
        PointerAction::Reset => {
            if *state == PointerState::default() {
                return None;
            }
            next = PointerState {
                gesture_changed: true,
                ..PointerState::default()
            };
        }
    }
    Some(next)
}
