//! Input handling: raw host primitives, the canvas gesture recognizer and
//! per-element drag handles.

pub mod drag_handle;
pub mod gesture;
pub mod pointer;
pub mod timers;
pub mod touch;

pub use drag_handle::{DragHandle, HandleEvent, HandleId, HandleSet, Routed};
pub use gesture::{GestureEvent, GestureRecognizer};
pub use pointer::{DeviceClass, NormalizedPointer, PointerPhase, RawInput, TouchPhase, TouchPoint};
pub use timers::PendingTimers;
pub use touch::TwoFingerMotion;
