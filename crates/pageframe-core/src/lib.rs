//! PageFrame Core Library
//!
//! Platform-agnostic state, input and geometry for the PageFrame viewer surface.

pub mod config;
pub mod engine;
pub mod input;
pub mod manipulator;
pub mod pixels;
pub mod store;

pub use config::{ConfigError, GestureConfig, HandleConfig, ManipulationConfig, ViewerConfig, ZoomConfig};
pub use engine::{
    AnnotationEntry, DocumentEngine, EngineError, EngineEvent, EngineFuture, EngineResult, ItemDraft,
    ItemId, ItemKind, MemoryEngine, SearchHit, TextSelection, ViewTransform,
};
pub use input::{
    DeviceClass, DragHandle, GestureEvent, GestureRecognizer, HandleEvent, HandleId, HandleSet,
    NormalizedPointer, PointerPhase, RawInput, TouchPhase, TouchPoint,
};
pub use manipulator::{Constraints, HandleKind, ManipulationSession};
pub use pixels::PixelValue;
pub use store::{Action, CursorStyle, ReducerTable, Store, ViewerMode, ViewerState};
