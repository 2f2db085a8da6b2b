//! PageFrame Render Library
//!
//! Frame scheduling, host surfaces, and the built-in view layers and feature
//! modules. The host environment is reached only through [`HostContext`];
//! [`HeadlessHost`] records everything for tests and the native demo.

pub mod config;
pub mod host;
pub mod layer;
pub mod layers;
pub mod modules;
mod scheduler;

pub use config::RenderConfig;
pub use host::{
    DrawCommand, HeadlessHost, HeadlessSurface, HostContext, HostError, HostResult, SurfaceId, SurfaceKind,
};
pub use layer::{FeatureModule, Frame, FrameControl, LayerContext, ViewLayer};
pub use layers::default_layers;
pub use modules::{NOTE_TOOL, default_modules};
pub use scheduler::{RenderScheduler, TickReport};
