//! PageFrame Application
//!
//! The viewer shell: wires the gesture recognizer, drag handles, state store,
//! document engine and render scheduler together for native and WASM hosts.

mod config;
mod viewer;

pub use config::AppConfig;
pub use viewer::Viewer;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebHost, run_wasm};
