//! Built-in feature modules.

mod note_tool;
mod popup;

pub use note_tool::{NOTE_TOOL, NoteTool};
pub use popup::{POPUP_GRIP, PopupModule};

use crate::layer::FeatureModule;

pub fn default_modules() -> Vec<Box<dyn FeatureModule>> {
    vec![Box::new(NoteTool::default()), Box::new(PopupModule::default())]
}
