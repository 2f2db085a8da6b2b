//! Viewer mode slice.

use serde::Serialize;

use super::{ChangeTracked, ViewerState};
use crate::engine::{ItemId, TextSelection};

/// Mutually exclusive interaction mode. Each variant carries its own
/// selection, so entering one drops every other selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum ViewerMode {
    #[default]
    Default,
    AnnotationSelected { id: ItemId },
    TextSelected { selection: TextSelection },
    PopupSelected { id: ItemId },
    /// A feature module (tool) owns the canvas.
    ModuleSelected { module: String },
}

impl ViewerMode {
    pub fn selected_annotation(&self) -> Option<ItemId> {
        match self {
            Self::AnnotationSelected { id } => Some(*id),
            _ => None,
        }
    }

    pub fn popup(&self) -> Option<ItemId> {
        match self {
            Self::PopupSelected { id } => Some(*id),
            _ => None,
        }
    }

    pub fn text_selection(&self) -> Option<&TextSelection> {
        match self {
            Self::TextSelected { selection } => Some(selection),
            _ => None,
        }
    }

    pub fn is_module(&self, name: &str) -> bool {
        matches!(self, Self::ModuleSelected { module } if module == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModeState {
    pub mode: ViewerMode,
    pub mode_changed: bool,
}

impl ChangeTracked for ModeState {
    fn any_changed(&self) -> bool {
        self.mode_changed
    }

    fn cleared(&self) -> Self {
        Self {
            mode: self.mode.clone(),
            mode_changed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModeAction {
    Enter(ViewerMode),
    /// Back to [`ViewerMode::Default`].
    Reset,
}

pub fn reduce(state: &ModeState, action: &ModeAction, _root: &ViewerState) -> Option<ModeState> {
    let mode = match action {
        ModeAction::Enter(mode) => mode.clone(),
        ModeAction::Reset => ViewerMode::Default,
    };
    if mode == state.mode {
        return None;
    }
    log::debug!("viewer mode {:?} -> {:?}", state.mode, mode);
    Some(ModeState {
        mode,
        mode_changed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_entering_mode_replaces_selection() {
        let root = ViewerState::default();
        let id = Uuid::new_v4();
        let state = reduce(&ModeState::default(), &ModeAction::Enter(ViewerMode::AnnotationSelected { id }), &root).unwrap();
        assert_eq!(state.mode.selected_annotation(), Some(id));

        let state = reduce(
            &state,
            &ModeAction::Enter(ViewerMode::ModuleSelected { module: "note".into() }),
            &root,
        )
        .unwrap();
        assert_eq!(state.mode.selected_annotation(), None);
        assert!(state.mode.is_module("note"));
    }

    #[test]
    fn test_reset_in_default_is_noop() {
        let root = ViewerState::default();
        assert!(reduce(&ModeState::default(), &ModeAction::Reset, &root).is_none());
    }
}
