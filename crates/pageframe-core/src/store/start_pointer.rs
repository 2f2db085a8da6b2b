//! Anchor pointer of the current chain.

use serde::Serialize;

use super::{ChangeTracked, ViewerState};
use crate::input::NormalizedPointer;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StartPointerState {
    pub pointer: Option<NormalizedPointer>,
    pub changed: bool,
}

impl ChangeTracked for StartPointerState {
    fn any_changed(&self) -> bool {
        self.changed
    }

    fn cleared(&self) -> Self {
        Self {
            pointer: self.pointer,
            changed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartPointerAction {
    /// Record the press that began a chain, or forget it with `None`.
    Record(Option<NormalizedPointer>),
}

pub fn reduce(
    state: &StartPointerState,
    action: &StartPointerAction,
    _root: &ViewerState,
) -> Option<StartPointerState> {
    let StartPointerAction::Record(pointer) = action;
    if *pointer == state.pointer {
        return None;
    }
    Some(StartPointerState {
        pointer: *pointer,
        changed: true,
    })
}
