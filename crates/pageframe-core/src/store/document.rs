//! Document viewport slice.

use serde::Serialize;
use std::collections::BTreeSet;

use super::{ChangeTracked, ViewerState};
use crate::config::ZoomConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentState {
    pub loaded: bool,
    pub page_count: usize,
    pub current_page: usize,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// The engine is working on something long-running.
    pub busy: bool,
    pub visible_pages: BTreeSet<usize>,
    pub loaded_changed: bool,
    pub zoom_changed: bool,
    pub page_changed: bool,
    pub busy_changed: bool,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new(&ZoomConfig::default())
    }
}

impl DocumentState {
    pub fn new(zoom: &ZoomConfig) -> Self {
        Self {
            loaded: false,
            page_count: 0,
            current_page: 0,
            zoom: zoom.initial,
            min_zoom: zoom.min,
            max_zoom: zoom.max,
            busy: false,
            visible_pages: BTreeSet::new(),
            loaded_changed: false,
            zoom_changed: false,
            page_changed: false,
            busy_changed: false,
        }
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            self.zoom
        }
    }

    fn with_zoom(&self, zoom: f64) -> Option<Self> {
        let zoom = self.clamp_zoom(zoom);
        if zoom == self.zoom {
            return None;
        }
        Some(Self {
            zoom,
            zoom_changed: true,
            ..self.clone()
        })
    }
}

impl ChangeTracked for DocumentState {
    fn any_changed(&self) -> bool {
        self.loaded_changed || self.zoom_changed || self.page_changed || self.busy_changed
    }

    fn cleared(&self) -> Self {
        Self {
            loaded_changed: false,
            zoom_changed: false,
            page_changed: false,
            busy_changed: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentAction {
    Open { page_count: usize },
    Close,
    SetZoom(f64),
    /// Multiply the zoom by a factor.
    ZoomBy(f64),
    SetCurrentPage(usize),
    SetBusy(bool),
    SetPageVisible { page: usize, visible: bool },
}

pub fn reduce(
    state: &DocumentState,
    action: &DocumentAction,
    _root: &ViewerState,
) -> Option<DocumentState> {
    match *action {
        DocumentAction::Open { page_count } => Some(DocumentState {
            loaded: true,
            page_count,
            current_page: 0,
            visible_pages: BTreeSet::new(),
            loaded_changed: true,
            page_changed: true,
            ..state.clone()
        }),
        DocumentAction::Close => {
            if !state.loaded {
                return None;
            }
            Some(DocumentState {
                loaded: false,
                page_count: 0,
                current_page: 0,
                visible_pages: BTreeSet::new(),
                loaded_changed: true,
                page_changed: true,
                ..state.clone()
            })
        }
        DocumentAction::SetZoom(zoom) => state.with_zoom(zoom),
        DocumentAction::ZoomBy(factor) => state.with_zoom(state.zoom * factor),
        DocumentAction::SetCurrentPage(page) => {
            if page >= state.page_count || page == state.current_page {
                return None;
            }
            Some(DocumentState {
                current_page: page,
                page_changed: true,
                ..state.clone()
            })
        }
        DocumentAction::SetBusy(busy) => {
            if busy == state.busy {
                return None;
            }
            Some(DocumentState {
                busy,
                busy_changed: true,
                ..state.clone()
            })
        }
        DocumentAction::SetPageVisible { page, visible } => {
            if page >= state.page_count || state.visible_pages.contains(&page) == visible {
                return None;
            }
            let mut visible_pages = state.visible_pages.clone();
            if visible {
                visible_pages.insert(page);
            } else {
                visible_pages.remove(&page);
            }
            Some(DocumentState {
                visible_pages,
                page_changed: true,
                ..state.clone()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> DocumentState {
        reduce(
            &DocumentState::default(),
            &DocumentAction::Open { page_count: 3 },
            &ViewerState::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_zoom_clamped() {
        let root = ViewerState::default();
        let next = reduce(&opened(), &DocumentAction::SetZoom(100.0), &root).unwrap();
        assert!((next.zoom - 8.0).abs() < f64::EPSILON);
        assert!(next.zoom_changed);
        assert!(reduce(&next, &DocumentAction::ZoomBy(2.0), &root).is_none());
        assert!(reduce(&next, &DocumentAction::SetZoom(f64::NAN), &root).is_none());
    }

    #[test]
    fn test_page_out_of_range_ignored() {
        let root = ViewerState::default();
        let state = opened().cleared();
        assert!(reduce(&state, &DocumentAction::SetCurrentPage(3), &root).is_none());
        let next = reduce(&state, &DocumentAction::SetCurrentPage(2), &root).unwrap();
        assert_eq!(next.current_page, 2);
        assert!(next.page_changed && !next.zoom_changed);
    }

    #[test]
    fn test_visibility_set() {
        let root = ViewerState::default();
        let state = opened();
        let next = reduce(&state, &DocumentAction::SetPageVisible { page: 1, visible: true }, &root).unwrap();
        assert!(next.visible_pages.contains(&1));
        assert!(reduce(&next, &DocumentAction::SetPageVisible { page: 1, visible: true }, &root).is_none());
    }
}
