//! Index of annotation items known to the viewer.

use kurbo::Point;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{ChangeTracked, ViewerState};
use crate::engine::{AnnotationEntry, ItemId};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationsState {
    pub entries: BTreeMap<ItemId, AnnotationEntry>,
    pub index_changed: bool,
}

impl AnnotationsState {
    pub fn get(&self, id: ItemId) -> Option<&AnnotationEntry> {
        self.entries.get(&id)
    }

    pub fn on_page(&self, page: usize) -> impl Iterator<Item = &AnnotationEntry> {
        self.entries.values().filter(move |e| e.page == page)
    }

    /// Entry containing a document point, if any.
    pub fn hit_test(&self, point: Point) -> Option<&AnnotationEntry> {
        self.entries.values().find(|e| e.rect.contains(point))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ChangeTracked for AnnotationsState {
    fn any_changed(&self) -> bool {
        self.index_changed
    }

    fn cleared(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            index_changed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationsAction {
    Replace(Vec<AnnotationEntry>),
    Upsert(AnnotationEntry),
    Remove(ItemId),
    Clear,
}

pub fn reduce(
    state: &AnnotationsState,
    action: &AnnotationsAction,
    _root: &ViewerState,
) -> Option<AnnotationsState> {
    let entries = match action {
        AnnotationsAction::Replace(entries) => {
            entries.iter().map(|e| (e.id, e.clone())).collect()
        }
        AnnotationsAction::Upsert(entry) => {
            if state.entries.get(&entry.id) == Some(entry) {
                return None;
            }
            let mut entries = state.entries.clone();
            entries.insert(entry.id, entry.clone());
            entries
        }
        AnnotationsAction::Remove(id) => {
            if !state.entries.contains_key(id) {
                return None;
            }
            let mut entries = state.entries.clone();
            entries.remove(id);
            entries
        }
        AnnotationsAction::Clear => {
            if state.entries.is_empty() {
                return None;
            }
            BTreeMap::new()
        }
    };
    Some(AnnotationsState {
        entries,
        index_changed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ItemKind;
    use kurbo::Rect;
    use uuid::Uuid;

    fn entry(page: usize, rect: Rect) -> AnnotationEntry {
        AnnotationEntry {
            id: Uuid::new_v4(),
            page,
            rect,
            kind: ItemKind::Note,
            aspect_ratio: None,
        }
    }

    #[test]
    fn test_upsert_and_hit_test() {
        let root = ViewerState::default();
        let a = entry(0, Rect::new(0.0, 0.0, 50.0, 50.0));
        let state = reduce(&AnnotationsState::default(), &AnnotationsAction::Upsert(a.clone()), &root).unwrap();
        assert_eq!(state.hit_test(Point::new(10.0, 10.0)).map(|e| e.id), Some(a.id));
        assert!(state.hit_test(Point::new(90.0, 10.0)).is_none());
        assert!(reduce(&state, &AnnotationsAction::Upsert(a), &root).is_none());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let root = ViewerState::default();
        let state = AnnotationsState::default();
        assert!(reduce(&state, &AnnotationsAction::Remove(Uuid::new_v4()), &root).is_none());
        assert!(reduce(&state, &AnnotationsAction::Clear, &root).is_none());
    }

    #[test]
    fn test_replace() {
        let root = ViewerState::default();
        let entries = vec![entry(0, Rect::ZERO), entry(1, Rect::ZERO), entry(1, Rect::ZERO)];
        let state = reduce(&AnnotationsState::default(), &AnnotationsAction::Replace(entries), &root).unwrap();
        assert_eq!(state.len(), 3);
        assert_eq!(state.on_page(1).count(), 2);
    }
}
