//! Reactive viewer state.
//!
//! [`ViewerState`] is a root of independent slices, each behind an `Rc` and
//! replaced (never mutated) when an action changes it. Every slice has its
//! own action enum and reducer; the reducers are registered in an explicit
//! [`ReducerTable`] and dispatched through [`Store`].
//!
//! Reducers see the latest root state for cross-slice reads but can only
//! return a new value of their own slice. Returning `None` is a no-op.

pub mod annotations;
pub mod canvas;
pub mod document;
pub mod mode;
pub mod pointer;
pub mod scroll;
pub mod search;
pub mod start_pointer;

pub use annotations::{AnnotationsAction, AnnotationsState};
pub use canvas::{CanvasAction, CanvasState, CursorStyle};
pub use document::{DocumentAction, DocumentState};
pub use mode::{ModeAction, ModeState, ViewerMode};
pub use pointer::{PointerAction, PointerState};
pub use scroll::{ScrollAction, ScrollState};
pub use search::{SearchAction, SearchState};
pub use start_pointer::{StartPointerAction, StartPointerState};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use std::rc::Rc;

use crate::config::ViewerConfig;
use crate::engine::ViewTransform;

/// A slice carrying "changed since the last frame" flags.
pub trait ChangeTracked: Clone {
    fn any_changed(&self) -> bool;

    /// Copy of the slice with every flag cleared.
    fn cleared(&self) -> Self;
}

/// Root state tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewerState {
    pub document: Rc<DocumentState>,
    pub canvas: Rc<CanvasState>,
    pub scroll: Rc<ScrollState>,
    pub pointer: Rc<PointerState>,
    pub start_pointer: Rc<StartPointerState>,
    pub search: Rc<SearchState>,
    pub mode: Rc<ModeState>,
    pub annotations: Rc<AnnotationsState>,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            document: Rc::new(DocumentState::new(&config.zoom)),
            ..Self::default()
        }
    }

    /// Whether any slice has a flag set.
    pub fn any_changed(&self) -> bool {
        self.document.any_changed()
            || self.canvas.any_changed()
            || self.scroll.any_changed()
            || self.pointer.any_changed()
            || self.start_pointer.any_changed()
            || self.search.any_changed()
            || self.mode.any_changed()
            || self.annotations.any_changed()
    }

    /// Current document-to-surface mapping.
    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform::new(self.document.zoom, self.scroll.offset())
    }
}

/// Root action: one variant per slice plus the two store-wide actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Document(DocumentAction),
    Canvas(CanvasAction),
    Scroll(ScrollAction),
    Pointer(PointerAction),
    StartPointer(StartPointerAction),
    Search(SearchAction),
    Mode(ModeAction),
    Annotations(AnnotationsAction),
    /// Clear every change flag. Run once per frame by the scheduler.
    ResetChangeFlags,
    /// Replace the tree with defaults, keeping the host surface metrics.
    LoadDefault,
}

/// Slice reducer: `(slice, action, latest root) -> new slice or no-op`.
pub type Reducer<S, A> = fn(&S, &A, &ViewerState) -> Option<S>;

/// Explicit reducer registry, one entry per slice.
#[derive(Clone, Copy)]
pub struct ReducerTable {
    pub document: Reducer<DocumentState, DocumentAction>,
    pub canvas: Reducer<CanvasState, CanvasAction>,
    pub scroll: Reducer<ScrollState, ScrollAction>,
    pub pointer: Reducer<PointerState, PointerAction>,
    pub start_pointer: Reducer<StartPointerState, StartPointerAction>,
    pub search: Reducer<SearchState, SearchAction>,
    pub mode: Reducer<ModeState, ModeAction>,
    pub annotations: Reducer<AnnotationsState, AnnotationsAction>,
}

impl Default for ReducerTable {
    fn default() -> Self {
        Self {
            document: document::reduce,
            canvas: canvas::reduce,
            scroll: scroll::reduce,
            pointer: pointer::reduce,
            start_pointer: start_pointer::reduce,
            search: search::reduce,
            mode: mode::reduce,
            annotations: annotations::reduce,
        }
    }
}

impl std::fmt::Debug for ReducerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducerTable").finish_non_exhaustive()
    }
}

/// A deferred action: applied only once the future resolves.
pub type DeferredAction = LocalBoxFuture<'static, Option<Action>>;

fn apply<S, A>(slot: &mut Rc<S>, reducer: Reducer<S, A>, action: &A, root: &ViewerState) -> bool {
    match reducer(&**slot, action, root) {
        Some(next) => {
            *slot = Rc::new(next);
            true
        }
        None => false,
    }
}

fn clear_flags<S: ChangeTracked>(slot: &mut Rc<S>) -> bool {
    if slot.any_changed() {
        *slot = Rc::new(slot.cleared());
        true
    } else {
        false
    }
}

/// Typed dispatcher over [`ViewerState`].
pub struct Store {
    config: ViewerConfig,
    state: ViewerState,
    reducers: ReducerTable,
    deferred: Vec<DeferredAction>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl Store {
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_reducers(config, ReducerTable::default())
    }

    /// Store with a custom reducer table.
    pub fn with_reducers(config: ViewerConfig, reducers: ReducerTable) -> Self {
        Self {
            state: ViewerState::new(&config),
            config,
            reducers,
            deferred: Vec::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Latest state.
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Cheap copy of the latest state for renderers.
    pub fn snapshot(&self) -> ViewerState {
        self.state.clone()
    }

    /// Apply an action synchronously. Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        log::trace!("dispatch {:?}", action);
        let root = self.state.clone();
        let r = self.reducers;
        match &action {
            Action::Document(a) => apply(&mut self.state.document, r.document, a, &root),
            Action::Canvas(a) => apply(&mut self.state.canvas, r.canvas, a, &root),
            Action::Scroll(a) => apply(&mut self.state.scroll, r.scroll, a, &root),
            Action::Pointer(a) => apply(&mut self.state.pointer, r.pointer, a, &root),
            Action::StartPointer(a) => apply(&mut self.state.start_pointer, r.start_pointer, a, &root),
            Action::Search(a) => apply(&mut self.state.search, r.search, a, &root),
            Action::Mode(a) => apply(&mut self.state.mode, r.mode, a, &root),
            Action::Annotations(a) => apply(&mut self.state.annotations, r.annotations, a, &root),
            Action::ResetChangeFlags => self.reset_change_flags(),
            Action::LoadDefault => {
                self.load_default();
                true
            }
        }
    }

    /// Compute an action from the latest state and dispatch it.
    pub fn update(&mut self, f: impl FnOnce(&ViewerState) -> Option<Action>) -> bool {
        match f(&self.state) {
            Some(action) => self.dispatch(action),
            None => false,
        }
    }

    /// Queue an action that is applied once `future` resolves.
    pub fn defer(&mut self, future: impl Future<Output = Option<Action>> + 'static) {
        self.deferred.push(future.boxed_local());
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Poll every deferred action without blocking and dispatch the resolved
    /// ones in submission order. Returns how many resolved.
    pub fn settle_deferred(&mut self) -> usize {
        if self.deferred.is_empty() {
            return 0;
        }
        let mut ready = Vec::new();
        let mut still_pending = Vec::new();
        for mut future in std::mem::take(&mut self.deferred) {
            match (&mut future).now_or_never() {
                Some(action) => ready.push(action),
                None => still_pending.push(future),
            }
        }
        self.deferred = still_pending;

        let resolved = ready.len();
        for action in ready.into_iter().flatten() {
            let closes = action == Action::LoadDefault;
            self.dispatch(action);
            if closes {
                break;
            }
        }
        resolved
    }

    fn reset_change_flags(&mut self) -> bool {
        let s = &mut self.state;
        // Non-short-circuiting so every slice is visited.
        clear_flags(&mut s.document)
            | clear_flags(&mut s.canvas)
            | clear_flags(&mut s.scroll)
            | clear_flags(&mut s.pointer)
            | clear_flags(&mut s.start_pointer)
            | clear_flags(&mut s.search)
            | clear_flags(&mut s.mode)
            | clear_flags(&mut s.annotations)
    }

    fn load_default(&mut self) {
        let dropped = self.deferred.len();
        self.deferred.clear();
        let canvas = self.state.canvas.cleared();
        self.state = ViewerState {
            canvas: Rc::new(canvas),
            ..ViewerState::new(&self.config)
        };
        log::info!("viewer state reset to defaults ({} deferred result(s) dropped)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DeviceClass, GestureEvent, NormalizedPointer};
    use futures::channel::oneshot;
    use kurbo::Point;
    use proptest::prelude::*;

    fn store() -> Store {
        Store::new(ViewerConfig::default())
    }

    fn open(store: &mut Store) {
        store.dispatch(Action::Document(DocumentAction::Open { page_count: 4 }));
    }

    #[test]
    fn test_sibling_slices_keep_identity() {
        let mut store = store();
        let before = store.snapshot();
        assert!(store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::ModuleSelected {
            module: "note".into(),
        }))));
        let after = store.snapshot();
        assert!(!Rc::ptr_eq(&before.mode, &after.mode));
        assert!(Rc::ptr_eq(&before.document, &after.document));
        assert!(Rc::ptr_eq(&before.canvas, &after.canvas));
        assert!(Rc::ptr_eq(&before.annotations, &after.annotations));
    }

    #[test]
    fn test_noop_action_keeps_state() {
        let mut store = store();
        let before = store.snapshot();
        assert!(!store.dispatch(Action::Mode(ModeAction::Reset)));
        assert!(Rc::ptr_eq(&before.mode, &store.state().mode));
        assert!(!store.state().mode.mode_changed);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_dispatch() {
        let mut store = store();
        open(&mut store);
        let snapshot = store.snapshot();
        store.dispatch(Action::Document(DocumentAction::SetZoom(2.0)));
        assert!((snapshot.document.zoom - 1.0).abs() < f64::EPSILON);
        assert!((store.state().document.zoom - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_reads_latest_state() {
        let mut store = store();
        open(&mut store);
        store.dispatch(Action::Document(DocumentAction::SetZoom(2.0)));
        let changed = store.update(|state| {
            Some(Action::Document(DocumentAction::SetZoom(state.document.zoom * 1.5)))
        });
        assert!(changed);
        assert!((store.state().document.zoom - 3.0).abs() < f64::EPSILON);
        assert!(!store.update(|_| None));
    }

    #[test]
    fn test_reset_clears_flags_and_keeps_clean_slices() {
        let mut store = store();
        open(&mut store);
        let clean_search = store.state().search.clone();
        assert!(store.state().document.loaded_changed);
        assert!(store.dispatch(Action::ResetChangeFlags));
        assert!(!store.state().any_changed());
        assert!(store.state().document.loaded);
        assert!(Rc::ptr_eq(&clean_search, &store.state().search));
        assert!(!store.dispatch(Action::ResetChangeFlags));
    }

    #[test]
    fn test_deferred_applies_only_on_resolution() {
        let mut store = store();
        let (tx, rx) = oneshot::channel::<ViewerMode>();
        store.defer(async move { rx.await.ok().map(|mode| Action::Mode(ModeAction::Enter(mode))) });
        assert_eq!(store.settle_deferred(), 0);
        assert_eq!(store.pending_deferred(), 1);

        tx.send(ViewerMode::ModuleSelected { module: "note".into() }).unwrap();
        assert_eq!(store.settle_deferred(), 1);
        assert!(store.state().mode.mode.is_module("note"));
        assert_eq!(store.pending_deferred(), 0);
    }

    #[test]
    fn test_deferred_resolving_to_nothing_is_noop() {
        let mut store = store();
        store.defer(async { None });
        let before = store.snapshot();
        assert_eq!(store.settle_deferred(), 1);
        assert!(Rc::ptr_eq(&before.mode, &store.state().mode));
    }

    #[test]
    fn test_deferred_resolve_in_submission_order() {
        let mut store = store();
        open(&mut store);
        store.defer(async { Some(Action::Document(DocumentAction::SetZoom(2.0))) });
        store.defer(async { Some(Action::Document(DocumentAction::SetZoom(3.0))) });
        store.settle_deferred();
        assert!((store.state().document.zoom - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_default_drops_pending_and_keeps_surface() {
        let mut store = store();
        open(&mut store);
        store.dispatch(Action::Canvas(CanvasAction::SetPixelRatio(2.0)));
        store.dispatch(Action::Canvas(CanvasAction::Resize { width: 300.0, height: 200.0 }));
        let (_tx, rx) = oneshot::channel::<()>();
        store.defer(async move {
            let _ = rx.await;
            Some(Action::Document(DocumentAction::SetZoom(4.0)))
        });

        assert!(store.dispatch(Action::LoadDefault));
        assert_eq!(store.pending_deferred(), 0);
        assert!(!store.state().document.loaded);
        assert!((store.state().canvas.pixel_ratio - 2.0).abs() < f64::EPSILON);
        assert!((store.state().canvas.width.css - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_reducer_table() {
        fn frozen(_: &ModeState, _: &ModeAction, _: &ViewerState) -> Option<ModeState> {
            None
        }
        let table = ReducerTable {
            mode: frozen,
            ..ReducerTable::default()
        };
        let mut store = Store::with_reducers(ViewerConfig::default(), table);
        assert!(!store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::ModuleSelected {
            module: "note".into(),
        }))));
    }

    #[test]
    fn test_cross_slice_read_uses_latest_root() {
        let mut store = store();
        store.dispatch(Action::Canvas(CanvasAction::Resize { width: 100.0, height: 100.0 }));
        store.dispatch(Action::Scroll(ScrollAction::SetExtent { width: 300.0, height: 100.0 }));
        store.dispatch(Action::Scroll(ScrollAction::ScrollBy { dx: 500.0, dy: 0.0 }));
        assert!((store.state().scroll.left.css - 200.0).abs() < f64::EPSILON);
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            (0.5f64..4.0).prop_map(|z| Action::Document(DocumentAction::SetZoom(z))),
            any::<bool>().prop_map(|b| Action::Document(DocumentAction::SetBusy(b))),
            (10.0f64..800.0, 10.0f64..800.0)
                .prop_map(|(w, h)| Action::Canvas(CanvasAction::Resize { width: w, height: h })),
            (0.5f64..3.0).prop_map(|r| Action::Canvas(CanvasAction::SetPixelRatio(r))),
            (-200.0f64..200.0, -200.0f64..200.0)
                .prop_map(|(dx, dy)| Action::Scroll(ScrollAction::ScrollBy { dx, dy })),
            (0.0f64..500.0, 0.0f64..500.0).prop_map(|(x, y)| {
                let p = NormalizedPointer::at(Point::new(x, y), 1, DeviceClass::Mouse);
                Action::Pointer(PointerAction::Gesture(GestureEvent::Move(p)))
            }),
            any::<bool>().prop_map(|b| {
                let mode = if b {
                    ViewerMode::ModuleSelected { module: "note".into() }
                } else {
                    ViewerMode::Default
                };
                Action::Mode(ModeAction::Enter(mode))
            }),
            Just(Action::Search(SearchAction::Begin("q".into()))),
            Just(Action::ResetChangeFlags),
        ]
    }

    fn flags(state: &ViewerState) -> [bool; 8] {
        [
            state.document.any_changed(),
            state.canvas.any_changed(),
            state.scroll.any_changed(),
            state.pointer.any_changed(),
            state.start_pointer.any_changed(),
            state.search.any_changed(),
            state.mode.any_changed(),
            state.annotations.any_changed(),
        ]
    }

    fn slot(action: &Action) -> Option<usize> {
        match action {
            Action::Document(_) => Some(0),
            Action::Canvas(_) => Some(1),
            Action::Scroll(_) => Some(2),
            Action::Pointer(_) => Some(3),
            Action::StartPointer(_) => Some(4),
            Action::Search(_) => Some(5),
            Action::Mode(_) => Some(6),
            Action::Annotations(_) => Some(7),
            Action::ResetChangeFlags | Action::LoadDefault => None,
        }
    }

    proptest! {
        #[test]
        fn prop_flag_set_iff_slice_updated_since_reset(actions in prop::collection::vec(arb_action(), 1..60)) {
            let mut store = store();
            open(&mut store);
            store.dispatch(Action::ResetChangeFlags);
            let mut expected = [false; 8];
            for action in actions {
                let target = slot(&action);
                let previous = flags(store.state());
                let changed = store.dispatch(action);
                match target {
                    None => expected = [false; 8],
                    Some(i) => {
                        if changed {
                            expected[i] = true;
                        }
                    }
                }
                let now = flags(store.state());
                prop_assert_eq!(now, expected);
                // Monotone between resets.
                if target.is_some() {
                    for (before, after) in previous.iter().zip(now.iter()) {
                        prop_assert!(!before || *after);
                    }
                }
            }
        }
    }
}
