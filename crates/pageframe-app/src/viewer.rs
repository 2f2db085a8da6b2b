//! Viewer lifecycle: input routing, engine events and the frame loop.

use pageframe_core::store::{
    AnnotationsAction, CanvasAction, DocumentAction, ModeAction, PointerAction, ScrollAction, SearchAction,
    StartPointerAction,
};
use pageframe_core::{
    Action, AnnotationEntry, DocumentEngine, EngineEvent, GestureEvent, GestureRecognizer, HandleEvent, HandleSet,
    Store, ViewerMode, ViewerState,
};
use pageframe_render::{HostContext, HostResult, RenderScheduler, TickReport, default_layers, default_modules};
use std::rc::Rc;
use std::time::Duration;

use crate::config::AppConfig;

/// A document viewer bound to one host surface and one document engine.
///
/// The host drives it with three calls: [`Viewer::handle_input`] for every raw
/// input primitive, [`Viewer::frame`] once per animation frame, and the
/// lifecycle calls ([`Viewer::attach`], [`Viewer::open`], ...).
pub struct Viewer<H: HostContext> {
    recognizer: GestureRecognizer,
    handles: HandleSet,
    store: Store,
    engine: Rc<dyn DocumentEngine>,
    scheduler: RenderScheduler<H>,
}

impl<H: HostContext> std::fmt::Debug for Viewer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("recognizer", &self.recognizer)
            .field("handles", &self.handles.len())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl<H: HostContext> Viewer<H> {
    pub fn new(host: H, engine: Rc<dyn DocumentEngine>, config: AppConfig) -> Self {
        let AppConfig { viewer, render } = config;
        Self {
            recognizer: GestureRecognizer::new(viewer.gesture.clone()),
            handles: HandleSet::new(viewer.handle.clone()),
            store: Store::new(viewer),
            engine,
            scheduler: RenderScheduler::new(host, render),
        }
    }

    pub fn state(&self) -> &ViewerState {
        self.store.state()
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn host(&self) -> &H {
        self.scheduler.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.scheduler.host_mut()
    }

    pub fn scheduler(&self) -> &RenderScheduler<H> {
        &self.scheduler
    }

    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }

    /// Attach to the host and install the built-in layers and modules.
    pub fn attach(&mut self) -> HostResult<()> {
        self.scheduler.attach()?;
        for layer in default_layers() {
            self.scheduler.add_layer(layer, &mut self.handles)?;
        }
        for module in default_modules() {
            self.scheduler.add_module(module, &mut self.handles)?;
        }
        self.recognizer.attach();
        let ratio = self.scheduler.host().device_pixel_ratio();
        self.set_pixel_ratio(ratio);
        Ok(())
    }

    /// Release every surface and stop listening.
    pub fn detach(&mut self) {
        self.recognizer.detach();
        self.scheduler.detach(&mut self.handles);
    }

    /// Show the engine's document with its known annotations and start rendering.
    pub fn open(&mut self, annotations: Vec<AnnotationEntry>) {
        let page_count = self.engine.page_count();
        log::info!("opening document with {} page(s)", page_count);
        self.recognizer.reset();
        self.store.dispatch(Action::Pointer(PointerAction::Reset));
        self.store
            .dispatch(Action::StartPointer(StartPointerAction::Record(None)));
        self.store
            .dispatch(Action::Document(DocumentAction::Open { page_count }));
        self.sync_extent();
        self.store
            .dispatch(Action::Annotations(AnnotationsAction::Replace(annotations)));
        self.scheduler.start();
    }

    /// Drop the document and every pending result.
    pub fn close(&mut self) {
        log::info!("closing document");
        self.recognizer.reset();
        self.store.dispatch(Action::LoadDefault);
        self.scheduler.stop();
    }

    /// Host surface resized (CSS pixels).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.store
            .dispatch(Action::Canvas(CanvasAction::Resize { width, height }));
        // A larger viewport can leave the offset past the new maximum.
        self.store
            .dispatch(Action::Scroll(ScrollAction::ScrollBy { dx: 0.0, dy: 0.0 }));
    }

    /// The window moved to a display with another device pixel ratio.
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        if self
            .store
            .dispatch(Action::Canvas(CanvasAction::SetPixelRatio(ratio)))
        {
            let ratio = self.store.state().canvas.pixel_ratio;
            self.store.dispatch(Action::Scroll(ScrollAction::Rescale(ratio)));
        }
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.store
            .dispatch(Action::Document(DocumentAction::ZoomBy(factor)));
    }

    /// Hand the canvas to a feature module such as the note tool.
    pub fn select_tool(&mut self, module: &str) {
        self.store
            .dispatch(Action::Mode(ModeAction::Enter(ViewerMode::ModuleSelected {
                module: module.to_string(),
            })));
    }

    pub fn reset_mode(&mut self) {
        self.store.dispatch(Action::Mode(ModeAction::Reset));
    }

    /// Start a search. Results are applied when the engine answers, unless a
    /// newer query replaced this one in the meantime.
    pub fn search(&mut self, query: &str) {
        let query = query.to_string();
        self.store
            .dispatch(Action::Search(SearchAction::Begin(query.clone())));
        let pending = self.engine.search(&query);
        self.store.defer(async move {
            match pending.await {
                Ok(hits) => {
                    log::debug!("{} hit(s) for {:?}", hits.len(), query);
                    Some(Action::Search(SearchAction::Results { query, hits }))
                }
                Err(err) => {
                    log::warn!("Search for {:?} failed: {}", query, err);
                    Some(Action::Search(SearchAction::Failed { query }))
                }
            }
        });
    }

    pub fn next_hit(&mut self) {
        self.store.dispatch(Action::Search(SearchAction::Next));
    }

    pub fn previous_hit(&mut self) {
        self.store.dispatch(Action::Search(SearchAction::Previous));
    }

    pub fn clear_search(&mut self) {
        self.store.dispatch(Action::Search(SearchAction::Clear));
    }

    /// Delete the selected annotation. Returns false when nothing is selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.store.state().mode.mode.selected_annotation() else {
            return false;
        };
        let pending = self.engine.delete_item(id);
        self.store.defer(async move {
            match pending.await {
                Ok(id) => Some(Action::Annotations(AnnotationsAction::Remove(id))),
                Err(err) => {
                    log::warn!("Failed to delete annotation {}: {}", id, err);
                    None
                }
            }
        });
        true
    }

    /// Feed one raw input primitive.
    ///
    /// Drag handles see the input first. While one of them holds the pointer
    /// the gesture recognizer is suspended. Input is dropped while no
    /// document is open, since no frame would ever consume it.
    pub fn handle_input(&mut self, input: pageframe_core::RawInput, now: Duration) {
        if !self.scheduler.is_running() {
            log::trace!("input dropped, render loop stopped");
            return;
        }
        let routed = self.handles.route(&input, now);
        if routed.consumed {
            self.recognizer.suspend();
            self.dispatch_handle_events(routed.events);
            if self.handles.captured().is_none() {
                self.recognizer.resume();
            }
        } else {
            if self.recognizer.is_suspended() && self.handles.captured().is_none() {
                self.recognizer.resume();
            }
            let gestures = self.recognizer.handle(&input, now);
            self.dispatch_gestures(gestures);
        }
        self.store.settle_deferred();
    }

    /// Run one animation frame.
    pub fn frame(&mut self, now: Duration) -> TickReport {
        if self.scheduler.is_running() {
            let gestures = self.recognizer.tick(now);
            self.dispatch_gestures(gestures);
            let handle_events = self.handles.tick(now);
            self.dispatch_handle_events(handle_events);
        }

        for event in self.engine.poll_events() {
            self.apply_engine_event(event);
        }
        self.store.settle_deferred();

        self.scheduler
            .tick(now, &mut self.store, self.engine.as_ref(), &mut self.handles)
    }

    fn sync_extent(&mut self) {
        let size = self.engine.document_size();
        let zoom = self.store.state().document.zoom;
        self.store.dispatch(Action::Scroll(ScrollAction::SetExtent {
            width: size.width * zoom,
            height: size.height * zoom,
        }));
    }

    fn dispatch_gestures(&mut self, gestures: Vec<GestureEvent>) {
        for gesture in gestures {
            match gesture {
                GestureEvent::Down(pointer) => {
                    self.store
                        .dispatch(Action::StartPointer(StartPointerAction::Record(Some(pointer))));
                }
                GestureEvent::Up(_) => {
                    self.store
                        .dispatch(Action::StartPointer(StartPointerAction::Record(None)));
                }
                _ => {}
            }
            self.store
                .dispatch(Action::Pointer(PointerAction::Gesture(gesture)));
        }
    }

    fn dispatch_handle_events(&mut self, events: Vec<HandleEvent>) {
        for event in events {
            self.store
                .dispatch(Action::Pointer(PointerAction::Handle(event)));
        }
    }

    fn apply_engine_event(&mut self, event: EngineEvent) {
        let action = match event {
            EngineEvent::Busy(busy) => Action::Document(DocumentAction::SetBusy(busy)),
            EngineEvent::PageVisibility { page, visible } => {
                Action::Document(DocumentAction::SetPageVisible { page, visible })
            }
            EngineEvent::ItemCreated(entry) | EngineEvent::ItemUpdated(entry) => {
                Action::Annotations(AnnotationsAction::Upsert(entry))
            }
            EngineEvent::ItemDeleted(id) => Action::Annotations(AnnotationsAction::Remove(id)),
        };
        self.store.dispatch(action);
    }
}
