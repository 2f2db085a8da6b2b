//! Scrolling and zooming from drags and two-finger gestures.

use kurbo::{Point, Vec2};
use pageframe_core::store::{DocumentAction, ScrollAction};
use pageframe_core::{Action, GestureEvent, Store};

use crate::host::HostResult;
use crate::layer::{Frame, FrameControl, LayerContext, ViewLayer};

const NAME: &str = "pan";

#[derive(Debug, Default)]
pub struct PanLayer;

fn scroll_by(store: &mut Store, delta: Vec2) {
    if delta != Vec2::ZERO {
        store.dispatch(Action::Scroll(ScrollAction::ScrollBy {
            dx: -delta.x,
            dy: -delta.y,
        }));
    }
}

fn sync_extent(frame: &mut Frame<'_>) {
    let zoom = frame.store.state().document.zoom;
    let size = frame.engine.document_size();
    frame.store.dispatch(Action::Scroll(ScrollAction::SetExtent {
        width: size.width * zoom,
        height: size.height * zoom,
    }));
}

/// Zoom by `factor` keeping the document point under `center` fixed.
fn zoom_around(frame: &mut Frame<'_>, center: Point, factor: f64) {
    let before = frame.store.state().view_transform();
    let anchor = frame.engine.to_document(&before, center);
    if !frame
        .store
        .dispatch(Action::Document(DocumentAction::SetZoom(before.zoom * factor)))
    {
        return;
    }
    sync_extent(frame);
    let zoom = frame.store.state().document.zoom;
    log::debug!("pinch zoom {:.3} -> {:.3}", before.zoom, zoom);
    frame.store.dispatch(Action::Scroll(ScrollAction::ScrollTo {
        left: anchor.x * zoom - center.x,
        top: anchor.y * zoom - center.y,
    }));
}

impl ViewLayer for PanLayer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attach(&mut self, _cx: &mut LayerContext<'_>) -> HostResult<()> {
        Ok(())
    }

    fn detach(&mut self, _cx: &mut LayerContext<'_>) {}

    fn render(&mut self, frame: &mut Frame<'_>) -> FrameControl {
        let snapshot = frame.snapshot;
        let document = &snapshot.document;
        if document.loaded && (document.zoom_changed || document.loaded_changed || snapshot.canvas.size_changed)
        {
            sync_extent(frame);
        }

        for gesture in &snapshot.pointer.gestures {
            match *gesture {
                // The distance covered before the drag threshold was crossed.
                GestureEvent::DragStart { origin, pointer } => {
                    scroll_by(frame.store, pointer.position() - origin.position())
                }
                GestureEvent::DragMove(pointer) => scroll_by(frame.store, pointer.movement()),
                GestureEvent::TwoFingerPan { delta, .. } => scroll_by(frame.store, delta),
                GestureEvent::Pinch { center, distance_delta } => {
                    let factor = 1.0 + distance_delta;
                    if factor.is_finite() && factor > 0.0 {
                        zoom_around(frame, center, factor);
                    }
                }
                _ => {}
            }
        }

        if document.loaded && snapshot.scroll.position_changed {
            let state = frame.store.state();
            let view = state.view_transform();
            let viewport = state.canvas.css_size();
            let center = frame
                .engine
                .to_document(&view, Point::new(viewport.width / 2.0, viewport.height / 2.0));
            if let Some(page) = frame.engine.page_at(center) {
                frame
                    .store
                    .dispatch(Action::Document(DocumentAction::SetCurrentPage(page)));
            }
        }
        FrameControl::Continue
    }
}
