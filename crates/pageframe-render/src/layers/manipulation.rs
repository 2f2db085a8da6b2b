//! Move/resize of the selected annotation.

use pageframe_core::manipulator::{self, Constraints, ManipulationSession};
use pageframe_core::store::{AnnotationsAction, CanvasAction};
use pageframe_core::{Action, CursorStyle, GestureEvent, ItemId};

use super::{draw, entry_on_surface, page_on_surface, release};
use crate::host::{DrawCommand, HostResult, SurfaceId};
use crate::layer::{Frame, FrameControl, LayerContext, ViewLayer};

const NAME: &str = "manipulation";

/// Turns drags on the selected annotation into a [`ManipulationSession`],
/// previews the live rectangle and persists the result through the engine.
#[derive(Debug, Default)]
pub struct ManipulationLayer {
    preview: Option<SurfaceId>,
    session: Option<(ItemId, ManipulationSession)>,
    preview_visible: bool,
}

impl ManipulationLayer {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    fn show_preview(&mut self, frame: &mut Frame<'_>) {
        let Some((_, session)) = &self.session else {
            return;
        };
        let rect = session.current();
        draw(
            frame.host,
            self.preview,
            NAME,
            &[
                DrawCommand::Place { rect, visible: true },
                DrawCommand::StrokeRect {
                    rect,
                    color: frame.config.preview_color(),
                    width: 1.5,
                },
            ],
        );
        self.preview_visible = true;
    }

    fn hide_preview(&mut self, frame: &mut Frame<'_>) {
        if self.preview_visible {
            draw(
                frame.host,
                self.preview,
                NAME,
                &[DrawCommand::Place {
                    rect: kurbo::Rect::ZERO,
                    visible: false,
                }],
            );
            self.preview_visible = false;
        }
    }

    fn commit(&self, frame: &mut Frame<'_>, id: ItemId, rect: kurbo::Rect) {
        let view = frame.snapshot.view_transform();
        let document_rect = frame.engine.rect_to_document(&view, rect);
        log::debug!("persisting annotation {} at {:?}", id, document_rect);
        let update = frame.engine.update_item(id, document_rect);
        frame.store.defer(async move {
            match update.await {
                Ok(entry) => Some(Action::Annotations(AnnotationsAction::Upsert(entry))),
                Err(err) => {
                    log::warn!("Failed to update annotation {}: {}", id, err);
                    None
                }
            }
        });
    }
}

impl ViewLayer for ManipulationLayer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()> {
        self.preview = Some(cx.host.create_html_layer(NAME)?);
        Ok(())
    }

    fn detach(&mut self, cx: &mut LayerContext<'_>) {
        self.session = None;
        self.preview_visible = false;
        release(cx.host, &mut self.preview, NAME);
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> FrameControl {
        let snapshot = frame.snapshot;
        let selected = snapshot.mode.mode.selected_annotation();
        let entry = selected.and_then(|id| snapshot.annotations.get(id));
        let Some(entry) = entry else {
            self.session = None;
            self.hide_preview(frame);
            return FrameControl::Continue;
        };
        if self.session.as_ref().is_some_and(|(id, _)| *id != entry.id) {
            self.session = None;
        }

        let view = snapshot.view_transform();
        let manipulation = frame.store.config().manipulation.clone();
        let mut consumed = false;

        for gesture in &snapshot.pointer.gestures {
            match *gesture {
                GestureEvent::DragStart { origin, pointer } if self.session.is_none() => {
                    let rect = entry_on_surface(frame.engine, &view, entry);
                    let start = origin.position();
                    let handle = manipulator::hit_test_handles(rect, start, manipulation.handle_hit_tolerance);
                    if handle.is_none() && !rect.contains(start) {
                        continue;
                    }
                    let Some(bounds) = page_on_surface(frame.engine, &view, entry.page) else {
                        continue;
                    };
                    let constraints = Constraints::new(bounds, manipulation.min_size)
                        .with_aspect_ratio(entry.aspect_ratio);
                    let mut session = ManipulationSession::new(rect, handle, start, constraints);
                    session.update(pointer.position());
                    let cursor = handle.map_or(CursorStyle::Grabbing, |h| h.cursor());
                    frame.store.dispatch(Action::Canvas(CanvasAction::SetCursor(cursor)));
                    self.session = Some((entry.id, session));
                    consumed = true;
                }
                GestureEvent::DragMove(pointer) => {
                    if let Some((_, session)) = self.session.as_mut() {
                        session.update(pointer.position());
                        consumed = true;
                    }
                }
                GestureEvent::DragEnd { pointer, moved, .. } => {
                    if let Some((id, session)) = self.session.take() {
                        if let Some(rect) = session.finish(pointer.position(), moved) {
                            self.commit(frame, id, rect);
                        }
                        frame
                            .store
                            .dispatch(Action::Canvas(CanvasAction::SetCursor(CursorStyle::Default)));
                        consumed = true;
                    }
                }
                _ => {}
            }
        }

        if self.session.is_some() {
            self.show_preview(frame);
        } else {
            self.hide_preview(frame);
        }

        if consumed {
            FrameControl::StopFrame
        } else {
            FrameControl::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::testing::{Harness, drag};
    use kurbo::{Point, Rect};
    use pageframe_core::EngineError;
    use pageframe_core::store::{ModeAction, ViewerMode};

    fn selected(h: &mut Harness, rect: Rect, ratio: Option<f64>) -> ItemId {
        let entry = h.annotate(rect, ratio);
        h.store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::AnnotationSelected {
            id: entry.id,
        })));
        entry.id
    }

    #[test]
    fn test_move_persists_on_drag_end() {
        let mut h = Harness::new();
        let mut layer = ManipulationLayer::default();
        h.attach(&mut layer);
        let id = selected(&mut h, Rect::new(100.0, 100.0, 200.0, 150.0), None);

        for event in drag(Point::new(150.0, 120.0), Point::new(180.0, 160.0)) {
            h.gesture(event);
        }
        assert_eq!(h.render(&mut layer), FrameControl::StopFrame);
        assert_eq!(h.store.pending_deferred(), 1);
        h.settle();

        let expected = Rect::new(130.0, 140.0, 230.0, 190.0);
        assert_eq!(h.engine.item(id).map(|e| e.rect), Some(expected));
        assert_eq!(h.store.state().annotations.get(id).map(|e| e.rect), Some(expected));
    }

    #[test]
    fn test_no_update_when_drag_returns_to_start() {
        let mut h = Harness::new();
        let mut layer = ManipulationLayer::default();
        h.attach(&mut layer);
        selected(&mut h, Rect::new(100.0, 100.0, 200.0, 150.0), None);

        for event in drag(Point::new(150.0, 120.0), Point::new(150.0, 120.0)) {
            h.gesture(event);
        }
        assert_eq!(h.render(&mut layer), FrameControl::StopFrame);
        assert_eq!(h.store.pending_deferred(), 0);
    }

    #[test]
    fn test_resize_keeps_ratio_and_previews() {
        let mut h = Harness::new();
        let mut layer = ManipulationLayer::default();
        h.attach(&mut layer);
        selected(&mut h, Rect::new(100.0, 100.0, 200.0, 150.0), Some(2.0));

        let [start, mid, _] = drag(Point::new(200.0, 150.0), Point::new(260.0, 170.0));
        h.gesture(start);
        h.gesture(mid);
        assert_eq!(h.render(&mut layer), FrameControl::StopFrame);
        assert!(layer.is_active());

        let preview = h.host.surfaces_owned_by(NAME)[0];
        let (rect, visible) = h.host.surface(preview).unwrap().placement().unwrap();
        assert!(visible);
        assert!((rect.width() / rect.height() - 2.0).abs() < 1e-9);
        assert_eq!(h.store.state().canvas.cursor, CursorStyle::ResizeNwse);
    }

    #[test]
    fn test_drag_outside_selection_passes_through() {
        let mut h = Harness::new();
        let mut layer = ManipulationLayer::default();
        h.attach(&mut layer);
        selected(&mut h, Rect::new(100.0, 100.0, 200.0, 150.0), None);
        for event in drag(Point::new(300.0, 300.0), Point::new(320.0, 300.0)) {
            h.gesture(event);
        }
        assert_eq!(h.render(&mut layer), FrameControl::Continue);
    }

    #[test]
    fn test_rejected_update_keeps_annotation() {
        let mut h = Harness::new();
        let mut layer = ManipulationLayer::default();
        h.attach(&mut layer);
        let original = Rect::new(100.0, 100.0, 200.0, 150.0);
        let id = selected(&mut h, original, None);
        h.engine.fail_next(EngineError::Rejected("locked".into()));
        for event in drag(Point::new(150.0, 120.0), Point::new(180.0, 160.0)) {
            h.gesture(event);
        }
        h.render(&mut layer);
        h.settle();
        assert_eq!(h.store.state().annotations.get(id).map(|e| e.rect), Some(original));
    }

    #[test]
    fn test_detach_releases_preview() {
        let mut h = Harness::new();
        let mut layer = ManipulationLayer::default();
        h.attach(&mut layer);
        assert_eq!(h.host.surfaces_owned_by(NAME).len(), 1);
        h.detach(&mut layer);
        assert!(h.host.surfaces_owned_by(NAME).is_empty());
    }
}
