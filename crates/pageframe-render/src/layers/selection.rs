//! Click-to-select and the selection outline.

use kurbo::{Point, Rect};
use pageframe_core::manipulator::{self, handles};
use pageframe_core::store::{CanvasAction, ModeAction};
use pageframe_core::{Action, CursorStyle, GestureEvent, ViewerMode, ViewerState};

use super::{draw, entry_on_surface, release};
use crate::host::{DrawCommand, HostResult, SurfaceId};
use crate::layer::{Frame, FrameControl, LayerContext, ViewLayer};

const NAME: &str = "selection";

#[derive(Debug, Default)]
pub struct SelectionLayer {
    surface: Option<SurfaceId>,
    drawn: Option<Rect>,
}

impl SelectionLayer {
    fn hover_cursor(&self, frame: &Frame<'_>, position: Point) -> CursorStyle {
        let snapshot = frame.snapshot;
        let view = snapshot.view_transform();
        let tolerance = frame.store.config().manipulation.handle_hit_tolerance;
        if let Some(entry) = snapshot
            .mode
            .mode
            .selected_annotation()
            .and_then(|id| snapshot.annotations.get(id))
        {
            let rect = entry_on_surface(frame.engine, &view, entry);
            if let Some(kind) = manipulator::hit_test_handles(rect, position, tolerance) {
                return kind.cursor();
            }
            if rect.contains(position) {
                return CursorStyle::Move;
            }
        }
        let document = frame.engine.to_document(&view, position);
        if snapshot.annotations.hit_test(document).is_some() {
            CursorStyle::Pointer
        } else {
            CursorStyle::Default
        }
    }

    fn redraw(&mut self, frame: &mut Frame<'_>, rect: Option<Rect>) {
        if rect == self.drawn {
            return;
        }
        let mut commands = vec![DrawCommand::Clear];
        if let Some(rect) = rect {
            commands.push(DrawCommand::StrokeRect {
                rect,
                color: frame.config.selection_color(),
                width: 1.0,
            });
            let half = frame.config.handle_size / 2.0;
            for handle in handles(rect) {
                let square = Rect::from_center_size(handle.position, (half * 2.0, half * 2.0));
                commands.push(DrawCommand::FillRect {
                    rect: square,
                    color: frame.config.handle_color(),
                });
                commands.push(DrawCommand::StrokeRect {
                    rect: square,
                    color: frame.config.selection_color(),
                    width: 1.0,
                });
            }
        }
        draw(frame.host, self.surface, NAME, &commands);
        self.drawn = rect;
    }
}

fn selected_rect(frame: &Frame<'_>, snapshot: &ViewerState) -> Option<Rect> {
    let id = snapshot.mode.mode.selected_annotation()?;
    let entry = snapshot.annotations.get(id)?;
    Some(entry_on_surface(frame.engine, &snapshot.view_transform(), entry))
}

impl ViewLayer for SelectionLayer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()> {
        self.surface = Some(cx.host.create_canvas(NAME)?);
        self.drawn = None;
        Ok(())
    }

    fn detach(&mut self, cx: &mut LayerContext<'_>) {
        self.drawn = None;
        release(cx.host, &mut self.surface, NAME);
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> FrameControl {
        let snapshot = frame.snapshot;
        let mode = &snapshot.mode.mode;

        // The item was deleted underneath the selection.
        if let Some(id) = mode.selected_annotation() {
            if snapshot.annotations.get(id).is_none() {
                log::debug!("selected annotation {} disappeared", id);
                frame.store.dispatch(Action::Mode(ModeAction::Reset));
                self.redraw(frame, None);
                return FrameControl::Continue;
            }
        }

        let mut control = FrameControl::Continue;
        if !matches!(mode, ViewerMode::ModuleSelected { .. }) {
            let view = snapshot.view_transform();
            for gesture in &snapshot.pointer.gestures {
                match gesture {
                    GestureEvent::Click(p) => {
                        let document = frame.engine.to_document(&view, p.position());
                        match snapshot.annotations.hit_test(document) {
                            Some(entry) => {
                                frame.store.dispatch(Action::Mode(ModeAction::Enter(
                                    ViewerMode::AnnotationSelected { id: entry.id },
                                )));
                                control = FrameControl::StopFrame;
                            }
                            None if *mode != ViewerMode::Default => {
                                frame.store.dispatch(Action::Mode(ModeAction::Reset));
                            }
                            None => {}
                        }
                    }
                    GestureEvent::DoubleClick(p) => {
                        let document = frame.engine.to_document(&view, p.position());
                        if let Some(entry) = snapshot.annotations.hit_test(document) {
                            frame
                                .store
                                .dispatch(Action::Mode(ModeAction::Enter(ViewerMode::PopupSelected {
                                    id: entry.id,
                                })));
                            control = FrameControl::StopFrame;
                        }
                    }
                    _ => {}
                }
            }

            let pointer = &snapshot.pointer;
            if pointer.position_changed && !pointer.dragging {
                let cursor = self.hover_cursor(frame, pointer.current.position());
                frame.store.dispatch(Action::Canvas(CanvasAction::SetCursor(cursor)));
            }
        }

        let rect = selected_rect(frame, snapshot);
        self.redraw(frame, rect);
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::testing::{Harness, pointer};
    use pageframe_core::store::{AnnotationsAction, ScrollAction};

    #[test]
    fn test_click_selects_and_outlines() {
        let mut h = Harness::new();
        let mut layer = SelectionLayer::default();
        h.attach(&mut layer);
        let entry = h.annotate(Rect::new(100.0, 100.0, 200.0, 150.0), None);

        h.gesture(GestureEvent::Click(pointer(150.0, 120.0)));
        assert_eq!(h.render(&mut layer), FrameControl::StopFrame);
        assert_eq!(h.store.state().mode.mode.selected_annotation(), Some(entry.id));

        h.render(&mut layer);
        let surface = h.host.surfaces_owned_by(NAME)[0];
        let commands = &h.host.surface(surface).unwrap().commands;
        // outline + fill and stroke per handle
        assert_eq!(commands.len(), 2 + 8 * 2);
    }

    #[test]
    fn test_click_on_empty_canvas_clears_selection() {
        let mut h = Harness::new();
        let mut layer = SelectionLayer::default();
        h.attach(&mut layer);
        let entry = h.annotate(Rect::new(100.0, 100.0, 200.0, 150.0), None);
        h.store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::AnnotationSelected {
            id: entry.id,
        })));

        h.gesture(GestureEvent::Click(pointer(350.0, 500.0)));
        assert_eq!(h.render(&mut layer), FrameControl::Continue);
        assert_eq!(h.store.state().mode.mode, ViewerMode::Default);
    }

    #[test]
    fn test_click_respects_scroll() {
        let mut h = Harness::new();
        let mut layer = SelectionLayer::default();
        h.attach(&mut layer);
        let entry = h.annotate(Rect::new(100.0, 900.0, 200.0, 950.0), None);
        h.store.dispatch(Action::Scroll(ScrollAction::ScrollTo { left: 0.0, top: 800.0 }));

        h.gesture(GestureEvent::Click(pointer(150.0, 120.0)));
        h.render(&mut layer);
        assert_eq!(h.store.state().mode.mode.selected_annotation(), Some(entry.id));
    }

    #[test]
    fn test_double_click_opens_popup() {
        let mut h = Harness::new();
        let mut layer = SelectionLayer::default();
        h.attach(&mut layer);
        let entry = h.annotate(Rect::new(100.0, 100.0, 200.0, 150.0), None);
        h.gesture(GestureEvent::Click(pointer(150.0, 120.0)));
        h.gesture(GestureEvent::DoubleClick(pointer(150.0, 120.0)));
        h.render(&mut layer);
        assert_eq!(h.store.state().mode.mode.popup(), Some(entry.id));
    }

    #[test]
    fn test_removed_annotation_resets_mode() {
        let mut h = Harness::new();
        let mut layer = SelectionLayer::default();
        h.attach(&mut layer);
        let entry = h.annotate(Rect::new(100.0, 100.0, 200.0, 150.0), None);
        h.store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::AnnotationSelected {
            id: entry.id,
        })));
        h.store.dispatch(Action::Annotations(AnnotationsAction::Remove(entry.id)));
        h.render(&mut layer);
        assert_eq!(h.store.state().mode.mode, ViewerMode::Default);
    }

    #[test]
    fn test_module_mode_ignores_clicks() {
        let mut h = Harness::new();
        let mut layer = SelectionLayer::default();
        h.attach(&mut layer);
        h.annotate(Rect::new(100.0, 100.0, 200.0, 150.0), None);
        let tool = ViewerMode::ModuleSelected { module: "note".into() };
        h.store.dispatch(Action::Mode(ModeAction::Enter(tool.clone())));
        h.gesture(GestureEvent::Click(pointer(150.0, 120.0)));
        h.render(&mut layer);
        assert_eq!(h.store.state().mode.mode, tool);
    }

    #[test]
    fn test_hover_cursor() {
        let mut h = Harness::new();
        let mut layer = SelectionLayer::default();
        h.attach(&mut layer);
        let entry = h.annotate(Rect::new(100.0, 100.0, 200.0, 150.0), None);

        h.gesture(GestureEvent::Move(pointer(150.0, 120.0)));
        h.render(&mut layer);
        assert_eq!(h.store.state().canvas.cursor, CursorStyle::Pointer);

        h.store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::AnnotationSelected {
            id: entry.id,
        })));
        h.gesture(GestureEvent::Move(pointer(200.0, 150.0)));
        h.render(&mut layer);
        assert_eq!(h.store.state().canvas.cursor, CursorStyle::ResizeNwse);

        h.gesture(GestureEvent::Move(pointer(380.0, 500.0)));
        h.render(&mut layer);
        assert_eq!(h.store.state().canvas.cursor, CursorStyle::Default);
    }
}
