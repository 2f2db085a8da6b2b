//! Annotation popup, shown beside the item in `PopupSelected` mode.
//!
//! The popup is an HTML layer with a grip strip along its top edge. The grip
//! is a drag handle: dragging it moves the popup, double-clicking it closes
//! the popup.

use kurbo::{Point, Rect, Vec2};
use pageframe_core::store::ModeAction;
use pageframe_core::{Action, AnnotationEntry, HandleEvent, HandleId, ItemId};

use crate::host::{DrawCommand, HostResult, SurfaceId};
use crate::layer::{FeatureModule, Frame, LayerContext};
use crate::layers::{draw, entry_on_surface, release};

const NAME: &str = "popup";

/// Drag handle id of the popup grip.
pub const POPUP_GRIP: HandleId = HandleId("popup.grip");

/// Gap between the annotation and its popup.
const POPUP_GAP: f64 = 8.0;

#[derive(Debug, Default)]
pub struct PopupModule {
    surface: Option<SurfaceId>,
    shown_for: Option<ItemId>,
    /// Accumulated grip drags.
    offset: Vec2,
    drawn: Option<Rect>,
}

impl PopupModule {
    /// Popup rectangle in surface pixels.
    pub fn popup_rect(&self) -> Option<Rect> {
        self.drawn
    }

    fn hide(&mut self, frame: &mut Frame<'_>) {
        frame.handles.suspend(POPUP_GRIP);
        self.shown_for = None;
        self.offset = Vec2::ZERO;
        if self.drawn.take().is_some() {
            draw(
                frame.host,
                self.surface,
                NAME,
                &[DrawCommand::Place {
                    rect: Rect::ZERO,
                    visible: false,
                }],
            );
        }
    }

    fn show(&mut self, frame: &mut Frame<'_>, entry: &AnnotationEntry) {
        let view = frame.snapshot.view_transform();
        let anchor = entry_on_surface(frame.engine, &view, entry);
        let config = frame.config;
        let rect = Rect::from_origin_size(
            Point::new(anchor.x1 + POPUP_GAP, anchor.y0) + self.offset,
            (config.popup_width, config.popup_height),
        );
        let grip = Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + config.popup_grip_height);
        frame.handles.register(POPUP_GRIP, grip);
        frame.handles.resume(POPUP_GRIP);

        if self.drawn == Some(rect) {
            return;
        }
        let text = format!("{:?} on page {}", entry.kind, entry.page + 1);
        draw(
            frame.host,
            self.surface,
            NAME,
            &[
                DrawCommand::Place { rect, visible: true },
                DrawCommand::FillRect {
                    rect: grip,
                    color: config.selection_color(),
                },
                DrawCommand::StrokeRect {
                    rect,
                    color: config.selection_color(),
                    width: 1.0,
                },
                DrawCommand::Text {
                    position: Point::new(rect.x0 + 8.0, grip.y1 + 16.0),
                    text,
                },
            ],
        );
        self.drawn = Some(rect);
    }
}

impl FeatureModule for PopupModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()> {
        self.surface = Some(cx.host.create_html_layer(NAME)?);
        cx.handles.register(POPUP_GRIP, Rect::ZERO);
        cx.handles.suspend(POPUP_GRIP);
        Ok(())
    }

    fn detach(&mut self, cx: &mut LayerContext<'_>) {
        cx.handles.unregister(POPUP_GRIP);
        self.shown_for = None;
        self.offset = Vec2::ZERO;
        self.drawn = None;
        release(cx.host, &mut self.surface, NAME);
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let snapshot = frame.snapshot;
        let Some(id) = snapshot.mode.mode.popup() else {
            self.hide(frame);
            return;
        };
        let Some(entry) = snapshot.annotations.get(id) else {
            log::debug!("popup target {} is gone", id);
            frame.store.dispatch(Action::Mode(ModeAction::Reset));
            self.hide(frame);
            return;
        };
        if self.shown_for != Some(id) {
            self.shown_for = Some(id);
            self.offset = Vec2::ZERO;
        }

        for event in &snapshot.pointer.handle_events {
            match *event {
                HandleEvent::Move { id: handle, delta, .. } if handle == POPUP_GRIP => self.offset += delta,
                HandleEvent::DoubleClick { id: handle, .. } if handle == POPUP_GRIP => {
                    frame.store.dispatch(Action::Mode(ModeAction::Reset));
                    self.hide(frame);
                    return;
                }
                _ => {}
            }
        }
        self.show(frame, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::testing::Harness;
    use pageframe_core::ViewerMode;
    use pageframe_core::store::PointerAction;

    fn open_popup(h: &mut Harness) -> ItemId {
        let entry = h.annotate(Rect::new(100.0, 100.0, 140.0, 140.0), None);
        h.store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::PopupSelected {
            id: entry.id,
        })));
        entry.id
    }

    fn handle(h: &mut Harness, event: HandleEvent) {
        h.store.dispatch(Action::Pointer(PointerAction::Handle(event)));
    }

    #[test]
    fn test_popup_beside_annotation() {
        let mut h = Harness::new();
        let mut popup = PopupModule::default();
        h.attach_module(&mut popup);
        open_popup(&mut h);
        h.render_module(&mut popup);

        let expected = Rect::new(148.0, 100.0, 388.0, 260.0);
        assert_eq!(popup.popup_rect(), Some(expected));
        let grip = h.handles.get(POPUP_GRIP).unwrap();
        assert!(!grip.is_suspended());
        assert_eq!(grip.bounds(), Rect::new(148.0, 100.0, 388.0, 120.0));
    }

    #[test]
    fn test_grip_drag_moves_popup() {
        let mut h = Harness::new();
        let mut popup = PopupModule::default();
        h.attach_module(&mut popup);
        open_popup(&mut h);
        h.render_module(&mut popup);

        handle(
            &mut h,
            HandleEvent::Move {
                id: POPUP_GRIP,
                position: Point::new(200.0, 140.0),
                delta: Vec2::new(-30.0, 40.0),
            },
        );
        h.render_module(&mut popup);
        assert_eq!(popup.popup_rect().map(|r| r.origin()), Some(Point::new(118.0, 140.0)));
    }

    #[test]
    fn test_grip_double_click_closes() {
        let mut h = Harness::new();
        let mut popup = PopupModule::default();
        h.attach_module(&mut popup);
        open_popup(&mut h);
        h.render_module(&mut popup);

        handle(
            &mut h,
            HandleEvent::DoubleClick {
                id: POPUP_GRIP,
                position: Point::new(200.0, 110.0),
            },
        );
        h.render_module(&mut popup);
        assert_eq!(h.store.state().mode.mode, ViewerMode::Default);
        assert!(h.handles.get(POPUP_GRIP).unwrap().is_suspended());
        let surface = h.host.surfaces_owned_by(NAME)[0];
        assert_eq!(h.host.surface(surface).unwrap().placement(), Some((Rect::ZERO, false)));
    }

    #[test]
    fn test_offset_resets_for_new_target() {
        let mut h = Harness::new();
        let mut popup = PopupModule::default();
        h.attach_module(&mut popup);
        open_popup(&mut h);
        h.render_module(&mut popup);
        handle(
            &mut h,
            HandleEvent::Move {
                id: POPUP_GRIP,
                position: Point::ZERO,
                delta: Vec2::new(10.0, 10.0),
            },
        );
        h.render_module(&mut popup);

        let other = h.annotate(Rect::new(300.0, 300.0, 340.0, 340.0), None);
        h.store.dispatch(Action::Mode(ModeAction::Enter(ViewerMode::PopupSelected {
            id: other.id,
        })));
        h.render_module(&mut popup);
        assert_eq!(popup.popup_rect().map(|r| r.origin()), Some(Point::new(348.0, 300.0)));
    }

    #[test]
    fn test_detach_cleans_up() {
        let mut h = Harness::new();
        let mut popup = PopupModule::default();
        h.attach_module(&mut popup);
        h.detach_module(&mut popup);
        assert!(h.handles.get(POPUP_GRIP).is_none());
        assert!(h.host.surfaces_owned_by(NAME).is_empty());
    }
}
