//! Note tool: click to drop a note on the page under the pointer.

use kurbo::{Point, Rect, Size, Vec2};
use pageframe_core::manipulator;
use pageframe_core::store::{AnnotationsAction, CanvasAction};
use pageframe_core::{Action, CursorStyle, GestureEvent, ItemDraft, ItemKind};

use crate::host::HostResult;
use crate::layer::{FeatureModule, Frame, LayerContext};

/// Mode name the note tool answers to in `ViewerMode::ModuleSelected`.
pub const NOTE_TOOL: &str = "note";

#[derive(Debug, Default)]
pub struct NoteTool {
    active: bool,
}

impl NoteTool {
    /// Note rectangle centred on `at`, kept inside `page`.
    fn place(at: Point, size: f64, page: Rect) -> Rect {
        let rect = Rect::from_center_size(at, Size::new(size, size));
        manipulator::translate(rect, Vec2::ZERO, page)
    }

    fn create(&self, frame: &mut Frame<'_>, position: Point) {
        let view = frame.snapshot.view_transform();
        let document = frame.engine.to_document(&view, position);
        let Some((page, bounds)) = frame
            .engine
            .page_at(document)
            .and_then(|page| frame.engine.page_rect(page).map(|r| (page, r)))
        else {
            log::debug!("note tool click outside any page at {:?}", document);
            return;
        };
        let draft = ItemDraft {
            page,
            rect: Self::place(document, frame.config.note_size, bounds),
            kind: ItemKind::Note,
            aspect_ratio: Some(1.0),
        };
        log::info!("creating note on page {}", page);
        let created = frame.engine.create_item(draft);
        frame.store.defer(async move {
            match created.await {
                Ok(entry) => Some(Action::Annotations(AnnotationsAction::Upsert(entry))),
                Err(err) => {
                    log::warn!("Failed to create note: {}", err);
                    None
                }
            }
        });
    }
}

impl FeatureModule for NoteTool {
    fn name(&self) -> &'static str {
        NOTE_TOOL
    }

    fn attach(&mut self, _cx: &mut LayerContext<'_>) -> HostResult<()> {
        self.active = false;
        Ok(())
    }

    fn detach(&mut self, _cx: &mut LayerContext<'_>) {
        self.active = false;
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let snapshot = frame.snapshot;
        let selected = snapshot.mode.mode.is_module(NOTE_TOOL);
        if selected != self.active {
            self.active = selected;
            let cursor = if selected {
                CursorStyle::Crosshair
            } else {
                CursorStyle::Default
            };
            frame.store.dispatch(Action::Canvas(CanvasAction::SetCursor(cursor)));
        }
        if !selected {
            return;
        }
        for gesture in &snapshot.pointer.gestures {
            if let GestureEvent::Click(p) = gesture {
                self.create(frame, p.position());
            }
        }
    }
}
