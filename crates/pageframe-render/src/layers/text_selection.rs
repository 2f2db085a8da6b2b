//! Long-press text selection.

use kurbo::Rect;
use pageframe_core::store::ModeAction;
use pageframe_core::{Action, GestureEvent, ViewerMode};

use super::{draw, release};
use crate::host::{DrawCommand, HostResult, SurfaceId};
use crate::layer::{Frame, FrameControl, LayerContext, ViewLayer};

const NAME: &str = "text-selection";

#[derive(Debug, Default)]
pub struct TextSelectionLayer {
    surface: Option<SurfaceId>,
    drawn: Vec<Rect>,
}

impl TextSelectionLayer {
    fn request_text(&self, frame: &mut Frame<'_>, position: kurbo::Point) {
        let view = frame.snapshot.view_transform();
        let document = frame.engine.to_document(&view, position);
        let Some(page) = frame.engine.page_at(document) else {
            return;
        };
        let lookup = frame.engine.text_at(page, document);
        frame.store.defer(async move {
            match lookup.await {
                Ok(Some(selection)) => Some(Action::Mode(ModeAction::Enter(ViewerMode::TextSelected {
                    selection,
                }))),
                Ok(None) => None,
                Err(err) => {
                    log::warn!("Text lookup on page {} failed: {}", page, err);
                    None
                }
            }
        });
    }
}

impl ViewLayer for TextSelectionLayer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()> {
        self.surface = Some(cx.host.create_canvas(NAME)?);
        self.drawn.clear();
        Ok(())
    }

    fn detach(&mut self, cx: &mut LayerContext<'_>) {
        self.drawn.clear();
        release(cx.host, &mut self.surface, NAME);
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> FrameControl {
        let snapshot = frame.snapshot;
        let mode = &snapshot.mode.mode;

        if matches!(mode, ViewerMode::Default | ViewerMode::TextSelected { .. }) {
            if let Some(position) = snapshot.pointer.find_gesture(|g| match g {
                GestureEvent::LongPress(p) => Some(p.position()),
                _ => None,
            }) {
                self.request_text(frame, position);
            }
        }

        let view = snapshot.view_transform();
        let rects: Vec<Rect> = mode
            .text_selection()
            .map(|selection| {
                selection
                    .rects
                    .iter()
                    .map(|r| frame.engine.rect_to_surface(&view, *r))
                    .collect()
            })
            .unwrap_or_default();

        if rects != self.drawn {
            let color = frame.config.text_selection_color();
            let mut commands = vec![DrawCommand::Clear];
            commands.extend(rects.iter().map(|&rect| DrawCommand::FillRect { rect, color }));
            draw(frame.host, self.surface, NAME, &commands);
            self.drawn = rects;
        }
        FrameControl::Continue
    }
}
