//! Vertical scrollbar with a draggable thumb.

use kurbo::Rect;
use pageframe_core::store::ScrollAction;
use pageframe_core::{Action, HandleEvent, HandleId, ViewerState};

use super::{draw, release};
use crate::config::RenderConfig;
use crate::host::{DrawCommand, HostResult, SurfaceId};
use crate::layer::{Frame, FrameControl, LayerContext, ViewLayer};

const NAME: &str = "scrollbar";

/// Drag handle id of the scrollbar thumb.
pub const SCROLLBAR_THUMB: HandleId = HandleId("scrollbar.thumb");

#[derive(Debug, Clone, Copy, PartialEq)]
struct Thumb {
    rect: Rect,
    /// Distance the thumb can travel.
    track: f64,
    /// Scrollable distance.
    range: f64,
}

fn thumb(state: &ViewerState, config: &RenderConfig) -> Option<Thumb> {
    let viewport = state.canvas.css_size();
    let content = state.scroll.content_height.css;
    let range = content - viewport.height;
    if range <= 0.0 || viewport.width <= config.scrollbar_width {
        return None;
    }
    let length = (viewport.height * viewport.height / content)
        .max(config.scrollbar_min_thumb)
        .min(viewport.height);
    let track = viewport.height - length;
    let top = if track > 0.0 {
        state.scroll.top.css / range * track
    } else {
        0.0
    };
    Some(Thumb {
        rect: Rect::new(
            viewport.width - config.scrollbar_width,
            top,
            viewport.width,
            top + length,
        ),
        track,
        range,
    })
}

#[derive(Debug, Default)]
pub struct ScrollbarLayer {
    surface: Option<SurfaceId>,
    drawn: Option<Rect>,
    dirty: bool,
}

impl ViewLayer for ScrollbarLayer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()> {
        self.surface = Some(cx.host.create_html_layer(NAME)?);
        self.drawn = None;
        self.dirty = true;
        cx.handles.register(SCROLLBAR_THUMB, Rect::ZERO);
        cx.handles.suspend(SCROLLBAR_THUMB);
        Ok(())
    }

    fn detach(&mut self, cx: &mut LayerContext<'_>) {
        cx.handles.unregister(SCROLLBAR_THUMB);
        self.drawn = None;
        release(cx.host, &mut self.surface, NAME);
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> FrameControl {
        let snapshot = frame.snapshot;

        // Thumb travel maps onto the scroll range.
        if let Some(geometry) = thumb(snapshot, frame.config) {
            let dy: f64 = snapshot
                .pointer
                .handle_events
                .iter()
                .filter_map(|event| match *event {
                    HandleEvent::Move { id, delta, .. } if id == SCROLLBAR_THUMB => Some(delta.y),
                    _ => None,
                })
                .sum();
            if dy != 0.0 && geometry.track > 0.0 {
                frame.store.dispatch(Action::Scroll(ScrollAction::ScrollBy {
                    dx: 0.0,
                    dy: dy * geometry.range / geometry.track,
                }));
            }
        }

        let current = thumb(frame.store.state(), frame.config);
        match current {
            Some(geometry) => {
                frame.handles.register(SCROLLBAR_THUMB, geometry.rect);
                frame.handles.resume(SCROLLBAR_THUMB);
            }
            None => {
                frame.handles.suspend(SCROLLBAR_THUMB);
            }
        }

        let rect = current.map(|t| t.rect);
        if self.dirty || rect != self.drawn {
            let commands = match rect {
                Some(rect) => vec![
                    DrawCommand::Place { rect, visible: true },
                    DrawCommand::FillRect {
                        rect,
                        color: frame.config.scrollbar_color(),
                    },
                ],
                None => vec![DrawCommand::Place {
                    rect: Rect::ZERO,
                    visible: false,
                }],
            };
            draw(frame.host, self.surface, NAME, &commands);
            self.drawn = rect;
            self.dirty = false;
        }
        FrameControl::Continue
    }
}
