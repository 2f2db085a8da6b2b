//! Search hit highlighting.

use kurbo::Rect;
use pageframe_core::store::{ChangeTracked, ScrollAction};
use pageframe_core::{Action, ViewerState};

use super::{draw, release};
use crate::host::{DrawCommand, HostResult, SurfaceId};
use crate::layer::{Frame, FrameControl, LayerContext, ViewLayer};

const NAME: &str = "search-highlight";

/// Draws every hit, the active one in its own color, and scrolls the active
/// hit into view when it changes.
#[derive(Debug, Default)]
pub struct SearchHighlightLayer {
    surface: Option<SurfaceId>,
    dirty: bool,
}

fn needs_redraw(snapshot: &ViewerState) -> bool {
    snapshot.search.any_changed()
        || snapshot.document.zoom_changed
        || snapshot.scroll.position_changed
        || snapshot.canvas.size_changed
}

impl SearchHighlightLayer {
    fn reveal_active(&self, frame: &mut Frame<'_>) {
        let snapshot = frame.snapshot;
        let Some(target) = snapshot
            .search
            .active_hit()
            .and_then(|hit| hit.rects.first().copied())
        else {
            return;
        };
        let view = snapshot.view_transform();
        let rect = frame.engine.rect_to_surface(&view, target);
        let viewport = Rect::from_origin_size(kurbo::Point::ORIGIN, snapshot.canvas.css_size());
        if viewport.contains_rect(rect) {
            return;
        }
        let center = rect.center();
        log::debug!("scrolling search hit into view at {:?}", target);
        frame.store.dispatch(Action::Scroll(ScrollAction::ScrollTo {
            left: view.scroll.x + center.x - viewport.width() / 2.0,
            top: view.scroll.y + center.y - viewport.height() / 2.0,
        }));
    }
}

impl ViewLayer for SearchHighlightLayer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()> {
        self.surface = Some(cx.host.create_canvas(NAME)?);
        self.dirty = true;
        Ok(())
    }

    fn detach(&mut self, cx: &mut LayerContext<'_>) {
        release(cx.host, &mut self.surface, NAME);
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> FrameControl {
        let snapshot = frame.snapshot;
        if snapshot.search.active_changed {
            self.reveal_active(frame);
        }
        if !self.dirty && !needs_redraw(snapshot) {
            return FrameControl::Continue;
        }
        self.dirty = false;

        let view = snapshot.view_transform();
        let search = &snapshot.search;
        let mut commands = vec![DrawCommand::Clear];
        for (index, hit) in search.hits.iter().enumerate() {
            let color = if search.active == Some(index) {
                frame.config.search_active_color()
            } else {
                frame.config.search_hit_color()
            };
            for rect in &hit.rects {
                commands.push(DrawCommand::FillRect {
                    rect: frame.engine.rect_to_surface(&view, *rect),
                    color,
                });
            }
        }
        draw(frame.host, self.surface, NAME, &commands);
        FrameControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::testing::Harness;
    use pageframe_core::SearchHit;
    use pageframe_core::store::SearchAction;

    fn hits() -> Vec<SearchHit> {
        vec![
            SearchHit {
                page: 0,
                rects: vec![Rect::new(10.0, 10.0, 60.0, 20.0)],
            },
            SearchHit {
                page: 1,
                rects: vec![Rect::new(10.0, 1000.0, 60.0, 1010.0)],
            },
        ]
    }

    fn search(h: &mut Harness) {
        h.store.dispatch(Action::Search(SearchAction::Begin("term".into())));
        h.store.dispatch(Action::Search(SearchAction::Results {
            query: "term".into(),
            hits: hits(),
        }));
    }

    fn draws(h: &Harness) -> usize {
        let surface = h.host.surfaces_owned_by(NAME)[0];
        h.host.surface(surface).unwrap().draws
    }

    #[test]
    fn test_draws_hits_once_per_change() {
        let mut h = Harness::new();
        let mut layer = SearchHighlightLayer::default();
        h.attach(&mut layer);
        h.render(&mut layer);
        assert_eq!(draws(&h), 1);

        search(&mut h);
        h.render(&mut layer);
        assert_eq!(draws(&h), 2);
        let surface = h.host.surfaces_owned_by(NAME)[0];
        assert_eq!(h.host.surface(surface).unwrap().commands.len(), 3);

        h.render(&mut layer);
        assert_eq!(draws(&h), 2);
    }

    #[test]
    fn test_next_hit_scrolls_into_view() {
        let mut h = Harness::new();
        let mut layer = SearchHighlightLayer::default();
        h.attach(&mut layer);
        search(&mut h);
        h.render(&mut layer);
        assert_eq!(h.store.state().scroll.offset().y, 0.0);

        h.store.dispatch(Action::Search(SearchAction::Next));
        h.render(&mut layer);
        let top = h.store.state().scroll.offset().y;
        assert!((top - (1005.0 - 300.0)).abs() < 1e-9);
    }

    #[test]
    fn test_clear_removes_highlights() {
        let mut h = Harness::new();
        let mut layer = SearchHighlightLayer::default();
        h.attach(&mut layer);
        search(&mut h);
        h.render(&mut layer);
        h.store.dispatch(Action::Search(SearchAction::Clear));
        h.render(&mut layer);
        let surface = h.host.surfaces_owned_by(NAME)[0];
        assert_eq!(h.host.surface(surface).unwrap().commands.len(), 1);
    }
}
