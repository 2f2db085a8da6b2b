//! Built-in view layers, in the order they are composed.

mod manipulation;
mod pan;
mod scrollbar;
mod search_highlight;
mod selection;
mod text_selection;

pub use manipulation::ManipulationLayer;
pub use pan::PanLayer;
pub use scrollbar::{SCROLLBAR_THUMB, ScrollbarLayer};
pub use search_highlight::SearchHighlightLayer;
pub use selection::SelectionLayer;
pub use text_selection::TextSelectionLayer;

use kurbo::Rect;
use pageframe_core::{AnnotationEntry, DocumentEngine, ViewTransform};

use crate::host::{DrawCommand, HostContext, SurfaceId};
use crate::layer::ViewLayer;

/// The standard layer stack.
///
/// The scrollbar comes first: it owns a drag handle whose events must be
/// consumed even on ticks that a later layer stops.
pub fn default_layers() -> Vec<Box<dyn ViewLayer>> {
    vec![
        Box::new(ScrollbarLayer::default()),
        Box::new(ManipulationLayer::default()),
        Box::new(SelectionLayer::default()),
        Box::new(TextSelectionLayer::default()),
        Box::new(PanLayer::default()),
        Box::new(SearchHighlightLayer::default()),
    ]
}

/// Page rectangle in surface pixels.
pub(crate) fn page_on_surface(engine: &dyn DocumentEngine, view: &ViewTransform, page: usize) -> Option<Rect> {
    engine.page_rect(page).map(|r| engine.rect_to_surface(view, r))
}

pub(crate) fn entry_on_surface(engine: &dyn DocumentEngine, view: &ViewTransform, entry: &AnnotationEntry) -> Rect {
    engine.rect_to_surface(view, entry.rect)
}

/// Draw, logging instead of failing the frame.
pub(crate) fn draw(host: &mut dyn HostContext, surface: Option<SurfaceId>, owner: &str, commands: &[DrawCommand]) {
    let Some(surface) = surface else {
        return;
    };
    if let Err(err) = host.draw(surface, commands) {
        log::warn!("{} failed to draw: {}", owner, err);
    }
}

/// Give a surface back to the host.
pub(crate) fn release(host: &mut dyn HostContext, surface: &mut Option<SurfaceId>, owner: &str) {
    if let Some(id) = surface.take() {
        if let Err(err) = host.release(id) {
            log::warn!("{} failed to release its surface: {}", owner, err);
        }
    }
}
