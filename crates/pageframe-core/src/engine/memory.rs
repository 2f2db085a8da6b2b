//! In-memory document engine for tests and demos.

use futures::FutureExt;
use futures::channel::oneshot;
use kurbo::{Point, Rect, Size};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use super::{
    AnnotationEntry, DocumentEngine, EngineError, EngineEvent, EngineFuture, EngineResult,
    ItemDraft, ItemId, SearchHit, TextSelection,
};

/// Vertical gap between pages, in document units.
pub const PAGE_GAP: f64 = 16.0;

type PendingCall = Box<dyn FnOnce(&MemoryEngine)>;

#[derive(Debug, Clone)]
struct TextRun {
    page: usize,
    rect: Rect,
    text: String,
}

/// Engine with a vertical page stack whose deferred results resolve only
/// when [`MemoryEngine::process_pending`] runs.
#[derive(Default)]
pub struct MemoryEngine {
    pages: Vec<Size>,
    text: RefCell<Vec<TextRun>>,
    items: RefCell<HashMap<ItemId, AnnotationEntry>>,
    pending: RefCell<VecDeque<PendingCall>>,
    events: RefCell<Vec<EngineEvent>>,
    fail_next: RefCell<Option<EngineError>>,
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("pages", &self.pages.len())
            .field("items", &self.items.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl MemoryEngine {
    pub fn new(pages: Vec<Size>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// `count` pages of the same size.
    pub fn with_uniform_pages(count: usize, size: Size) -> Self {
        Self::new(vec![size; count])
    }

    /// Place a run of text on a page (document coordinates).
    pub fn add_text(&self, page: usize, rect: Rect, text: impl Into<String>) {
        self.text.borrow_mut().push(TextRun {
            page,
            rect,
            text: text.into(),
        });
    }

    /// Seed an item without going through the deferred path.
    pub fn insert_item(&self, entry: AnnotationEntry) {
        self.items.borrow_mut().insert(entry.id, entry);
    }

    pub fn item(&self, id: ItemId) -> Option<AnnotationEntry> {
        self.items.borrow().get(&id).cloned()
    }

    pub fn items(&self) -> Vec<AnnotationEntry> {
        self.items.borrow().values().cloned().collect()
    }

    /// Make the next deferred call fail with `error`.
    pub fn fail_next(&self, error: EngineError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    /// Queue an engine-driven event.
    pub fn push_event(&self, event: EngineEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Resolve every queued call in submission order. Returns how many ran.
    pub fn process_pending(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(call) = next else {
                break;
            };
            call(self);
            count += 1;
        }
        if count > 0 {
            log::debug!("memory engine resolved {} call(s)", count);
        }
        count
    }

    fn defer<T: 'static>(
        &self,
        compute: impl FnOnce(&MemoryEngine) -> EngineResult<T> + 'static,
    ) -> EngineFuture<T> {
        let (tx, rx) = oneshot::channel();
        let failure = self.fail_next.borrow_mut().take();
        self.pending.borrow_mut().push_back(Box::new(move |engine: &MemoryEngine| {
            let result = match failure {
                Some(error) => Err(error),
                None => compute(engine),
            };
            // The caller may have dropped the future.
            let _ = tx.send(result);
        }));
        async move { rx.await.unwrap_or(Err(EngineError::Canceled)) }.boxed_local()
    }

    fn page_top(&self, page: usize) -> f64 {
        self.pages[..page].iter().map(|s| s.height + PAGE_GAP).sum()
    }

    fn max_width(&self) -> f64 {
        self.pages.iter().map(|s| s.width).fold(0.0, f64::max)
    }
}

impl DocumentEngine for MemoryEngine {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_rect(&self, page: usize) -> Option<Rect> {
        let size = *self.pages.get(page)?;
        let x = (self.max_width() - size.width) / 2.0;
        Some(Rect::from_origin_size(Point::new(x, self.page_top(page)), size))
    }

    fn document_size(&self) -> Size {
        if self.pages.is_empty() {
            return Size::ZERO;
        }
        let height = self.page_top(self.pages.len()) - PAGE_GAP;
        Size::new(self.max_width(), height)
    }

    fn create_item(&self, draft: ItemDraft) -> EngineFuture<AnnotationEntry> {
        let page_count = self.pages.len();
        self.defer(move |engine| {
            if draft.page >= page_count {
                return Err(EngineError::Rejected(format!("no page {}", draft.page)));
            }
            let entry = AnnotationEntry {
                id: uuid::Uuid::new_v4(),
                page: draft.page,
                rect: draft.rect,
                kind: draft.kind,
                aspect_ratio: draft.aspect_ratio,
            };
            engine.items.borrow_mut().insert(entry.id, entry.clone());
            engine.push_event(EngineEvent::ItemCreated(entry.clone()));
            Ok(entry)
        })
    }

    fn update_item(&self, id: ItemId, rect: Rect) -> EngineFuture<AnnotationEntry> {
        self.defer(move |engine| {
            let entry = {
                let mut items = engine.items.borrow_mut();
                let entry = items.get_mut(&id).ok_or(EngineError::NotFound(id))?;
                entry.rect = rect;
                entry.clone()
            };
            engine.push_event(EngineEvent::ItemUpdated(entry.clone()));
            Ok(entry)
        })
    }

    fn delete_item(&self, id: ItemId) -> EngineFuture<ItemId> {
        self.defer(move |engine| {
            engine
                .items
                .borrow_mut()
                .remove(&id)
                .ok_or(EngineError::NotFound(id))?;
            engine.push_event(EngineEvent::ItemDeleted(id));
            Ok(id)
        })
    }

    fn search(&self, query: &str) -> EngineFuture<Vec<SearchHit>> {
        let needle = query.to_lowercase();
        self.defer(move |engine| {
            if needle.is_empty() {
                return Ok(Vec::new());
            }
            Ok(engine
                .text
                .borrow()
                .iter()
                .filter(|run| run.text.to_lowercase().contains(&needle))
                .map(|run| SearchHit {
                    page: run.page,
                    rects: vec![run.rect],
                })
                .collect())
        })
    }

    fn text_at(&self, page: usize, point: Point) -> EngineFuture<Option<TextSelection>> {
        self.defer(move |engine| {
            Ok(engine
                .text
                .borrow()
                .iter()
                .find(|run| run.page == page && run.rect.contains(point))
                .map(|run| TextSelection {
                    page,
                    text: run.text.clone(),
                    rects: vec![run.rect],
                }))
        })
    }

    fn poll_events(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ItemKind;

    fn engine() -> MemoryEngine {
        MemoryEngine::with_uniform_pages(3, Size::new(600.0, 800.0))
    }

    fn draft(page: usize) -> ItemDraft {
        ItemDraft {
            page,
            rect: Rect::new(10.0, 10.0, 60.0, 40.0),
            kind: ItemKind::Note,
            aspect_ratio: None,
        }
    }

    #[test]
    fn test_vertical_layout() {
        let engine = engine();
        assert_eq!(engine.page_rect(1), Some(Rect::new(0.0, 816.0, 600.0, 1616.0)));
        assert_eq!(engine.document_size(), Size::new(600.0, 2432.0));
        assert_eq!(engine.page_at(Point::new(10.0, 820.0)), Some(1));
        assert_eq!(engine.page_at(Point::new(10.0, 808.0)), None);
    }

    #[test]
    fn test_create_resolves_on_process() {
        let engine = engine();
        let mut future = engine.create_item(draft(0));
        assert!((&mut future).now_or_never().is_none());
        assert_eq!(engine.process_pending(), 1);
        let entry = future.now_or_never().unwrap().unwrap();
        assert_eq!(engine.item(entry.id), Some(entry.clone()));
        assert_eq!(engine.poll_events(), vec![EngineEvent::ItemCreated(entry)]);
        assert!(engine.poll_events().is_empty());
    }

    #[test]
    fn test_fail_next_only_once() {
        let engine = engine();
        engine.fail_next(EngineError::Busy);
        let first = engine.create_item(draft(0));
        let second = engine.create_item(draft(0));
        engine.process_pending();
        assert_eq!(first.now_or_never().unwrap(), Err(EngineError::Busy));
        assert!(second.now_or_never().unwrap().is_ok());
    }

    #[test]
    fn test_update_missing_item() {
        let engine = engine();
        let id = uuid::Uuid::new_v4();
        let future = engine.update_item(id, Rect::ZERO);
        engine.process_pending();
        assert_eq!(future.now_or_never().unwrap(), Err(EngineError::NotFound(id)));
    }

    #[test]
    fn test_rejects_bad_page() {
        let engine = engine();
        let future = engine.create_item(draft(7));
        engine.process_pending();
        assert!(matches!(future.now_or_never().unwrap(), Err(EngineError::Rejected(_))));
    }

    #[test]
    fn test_search_and_text_at() {
        let engine = engine();
        engine.add_text(0, Rect::new(50.0, 50.0, 200.0, 70.0), "Quarterly Report");
        engine.add_text(2, Rect::new(50.0, 1700.0, 200.0, 1720.0), "report appendix");
        let hits = engine.search("REPORT");
        let text = engine.text_at(0, Point::new(60.0, 60.0));
        engine.process_pending();
        assert_eq!(hits.now_or_never().unwrap().unwrap().len(), 2);
        let selection = text.now_or_never().unwrap().unwrap().unwrap();
        assert_eq!(selection.text, "Quarterly Report");
    }
}
