//! Boundary to the external document engine.
//!
//! The engine owns page layout, text and annotation semantics. The viewer
//! only needs coordinate transforms (synchronous math) and a handful of
//! item/text/search calls that resolve later as deferred results.

mod memory;

pub use memory::MemoryEngine;

use futures::future::LocalBoxFuture;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),
    #[error("Engine rejected the request: {0}")]
    Rejected(String),
    #[error("Request was canceled")]
    Canceled,
    #[error("Engine is busy")]
    Busy,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Deferred engine result. Single-threaded, so no `Send` bound.
pub type EngineFuture<T> = LocalBoxFuture<'static, EngineResult<T>>;

/// Unique identifier for an annotation item.
pub type ItemId = Uuid;

/// Broad item category. The engine owns everything else about an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Note,
    Highlight,
    Ink,
    Stamp,
    Image,
}

/// Request to create an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub page: usize,
    /// Document coordinates.
    pub rect: Rect,
    pub kind: ItemKind,
    pub aspect_ratio: Option<f64>,
}

/// What the viewer indexes about an item: enough to hit-test and manipulate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    pub id: ItemId,
    pub page: usize,
    /// Document coordinates.
    pub rect: Rect,
    pub kind: ItemKind,
    /// Fixed `width / height` kept while resizing.
    pub aspect_ratio: Option<f64>,
}

/// One search match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub page: usize,
    /// Document coordinates.
    pub rects: Vec<Rect>,
}

/// Text picked from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSelection {
    pub page: usize,
    pub text: String,
    /// Document coordinates.
    pub rects: Vec<Rect>,
}

/// Events pushed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    Busy(bool),
    PageVisibility { page: usize, visible: bool },
    ItemCreated(AnnotationEntry),
    ItemUpdated(AnnotationEntry),
    ItemDeleted(ItemId),
}

/// Mapping between host-surface CSS pixels and document coordinates.
///
/// `surface = document * zoom - scroll`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub zoom: f64,
    /// Scroll offset in CSS pixels.
    pub scroll: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scroll: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new(zoom: f64, scroll: Vec2) -> Self {
        Self { zoom, scroll }
    }

    pub fn to_surface(&self, point: Point) -> Point {
        Point::new(
            point.x * self.zoom - self.scroll.x,
            point.y * self.zoom - self.scroll.y,
        )
    }

    pub fn to_document(&self, point: Point) -> Point {
        Point::new(
            (point.x + self.scroll.x) / self.zoom,
            (point.y + self.scroll.y) / self.zoom,
        )
    }

    pub fn rect_to_surface(&self, rect: Rect) -> Rect {
        Rect::from_points(self.to_surface(rect.origin()), self.to_surface(Point::new(rect.x1, rect.y1)))
    }

    pub fn rect_to_document(&self, rect: Rect) -> Rect {
        Rect::from_points(self.to_document(rect.origin()), self.to_document(Point::new(rect.x1, rect.y1)))
    }
}

/// The external document engine.
///
/// Layout and transforms answer immediately. Everything that touches
/// document content returns an [`EngineFuture`].
pub trait DocumentEngine {
    fn page_count(&self) -> usize;

    /// Page rectangle in document coordinates.
    fn page_rect(&self, page: usize) -> Option<Rect>;

    /// Size of the whole laid-out document.
    fn document_size(&self) -> Size;

    /// Page containing a document point.
    fn page_at(&self, point: Point) -> Option<usize> {
        (0..self.page_count()).find(|&page| self.page_rect(page).is_some_and(|r| r.contains(point)))
    }

    fn to_document(&self, view: &ViewTransform, point: Point) -> Point {
        view.to_document(point)
    }

    fn to_surface(&self, view: &ViewTransform, point: Point) -> Point {
        view.to_surface(point)
    }

    fn rect_to_surface(&self, view: &ViewTransform, rect: Rect) -> Rect {
        view.rect_to_surface(rect)
    }

    fn rect_to_document(&self, view: &ViewTransform, rect: Rect) -> Rect {
        view.rect_to_document(rect)
    }

    fn create_item(&self, draft: ItemDraft) -> EngineFuture<AnnotationEntry>;

    /// Move or resize an item (document coordinates).
    fn update_item(&self, id: ItemId, rect: Rect) -> EngineFuture<AnnotationEntry>;

    fn delete_item(&self, id: ItemId) -> EngineFuture<ItemId>;

    fn search(&self, query: &str) -> EngineFuture<Vec<SearchHit>>;

    /// Text under a document point.
    fn text_at(&self, page: usize, point: Point) -> EngineFuture<Option<TextSelection>>;

    /// Drain events the engine produced since the last call.
    fn poll_events(&self) -> Vec<EngineEvent>;
}
