//! Host context: everything the viewer needs from the embedding surface.
//!
//! Layers acquire drawing surfaces through [`HostContext::create_canvas`] and
//! [`HostContext::create_html_layer`] and must hand every one of them back
//! with [`HostContext::release`] when they are removed.

use kurbo::{Point, Rect};
use pageframe_core::CursorStyle;
use peniko::Color;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Host errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Unknown surface: {0:?}")]
    UnknownSurface(SurfaceId),
    #[error("Surface creation failed: {0}")]
    SurfaceCreation(String),
    #[error("Unsupported by host: {0}")]
    Unsupported(String),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Handle to a surface owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SurfaceId(pub u32);

/// Kind of drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SurfaceKind {
    /// Bitmap canvas stacked over the pages.
    Canvas,
    /// Positioned element for DOM-hosted content (popups, previews, scrollbars).
    HtmlLayer,
}

/// Drawing command. A `draw` call replaces the previous content of a surface.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear,
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, color: Color, width: f64 },
    Text { position: Point, text: String },
    /// Position an HTML layer (CSS pixels).
    Place { rect: Rect, visible: bool },
}

/// Capabilities required from the embedding environment.
pub trait HostContext {
    /// Start delivering input and frames.
    fn attach(&mut self) -> HostResult<()>;

    /// Stop delivering input and frames.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;

    fn device_pixel_ratio(&self) -> f64;

    fn set_cursor(&mut self, cursor: CursorStyle);

    /// Ask for one more animation frame.
    fn request_frame(&mut self);

    fn create_canvas(&mut self, owner: &str) -> HostResult<SurfaceId>;

    fn create_html_layer(&mut self, owner: &str) -> HostResult<SurfaceId>;

    fn release(&mut self, surface: SurfaceId) -> HostResult<()>;

    fn draw(&mut self, surface: SurfaceId, commands: &[DrawCommand]) -> HostResult<()>;
}

/// A surface as recorded by [`HeadlessHost`].
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub kind: SurfaceKind,
    pub owner: String,
    pub commands: Vec<DrawCommand>,
    pub draws: usize,
}

impl HeadlessSurface {
    /// Last `Place` command, if any.
    pub fn placement(&self) -> Option<(Rect, bool)> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::Place { rect, visible } => Some((*rect, *visible)),
            _ => None,
        })
    }
}

/// Host that records every call. Used by tests and the native demo.
#[derive(Debug)]
pub struct HeadlessHost {
    attached: bool,
    pixel_ratio: f64,
    next_id: u32,
    surfaces: BTreeMap<SurfaceId, HeadlessSurface>,
    cursor_history: Vec<CursorStyle>,
    frame_requests: usize,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            attached: false,
            pixel_ratio: 1.0,
            next_id: 1,
            surfaces: BTreeMap::new(),
            cursor_history: Vec::new(),
            frame_requests: 0,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Simulate the window moving to a display with another ratio.
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&HeadlessSurface> {
        self.surfaces.get(&id)
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn surfaces_owned_by(&self, owner: &str) -> Vec<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.owner == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Last cursor applied.
    pub fn cursor(&self) -> Option<CursorStyle> {
        self.cursor_history.last().copied()
    }

    pub fn cursor_history(&self) -> &[CursorStyle] {
        &self.cursor_history
    }

    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    fn create(&mut self, kind: SurfaceKind, owner: &str) -> HostResult<SurfaceId> {
        if !self.attached {
            return Err(HostError::SurfaceCreation(format!(
                "host is detached ({} requested by {})",
                match kind {
                    SurfaceKind::Canvas => "canvas",
                    SurfaceKind::HtmlLayer => "html layer",
                },
                owner
            )));
        }
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(
            id,
            HeadlessSurface {
                kind,
                owner: owner.to_string(),
                commands: Vec::new(),
                draws: 0,
            },
        );
        Ok(id)
    }
}

impl HostContext for HeadlessHost {
    fn attach(&mut self) -> HostResult<()> {
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor_history.push(cursor);
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }

    fn create_canvas(&mut self, owner: &str) -> HostResult<SurfaceId> {
        self.create(SurfaceKind::Canvas, owner)
    }

    fn create_html_layer(&mut self, owner: &str) -> HostResult<SurfaceId> {
        self.create(SurfaceKind::HtmlLayer, owner)
    }

    fn release(&mut self, surface: SurfaceId) -> HostResult<()> {
        self.surfaces
            .remove(&surface)
            .map(|_| ())
            .ok_or(HostError::UnknownSurface(surface))
    }

    fn draw(&mut self, surface: SurfaceId, commands: &[DrawCommand]) -> HostResult<()> {
        let target = self
            .surfaces
            .get_mut(&surface)
            .ok_or(HostError::UnknownSurface(surface))?;
        target.commands = commands.to_vec();
        target.draws += 1;
        Ok(())
    }
}
