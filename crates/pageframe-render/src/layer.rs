//! View layer and feature module contracts.

use pageframe_core::{DocumentEngine, HandleSet, Store, ViewerState};
use std::time::Duration;

use crate::config::RenderConfig;
use crate::host::{HostContext, HostResult};

/// What a view layer tells the scheduler after rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    /// Skip the remaining view layers for this tick only.
    StopFrame,
}

/// Resources handed to layers when they are attached or detached.
pub struct LayerContext<'a> {
    pub host: &'a mut dyn HostContext,
    pub handles: &'a mut HandleSet,
    pub config: &'a RenderConfig,
}

/// Everything a layer sees during one tick.
///
/// `snapshot` is the state taken at the start of the tick and is the same for
/// every layer. Changes go through `store` and show up on the next tick.
pub struct Frame<'a> {
    pub timestamp: Duration,
    pub snapshot: &'a ViewerState,
    pub store: &'a mut Store,
    pub host: &'a mut dyn HostContext,
    pub engine: &'a dyn DocumentEngine,
    pub handles: &'a mut HandleSet,
    pub config: &'a RenderConfig,
}

/// A visual layer composed by the scheduler, in list order.
pub trait ViewLayer {
    fn name(&self) -> &'static str;

    /// Acquire surfaces and handles.
    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()>;

    /// Release every surface and handle acquired in `attach` or `render`.
    fn detach(&mut self, cx: &mut LayerContext<'_>);

    fn render(&mut self, frame: &mut Frame<'_>) -> FrameControl;
}

/// A pluggable tool. Runs after the view layers and cannot stop the frame.
pub trait FeatureModule {
    fn name(&self) -> &'static str;

    fn attach(&mut self, cx: &mut LayerContext<'_>) -> HostResult<()>;

    fn detach(&mut self, cx: &mut LayerContext<'_>);

    fn render(&mut self, frame: &mut Frame<'_>);
}
