//! Per-frame render scheduler.
//!
//! One tick, in order:
//!
//! 1. snapshot the store,
//! 2. reset every change flag,
//! 3. apply the desired cursor if it differs from the last one applied,
//! 4. run the view layers until one returns [`FrameControl::StopFrame`],
//! 5. run every feature module,
//!
//! then request the next frame from the host while running.

use pageframe_core::{Action, CursorStyle, DocumentEngine, HandleSet, Store};
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use crate::config::RenderConfig;
use crate::host::{HostContext, HostResult};
use crate::layer::{FeatureModule, Frame, FrameControl, LayerContext, ViewLayer};

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// False when the scheduler was stopped and nothing ran.
    pub rendered: bool,
    pub timestamp: Duration,
    pub layers_run: Vec<&'static str>,
    pub stopped_by: Option<&'static str>,
    pub modules_run: Vec<&'static str>,
    pub cursor_applied: Option<CursorStyle>,
    /// Wall time spent in the tick.
    pub elapsed: Duration,
}

pub struct RenderScheduler<H: HostContext> {
    host: H,
    config: RenderConfig,
    layers: Vec<Box<dyn ViewLayer>>,
    modules: Vec<Box<dyn FeatureModule>>,
    applied_cursor: Option<CursorStyle>,
    attached: bool,
    running: bool,
}

impl<H: HostContext> std::fmt::Debug for RenderScheduler<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("layers", &self.layer_names())
            .field("modules", &self.module_names())
            .field("attached", &self.attached)
            .field("running", &self.running)
            .finish()
    }
}

impl<H: HostContext> RenderScheduler<H> {
    pub fn new(host: H, config: RenderConfig) -> Self {
        Self {
            host,
            config,
            layers: Vec::new(),
            modules: Vec::new(),
            applied_cursor: None,
            attached: false,
            running: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn attach(&mut self) -> HostResult<()> {
        self.host.attach()?;
        self.attached = true;
        log::info!("render scheduler attached");
        Ok(())
    }

    /// Remove every layer and module, then let go of the host.
    pub fn detach(&mut self, handles: &mut HandleSet) {
        self.stop();
        let mut cx = LayerContext {
            host: &mut self.host,
            handles,
            config: &self.config,
        };
        for mut layer in self.layers.drain(..) {
            layer.detach(&mut cx);
        }
        for mut module in self.modules.drain(..) {
            module.detach(&mut cx);
        }
        self.host.detach();
        self.applied_cursor = None;
        self.attached = false;
        log::info!("render scheduler detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Append a view layer, letting it acquire its surfaces.
    pub fn add_layer(&mut self, mut layer: Box<dyn ViewLayer>, handles: &mut HandleSet) -> HostResult<()> {
        let mut cx = LayerContext {
            host: &mut self.host,
            handles,
            config: &self.config,
        };
        layer.attach(&mut cx)?;
        log::debug!("layer {} added", layer.name());
        self.layers.push(layer);
        Ok(())
    }

    /// Remove a view layer; it releases every surface it created.
    pub fn remove_layer(&mut self, name: &str, handles: &mut HandleSet) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.name() == name) else {
            return false;
        };
        let mut layer = self.layers.remove(index);
        let mut cx = LayerContext {
            host: &mut self.host,
            handles,
            config: &self.config,
        };
        layer.detach(&mut cx);
        log::debug!("layer {} removed", name);
        true
    }

    pub fn add_module(&mut self, mut module: Box<dyn FeatureModule>, handles: &mut HandleSet) -> HostResult<()> {
        let mut cx = LayerContext {
            host: &mut self.host,
            handles,
            config: &self.config,
        };
        module.attach(&mut cx)?;
        log::debug!("module {} added", module.name());
        self.modules.push(module);
        Ok(())
    }

    pub fn remove_module(&mut self, name: &str, handles: &mut HandleSet) -> bool {
        let Some(index) = self.modules.iter().position(|m| m.name() == name) else {
            return false;
        };
        let mut module = self.modules.remove(index);
        let mut cx = LayerContext {
            host: &mut self.host,
            handles,
            config: &self.config,
        };
        module.detach(&mut cx);
        true
    }

    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Begin the frame loop.
    pub fn start(&mut self) {
        if !self.running {
            log::info!("render loop started");
        }
        self.running = true;
        self.host.request_frame();
    }

    /// End the frame loop. Pending frames become no-ops.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("render loop stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one animation tick.
    pub fn tick(
        &mut self,
        timestamp: Duration,
        store: &mut Store,
        engine: &dyn DocumentEngine,
        handles: &mut HandleSet,
    ) -> TickReport {
        let mut report = TickReport {
            timestamp,
            ..TickReport::default()
        };
        if !self.running {
            return report;
        }
        let started = Instant::now();
        report.rendered = true;

        let snapshot = store.snapshot();
        store.dispatch(Action::ResetChangeFlags);

        let desired = snapshot.canvas.cursor;
        if self.applied_cursor != Some(desired) {
            self.host.set_cursor(desired);
            self.applied_cursor = Some(desired);
            report.cursor_applied = Some(desired);
        }

        let Self {
            host,
            config,
            layers,
            modules,
            ..
        } = self;
        let mut frame = Frame {
            timestamp,
            snapshot: &snapshot,
            store,
            host,
            engine,
            handles,
            config,
        };

        for layer in layers.iter_mut() {
            report.layers_run.push(layer.name());
            if layer.render(&mut frame) == FrameControl::StopFrame {
                report.stopped_by = Some(layer.name());
                break;
            }
        }
        for module in modules.iter_mut() {
            report.modules_run.push(module.name());
            module.render(&mut frame);
        }

        self.host.request_frame();
        report.elapsed = started.elapsed();
        if let Some(name) = report.stopped_by {
            log::trace!("frame at {:?} stopped by {}", timestamp, name);
        }
        report
    }
}
