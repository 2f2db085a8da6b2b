//! WebAssembly entry point and the DOM-backed host.

use kurbo::Rect;
use pageframe_core::store::ScrollAction;
use pageframe_core::{
    Action, CursorStyle, DeviceClass, MemoryEngine, PointerPhase, RawInput, TouchPhase, TouchPoint,
};
use pageframe_render::{DrawCommand, HostContext, HostError, HostResult, SurfaceId, SurfaceKind};
use peniko::Color;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use crate::{AppConfig, Viewer};

/// Element id the viewer mounts into; falls back to `<body>`.
const CONTAINER_ID: &str = "pageframe";

fn js_error(context: &str, err: JsValue) -> HostError {
    HostError::SurfaceCreation(format!("{}: {:?}", context, err))
}

fn css_color(color: Color) -> String {
    let c = color.to_rgba8();
    format!("rgba({}, {}, {}, {:.3})", c.r, c.g, c.b, f64::from(c.a) / 255.0)
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        log::warn!("Failed to set {}: {:?}", property, err);
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Requests animation frames on behalf of the host, at most one pending at a time.
#[derive(Clone, Default)]
pub struct FrameDriver {
    pending: Rc<Cell<bool>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameDriver {
    /// Ask for the next animation frame unless one is already on its way.
    fn request(&self) {
        if self.pending.get() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = self.callback.borrow();
        // Not installed yet; `start_frame_loop` kicks the first frame.
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(_) => self.pending.set(true),
            Err(err) => log::error!("requestAnimationFrame failed: {:?}", err),
        }
    }
}

struct WebSurface {
    kind: SurfaceKind,
    element: HtmlElement,
    context: Option<CanvasRenderingContext2d>,
}

/// Host backed by DOM elements stacked inside one container.
pub struct WebHost {
    container: HtmlElement,
    attached: bool,
    next_id: u32,
    surfaces: HashMap<SurfaceId, WebSurface>,
    frames: FrameDriver,
}

impl WebHost {
    pub fn new(container: HtmlElement) -> Self {
        Self {
            container,
            attached: false,
            next_id: 1,
            surfaces: HashMap::new(),
            frames: FrameDriver::default(),
        }
    }

    pub fn frame_driver(&self) -> FrameDriver {
        self.frames.clone()
    }

    fn document(&self) -> HostResult<web_sys::Document> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| HostError::Unsupported("no document".into()))
    }

    fn insert(&mut self, kind: SurfaceKind, element: HtmlElement, context: Option<CanvasRenderingContext2d>) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(id, WebSurface { kind, element, context });
        id
    }

    fn create_element(&self, tag: &str, owner: &str) -> HostResult<HtmlElement> {
        if !self.attached {
            return Err(HostError::SurfaceCreation(format!(
                "host is detached ({} requested by {})",
                tag, owner
            )));
        }
        let element: HtmlElement = self
            .document()?
            .create_element(tag)
            .map_err(|e| js_error("create_element", e))?
            .dyn_into()
            .map_err(|_| HostError::SurfaceCreation(format!("<{}> is not an HtmlElement", tag)))?;
        element
            .set_attribute("data-owner", owner)
            .map_err(|e| js_error("set_attribute", e))?;
        set_style(&element, "position", "absolute");
        set_style(&element, "left", "0px");
        set_style(&element, "top", "0px");
        set_style(&element, "pointer-events", "none");
        self.container
            .append_child(&element)
            .map_err(|e| js_error("append_child", e))?;
        Ok(element)
    }

    /// Match the backing store to the container size and pixel ratio.
    fn fit_canvas(&self, element: &HtmlElement, context: &CanvasRenderingContext2d) {
        let Some(canvas) = element.dyn_ref::<HtmlCanvasElement>() else {
            return;
        };
        let ratio = self.device_pixel_ratio();
        let width = f64::from(self.container.client_width());
        let height = f64::from(self.container.client_height());
        let device_width = (width * ratio).round() as u32;
        let device_height = (height * ratio).round() as u32;
        if canvas.width() != device_width || canvas.height() != device_height {
            canvas.set_width(device_width);
            canvas.set_height(device_height);
            set_style(element, "width", &format!("{}px", width));
            set_style(element, "height", &format!("{}px", height));
        }
        if let Err(err) = context.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            log::warn!("Failed to scale canvas: {:?}", err);
        }
    }

    fn draw_canvas(&self, surface: &WebSurface, commands: &[DrawCommand]) -> HostResult<()> {
        let Some(ctx) = &surface.context else {
            return Err(HostError::Unsupported("canvas without a 2d context".into()));
        };
        for command in commands {
            match command {
                DrawCommand::Clear => {
                    self.fit_canvas(&surface.element, ctx);
                    ctx.clear_rect(
                        0.0,
                        0.0,
                        f64::from(self.container.client_width()),
                        f64::from(self.container.client_height()),
                    );
                }
                DrawCommand::FillRect { rect, color } => {
                    ctx.set_fill_style_str(&css_color(*color));
                    ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
                }
                DrawCommand::StrokeRect { rect, color, width } => {
                    ctx.set_stroke_style_str(&css_color(*color));
                    ctx.set_line_width(*width);
                    ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
                }
                DrawCommand::Text { position, text } => {
                    ctx.fill_text(text, position.x, position.y)
                        .map_err(|e| js_error("fill_text", e))?;
                }
                DrawCommand::Place { .. } => {}
            }
        }
        Ok(())
    }

    fn draw_layer(&self, surface: &WebSurface, commands: &[DrawCommand]) {
        let element = &surface.element;
        let mut origin = kurbo::Point::ZERO;
        for command in commands {
            match command {
                DrawCommand::Clear => {
                    element.set_text_content(None);
                    set_style(element, "background", "none");
                    set_style(element, "border", "none");
                }
                DrawCommand::Place { rect, visible } => {
                    origin = rect.origin();
                    place(element, *rect);
                    set_style(element, "display", if *visible { "block" } else { "none" });
                }
                // The element box is the Place rect; fills and strokes style it.
                DrawCommand::FillRect { color, .. } => {
                    set_style(element, "background", &css_color(*color));
                }
                DrawCommand::StrokeRect { color, width, .. } => {
                    set_style(element, "border", &format!("{}px solid {}", width, css_color(*color)));
                }
                DrawCommand::Text { position, text } => {
                    element.set_text_content(Some(text));
                    set_style(
                        element,
                        "padding",
                        &format!("{}px {}px", position.y - origin.y, position.x - origin.x),
                    );
                }
            }
        }
    }
}

fn place(element: &HtmlElement, rect: Rect) {
    set_style(element, "left", &format!("{}px", rect.x0));
    set_style(element, "top", &format!("{}px", rect.y0));
    set_style(element, "width", &format!("{}px", rect.width()));
    set_style(element, "height", &format!("{}px", rect.height()));
}

impl HostContext for WebHost {
    fn attach(&mut self) -> HostResult<()> {
        set_style(&self.container, "position", "relative");
        set_style(&self.container, "touch-action", "none");
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) {
        for (_, surface) in self.surfaces.drain() {
            surface.element.remove();
        }
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        set_style(&self.container, "cursor", cursor.css_name());
    }

    fn request_frame(&mut self) {
        self.frames.request();
    }

    fn create_canvas(&mut self, owner: &str) -> HostResult<SurfaceId> {
        let element = self.create_element("canvas", owner)?;
        let context = element
            .dyn_ref::<HtmlCanvasElement>()
            .ok_or_else(|| HostError::SurfaceCreation("not a canvas".into()))?
            .get_context("2d")
            .map_err(|e| js_error("get_context", e))?
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| HostError::SurfaceCreation("2d context unavailable".into()))?;
        self.fit_canvas(&element, &context);
        Ok(self.insert(SurfaceKind::Canvas, element, Some(context)))
    }

    fn create_html_layer(&mut self, owner: &str) -> HostResult<SurfaceId> {
        let element = self.create_element("div", owner)?;
        set_style(&element, "display", "none");
        set_style(&element, "box-sizing", "border-box");
        Ok(self.insert(SurfaceKind::HtmlLayer, element, None))
    }

    fn release(&mut self, surface: SurfaceId) -> HostResult<()> {
        let removed = self
            .surfaces
            .remove(&surface)
            .ok_or(HostError::UnknownSurface(surface))?;
        removed.element.remove();
        Ok(())
    }

    fn draw(&mut self, surface: SurfaceId, commands: &[DrawCommand]) -> HostResult<()> {
        let target = self
            .surfaces
            .get(&surface)
            .ok_or(HostError::UnknownSurface(surface))?;
        match target.kind {
            SurfaceKind::Canvas => self.draw_canvas(target, commands),
            SurfaceKind::HtmlLayer => {
                self.draw_layer(target, commands);
                Ok(())
            }
        }
    }
}

type SharedViewer = Rc<RefCell<Viewer<WebHost>>>;

fn timestamp(ms: f64) -> Duration {
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

fn local_point(container: &HtmlElement, client_x: i32, client_y: i32) -> kurbo::Point {
    let bounds = container.get_bounding_client_rect();
    kurbo::Point::new(f64::from(client_x) - bounds.left(), f64::from(client_y) - bounds.top())
}

fn touch_points(container: &HtmlElement, list: &web_sys::TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| {
            let p = local_point(container, t.client_x(), t.client_y());
            TouchPoint::new(i64::from(t.identifier()), p.x, p.y)
        })
        .collect()
}

fn listen<E: FromWasmAbi + 'static>(
    target: &HtmlElement,
    name: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn install_input(viewer: &SharedViewer, container: &HtmlElement) -> Result<(), JsValue> {
    let pointer_events = [
        ("pointerdown", PointerPhase::Down),
        ("pointermove", PointerPhase::Move),
        ("pointerup", PointerPhase::Up),
        ("pointercancel", PointerPhase::Cancel),
    ];
    for (name, phase) in pointer_events {
        let viewer = viewer.clone();
        let element = container.clone();
        listen(container, name, move |event: web_sys::PointerEvent| {
            let device = match event.pointer_type().as_str() {
                // Touch arrives through the touch listeners.
                "touch" => return,
                "pen" => DeviceClass::Pen,
                _ => DeviceClass::Mouse,
            };
            let input = RawInput::Pointer {
                phase,
                position: local_point(&element, event.client_x(), event.client_y()),
                buttons: event.buttons(),
                device,
            };
            viewer
                .borrow_mut()
                .handle_input(input, timestamp(event.time_stamp()));
        })?;
    }

    let touch_events = [
        ("touchstart", TouchPhase::Start),
        ("touchmove", TouchPhase::Move),
        ("touchend", TouchPhase::End),
        ("touchcancel", TouchPhase::Cancel),
    ];
    for (name, phase) in touch_events {
        let viewer = viewer.clone();
        let element = container.clone();
        listen(container, name, move |event: web_sys::TouchEvent| {
            event.prevent_default();
            let input = RawInput::Touch {
                phase,
                touches: touch_points(&element, &event.touches()),
                changed: touch_points(&element, &event.changed_touches()),
            };
            viewer
                .borrow_mut()
                .handle_input(input, timestamp(event.time_stamp()));
        })?;
    }

    let wheel_viewer = viewer.clone();
    listen(container, "wheel", move |event: web_sys::WheelEvent| {
        event.prevent_default();
        wheel_viewer
            .borrow_mut()
            .store_mut()
            .dispatch(Action::Scroll(ScrollAction::ScrollBy {
                dx: event.delta_x(),
                dy: event.delta_y(),
            }));
    })?;
    Ok(())
}

fn install_resize_observer(viewer: &SharedViewer, container: &HtmlElement) -> Result<(), JsValue> {
    let viewer = viewer.clone();
    let element = container.clone();
    let closure = Closure::<dyn FnMut(JsValue)>::new(move |_entries: JsValue| {
        viewer
            .borrow_mut()
            .resize(f64::from(element.client_width()), f64::from(element.client_height()));
    });
    let observer = web_sys::ResizeObserver::new(closure.as_ref().unchecked_ref())?;
    observer.observe(container);
    closure.forget();
    Ok(())
}

/// Follow the device pixel ratio, which changes on zoom or when the window
/// moves to another display. A resolution query only ever matches one ratio,
/// so each change re-arms the watch for the new value.
fn watch_pixel_ratio(viewer: SharedViewer) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let ratio = window.device_pixel_ratio();
    let Some(query) = window.match_media(&format!("(resolution: {}dppx)", ratio))? else {
        log::warn!("matchMedia unavailable, pixel ratio fixed at {}", ratio);
        return Ok(());
    };
    let listener = Closure::once_into_js(move || {
        let ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        log::debug!("device pixel ratio changed to {}", ratio);
        viewer.borrow_mut().set_pixel_ratio(ratio);
        if let Err(err) = watch_pixel_ratio(viewer) {
            log::error!("Failed to watch pixel ratio: {:?}", err);
        }
    });
    let options = web_sys::AddEventListenerOptions::new();
    options.set_once(true);
    query.add_event_listener_with_callback_and_add_event_listener_options(
        "change",
        listener.unchecked_ref(),
        &options,
    )
}

/// Drive frames from requestAnimationFrame. The scheduler asks for the next
/// frame through the host while it runs, so the loop idles once the viewer
/// stops and resumes on the next request.
fn start_frame_loop(viewer: SharedViewer, frames: FrameDriver) {
    let pending = frames.pending.clone();
    let frame_viewer = viewer.clone();
    *frames.callback.borrow_mut() = Some(Closure::new(move |ms: f64| {
        pending.set(false);
        frame_viewer.borrow_mut().frame(timestamp(ms));
    }));
    // Requests made before the callback existed were dropped.
    viewer.borrow_mut().host_mut().request_frame();
}

fn demo_engine() -> MemoryEngine {
    let engine = MemoryEngine::with_uniform_pages(6, kurbo::Size::new(612.0, 792.0));
    engine.add_text(0, Rect::new(72.0, 72.0, 360.0, 92.0), "PageFrame in the browser");
    engine.add_text(1, Rect::new(72.0, 880.0, 360.0, 900.0), "Long-press to select this line");
    engine
}

fn mount() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container: HtmlElement = match document.get_element_by_id(CONTAINER_ID) {
        Some(element) => element.dyn_into()?,
        None => document.body().ok_or_else(|| JsValue::from_str("no body"))?,
    };

    let host = WebHost::new(container.clone());
    let frames = host.frame_driver();
    let engine = Rc::new(demo_engine());
    let mut viewer = Viewer::new(host, engine, AppConfig::default());
    viewer
        .attach()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    viewer.resize(f64::from(container.client_width()), f64::from(container.client_height()));
    viewer.open(Vec::new());

    let viewer = Rc::new(RefCell::new(viewer));
    install_input(&viewer, &container)?;
    install_resize_observer(&viewer, &container)?;
    watch_pixel_ratio(viewer.clone())?;
    start_frame_loop(viewer, frames);
    Ok(())
}

/// Initialize and run the WASM viewer.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("Logger unavailable: {}", err)));
    }

    log::info!("Starting PageFrame (WASM)");
    if let Err(err) = mount() {
        log::error!("Failed to start viewer: {:?}", err);
    }
}
