//! Native demo entry point.
//!
//! Drives a headless viewer through a scripted session and prints the final
//! state as JSON. Pass a config file path as the first argument to override
//! the defaults.

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting PageFrame demo");

    let config_path = std::env::args().nth(1);
    match demo::run(config_path.as_deref()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Demo failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}

#[cfg(feature = "native")]
mod demo {
    use kurbo::{Rect, Size};
    use pageframe_app::{AppConfig, Viewer};
    use pageframe_core::{
        AnnotationEntry, ConfigError, ItemId, ItemKind, MemoryEngine, PointerPhase, RawInput,
    };
    use pageframe_render::{HeadlessHost, HostError, NOTE_TOOL};
    use std::rc::Rc;
    use std::time::Duration;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DemoError {
        #[error("Failed to read config: {0}")]
        Io(#[from] std::io::Error),
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error("Host error: {0}")]
        Host(#[from] HostError),
        #[error("Failed to serialize state: {0}")]
        Json(#[from] serde_json::Error),
    }

    /// Letter-sized pages.
    const PAGE: Size = Size::new(612.0, 792.0);

    /// Simulated clock advancing in ~60 Hz frames.
    struct Clock(Duration);

    impl Clock {
        fn advance(&mut self, ms: u64) -> Duration {
            self.0 += Duration::from_millis(ms);
            self.0
        }
    }

    fn click(viewer: &mut Viewer<HeadlessHost>, clock: &mut Clock, x: f64, y: f64) {
        viewer.handle_input(RawInput::mouse(PointerPhase::Down, x, y), clock.advance(5));
        viewer.handle_input(RawInput::mouse(PointerPhase::Up, x, y), clock.advance(40));
        // let the double-click window close
        viewer.frame(clock.advance(300));
    }

    pub fn run(config_path: Option<&str>) -> Result<String, DemoError> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading config from {}", path);
                AppConfig::from_json(&std::fs::read_to_string(path)?)?
            }
            None => AppConfig::default(),
        };

        let engine = Rc::new(MemoryEngine::with_uniform_pages(4, PAGE));
        engine.add_text(0, Rect::new(72.0, 72.0, 340.0, 90.0), "PageFrame demo document");
        engine.add_text(2, Rect::new(72.0, 1700.0, 300.0, 1718.0), "Another PageFrame paragraph");
        let note = AnnotationEntry {
            id: ItemId::new_v4(),
            page: 0,
            rect: Rect::new(120.0, 200.0, 220.0, 260.0),
            kind: ItemKind::Note,
            aspect_ratio: None,
        };
        engine.insert_item(note.clone());

        let host = HeadlessHost::new().with_pixel_ratio(2.0);
        let mut viewer = Viewer::new(host, engine.clone(), config);
        viewer.attach()?;
        viewer.resize(800.0, 600.0);
        viewer.open(vec![note.clone()]);

        let mut clock = Clock(Duration::ZERO);
        viewer.frame(clock.advance(16));

        // Select the note and drag it down and to the right.
        click(&mut viewer, &mut clock, 170.0, 230.0);
        viewer.handle_input(RawInput::mouse(PointerPhase::Down, 170.0, 230.0), clock.advance(16));
        viewer.handle_input(RawInput::mouse(PointerPhase::Move, 200.0, 260.0), clock.advance(16));
        viewer.handle_input(RawInput::mouse(PointerPhase::Move, 230.0, 290.0), clock.advance(16));
        viewer.handle_input(RawInput::mouse(PointerPhase::Up, 230.0, 290.0), clock.advance(16));
        viewer.frame(clock.advance(16));
        engine.process_pending();
        viewer.frame(clock.advance(16));

        // Search and step to the second hit.
        viewer.reset_mode();
        viewer.search("pageframe");
        engine.process_pending();
        viewer.frame(clock.advance(16));
        viewer.next_hit();
        viewer.frame(clock.advance(16));

        // Drop a note with the note tool.
        viewer.select_tool(NOTE_TOOL);
        viewer.frame(clock.advance(16));
        click(&mut viewer, &mut clock, 300.0, 400.0);
        engine.process_pending();
        viewer.frame(clock.advance(16));

        log::info!(
            "{} annotation(s), {} surface(s), {} frame request(s)",
            viewer.state().annotations.len(),
            viewer.host().live_surfaces(),
            viewer.host().frame_requests()
        );
        let json = serde_json::to_string_pretty(viewer.state())?;
        viewer.detach();
        Ok(json)
    }
}
