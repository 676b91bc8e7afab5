use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize, Size};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::SurfaceSize;
use crate::error::{ErrorCode, FatalError, OrFatal, Result};
use crate::lifecycle::{start, Controller, GpuStartup, LoopControl, SurfaceEvent};
use crate::render::{FrameRenderer, RendererContext};
use crate::time::FrameCounter;
use crate::ReefConfig;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,

    /// Window size as a fraction of the desktop, centred on it.
    pub desktop_fraction: f64,

    /// Used when no monitor can be queried.
    pub fallback_size: LogicalSize<f64>,

    /// Quiet period after the last size change that ends an interactive
    /// resize. Zero disables resize detection.
    pub resize_settle: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Reef".to_string(),
            desktop_fraction: 2.0 / 3.0,
            fallback_size: LogicalSize::new(1280.0, 720.0),
            resize_settle: Duration::from_millis(150),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the demo until the window is closed or a fatal error occurs.
    ///
    /// Everything created is torn down before this returns, on both paths.
    pub fn run(config: &ReefConfig) -> Result<()> {
        let event_loop = EventLoop::new().or_fatal(ErrorCode::Window, "unable to create event loop")?;
        let mut state = AppState::new(config);

        let loop_result = event_loop
            .run_app(&mut state)
            .or_fatal(ErrorCode::Window, "event loop terminated with error");

        state.shutdown();

        match state.failure.take() {
            Some(err) => Err(err),
            None => loop_result,
        }
    }
}

struct AppState<'a> {
    config: &'a ReefConfig,
    window: Option<Arc<Window>>,
    controller: Option<Controller<RendererContext>>,
    resize: Option<super::ResizeTracker>,
    failure: Option<FatalError>,
    started: bool,
}

impl<'a> AppState<'a> {
    fn new(config: &'a ReefConfig) -> Self {
        Self {
            config,
            window: None,
            controller: None,
            resize: None,
            failure: None,
            started: false,
        }
    }

    /// Records the first failure and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: FatalError) {
        log::error!("{err}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }

    fn startup(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = create_hidden_window(event_loop, &self.config.runtime)?;
        self.window = Some(Arc::clone(&window));

        let started = start(&mut GpuStartup {
            window: Arc::clone(&window),
            gpu: &self.config.gpu,
            scene: &self.config.scene,
        })?;

        let size = started.device.size();
        let backend = RendererContext::new(started.device, started.programs, started.meshes, started.resources);
        let renderer = FrameRenderer::new(&self.config.scene, started.camera, FrameCounter::start(Instant::now()));

        self.controller = Some(Controller::new(backend, renderer));
        self.resize = Some(super::ResizeTracker::new(size, self.config.runtime.resize_settle));

        window.set_visible(true);
        log::info!("started at {}x{}", size.width, size.height);
        Ok(())
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, events: impl IntoIterator<Item = SurfaceEvent>) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        let mut outcome = Ok(LoopControl::Continue);
        for event in events {
            outcome = controller.handle(event, Instant::now());
            if !matches!(outcome, Ok(LoopControl::Continue)) {
                break;
            }
        }

        match outcome {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => event_loop.exit(),
            Err(err) => self.fail(event_loop, err),
        }
    }

    /// Tears down the renderer, then the window.
    fn shutdown(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.shutdown();
        }
        self.resize = None;
        if let Some(window) = self.window.take() {
            drop(window);
            log::debug!("window destroyed");
        }
    }
}

impl ApplicationHandler for AppState<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(err) = self.startup(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.failure.is_some() || event_loop.exiting() {
            return;
        }

        let now = Instant::now();
        if let Some(end) = self.resize.as_mut().and_then(|r| r.poll(now)) {
            self.dispatch(event_loop, [end]);
        }

        // Render on idle.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.failure.is_some() {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.dispatch(event_loop, [SurfaceEvent::Quit]);
            }

            WindowEvent::Resized(new_size) => {
                let events = match self.resize.as_mut() {
                    Some(tracker) => tracker.on_resize(SurfaceSize::from(new_size), Instant::now()),
                    None => Vec::new(),
                };
                self.dispatch(event_loop, events);
            }

            WindowEvent::RedrawRequested => {
                self.dispatch(event_loop, [SurfaceEvent::Repaint]);
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn create_hidden_window(event_loop: &ActiveEventLoop, config: &RuntimeConfig) -> Result<Arc<Window>> {
    let mut attrs = Window::default_attributes()
        .with_title(config.title.clone())
        .with_visible(false);

    let monitor = event_loop
        .primary_monitor()
        .or_else(|| event_loop.available_monitors().next());

    match monitor {
        Some(monitor) => {
            let desktop = monitor.size();
            let origin = monitor.position();
            let fraction = config.desktop_fraction.clamp(0.1, 1.0);
            let size = PhysicalSize::new(
                (f64::from(desktop.width) * fraction) as u32,
                (f64::from(desktop.height) * fraction) as u32,
            );
            let position = PhysicalPosition::new(
                origin.x + ((desktop.width - size.width) / 2) as i32,
                origin.y + ((desktop.height - size.height) / 2) as i32,
            );
            attrs = attrs.with_inner_size(Size::Physical(size)).with_position(position);
        }
        None => {
            attrs = attrs.with_inner_size(config.fallback_size);
        }
    }

    let window = event_loop
        .create_window(attrs)
        .or_fatal(ErrorCode::Window, "unable to create window")?;

    Ok(Arc::new(window))
}
