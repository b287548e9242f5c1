//! Backdrop viewer: a window that animates and draws a particle field.

use crate::config::BackdropConfig;
use crate::error::RunError;
use crate::field::ParticleField;
use crate::gpu::GpuState;
use crate::input::Input;
use crate::pointer::PointerTracker;
use crate::spawn::SpawnContext;
use crate::time::Time;
use log::{debug, error, info, warn};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Builder for the backdrop viewer.
///
/// ```ignore
/// Backdrop::new()
///     .with_seed(7)
///     .with_title("Portfolio backdrop")
///     .run()?;
/// ```
pub struct Backdrop {
    config: BackdropConfig,
    title: String,
}

impl Backdrop {
    pub fn new() -> Self {
        Self {
            config: BackdropConfig::default(),
            title: "driftfield".into(),
        }
    }

    pub fn with_config(mut self, config: BackdropConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the particle layout. Without a seed every run differs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    /// Open the window and animate until it is closed.
    pub fn run(self) -> Result<(), RunError> {
        self.config.pointer.validate()?;
        let seed = self.config.seed.unwrap_or_else(SpawnContext::clock_seed);
        let field = ParticleField::new(self.config.field.clone(), seed)?;
        info!("Spawned {} particles (seed {})", field.len(), seed);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, self.title, field);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: BackdropConfig,
    title: String,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    field: ParticleField,
    tracker: PointerTracker,
    input: Input,
    time: Time,
    /// First failure inside the event loop, returned from `run`.
    error: Option<RunError>,
}

impl App {
    fn new(config: BackdropConfig, title: String, field: ParticleField) -> Self {
        let tracker = PointerTracker::new(config.pointer.clone());
        let input = Input::new((0, 0), config.pointer.recenter_on_leave);
        Self {
            config,
            title,
            window: None,
            gpu_state: None,
            field,
            tracker,
            input,
            time: Time::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: RunError) {
        error!("{}", e);
        if self.error.is_none() {
            self.error = Some(e);
        }
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input = Input::new((size.width, size.height), self.config.pointer.recenter_on_leave);

        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            self.field.positions(),
            &self.config.visuals,
        ))?;
        self.field.take_changed();

        self.tracker.start()?;
        self.time.reset();

        window.request_redraw();
        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.time.update();
        if !self.time.is_paused() {
            self.field.step(delta, self.tracker.smoothed());
        }

        if let Some(gpu_state) = &mut self.gpu_state {
            if self.field.take_changed() {
                gpu_state.upload(self.field.positions());
            }
            match gpu_state.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu_state.reconfigure()
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory, closing");
                    event_loop.exit();
                }
                Err(e) => warn!("Render error: {:?}", e),
            }
        }

        if delta > 0.0 && self.time.frame() % 600 == 0 {
            debug!(
                "frame {} fps {:.1} t {:.2}",
                self.time.frame(),
                self.time.fps(),
                self.field.time()
            );
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);
        if self.input.take_moved() {
            self.tracker.set_target(self.input.pointer_ndc());
        }
        if self.input.exit_requested() {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::Occluded(occluded) => {
                if occluded {
                    self.time.pause();
                } else {
                    self.time.resume();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.tracker.stop();
        self.gpu_state = None;
        self.window = None;
        debug!("Backdrop closed after {} frames", self.time.frame());
    }
}
