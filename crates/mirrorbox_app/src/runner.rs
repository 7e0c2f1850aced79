use std::sync::Arc;

use mirrorbox_core::{reduce, FrameMatrices, InputEvent, Projection, Reduction, TimeClock, TransformState};
use mirrorbox_renderer::SurfaceInitError;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::builder::AppConfig;
use crate::governor::FrameGovernor;
use crate::graphics::GraphicsState;
use crate::input::InputBridge;

/// What happened to the frame after asking the surface for a texture.
enum FrameOutcome {
    Presented,
    Skipped,
    Fatal,
}

struct Runner {
    config: AppConfig,
    // declared before `window` so GPU state is released first
    graphics: Option<GraphicsState>,
    window: Option<Arc<Window>>,
    input: InputBridge,
    /// Events received since the last frame, reduced in one pass before it.
    pending: Vec<InputEvent>,
    transform: TransformState,
    /// Aspect stays at the configured size; resizes only change the targets.
    projection: Projection,
    clock: TimeClock,
    governor: FrameGovernor,
    error: Option<anyhow::Error>,
}

impl Runner {
    fn new(config: AppConfig) -> Self {
        Self {
            projection: Projection::with_size(config.width, config.height),
            governor: FrameGovernor::new(config.frame_cap),
            config,
            graphics: None,
            window: None,
            input: InputBridge::new(),
            pending: Vec::new(),
            transform: TransformState::default(),
            clock: TimeClock::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| SurfaceInitError::Window(e.to_string()))?,
        );

        let gfx = pollster::block_on(GraphicsState::new(window.clone(), &self.config))?;
        log::info!("setup complete, entering the render loop");

        self.window = Some(window);
        self.graphics = Some(gfx);
        self.clock = TimeClock::new();
        Ok(())
    }

    /// Folds every pending event into the transform; `false` on quit.
    fn reduce_pending(&mut self) -> bool {
        for event in self.pending.drain(..) {
            match reduce(self.transform, &event) {
                Reduction::Continue(state) => self.transform = state,
                Reduction::Quit => return false,
            }
        }
        true
    }

    fn render(&mut self) -> FrameOutcome {
        let Some(gfx) = &mut self.graphics else {
            return FrameOutcome::Skipped;
        };

        let frame = match gfx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                gfx.reconfigure();
                return FrameOutcome::Skipped;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out waiting for a surface texture");
                return FrameOutcome::Skipped;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of memory acquiring a surface texture");
                return FrameOutcome::Fatal;
            }
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let matrices = FrameMatrices::new(&self.transform, &self.projection);
        let mut encoder = gfx.renderer.begin_frame();
        gfx.renderer.render_to_view(&mut encoder, &view, &matrices);
        gfx.renderer.context.queue.submit(Some(encoder.finish()));
        frame.present();
        FrameOutcome::Presented
    }
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::Resized(size) = event {
            if let Some(gfx) = &mut self.graphics {
                gfx.resize(size.width, size.height);
            }
            return;
        }
        if let Some(input) = self.input.translate(&event) {
            self.pending.push(input);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_none() {
            return;
        }

        // ── 1. REDUCE ────────────────────────────────────────────────────────
        if !self.reduce_pending() {
            event_loop.exit();
            return;
        }

        // ── 2. RENDER ────────────────────────────────────────────────────────
        match self.render() {
            FrameOutcome::Presented => {
                self.governor.wait(&self.clock);
                self.clock.tick();
            }
            FrameOutcome::Skipped => {}
            FrameOutcome::Fatal => event_loop.exit(),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let time = self.clock.peek();
        log::info!("rendered {} frames in {:.1}s", self.clock.frames(), time.elapsed);
        self.graphics = None;
        self.window = None;
    }
}

pub(crate) fn run_internal(config: AppConfig) -> anyhow::Result<()> {
    let mut runner = Runner::new(config);
    let event_loop = EventLoop::new().inspect_err(|e| log::error!("creating the event loop: {e}"))?;
    // Poll = spin the loop as fast as possible; no sleeping between frames.
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut runner)
        .inspect_err(|e| log::error!("event loop: {e}"))?;
    match runner.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorbox_core::Key;

    #[test]
    fn pending_events_fold_in_order_and_drain() {
        let mut runner = Runner::new(AppConfig::default());
        runner.pending = vec![InputEvent::KeyReleased(Key::Left), InputEvent::KeyReleased(Key::Left)];
        assert!(runner.reduce_pending());
        assert!((runner.transform.x_rotation + 0.2).abs() < 1e-6);
        assert!(runner.pending.is_empty());
    }

    #[test]
    fn quit_stops_the_reduction() {
        let mut runner = Runner::new(AppConfig::default());
        runner.pending = vec![InputEvent::Quit, InputEvent::KeyReleased(Key::Right)];
        assert!(!runner.reduce_pending());
        assert_eq!(runner.transform, TransformState::default());
    }

    #[test]
    fn projection_aspect_follows_the_configured_size() {
        let runner = Runner::new(AppConfig { width: 1000, height: 500, ..Default::default() });
        assert!((runner.projection.aspect - 2.0).abs() < 1e-6);
    }
}
