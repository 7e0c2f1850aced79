use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use mirrorbox_renderer::{compile, DecodedImage, EngineContext, Renderer, SurfaceInitError};
use winit::window::Window;

use crate::builder::AppConfig;

/// Surface plus the renderer drawing into it.
///
/// Fields drop in declaration order: the renderer (and its device) goes
/// before the surface, the reverse of creation.
pub struct GraphicsState {
    pub renderer: Renderer,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl GraphicsState {
    pub async fn new(window: Arc<Window>, app: &AppConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| SurfaceInitError::Surface(e.to_string()))?;
        let context = EngineContext::new_with_instance(instance, Some(&surface)).await?;

        let caps = surface.get_capabilities(&context.adapter);
        // Shader output is written as-is, like a default GL framebuffer.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(SurfaceInitError::NoSurfaceFormat)?;
        let present_mode = if app.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&context.device, &config);
        log::info!("surface configured: {width}x{height} {format:?} {present_mode:?}");

        let vertex = read_source(&app.vertex_shader)?;
        let fragment = read_source(&app.fragment_shader)?;
        let program = compile(&vertex, &fragment, &app.shader_version)?;
        let image = DecodedImage::load_or_placeholder(&app.texture);

        let renderer = Renderer::new(context, width, height, format, program, &image)?;

        Ok(Self { renderer, surface, config })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
            self.renderer.resize(width, height);
        }
    }

    /// Re-applies the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.renderer.context.device, &self.config);
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading shader source {}", path.display()))
}
