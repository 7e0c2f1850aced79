use std::sync::Arc;

use anyhow::Context as _;
use thiserror::Error;

/// The wgpu objects shared by everything that touches the GPU.
///
/// `Device` and `Queue` are `Arc`-wrapped so passes and resources can hold
/// their own handle; `Instance` and `Adapter` stay owned here.
pub struct EngineContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

/// Window, adapter, device or surface creation failed.  Always fatal.
#[derive(Debug, Error)]
pub enum SurfaceInitError {
    #[error("could not create the window: {0}")]
    Window(String),
    #[error("no suitable graphics adapter found")]
    AdapterUnavailable,
    #[error("device request failed: {0}")]
    DeviceRequest(String),
    #[error("could not create a surface for the window: {0}")]
    Surface(String),
    #[error("the surface reports no supported texture format")]
    NoSurfaceFormat,
    #[error("depth-stencil format {0:?} is not renderable on this adapter")]
    NoStencil(wgpu::TextureFormat),
}

impl EngineContext {
    /// Headless context with no surface, for tests and off-screen rendering.
    pub async fn new() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Self::new_with_instance(instance, None).await
    }

    /// Context that reuses `instance` and, when given, picks an adapter that
    /// can present to `compatible_surface`.
    pub async fn new_with_instance(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .context(SurfaceInitError::AdapterUnavailable)?;

        let info = adapter.get_info();
        log::info!("selected adapter: {} ({:?})", info.name, info.backend);

        let depth_format = crate::render_target::DepthStencilTarget::FORMAT;
        let depth_features = adapter.get_texture_format_features(depth_format);
        if !depth_features.allowed_usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
            return Err(SurfaceInitError::NoStencil(depth_format).into());
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Mirrorbox Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| SurfaceInitError::DeviceRequest(e.to_string()))?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }
}
