/// Off-screen colour attachment for rendering without a window.
///
/// `COPY_SRC` is included so the result can be read back.
use crate::resources::texture::{self, RenderTextureDesc};

pub struct ColorTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl ColorTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let texture = texture::create_render_texture(device, &RenderTextureDesc {
            label: "Off-screen Color Texture",
            width: width.max(1),
            height: height.max(1),
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        });
        let view = texture::default_view(&texture);
        Self { texture, view, format }
    }
}
