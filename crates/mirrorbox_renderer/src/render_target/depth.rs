/// The combined depth + 8-bit stencil attachment.
///
/// The mirror effect depends on the stencil aspect, so the format is fixed
/// rather than negotiated.
use crate::resources::texture::{self, RenderTextureDesc};

pub struct DepthStencilTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl DepthStencilTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (texture, view) = Self::make(device, width, height);
        Self { texture, view, width, height }
    }

    /// Recreates the attachment; a no-op when the size is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        let (t, v) = Self::make(device, width, height);
        self.texture = t;
        self.view = v;
        self.width = width;
        self.height = height;
    }

    fn make(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
        let tex = texture::create_render_texture(device, &RenderTextureDesc {
            label: "Depth-Stencil Texture",
            width: width.max(1),
            height: height.max(1),
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        });
        let view = texture::default_view(&tex);
        (tex, view)
    }
}
