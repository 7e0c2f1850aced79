/// Bind-group and pipeline layouts shared by every pipeline variant of the
/// scene program.  All variants use the same layout, so bind groups created
/// once stay valid whichever variant is bound.
use std::sync::Arc;

#[derive(Clone)]
pub struct ProgramLayouts {
    /// group(0): the draw uniform block via a **dynamic** uniform buffer.
    ///
    /// Every draw gets its own slot; only the offset changes between draws.
    pub draw: Arc<wgpu::BindGroupLayout>,
    /// group(1): the scene texture (binding 0) and its sampler (binding 1).
    pub texture: Arc<wgpu::BindGroupLayout>,
    pub pipeline: Arc<wgpu::PipelineLayout>,
}

impl ProgramLayouts {
    pub fn new(device: &wgpu::Device, draw_block_size: u32) -> Self {
        let draw = Arc::new(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layout: Draw (dynamic)"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(draw_block_size as u64),
                },
                count: None,
            }],
        }));

        let texture = Arc::new(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layout: Scene Texture"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        }));

        let pipeline = Arc::new(device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&*draw, &*texture],
            push_constant_ranges: &[],
        }));

        Self { draw, texture, pipeline }
    }
}
