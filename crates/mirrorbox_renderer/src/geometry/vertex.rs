/// GPU side of the interleaved vertex table.
///
/// The buffer layout is fixed by [`Vertex`]; which attributes the pipeline
/// actually reads, and at which shader locations, comes from the reflected
/// [`ShaderHandles`].  An attribute the program does not declare is simply
/// left out of the layout.
use std::sync::Arc;

use mirrorbox_core::{Vertex, VertexTable};

use crate::resources::buffer;
use crate::shader::{Attribute, ShaderHandles};

/// Vertex format and byte offset of each attribute inside [`Vertex`].
fn attribute_format(attribute: Attribute) -> (wgpu::VertexFormat, wgpu::BufferAddress) {
    match attribute {
        Attribute::Position => (wgpu::VertexFormat::Float32x3, Vertex::POSITION_OFFSET),
        Attribute::Color => (wgpu::VertexFormat::Float32x3, Vertex::COLOR_OFFSET),
        Attribute::Texcoord => (wgpu::VertexFormat::Float32x2, Vertex::TEXCOORD_OFFSET),
        Attribute::Normal => (wgpu::VertexFormat::Float32x3, Vertex::NORMAL_OFFSET),
    }
}

/// Attribute descriptors for every attribute the program uses.
pub fn vertex_attributes(handles: &ShaderHandles) -> Vec<wgpu::VertexAttribute> {
    Attribute::ALL
        .iter()
        .filter_map(|&attribute| {
            let shader_location = handles.attribute(attribute)?;
            let (format, offset) = attribute_format(attribute);
            Some(wgpu::VertexAttribute { format, offset, shader_location })
        })
        .collect()
}

/// Buffer layout over `attributes`, stride fixed to one [`Vertex`].
pub fn buffer_layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: Vertex::STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// The vertex table uploaded once into a write-once buffer.
pub struct GpuVertexTable {
    pub buffer: Arc<wgpu::Buffer>,
}

impl GpuVertexTable {
    pub fn upload(device: &wgpu::Device, table: &VertexTable) -> Self {
        let buffer = buffer::create_vertex(device, "Scene Vertex Table", table.bytes());
        log::debug!("uploaded {} vertices ({} bytes)", table.vertices().len(), table.bytes().len());
        Self { buffer }
    }
}
