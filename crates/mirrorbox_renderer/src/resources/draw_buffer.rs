/// Dynamic uniform buffer holding one copy of the draw block per draw call.
///
/// The scene re-uses one set of uniforms across draws with different
/// values.  Queue writes are not ordered with the draws of a submission, so
/// instead of overwriting a single block every draw gets its own slot and
/// the pass binds it with a dynamic offset:
///
/// ```text
/// rpass.set_bind_group(0, &draw_buf.bind_group, &[draw_buf.offset(i)]);
/// ```
///
/// ## Alignment
///
/// Slots are `align_up(block_size, min_uniform_buffer_offset_alignment)`
/// bytes apart.  Values are written at the member offsets reflected from
/// the shader; members the program does not declare are skipped.
use std::sync::Arc;

use mirrorbox_core::DrawUniforms;

use crate::resources::buffer::{self, align_up};
use crate::shader::{ShaderHandles, Uniform};

/// Block size used when the program declares no draw block at all.
pub const EMPTY_BLOCK_SIZE: u32 = 16;

pub struct DrawBuffer {
    pub buffer: wgpu::Buffer,
    /// Single bind group over the whole buffer, bound with a dynamic offset.
    pub bind_group: Arc<wgpu::BindGroup>,
    /// Byte stride between consecutive slots.
    pub stride: u32,
    /// Bytes the shader sees through one binding.
    block_size: u32,
    capacity: usize,
    staging: Vec<u8>,
}

impl DrawBuffer {
    /// `layout` must be the draw bind-group layout with `has_dynamic_offset: true`.
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, block_size: u32, initial_capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let stride = align_up(block_size, alignment);
        let capacity = initial_capacity.max(1);
        let buffer = Self::create_buffer(device, capacity, stride);
        let bind_group = Self::create_bind_group(device, layout, &buffer, block_size);

        Self {
            buffer,
            bind_group: Arc::new(bind_group),
            stride,
            block_size,
            capacity,
            staging: Vec::new(),
        }
    }

    /// Byte offset of slot `index`.
    #[inline]
    pub fn offset(&self, index: usize) -> u32 {
        (index as u32).wrapping_mul(self.stride)
    }

    /// Packs `draws` into consecutive slots and uploads them in one write.
    ///
    /// Grows the buffer first when needed; a grown buffer gets a new bind
    /// group, so call this before recording the pass that uses it.
    pub fn write_all(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        handles: &ShaderHandles,
        draws: &[DrawUniforms],
    ) {
        if draws.is_empty() {
            return;
        }
        self.ensure_capacity(device, layout, draws.len());

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(draws.len() * stride, 0);
        for (slot, uniforms) in self.staging.chunks_exact_mut(stride).zip(draws) {
            pack_uniforms(handles, uniforms, slot);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    /// Ensures room for `needed` slots, doubling the capacity until it fits.
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, needed: usize) {
        if needed <= self.capacity {
            return;
        }
        let mut new_cap = self.capacity;
        while new_cap < needed {
            new_cap *= 2;
        }
        log::debug!("growing draw buffer from {} to {new_cap} slots", self.capacity);
        self.buffer = Self::create_buffer(device, new_cap, self.stride);
        self.bind_group = Arc::new(Self::create_bind_group(device, layout, &self.buffer, self.block_size));
        self.capacity = new_cap;
    }

    // ── Private helpers ──────────────────────────────────────────────────────

    fn create_buffer(device: &wgpu::Device, capacity: usize, stride: u32) -> wgpu::Buffer {
        buffer::create_uniform(device, "Draw Uniforms", capacity as u64 * stride as u64)
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        block_size: u32,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(block_size as u64),
                }),
            }],
        })
    }
}

/// Writes the values of one draw into `slot` at the reflected offsets.
pub fn pack_uniforms(handles: &ShaderHandles, uniforms: &DrawUniforms, slot: &mut [u8]) {
    for uniform in Uniform::ALL {
        let Some(location) = handles.uniform(uniform) else {
            continue;
        };
        let mut values = [0f32; 16];
        let len = match uniform {
            Uniform::Model => {
                values = uniforms.model.to_cols_array();
                16
            }
            Uniform::View => {
                values = uniforms.view.to_cols_array();
                16
            }
            Uniform::Proj => {
                values = uniforms.proj.to_cols_array();
                16
            }
            Uniform::OverrideColor => {
                values[..3].copy_from_slice(&uniforms.override_color.to_array());
                3
            }
        };
        let bytes: &[u8] = bytemuck::cast_slice(&values[..len]);
        let start = location.offset as usize;
        slot[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{compile, DEFAULT_VERSION_PREFIX};
    use mirrorbox_core::glam::{Mat4, Vec3};

    const SCENE_VERT: &str = include_str!("../../../../assets/shaders/scene.vert");
    const SCENE_FRAG: &str = include_str!("../../../../assets/shaders/scene.frag");

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
    }

    fn sample() -> DrawUniforms {
        DrawUniforms {
            model: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            view: Mat4::from_scale(Vec3::splat(2.0)),
            proj: Mat4::IDENTITY,
            override_color: Vec3::new(0.1, 0.2, 0.3),
        }
    }

    #[test]
    fn values_land_at_reflected_offsets() {
        let handles = compile(SCENE_VERT, SCENE_FRAG, DEFAULT_VERSION_PREFIX).unwrap().handles;
        let u = sample();
        let mut slot = vec![0u8; 256];
        pack_uniforms(&handles, &u, &mut slot);

        assert_eq!(floats(&slot[0..64]), u.model.to_cols_array());
        assert_eq!(floats(&slot[64..128]), u.view.to_cols_array());
        assert_eq!(floats(&slot[128..192]), u.proj.to_cols_array());
        assert_eq!(floats(&slot[192..204]), [0.1, 0.2, 0.3]);
        assert!(slot[204..].iter().all(|b| *b == 0));
    }

    #[test]
    fn absent_members_are_skipped() {
        let vert = "
layout(location = 0) in vec3 position;
layout(set = 0, binding = 0) uniform Draw {
    mat4 proj;
};
void main() {
    gl_Position = proj * vec4(position, 1.0);
}
";
        let frag = "
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(1.0);
}
";
        let handles = compile(vert, frag, DEFAULT_VERSION_PREFIX).unwrap().handles;
        assert_eq!(handles.block_size, Some(64));

        let u = sample();
        let mut slot = vec![0u8; 64];
        pack_uniforms(&handles, &u, &mut slot);
        assert_eq!(floats(&slot), u.proj.to_cols_array());
    }
}
