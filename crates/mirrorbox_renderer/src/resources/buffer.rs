/// Thin wrappers over `wgpu::Buffer` creation for the usages this renderer
/// needs.
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Creates a write-once vertex buffer from raw bytes.
///
/// The buffer has `VERTEX` usage only: it cannot be written after creation.
pub fn create_vertex(device: &wgpu::Device, label: &str, bytes: &[u8]) -> Arc<wgpu::Buffer> {
    Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytes,
        usage: wgpu::BufferUsages::VERTEX,
    }))
}

/// Creates a zero-filled uniform buffer of `size` bytes that can be updated
/// with `queue.write_buffer`.
pub fn create_uniform(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Round `value` up to the next multiple of `alignment` (a power of two).
#[inline]
pub fn align_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::align_up;

    #[test]
    fn align_up_rounds_to_the_next_multiple() {
        assert_eq!(align_up(208, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
        assert_eq!(align_up(208, 64), 256);
        assert_eq!(align_up(1, 4), 4);
    }
}
