/// One render pipeline per [`PipelineKey`].
///
/// The depth mask, stencil function/operations/masks and primitive topology
/// are baked into a wgpu pipeline, so each combination the frame uses gets
/// its own variant.  Every variant shares the program's two modules and its
/// single pipeline layout; the stencil reference stays dynamic.
use mirrorbox_core::render_state::{CompareFunction, StencilOperation};
use mirrorbox_core::{PipelineKey, Primitive};

use crate::render_target::DepthStencilTarget;

/// Everything shared by the variants of one program.
pub struct VariantDesc<'a> {
    pub vertex: &'a wgpu::ShaderModule,
    pub fragment: &'a wgpu::ShaderModule,
    pub layout: &'a wgpu::PipelineLayout,
    pub vertex_buffer: wgpu::VertexBufferLayout<'a>,
    pub target_format: wgpu::TextureFormat,
}

pub fn build_variant(device: &wgpu::Device, desc: &VariantDesc<'_>, key: &PipelineKey) -> wgpu::RenderPipeline {
    let label = format!("Scene Pipeline {:?} depth_write={} stencil={}", key.primitive, key.depth_write, key.stencil.is_some());

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label.as_str()),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.vertex,
            entry_point: Some(crate::shader::compile::ENTRY_POINT),
            buffers: &[desc.vertex_buffer.clone()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.fragment,
            entry_point: Some(crate::shader::compile::ENTRY_POINT),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: topology(key.primitive),
            front_face: wgpu::FrontFace::Ccw,
            // the reflection flips winding, so nothing is culled
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil_state(key)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Depth-stencil state for `key`.
pub fn depth_stencil_state(key: &PipelineKey) -> wgpu::DepthStencilState {
    let stencil = match key.stencil {
        None => wgpu::StencilState::default(),
        Some(s) => {
            let face = wgpu::StencilFaceState {
                compare: compare(s.compare),
                fail_op: operation(s.fail),
                depth_fail_op: operation(s.depth_fail),
                pass_op: operation(s.pass),
            };
            wgpu::StencilState {
                front: face,
                back: face,
                read_mask: s.read_mask,
                write_mask: s.write_mask,
            }
        }
    };

    wgpu::DepthStencilState {
        format: DepthStencilTarget::FORMAT,
        depth_write_enabled: key.depth_write,
        depth_compare: if key.depth_test { wgpu::CompareFunction::Less } else { wgpu::CompareFunction::Always },
        stencil,
        bias: wgpu::DepthBiasState::default(),
    }
}

fn topology(primitive: Primitive) -> wgpu::PrimitiveTopology {
    match primitive {
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
    }
}

fn compare(f: CompareFunction) -> wgpu::CompareFunction {
    match f {
        CompareFunction::Never => wgpu::CompareFunction::Never,
        CompareFunction::Less => wgpu::CompareFunction::Less,
        CompareFunction::Equal => wgpu::CompareFunction::Equal,
        CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFunction::Greater => wgpu::CompareFunction::Greater,
        CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFunction::Always => wgpu::CompareFunction::Always,
    }
}

fn operation(op: StencilOperation) -> wgpu::StencilOperation {
    match op {
        StencilOperation::Keep => wgpu::StencilOperation::Keep,
        StencilOperation::Zero => wgpu::StencilOperation::Zero,
        StencilOperation::Replace => wgpu::StencilOperation::Replace,
        StencilOperation::Invert => wgpu::StencilOperation::Invert,
        StencilOperation::IncrementClamp => wgpu::StencilOperation::IncrementClamp,
        StencilOperation::DecrementClamp => wgpu::StencilOperation::DecrementClamp,
        StencilOperation::IncrementWrap => wgpu::StencilOperation::IncrementWrap,
        StencilOperation::DecrementWrap => wgpu::StencilOperation::DecrementWrap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorbox_core::{build_vertex_buffer, record_frame, setup_commands, FrameMatrices, Projection, StateTracker, TransformState};

    fn frame_keys() -> Vec<PipelineKey> {
        let table = build_vertex_buffer();
        let mut tracker = StateTracker::new();
        tracker.replay(&setup_commands(), &table);
        let m = FrameMatrices::new(&TransformState::default(), &Projection::default());
        tracker.replay(&record_frame(&m), &table).pipeline_keys()
    }

    #[test]
    fn plain_cube_has_no_stencil_and_writes_depth() {
        let state = depth_stencil_state(&frame_keys()[0]);
        assert!(!state.stencil.is_enabled());
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        assert_eq!(state.format, wgpu::TextureFormat::Depth24PlusStencil8);
    }

    #[test]
    fn mirror_marks_and_reflection_reads_the_stencil() {
        let keys = frame_keys();
        let mark = depth_stencil_state(&keys[1]);
        assert!(!mark.depth_write_enabled);
        assert_eq!(mark.stencil.front.compare, wgpu::CompareFunction::Always);
        assert_eq!(mark.stencil.front.pass_op, wgpu::StencilOperation::Replace);
        assert_eq!(mark.stencil.write_mask, 0xFF);
        assert!(mark.stencil.needs_ref_value());

        let read = depth_stencil_state(&keys[2]);
        assert!(read.depth_write_enabled);
        assert_eq!(read.stencil.front.compare, wgpu::CompareFunction::Equal);
        assert_eq!(read.stencil.back.compare, wgpu::CompareFunction::Equal);
        assert_eq!(read.stencil.read_mask, 0xFF);
        assert_eq!(read.stencil.write_mask, 0);
    }

    #[test]
    fn grid_is_a_line_list_without_depth_writes() {
        let key = frame_keys()[3];
        assert_eq!(topology(key.primitive), wgpu::PrimitiveTopology::LineList);
        assert!(!depth_stencil_state(&key).depth_write_enabled);
    }
}
