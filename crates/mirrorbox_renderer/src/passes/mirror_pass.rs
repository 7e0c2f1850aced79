/// Cube, stencil-marked mirror, masked reflection and grid.
///
/// Opens one `wgpu::RenderPass` per [`PassPlan`] in the packet.  A plan's
/// clears become the load operations of its pass; everything not cleared
/// is loaded, so the stencil clear between the mirror and the cube does not
/// disturb colour or depth.
use std::sync::Arc;

use mirrorbox_core::render_state::ClearOps;
use mirrorbox_core::{DrawUniforms, PassPlan};
use wgpu::{
    CommandEncoder, Device, LoadOp, Operations, Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, StoreOp, TextureView,
};

use crate::geometry::GpuVertexTable;
use crate::graph::{FramePacket, RenderPass};
use crate::resources::{DrawBuffer, SceneTexture};
use crate::shader::ShaderProgram;

/// Slots allocated up front; one frame issues four draws.
const INITIAL_DRAW_SLOTS: usize = 8;

pub struct MirrorPass {
    program: ShaderProgram,
    vertices: GpuVertexTable,
    draw_buffer: DrawBuffer,
    /// Held so the view and sampler outlive the bind group over them.
    _texture: SceneTexture,
    texture_bind_group: Arc<wgpu::BindGroup>,
    uniforms: Vec<DrawUniforms>,
}

impl MirrorPass {
    pub fn new(device: &Device, program: ShaderProgram, vertices: GpuVertexTable, texture: SceneTexture) -> Self {
        let block_size = program
            .handles
            .block_size
            .unwrap_or(crate::resources::draw_buffer::EMPTY_BLOCK_SIZE);
        let draw_buffer = DrawBuffer::new(device, &program.layouts.draw, block_size, INITIAL_DRAW_SLOTS);

        let texture_bind_group = Arc::new(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Texture BindGroup"),
            layout: &program.layouts.texture,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        }));

        Self {
            program,
            vertices,
            draw_buffer,
            _texture: texture,
            texture_bind_group,
            uniforms: Vec::new(),
        }
    }
}

impl RenderPass for MirrorPass {
    fn name(&self) -> &str {
        "Mirror Scene Pass"
    }

    fn prepare(&mut self, device: &Device, queue: &Queue, packet: &FramePacket) {
        for key in packet.plan.pipeline_keys() {
            self.program.ensure_variant(device, &key);
        }

        self.uniforms.clear();
        self.uniforms.extend(packet.plan.draws().map(|d| d.uniforms));
        self.draw_buffer
            .write_all(device, queue, &self.program.layouts.draw, &self.program.handles, &self.uniforms);
    }

    fn execute(
        &mut self,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: &TextureView,
        packet: &FramePacket,
    ) {
        let mut slot = 0;
        for (index, plan) in packet.plan.passes.iter().enumerate() {
            let label = format!("{} #{index}", self.name());
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some(label.as_str()),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: color_ops(&plan.clear),
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(depth_ops(&plan.clear)),
                    stencil_ops: Some(stencil_ops(&plan.clear)),
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_vertex_buffer(0, self.vertices.buffer.slice(..));
            rpass.set_bind_group(1, &*self.texture_bind_group, &[]);
            slot = self.record_draws(&mut rpass, plan, slot);
        }
    }
}

impl MirrorPass {
    /// Records the draws of one pass; returns the next free uniform slot.
    fn record_draws(&self, rpass: &mut wgpu::RenderPass<'_>, plan: &PassPlan, mut slot: usize) -> usize {
        for draw in &plan.draws {
            let offset = self.draw_buffer.offset(slot);
            slot += 1;
            let Some(pipeline) = self.program.pipeline(&draw.key) else {
                log::warn!("no pipeline for {:?}, draw skipped", draw.key);
                continue;
            };
            rpass.set_pipeline(pipeline);
            rpass.set_stencil_reference(draw.stencil_reference);
            rpass.set_bind_group(0, &*self.draw_buffer.bind_group, &[offset]);
            rpass.draw(draw.range.vertices(), 0..1);
        }
        slot
    }
}

fn color_ops(clear: &ClearOps) -> Operations<wgpu::Color> {
    Operations {
        load: match clear.color {
            Some(c) => LoadOp::Clear(wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            }),
            None => LoadOp::Load,
        },
        store: StoreOp::Store,
    }
}

fn depth_ops(clear: &ClearOps) -> Operations<f32> {
    Operations {
        load: clear.depth.map_or(LoadOp::Load, LoadOp::Clear),
        store: StoreOp::Store,
    }
}

fn stencil_ops(clear: &ClearOps) -> Operations<u32> {
    Operations {
        load: clear.stencil.map_or(LoadOp::Load, LoadOp::Clear),
        store: StoreOp::Store,
    }
}
