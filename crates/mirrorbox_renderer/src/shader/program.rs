//! The linked scene program: GPU modules, layouts and pipeline variants.

use std::borrow::Cow;
use std::collections::HashMap;

use mirrorbox_core::PipelineKey;

use crate::geometry::vertex;
use crate::pipeline::{build_variant, ProgramLayouts, VariantDesc};
use crate::resources::draw_buffer::EMPTY_BLOCK_SIZE;
use crate::shader::compile::{CompileError, CompiledProgram, ShaderHandles};

/// One program for the whole scene.  Pipelines differ only in fixed state.
pub struct ShaderProgram {
    pub handles: ShaderHandles,
    pub layouts: ProgramLayouts,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    attributes: Vec<wgpu::VertexAttribute>,
    target_format: wgpu::TextureFormat,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl ShaderProgram {
    /// Creates the GPU modules and one pipeline per key in `keys`.
    ///
    /// Runs inside a validation error scope: anything wgpu rejects here,
    /// such as stage interfaces that do not match, becomes a link error.
    pub fn link(
        device: &wgpu::Device,
        compiled: CompiledProgram,
        target_format: wgpu::TextureFormat,
        keys: &[PipelineKey],
    ) -> Result<Self, CompileError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module =
            create_module(device, "Scene Vertex Stage", &compiled.vertex_source, wgpu::naga::ShaderStage::Vertex);
        let fragment_module =
            create_module(device, "Scene Fragment Stage", &compiled.fragment_source, wgpu::naga::ShaderStage::Fragment);
        let layouts = ProgramLayouts::new(device, compiled.handles.block_size.unwrap_or(EMPTY_BLOCK_SIZE));

        let mut program = Self {
            attributes: vertex::vertex_attributes(&compiled.handles),
            handles: compiled.handles,
            layouts,
            vertex: vertex_module,
            fragment: fragment_module,
            target_format,
            pipelines: HashMap::new(),
        };
        for key in keys {
            program.ensure_variant(device, key);
        }

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(CompileError::link(error.to_string()));
        }
        log::info!("scene program linked with {} pipeline variant(s)", program.pipelines.len());
        Ok(program)
    }

    /// Builds the pipeline for `key` unless it already exists.
    pub fn ensure_variant(&mut self, device: &wgpu::Device, key: &PipelineKey) {
        if self.pipelines.contains_key(key) {
            return;
        }
        let desc = VariantDesc {
            vertex: &self.vertex,
            fragment: &self.fragment,
            layout: &self.layouts.pipeline,
            vertex_buffer: vertex::buffer_layout(&self.attributes),
            target_format: self.target_format,
        };
        let pipeline = build_variant(device, &desc, key);
        log::debug!("built pipeline variant {key:?}");
        self.pipelines.insert(*key, pipeline);
    }

    pub fn pipeline(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }
}

fn create_module(device: &wgpu::Device, label: &str, source: &str, stage: wgpu::naga::ShaderStage) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: Default::default(),
        },
    })
}
