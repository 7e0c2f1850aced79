/// `mirrorbox_renderer`: wgpu backend for the mirror scene.
///
/// # Module layout
///
/// | Module          | Responsibility                                           |
/// |-----------------|----------------------------------------------------------|
/// | `context`       | `EngineContext`: instance, adapter, device, queue        |
/// | `resources`     | Buffer helpers, per-draw uniform slots, scene texture    |
/// | `geometry`      | Vertex layout from reflected locations; GPU vertex table |
/// | `shader`        | GLSL compile + reflection; the linked `ShaderProgram`    |
/// | `pipeline`      | Bind-group layouts and per-`PipelineKey` variants        |
/// | `render_target` | Depth-stencil attachment and off-screen colour target    |
/// | `graph`         | `RenderPass` trait + `FramePacket`                       |
/// | `passes`        | `MirrorPass`, which executes a replayed frame plan       |
pub mod context;
pub mod geometry;
pub mod graph;
pub mod passes;
pub mod pipeline;
pub mod render_target;
pub mod resources;
pub mod shader;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use context::{EngineContext, SurfaceInitError};
pub use graph::{FramePacket, RenderPass};
pub use render_target::{ColorTarget, DepthStencilTarget};
pub use resources::{AssetDecodeError, DecodedImage};
pub use shader::{compile, CompileError, CompiledProgram, ShaderHandles, ShaderStage, DEFAULT_VERSION_PREFIX};

// ── Internal imports ──────────────────────────────────────────────────────────

use mirrorbox_core::{
    build_vertex_buffer, record_frame, setup_commands, FrameMatrices, PipelineKey, Projection, StateTracker,
    TransformState, VertexTable,
};

use geometry::GpuVertexTable;
use passes::MirrorPass;
use resources::SceneTexture;
use shader::ShaderProgram;

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Top-level renderer.
///
/// Owns the depth-stencil attachment, the persistent render-state tracker
/// and the passes.  Each frame the fixed command sequence is replayed into
/// a [`FramePacket`] and every pass runs **prepare → execute** over it.
pub struct Renderer {
    pub context: EngineContext,
    pub depth: DepthStencilTarget,
    /// Ordered list of passes executed every frame.
    pub passes: Vec<Box<dyn RenderPass>>,
    tracker: StateTracker,
    table: VertexTable,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Uploads the scene, links `program` and applies the one-time setup state.
    ///
    /// Pipelines for every state combination of a frame are built here, so
    /// a link failure surfaces before the first frame.
    pub fn new(
        context: EngineContext,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        program: CompiledProgram,
        image: &DecodedImage,
    ) -> Result<Self, CompileError> {
        let device = &context.device;
        let table = build_vertex_buffer();

        let mut tracker = StateTracker::new();
        tracker.replay(&setup_commands(), &table);
        let keys = frame_keys(&tracker, &table);

        let program = ShaderProgram::link(device, program, format, &keys)?;
        let texture = SceneTexture::upload(device, &context.queue, image);
        let vertices = GpuVertexTable::upload(device, &table);
        let depth = DepthStencilTarget::new(device, width, height);

        let passes: Vec<Box<dyn RenderPass>> = vec![Box::new(MirrorPass::new(device, program, vertices, texture))];

        Ok(Self {
            context,
            depth,
            passes,
            tracker,
            table,
            width,
            height,
        })
    }

    // ── Frame API ─────────────────────────────────────────────────────────────

    /// Allocates a fresh `CommandEncoder` for the current frame.
    pub fn begin_frame(&self) -> wgpu::CommandEncoder {
        self.context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            })
    }

    /// Records one frame of the scene into `view` (e.g. a swapchain frame).
    pub fn render_to_view(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, matrices: &FrameMatrices) {
        let plan = self.tracker.replay(&record_frame(matrices), &self.table);
        let packet = FramePacket::new(plan);

        for pass in &mut self.passes {
            pass.prepare(&self.context.device, &self.context.queue, &packet);
            pass.execute(encoder, view, &self.depth.view, &packet);
        }
    }

    // ── Resize ────────────────────────────────────────────────────────────────

    /// Recreates the depth-stencil attachment when the window changes size.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == self.width && new_height == self.height {
            return;
        }
        self.depth.resize(&self.context.device, new_width, new_height);
        for pass in &mut self.passes {
            pass.on_resize(&self.context.device, &self.context.queue, new_width, new_height);
        }
        self.width = new_width;
        self.height = new_height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Keys used by one frame, replayed on a scratch copy of the tracker.
fn frame_keys(tracker: &StateTracker, table: &VertexTable) -> Vec<PipelineKey> {
    let mut scratch = tracker.clone();
    let matrices = FrameMatrices::new(&TransformState::default(), &Projection::default());
    scratch.replay(&record_frame(&matrices), table).pipeline_keys()
}
