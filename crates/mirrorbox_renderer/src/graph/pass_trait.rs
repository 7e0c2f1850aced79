/// The `RenderPass` trait: every stage the renderer executes implements this.
///
/// ## Two-phase design
/// `prepare` → `execute` lets passes upload GPU data **before** opening a
/// `wgpu::RenderPass`, because uniform writes must be queued before the
/// encoder records the draws that read them.
use wgpu::{CommandEncoder, Device, Queue, TextureView};

use crate::graph::FramePacket;

pub trait RenderPass: Send + Sync + 'static {
    /// Short human-readable label used as the wgpu debug label.
    fn name(&self) -> &str;

    /// Called whenever the render target dimensions change.
    #[allow(unused_variables)]
    fn on_resize(&mut self, device: &Device, queue: &Queue, width: u32, height: u32) {}

    /// Upload GPU data.  Called **before** `execute` each frame.
    fn prepare(&mut self, device: &Device, queue: &Queue, packet: &FramePacket);

    /// Record draw commands into `encoder`.
    ///
    /// - `color_view`: colour attachment (swapchain frame or off-screen target)
    /// - `depth_view`: the depth-stencil attachment
    fn execute(
        &mut self,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: &TextureView,
        packet: &FramePacket,
    );
}
