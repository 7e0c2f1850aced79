/// Data bundle assembled once per frame and passed immutably to every
/// `RenderPass`.
///
/// The packet carries the replayed [`FramePlan`]: the passes only see
/// resolved draws, never the command list or the transform state that
/// produced them.
use mirrorbox_core::FramePlan;

pub struct FramePacket {
    pub plan: FramePlan,
}

impl FramePacket {
    pub fn new(plan: FramePlan) -> Self {
        Self { plan }
    }
}
