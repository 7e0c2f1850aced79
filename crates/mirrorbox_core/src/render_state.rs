//! Immediate-mode render state, replayed into explicit per-pass draw plans.
//!
//! The scene is described as a flat list of [`RenderCommand`]s in the style
//! of a classic state machine: toggles, masks and uniform writes that stay
//! in effect until changed.  [`StateTracker`] replays that list and freezes
//! the state that is current at every draw into a [`ResolvedDraw`], so the
//! GPU layer never has to reason about ordering:
//!
//! * every clear that survives its write masks opens a new [`PassPlan`];
//! * every draw carries its [`PipelineKey`], stencil reference and a copy
//!   of the uniform values.
//!
//! The tracker's state persists across replays the way context state does,
//! so a value left behind by one frame is still visible to the next.

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::geometry::{GeometryRange, Primitive, RangeName, VertexTable};

/// Full stencil write mask; the only mask a stencil clear is honoured with.
pub const STENCIL_MASK_ALL: u32 = 0xFF;

// ── State vocabulary ──────────────────────────────────────────────────────────

/// Comparison used by the stencil and depth tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// What happens to a stencil value when a test outcome fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOperation {
    Keep,
    Zero,
    Replace,
    Invert,
    IncrementClamp,
    DecrementClamp,
    IncrementWrap,
    DecrementWrap,
}

/// Stencil test function: `(reference & read_mask) <compare> (stored & read_mask)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFunc {
    pub compare: CompareFunction,
    pub reference: u32,
    pub read_mask: u32,
}

/// Operations for stencil fail, depth fail and full pass, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilOps {
    pub fail: StencilOperation,
    pub depth_fail: StencilOperation,
    pub pass: StencilOperation,
}

/// The complete mutable state.  Defaults match a freshly created context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub stencil_test: bool,
    pub stencil_func: StencilFunc,
    pub stencil_ops: StencilOps,
    pub stencil_write_mask: u32,
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
    pub override_color: Vec3,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: false,
            depth_write: true,
            stencil_test: false,
            stencil_func: StencilFunc {
                compare: CompareFunction::Always,
                reference: 0,
                read_mask: STENCIL_MASK_ALL,
            },
            stencil_ops: StencilOps {
                fail: StencilOperation::Keep,
                depth_fail: StencilOperation::Keep,
                pass: StencilOperation::Keep,
            },
            stencil_write_mask: STENCIL_MASK_ALL,
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            override_color: Vec3::ZERO,
        }
    }
}

/// Buffers to clear.  `None` leaves that buffer alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClearOps {
    pub color: Option<Color>,
    pub depth: Option<f32>,
    pub stencil: Option<u32>,
}

impl ClearOps {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.depth.is_none() && self.stencil.is_none()
    }
}

/// One state change, clear, draw or present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    Clear(ClearOps),
    EnableDepthTest(bool),
    DepthMask(bool),
    EnableStencil(bool),
    StencilFunc(StencilFunc),
    StencilOp(StencilOps),
    StencilMask(u32),
    SetModel(Mat4),
    SetView(Mat4),
    SetProjection(Mat4),
    SetOverrideColor(Color),
    Draw(RangeName),
    Present,
}

// ── Resolved output ───────────────────────────────────────────────────────────

/// Stencil configuration baked into a pipeline.  The reference is dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilKey {
    pub compare: CompareFunction,
    pub fail: StencilOperation,
    pub depth_fail: StencilOperation,
    pub pass: StencilOperation,
    pub read_mask: u32,
    pub write_mask: u32,
}

/// Everything about a draw that must be fixed when its pipeline is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub primitive: Primitive,
    pub depth_test: bool,
    pub depth_write: bool,
    /// `None` while the stencil test is disabled.
    pub stencil: Option<StencilKey>,
}

/// Uniform values current at a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
    pub override_color: Vec3,
}

/// A draw with all the state it depends on frozen in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDraw {
    pub name: RangeName,
    pub range: GeometryRange,
    pub key: PipelineKey,
    pub stencil_reference: u32,
    pub uniforms: DrawUniforms,
}

/// Draws that share one attachment setup.  `clear` is applied on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassPlan {
    pub clear: ClearOps,
    pub draws: Vec<ResolvedDraw>,
}

/// The output of one replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    pub passes: Vec<PassPlan>,
    /// Whether the command list ended the frame with a present.
    pub presented: bool,
    /// Tracker state after the last command.
    pub end_state: RenderState,
}

impl FramePlan {
    /// All draws in submission order.
    pub fn draws(&self) -> impl Iterator<Item = &ResolvedDraw> {
        self.passes.iter().flat_map(|pass| pass.draws.iter())
    }

    /// Distinct pipeline keys in first-use order.
    pub fn pipeline_keys(&self) -> Vec<PipelineKey> {
        let mut keys: Vec<PipelineKey> = Vec::new();
        for draw in self.draws() {
            if !keys.contains(&draw.key) {
                keys.push(draw.key);
            }
        }
        keys
    }
}

// ── Tracker ───────────────────────────────────────────────────────────────────

/// Replays command lists against a persistent [`RenderState`].
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    state: RenderState,
}

impl StateTracker {
    pub fn new() -> Self {
        Default::default()
    }

    /// Current state, as left by the last replay.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Replays `commands` and returns the resolved plan.
    ///
    /// Processing stops after a `Present`; anything following it belongs to
    /// the next frame and is ignored.
    pub fn replay(&mut self, commands: &[RenderCommand], table: &VertexTable) -> FramePlan {
        let mut plan = FramePlan::default();

        for command in commands {
            match *command {
                RenderCommand::Clear(requested) => {
                    let clear = self.mask_clear(requested);
                    if !clear.is_empty() {
                        plan.passes.push(PassPlan { clear, draws: Vec::new() });
                    }
                }
                RenderCommand::EnableDepthTest(on) => self.state.depth_test = on,
                RenderCommand::DepthMask(on) => self.state.depth_write = on,
                RenderCommand::EnableStencil(on) => self.state.stencil_test = on,
                RenderCommand::StencilFunc(func) => self.state.stencil_func = func,
                RenderCommand::StencilOp(ops) => self.state.stencil_ops = ops,
                RenderCommand::StencilMask(mask) => self.state.stencil_write_mask = mask & STENCIL_MASK_ALL,
                RenderCommand::SetModel(m) => self.state.model = m,
                RenderCommand::SetView(m) => self.state.view = m,
                RenderCommand::SetProjection(m) => self.state.proj = m,
                RenderCommand::SetOverrideColor(c) => self.state.override_color = c.to_vec3(),
                RenderCommand::Draw(name) => {
                    let draw = self.resolve(name, table.range(name));
                    match plan.passes.last_mut() {
                        Some(pass) => pass.draws.push(draw),
                        None => plan.passes.push(PassPlan { clear: ClearOps::default(), draws: vec![draw] }),
                    }
                }
                RenderCommand::Present => {
                    plan.presented = true;
                    break;
                }
            }
        }

        plan.end_state = self.state;
        plan
    }

    /// Applies write masks to a clear request.
    fn mask_clear(&self, requested: ClearOps) -> ClearOps {
        let mut clear = requested;
        if clear.depth.is_some() && !self.state.depth_write {
            log::warn!("depth clear ignored while depth writes are disabled");
            clear.depth = None;
        }
        if let Some(value) = clear.stencil {
            match self.state.stencil_write_mask {
                STENCIL_MASK_ALL => clear.stencil = Some(value & STENCIL_MASK_ALL),
                0 => {
                    log::warn!("stencil clear ignored while the stencil write mask is 0x00");
                    clear.stencil = None;
                }
                mask => {
                    log::warn!("stencil clear with partial write mask {mask:#04x} is not supported, ignored");
                    clear.stencil = None;
                }
            }
        }
        clear
    }

    fn resolve(&self, name: RangeName, range: GeometryRange) -> ResolvedDraw {
        let s = &self.state;
        let stencil = s.stencil_test.then(|| StencilKey {
            compare: s.stencil_func.compare,
            fail: s.stencil_ops.fail,
            depth_fail: s.stencil_ops.depth_fail,
            pass: s.stencil_ops.pass,
            read_mask: s.stencil_func.read_mask,
            write_mask: s.stencil_write_mask,
        });
        ResolvedDraw {
            name,
            range,
            key: PipelineKey {
                primitive: range.primitive,
                depth_test: s.depth_test,
                // no depth test means no depth writes either
                depth_write: s.depth_test && s.depth_write,
                stencil,
            },
            stencil_reference: if s.stencil_test { s.stencil_func.reference } else { 0 },
            uniforms: DrawUniforms {
                model: s.model,
                view: s.view,
                proj: s.proj,
                override_color: s.override_color,
            },
        }
    }
}
