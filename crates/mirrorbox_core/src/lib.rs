//! `mirrorbox_core`: scene data and render-state logic that needs no GPU.
//!
//! # Module layout
//!
//! | Module         | Responsibility                                              |
//! |----------------|-------------------------------------------------------------|
//! | `color`        | Linear RGBA colour and the scene's fixed colours            |
//! | `geometry`     | Interleaved `Vertex` table with named, disjoint ranges      |
//! | `transform`    | `TransformState` and per-frame model/view/projection        |
//! | `input`        | Input events, held-button tracking and the pure reducer     |
//! | `render_state` | GL-style state commands replayed into per-pass draw plans   |
//! | `frame`        | The fixed cube → mirror → reflection → grid draw sequence   |
//! | `time`         | Frame clock snapshots                                       |

pub mod color;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod render_state;
pub mod time;
pub mod transform;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use color::Color;
pub use frame::{record_frame, setup_commands};
pub use geometry::{build_vertex_buffer, GeometryRange, Primitive, RangeName, Vertex, VertexTable};
pub use input::{apply, reduce, InputEvent, InputState, Key, MouseButton, Reduction};
pub use render_state::{ClearOps, DrawUniforms, FramePlan, PassPlan, PipelineKey, RenderCommand, ResolvedDraw, StateTracker};
pub use time::{Time, TimeClock};
pub use transform::{FrameMatrices, Projection, TransformState};

pub use glam;
