//! The fixed per-frame draw sequence.
//!
//! 1. clear colour and depth, draw the cube;
//! 2. mark the mirror quad into a freshly cleared stencil buffer without
//!    touching depth;
//! 3. draw the reflected, dimmed cube where the stencil holds 1;
//! 4. draw the grid without depth writes, then present.

use crate::color::Color;
use crate::geometry::RangeName;
use crate::render_state::{
    self, ClearOps, CompareFunction, RenderCommand, StencilOperation, StencilOps, STENCIL_MASK_ALL,
};
use crate::transform::{view_matrix, FrameMatrices};

/// Override colour of the reflection; darkens it relative to the real cube.
pub const REFLECTION_TINT: Color = Color::rgb(0.1, 0.1, 0.1);
/// Neutral override colour every other draw uses.
pub const NEUTRAL: Color = Color::WHITE;
/// Stencil value written under the mirror quad.
pub const MIRROR_STENCIL_REF: u32 = 1;
/// Depth buffer clear value (the far plane).
pub const DEPTH_CLEAR: f32 = 1.0;

/// One-time state set before the first frame.
pub fn setup_commands() -> Vec<RenderCommand> {
    vec![
        RenderCommand::EnableDepthTest(true),
        RenderCommand::SetView(view_matrix()),
        RenderCommand::SetOverrideColor(NEUTRAL),
    ]
}

/// Records one frame for the given matrices.
pub fn record_frame(matrices: &FrameMatrices) -> Vec<RenderCommand> {
    use RenderCommand::*;

    vec![
        Clear(ClearOps { color: Some(Color::CLEAR), depth: Some(DEPTH_CLEAR), stencil: None }),
        SetModel(matrices.model),
        SetProjection(matrices.proj),
        Draw(RangeName::Cube),
        // mirror footprint into the stencil buffer
        EnableStencil(true),
        StencilFunc(render_state::StencilFunc {
            compare: CompareFunction::Always,
            reference: MIRROR_STENCIL_REF,
            read_mask: STENCIL_MASK_ALL,
        }),
        StencilOp(StencilOps {
            fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            pass: StencilOperation::Replace,
        }),
        StencilMask(STENCIL_MASK_ALL),
        Clear(ClearOps { stencil: Some(0), ..Default::default() }),
        DepthMask(false),
        Draw(RangeName::MirrorQuad),
        // reflection, only where the mirror was marked
        StencilFunc(mirror_test()),
        StencilMask(0x00),
        DepthMask(true),
        SetModel(matrices.reflected_model()),
        SetOverrideColor(REFLECTION_TINT),
        Draw(RangeName::Cube),
        SetOverrideColor(NEUTRAL),
        EnableStencil(false),
        DepthMask(false),
        Draw(RangeName::GridLines),
        DepthMask(true),
        Present,
    ]
}

fn mirror_test() -> render_state::StencilFunc {
    render_state::StencilFunc { compare: CompareFunction::Equal, reference: MIRROR_STENCIL_REF, read_mask: STENCIL_MASK_ALL }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{build_vertex_buffer, Primitive};
    use crate::render_state::{FramePlan, StateTracker};
    use crate::transform::{Projection, TransformState};

    fn run_frames(states: &[TransformState]) -> (StateTracker, Vec<FramePlan>) {
        let table = build_vertex_buffer();
        let mut tracker = StateTracker::new();
        tracker.replay(&setup_commands(), &table);
        let plans = states
            .iter()
            .map(|s| tracker.replay(&record_frame(&FrameMatrices::new(s, &Projection::default())), &table))
            .collect();
        (tracker, plans)
    }

    #[test]
    fn frame_ends_with_stencil_disabled_and_depth_writes_on() {
        let (tracker, plans) = run_frames(&[TransformState::default()]);
        assert!(plans[0].presented);
        assert!(!tracker.state().stencil_test);
        assert!(tracker.state().depth_write);
        assert_eq!(tracker.state().override_color, NEUTRAL.to_vec3());
    }

    #[test]
    fn stencil_is_cleared_before_the_mask_is_written() {
        let (_, plans) = run_frames(&[TransformState::default()]);
        let passes = &plans[0].passes;
        assert_eq!(passes.len(), 2);

        assert_eq!(passes[0].clear.color, Some(Color::CLEAR));
        assert_eq!(passes[0].clear.depth, Some(DEPTH_CLEAR));
        assert_eq!(passes[0].clear.stencil, None);
        assert_eq!(passes[0].draws.len(), 1);

        assert_eq!(passes[1].clear, ClearOps { stencil: Some(0), ..Default::default() });
        let names: Vec<_> = passes[1].draws.iter().map(|d| d.name).collect();
        assert_eq!(names, [RangeName::MirrorQuad, RangeName::Cube, RangeName::GridLines]);
    }

    #[test]
    fn override_colour_is_neutral_outside_the_reflection() {
        let rotated = TransformState::default().rotated(0.3);
        let (_, plans) = run_frames(&[TransformState::default(), rotated]);
        for plan in &plans {
            for (i, draw) in plan.draws().enumerate() {
                let expected = if i == 2 { REFLECTION_TINT } else { NEUTRAL };
                assert_eq!(draw.uniforms.override_color, expected.to_vec3(), "draw {i}");
            }
        }
    }

    #[test]
    fn mirror_writes_stencil_and_reflection_reads_it() {
        let (_, plans) = run_frames(&[TransformState::default()]);
        let draws: Vec<_> = plans[0].draws().collect();

        let cube = draws[0];
        assert_eq!(cube.key.stencil, None);
        assert!(cube.key.depth_test && cube.key.depth_write);

        let mirror = draws[1];
        let mark = mirror.key.stencil.unwrap();
        assert_eq!(mark.compare, CompareFunction::Always);
        assert_eq!(mark.pass, StencilOperation::Replace);
        assert_eq!(mark.write_mask, 0xFF);
        assert_eq!(mirror.stencil_reference, 1);
        assert!(mirror.key.depth_test && !mirror.key.depth_write);

        let reflection = draws[2];
        let test = reflection.key.stencil.unwrap();
        assert_eq!(test.compare, CompareFunction::Equal);
        assert_eq!(test.read_mask, 0xFF);
        assert_eq!(test.write_mask, 0);
        assert_eq!(reflection.stencil_reference, 1);
        assert!(reflection.key.depth_write);

        let grid = draws[3];
        assert_eq!(grid.key.primitive, Primitive::Lines);
        assert_eq!(grid.key.stencil, None);
        assert!(!grid.key.depth_write);
    }

    #[test]
    fn reflection_uses_the_mirrored_model() {
        let state = TransformState::default().rotated(-0.1).tilted(0.2);
        let matrices = FrameMatrices::new(&state, &Projection::default());
        let (_, plans) = run_frames(&[state]);
        let draws: Vec<_> = plans[0].draws().collect();
        assert_eq!(draws[0].uniforms.model, matrices.model);
        assert_eq!(draws[1].uniforms.model, matrices.model);
        assert_eq!(draws[2].uniforms.model, matrices.reflected_model());
        assert!(draws.iter().all(|d| d.uniforms.proj == matrices.proj));
        assert!(draws.iter().all(|d| d.uniforms.view == view_matrix()));
    }

    #[test]
    fn one_frame_uses_four_pipelines() {
        let (_, plans) = run_frames(&[TransformState::default()]);
        assert_eq!(plans[0].pipeline_keys().len(), 4);
    }
}
