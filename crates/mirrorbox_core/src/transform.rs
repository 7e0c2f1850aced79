//! Interactive transform state and the matrices derived from it each frame.
//!
//! Rotations are stored as **turn fractions**: a magnitude of `2.0` is one
//! full 360° turn, so an angle in degrees is `value × 180°`.  Both rotation
//! fields are wrapped with a floating remainder so they stay inside
//! `(-2, 2)` instead of growing without bound.
//!
//! The scene is Z-up: the view looks at the origin from `(2.5, 2.5, 2.5)`
//! with `+Z` as the up axis.

use glam::{Mat4, Vec3};

/// Modulus used to wrap the rotation fields (one full turn).
pub const TURN: f32 = 2.0;

/// Wraps a turn fraction into `(-2, 2)`.
///
/// Rust's `%` on floats is C `fmod`: the result carries the sign of the
/// dividend, so the sign of the modulus does not matter.
#[inline]
pub fn wrap_turn(value: f32) -> f32 {
    value % TURN
}

/// Camera/model parameters mutated by input.  Not persisted across runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    /// Rotation about the vertical (+Z) axis, in turn fractions.
    pub x_rotation: f32,
    /// Tilt about the horizontal (+X) axis, in turn fractions.
    pub z_tilt: f32,
    /// Multiplier on the base field of view; never negative.
    pub zoom_factor: f32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            x_rotation: 0.0,
            z_tilt: 0.0,
            zoom_factor: 0.8,
        }
    }
}

impl TransformState {
    /// Adds `delta` to the vertical-axis rotation and wraps the result.
    #[must_use]
    pub fn rotated(self, delta: f32) -> Self {
        Self { x_rotation: wrap_turn(self.x_rotation + delta), ..self }
    }

    /// Adds `delta` to the horizontal-axis tilt and wraps the result.
    #[must_use]
    pub fn tilted(self, delta: f32) -> Self {
        Self { z_tilt: wrap_turn(self.z_tilt + delta), ..self }
    }

    /// Adds `delta` to the zoom factor, clamped to zero from below.
    #[must_use]
    pub fn zoomed(self, delta: f32) -> Self {
        Self { zoom_factor: (self.zoom_factor + delta).max(0.0), ..self }
    }

    /// Model matrix: rotation about +Z composed first, then about +X.
    ///
    /// Applied to column vectors right-to-left, so the tilt acts on the
    /// vertices first and the vertical rotation is the outer transform.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(turns_to_radians(self.x_rotation))
            * Mat4::from_rotation_x(turns_to_radians(self.z_tilt))
    }
}

#[inline]
fn turns_to_radians(turns: f32) -> f32 {
    turns * std::f32::consts::PI
}

// ── View / projection ─────────────────────────────────────────────────────────

/// Fixed eye position of the scene camera.
pub const EYE: Vec3 = Vec3::new(2.5, 2.5, 2.5);
/// Point centred on screen.
pub const TARGET: Vec3 = Vec3::ZERO;
/// Up axis; the floor is the XY plane.
pub const UP: Vec3 = Vec3::Z;

/// The constant view matrix.
pub fn view_matrix() -> Mat4 {
    Mat4::look_at_rh(EYE, TARGET, UP)
}

/// Projection parameters that do not change while the program runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Field of view at `zoom_factor == 1.0`, in degrees.
    pub base_fov_degrees: f32,
    /// Width / height.  Fixed at startup; window resizes do not change it.
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            base_fov_degrees: 45.0,
            aspect: 800.0 / 600.0,
            znear: 1.0,
            zfar: 10.0,
        }
    }
}

impl Projection {
    /// Projection with the same fixed planes and the aspect of `width × height`.
    pub fn with_size(width: u32, height: u32) -> Self {
        let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };
        Self { aspect, ..Default::default() }
    }

    /// Effective vertical field of view in radians.
    ///
    /// `zoom_factor` scales the *angle*, not a camera distance.
    pub fn fov_radians(&self, zoom_factor: f32) -> f32 {
        (zoom_factor * self.base_fov_degrees).to_radians()
    }

    /// Perspective matrix for wgpu's `0..1` clip-space depth.
    pub fn matrix(&self, zoom_factor: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(zoom_factor), self.aspect, self.znear, self.zfar)
    }
}

/// Model, view and projection for one frame.  Never cached across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
}

impl FrameMatrices {
    pub fn new(state: &TransformState, projection: &Projection) -> Self {
        Self {
            model: state.model_matrix(),
            view: view_matrix(),
            proj: projection.matrix(state.zoom_factor),
        }
    }

    /// Model matrix of the mirror image below the `z = -0.5` mirror plane.
    ///
    /// Translates one unit down the mirror normal and negates Z, in model
    /// space, so the reflection follows the cube's rotation.
    pub fn reflected_model(&self) -> Mat4 {
        self.model * Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0)) * Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_starts_zoomed_in() {
        let s = TransformState::default();
        assert_eq!((s.x_rotation, s.z_tilt, s.zoom_factor), (0.0, 0.0, 0.8));
    }

    #[test]
    fn wrap_follows_fmod_sign_of_dividend() {
        assert!((wrap_turn(2.05) - 0.05).abs() < 1e-6);
        assert!((wrap_turn(-2.05) + 0.05).abs() < 1e-6);
        assert_eq!(wrap_turn(-0.1), -0.1);
        assert_eq!(wrap_turn(2.0), 0.0);
    }

    #[test]
    fn rotation_past_a_full_turn_wraps() {
        let s = TransformState { x_rotation: 1.95, ..Default::default() }.rotated(0.1);
        assert!((s.x_rotation - 2.05f32 % 2.0).abs() < 1e-6);
        assert!(s.x_rotation > -2.0 && s.x_rotation < 2.0);
    }

    #[test]
    fn zoom_is_clamped_at_zero() {
        let s = TransformState { zoom_factor: 0.02, ..Default::default() }.zoomed(-0.05);
        assert_eq!(s.zoom_factor, 0.0);
        assert_eq!(s.zoomed(-0.05).zoom_factor, 0.0);
    }

    #[test]
    fn model_matrix_is_bit_for_bit_reproducible() {
        let s = TransformState { x_rotation: 0.37, z_tilt: -1.21, zoom_factor: 1.0 };
        let a = s.model_matrix().to_cols_array();
        let b = s.model_matrix().to_cols_array();
        assert_eq!(a.map(f32::to_bits), b.map(f32::to_bits));
    }

    #[test]
    fn model_composes_vertical_then_horizontal() {
        let s = TransformState { x_rotation: 0.5, z_tilt: 0.5, zoom_factor: 1.0 };
        // tilt 90° about X sends +Y to +Z, vertical rotation leaves Z alone
        let p = s.model_matrix().transform_point3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::Z, 1e-6), "{p:?}");
        // +X: untouched by the tilt, then rotated 90° about Z onto +Y
        let q = s.model_matrix().transform_point3(Vec3::X);
        assert!(q.abs_diff_eq(Vec3::Y, 1e-6), "{q:?}");
    }

    #[test]
    fn one_left_release_scenario() {
        let s = TransformState::default().rotated(-0.1);
        assert!((s.x_rotation - (-0.1f32 % -2.0)).abs() < 1e-7);

        let m = FrameMatrices::new(&s, &Projection::default());
        let expected_model = Mat4::from_rotation_z((-18.0f32).to_radians());
        assert!(m.model.abs_diff_eq(expected_model, 1e-6));

        let p = Projection::default();
        assert!((p.fov_radians(s.zoom_factor) - 36f32.to_radians()).abs() < 1e-6);
        let expected_proj = Mat4::perspective_rh(36f32.to_radians(), 800.0 / 600.0, 1.0, 10.0);
        assert!(m.proj.abs_diff_eq(expected_proj, 1e-5));
    }

    #[test]
    fn view_is_z_up_looking_at_origin() {
        let view = view_matrix();
        // the eye maps to the view-space origin, the target straight ahead (-Z)
        assert!(view.transform_point3(EYE).abs_diff_eq(Vec3::ZERO, 1e-5));
        let t = view.transform_point3(TARGET);
        assert!(t.x.abs() < 1e-5 && t.y.abs() < 1e-5 && t.z < 0.0);
        // world up projects onto view-space +Y
        let up = view.transform_vector3(UP);
        assert!(up.y > 0.0);
    }

    #[test]
    fn reflection_mirrors_through_the_mirror_plane() {
        let m = FrameMatrices::new(&TransformState::default(), &Projection::default());
        let r = m.reflected_model();
        // top of the cube (z = 0.5) lands at z = -1.5, bottom stays on the plane
        assert!(r.transform_point3(Vec3::new(0.0, 0.0, 0.5)).abs_diff_eq(Vec3::new(0.0, 0.0, -1.5), 1e-6));
        assert!(r.transform_point3(Vec3::new(0.0, 0.0, -0.5)).abs_diff_eq(Vec3::new(0.0, 0.0, -0.5), 1e-6));
    }

    #[test]
    fn projection_aspect_from_size() {
        assert_eq!(Projection::with_size(800, 600).aspect, 800.0 / 600.0);
        assert_eq!(Projection::with_size(800, 0).aspect, 1.0);
    }
}
