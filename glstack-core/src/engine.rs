//! Immediate-mode matrix engine: two stacks and a mode selector.
//!
//! # Conventions
//! - Matrices are stored column-major (translation at indices 12, 13, 14).
//! - Vectors are columns, transformed as `M * v`.
//! - Every builder composes onto the current top as `top = top * new`, so the
//!   most recently issued transform is the first one applied to geometry.
//!
//! # Invariants
//! - Both stacks always hold at least one matrix.
//! - A failed call leaves both stacks untouched.
//! - Switching mode never changes stack contents.

use nalgebra::{Point3, Vector3};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::projection::{ClipPlanes, Projection};
use crate::stack::{MatrixMode, MatrixStack};
use crate::transform::Transform;

/// Owns the model-view and projection stacks.
///
/// Not synchronized; callers sharing one engine across threads must
/// serialize access themselves.
#[derive(Debug, Clone)]
pub struct MatrixEngine {
    model_view: MatrixStack,
    projection: MatrixStack,
    mode: MatrixMode,
}

impl MatrixEngine {
    /// Engine with both stacks at the default depth, in model-view mode.
    pub fn new() -> Self {
        Self {
            model_view: MatrixStack::default(),
            projection: MatrixStack::default(),
            mode: MatrixMode::ModelView,
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            model_view_depth = config.model_view_depth,
            projection_depth = config.projection_depth,
            "creating matrix engine"
        );
        Ok(Self {
            model_view: MatrixStack::new(config.model_view_depth)?,
            projection: MatrixStack::new(config.projection_depth)?,
            mode: MatrixMode::ModelView,
        })
    }

    /// Select which stack subsequent calls act on.
    pub fn matrix_mode(&mut self, mode: MatrixMode) {
        tracing::debug!(?mode, "matrix mode");
        self.mode = mode;
    }

    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    /// Read-only access to either stack regardless of the current mode.
    pub fn stack(&self, mode: MatrixMode) -> &MatrixStack {
        match mode {
            MatrixMode::ModelView => &self.model_view,
            MatrixMode::Projection => &self.projection,
        }
    }

    fn current_stack(&self) -> &MatrixStack {
        self.stack(self.mode)
    }

    fn current_stack_mut(&mut self) -> &mut MatrixStack {
        match self.mode {
            MatrixMode::ModelView => &mut self.model_view,
            MatrixMode::Projection => &mut self.projection,
        }
    }

    /// The top matrix of the current stack.
    pub fn current(&self) -> &Matrix {
        self.current_stack().top()
    }

    /// Depth of the current stack, 1 when only the base matrix is present.
    pub fn depth(&self) -> usize {
        self.current_stack().depth()
    }

    pub fn capacity(&self) -> usize {
        self.current_stack().capacity()
    }

    pub fn load_identity(&mut self) {
        self.load(Matrix::identity());
    }

    /// Overwrite the top matrix with 16 column-major components.
    ///
    /// Values are copied verbatim; singular matrices are accepted.
    pub fn load_matrix(&mut self, m: &[f64; 16]) {
        self.load(Matrix::from_array(m));
    }

    pub fn load_matrix_f32(&mut self, m: &[f32; 16]) {
        self.load(Matrix::from_array_f32(m));
    }

    fn load(&mut self, m: Matrix) {
        let mode = self.mode;
        self.current_stack_mut().load(m);
        tracing::trace!(?mode, "load matrix");
    }

    /// Duplicate the top matrix onto the current stack.
    pub fn push_matrix(&mut self) -> Result<()> {
        let mode = self.mode;
        let stack = self.current_stack_mut();
        if let Err(err) = stack.push() {
            tracing::warn!(?mode, %err, "push rejected");
            return Err(err);
        }
        tracing::trace!(?mode, depth = stack.depth(), "push matrix");
        Ok(())
    }

    /// Discard the top matrix of the current stack.
    pub fn pop_matrix(&mut self) -> Result<()> {
        let mode = self.mode;
        let stack = self.current_stack_mut();
        if let Err(err) = stack.pop() {
            tracing::warn!(?mode, %err, "pop rejected");
            return Err(err);
        }
        tracing::trace!(?mode, depth = stack.depth(), "pop matrix");
        Ok(())
    }

    /// Copy of the top matrix, column-major.
    pub fn get_matrix(&self) -> [f64; 16] {
        self.current().to_array()
    }

    pub fn get_matrix_f32(&self) -> [f32; 16] {
        self.current().to_array_f32()
    }

    fn compose(&mut self, incoming: &Matrix) {
        let mode = self.mode;
        self.current_stack_mut().compose(incoming);
        tracing::trace!(?mode, "compose matrix");
    }

    /// Compose an arbitrary column-major matrix onto the top.
    pub fn mult_matrix(&mut self, m: &[f64; 16]) {
        self.compose(&Matrix::from_array(m));
    }

    pub fn mult_matrix_f32(&mut self, m: &[f32; 16]) {
        self.compose(&Matrix::from_array_f32(m));
    }

    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.compose(&Transform::translation(x, y, z));
    }

    pub fn translate_f32(&mut self, x: f32, y: f32, z: f32) {
        self.translate(f64::from(x), f64::from(y), f64::from(z));
    }

    pub fn scale(&mut self, x: f64, y: f64, z: f64) {
        self.compose(&Transform::scaling(x, y, z));
    }

    pub fn scale_f32(&mut self, x: f32, y: f32, z: f32) {
        self.scale(f64::from(x), f64::from(y), f64::from(z));
    }

    /// Rotate `angle_degrees` about the axis (x, y, z).
    pub fn rotate(&mut self, angle_degrees: f64, x: f64, y: f64, z: f64) -> Result<()> {
        let rotation = Transform::rotation(angle_degrees, x, y, z).inspect_err(|err| {
            tracing::warn!(%err, "rotate rejected");
        })?;
        self.compose(&rotation);
        Ok(())
    }

    pub fn rotate_f32(&mut self, angle_degrees: f32, x: f32, y: f32, z: f32) -> Result<()> {
        self.rotate(
            f64::from(angle_degrees),
            f64::from(x),
            f64::from(y),
            f64::from(z),
        )
    }

    /// Compose a view matrix looking from `eye` toward `center`.
    pub fn look_at(
        &mut self,
        eye: &Point3<f64>,
        center: &Point3<f64>,
        up: &Vector3<f64>,
    ) -> Result<()> {
        let view = Projection::look_at(eye, center, up).inspect_err(|err| {
            tracing::warn!(%err, "look_at rejected");
        })?;
        self.compose(&view);
        Ok(())
    }

    /// Compose an off-center perspective projection.
    pub fn frustum(
        &mut self,
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        z_near: f64,
        z_far: f64,
    ) -> Result<()> {
        let planes = ClipPlanes::new(left, right, bottom, top, z_near, z_far);
        let projection = Projection::frustum(&planes).inspect_err(|err| {
            tracing::warn!(%err, "frustum rejected");
        })?;
        self.compose(&projection);
        Ok(())
    }

    /// Compose a symmetric perspective projection.
    pub fn perspective(
        &mut self,
        fovy_degrees: f64,
        aspect: f64,
        z_near: f64,
        z_far: f64,
    ) -> Result<()> {
        let planes = ClipPlanes::from_perspective(fovy_degrees, aspect, z_near, z_far)
            .inspect_err(|err| tracing::warn!(%err, "perspective rejected"))?;
        self.frustum(
            planes.left,
            planes.right,
            planes.bottom,
            planes.top,
            planes.near,
            planes.far,
        )
    }

    /// Compose an orthographic projection.
    pub fn ortho(
        &mut self,
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        z_near: f64,
        z_far: f64,
    ) -> Result<()> {
        let planes = ClipPlanes::new(left, right, bottom, top, z_near, z_far);
        let projection = Projection::ortho(&planes).inspect_err(|err| {
            tracing::warn!(%err, "ortho rejected");
        })?;
        self.compose(&projection);
        Ok(())
    }
}

impl Default for MatrixEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatrixError;
    use nalgebra::Vector4;

    const EPS: f64 = 1e-9;

    fn sample() -> [f64; 16] {
        core::array::from_fn(|i| (i as f64 + 1.0) * 0.5 - 3.0)
    }

    #[test]
    fn starts_in_model_view_with_identity() {
        let engine = MatrixEngine::new();
        assert_eq!(engine.mode(), MatrixMode::ModelView);
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.capacity(), 16);
        assert_eq!(*engine.current(), Matrix::identity());
        assert_eq!(
            *engine.stack(MatrixMode::Projection).top(),
            Matrix::identity()
        );
    }

    #[test]
    fn identity_composition_is_neutral() {
        let m = Matrix::from_array(&sample());
        assert_eq!(m.compose(&Matrix::identity()), m);
        assert_eq!(Matrix::identity().compose(&m), m);

        let mut engine = MatrixEngine::new();
        engine.load_matrix(&sample());
        engine.mult_matrix(&Matrix::identity().to_array());
        assert_eq!(engine.get_matrix(), sample());
    }

    #[test]
    fn push_then_pop_restores_state() {
        let mut engine = MatrixEngine::new();
        engine.load_matrix(&sample());
        engine.push_matrix().unwrap();
        engine.translate(1.0, 2.0, 3.0);
        engine.rotate(30.0, 0.0, 1.0, 0.0).unwrap();
        assert_eq!(engine.depth(), 2);
        engine.pop_matrix().unwrap();
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.get_matrix(), sample());
    }

    #[test]
    fn sixteenth_push_overflows() {
        let mut engine = MatrixEngine::new();
        for _ in 0..15 {
            engine.push_matrix().unwrap();
        }
        assert_eq!(engine.depth(), 16);
        engine.translate(4.0, 0.0, 0.0);
        let before = engine.get_matrix();

        assert_eq!(
            engine.push_matrix(),
            Err(MatrixError::StackOverflow { capacity: 16 })
        );
        assert_eq!(engine.depth(), 16);
        assert_eq!(engine.get_matrix(), before);
    }

    #[test]
    fn pop_at_base_underflows() {
        let mut engine = MatrixEngine::new();
        engine.load_matrix(&sample());
        assert_eq!(engine.pop_matrix(), Err(MatrixError::StackUnderflow));
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.get_matrix(), sample());
    }

    #[test]
    fn zero_translation_is_neutral() {
        let mut engine = MatrixEngine::new();
        engine.load_matrix(&sample());
        engine.translate(0.0, 0.0, 0.0);
        assert_eq!(engine.get_matrix(), sample());
    }

    #[test]
    fn zero_axis_rotation_fails_without_mutation() {
        let mut engine = MatrixEngine::new();
        engine.load_matrix(&sample());
        for angle in [0.0, 90.0, 360.0] {
            assert_eq!(
                engine.rotate(angle, 0.0, 0.0, 0.0),
                Err(MatrixError::DegenerateAxis)
            );
        }
        assert_eq!(engine.rotate_f32(10.0, 0.0, 0.0, 0.0), Err(MatrixError::DegenerateAxis));
        assert_eq!(engine.get_matrix(), sample());
    }

    #[test]
    fn full_rotation_is_identity() {
        let mut engine = MatrixEngine::new();
        engine.rotate(360.0, 0.3, -1.0, 2.0).unwrap();
        assert!(engine.current().approx_eq(&Matrix::identity(), EPS));
    }

    #[test]
    fn frustum_with_zero_near_fails() {
        let mut engine = MatrixEngine::new();
        engine.matrix_mode(MatrixMode::Projection);
        assert!(matches!(
            engine.frustum(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0),
            Err(MatrixError::InvalidFrustum { .. })
        ));
        assert_eq!(*engine.current(), Matrix::identity());
    }

    #[test]
    fn perspective_sets_up_w_as_view_distance() {
        let mut engine = MatrixEngine::new();
        engine.matrix_mode(MatrixMode::Projection);
        engine.perspective(60.0, 1.0, 1.0, 100.0).unwrap();
        let clip = engine
            .current()
            .transform(&Vector4::new(0.0, 0.0, -1.0, 1.0));
        assert_eq!(clip.w, 1.0);
        // On the near plane, so depth maps to -1 after the divide.
        assert!((clip.z / clip.w + 1.0).abs() < EPS);
    }

    #[test]
    fn invalid_perspective_leaves_projection_untouched() {
        let mut engine = MatrixEngine::new();
        engine.matrix_mode(MatrixMode::Projection);
        engine.load_matrix(&sample());
        assert!(engine.perspective(180.0, 1.0, 1.0, 100.0).is_err());
        assert!(engine.perspective(60.0, 0.0, 1.0, 100.0).is_err());
        assert!(engine.perspective(60.0, 1.0, 10.0, 1.0).is_err());
        assert_eq!(engine.get_matrix(), sample());
    }

    #[test]
    fn stacks_are_independent() {
        let mut engine = MatrixEngine::new();
        engine.translate(1.0, 2.0, 3.0);
        let model_view = engine.get_matrix();

        engine.matrix_mode(MatrixMode::Projection);
        engine.perspective(45.0, 1.5, 0.1, 50.0).unwrap();
        engine.push_matrix().unwrap();
        engine.scale(2.0, 2.0, 2.0);
        assert_eq!(
            engine.stack(MatrixMode::ModelView).top().to_array(),
            model_view
        );
        assert_eq!(engine.stack(MatrixMode::ModelView).depth(), 1);

        let projection = engine.get_matrix();
        engine.matrix_mode(MatrixMode::ModelView);
        engine.load_identity();
        engine.push_matrix().unwrap();
        engine.rotate(15.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(
            engine.stack(MatrixMode::Projection).top().to_array(),
            projection
        );
        assert_eq!(engine.stack(MatrixMode::Projection).depth(), 2);
    }

    #[test]
    fn translate_then_rotate_rotates_first() {
        let mut engine = MatrixEngine::new();
        engine.translate(10.0, 0.0, 0.0);
        engine.rotate(90.0, 0.0, 0.0, 1.0).unwrap();
        let p = engine
            .current()
            .transform_point(&Point3::new(1.0, 0.0, 0.0));
        // Rotated to (0, 1, 0), then moved by +10 in x.
        assert!((p.x - 10.0).abs() < EPS);
        assert!((p.y - 1.0).abs() < EPS);
        assert!(p.z.abs() < EPS);
    }

    #[test]
    fn scale_composes_on_the_right() {
        let mut engine = MatrixEngine::new();
        engine.translate(1.0, 0.0, 0.0);
        engine.scale(2.0, 3.0, 4.0);
        let p = engine
            .current()
            .transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vector4::new(3.0, 3.0, 4.0, 1.0));
    }

    #[test]
    fn look_at_composes_with_existing_view() {
        let mut engine = MatrixEngine::new();
        engine.translate(0.0, 0.0, -5.0);
        engine
            .look_at(
                &Point3::new(0.0, 0.0, 2.0),
                &Point3::origin(),
                &Vector3::y(),
            )
            .unwrap();
        let p = engine.current().transform_point(&Point3::origin());
        assert!((p.z + 7.0).abs() < EPS);

        let before = engine.get_matrix();
        let err = engine.look_at(&Point3::origin(), &Point3::origin(), &Vector3::y());
        assert!(matches!(err, Err(MatrixError::DegenerateView { .. })));
        assert_eq!(engine.get_matrix(), before);
    }

    #[test]
    fn ortho_composes_onto_projection() {
        let mut engine = MatrixEngine::new();
        engine.matrix_mode(MatrixMode::Projection);
        engine.ortho(-2.0, 2.0, -1.0, 1.0, 0.5, 4.5).unwrap();
        let m = engine.get_matrix();
        assert!((m[0] - 0.5).abs() < EPS);
        assert!((m[5] - 1.0).abs() < EPS);
        assert!((m[10] + 0.5).abs() < EPS);
        assert!((m[14] + 1.25).abs() < EPS);
        assert!(matches!(
            engine.ortho(1.0, 1.0, -1.0, 1.0, 0.0, 1.0),
            Err(MatrixError::InvalidOrtho { .. })
        ));
    }

    #[test]
    fn single_precision_round_trip() {
        let values: [f32; 16] = core::array::from_fn(|i| i as f32 / 3.0);
        let mut engine = MatrixEngine::new();
        engine.load_matrix_f32(&values);
        assert_eq!(engine.get_matrix_f32(), values);
        assert_eq!(engine.get_matrix()[5], f64::from(values[5]));

        engine.load_identity();
        engine.translate_f32(1.5, -2.0, 0.25);
        engine.scale_f32(2.0, 2.0, 2.0);
        engine.mult_matrix_f32(&Matrix::identity().to_array_f32());
        let m = engine.get_matrix_f32();
        assert_eq!(&m[12..15], &[1.5f32, -2.0, 0.25]);
        assert_eq!(m[0], 2.0);
    }

    #[test]
    fn custom_depths() {
        let mut engine = MatrixEngine::with_config(EngineConfig {
            model_view_depth: 16,
            projection_depth: 2,
        })
        .unwrap();
        engine.matrix_mode(MatrixMode::Projection);
        assert_eq!(engine.capacity(), 2);
        engine.push_matrix().unwrap();
        assert!(engine.push_matrix().is_err());

        assert!(MatrixEngine::with_config(EngineConfig {
            model_view_depth: 17,
            projection_depth: 2,
        })
        .is_err());
    }

    #[test]
    fn engines_do_not_share_state() {
        let mut a = MatrixEngine::new();
        let b = MatrixEngine::new();
        a.translate(1.0, 1.0, 1.0);
        a.push_matrix().unwrap();
        assert_eq!(*b.current(), Matrix::identity());
        assert_eq!(b.depth(), 1);
    }
}
