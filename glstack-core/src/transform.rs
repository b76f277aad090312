//! Translation, scaling and axis-angle rotation matrices
use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Identity with (x, y, z) in the translation column
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix {
        Matrix4::new_translation(&Vector3::new(x, y, z)).into()
    }

    /// Diagonal matrix with (x, y, z, 1) on the diagonal
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix {
        Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)).into()
    }

    /// Rotation of `angle_degrees` about the axis (x, y, z), counter-clockwise
    /// when looking down the axis toward the origin.
    ///
    /// The axis is normalized first; a zero-length (or non-finite) axis is
    /// rejected with [`MatrixError::DegenerateAxis`].
    pub fn rotation(angle_degrees: f64, x: f64, y: f64, z: f64) -> Result<Matrix> {
        let axis = Vector3::new(x, y, z);
        let magnitude = axis.norm();
        if magnitude == 0.0 || !magnitude.is_finite() {
            return Err(MatrixError::DegenerateAxis);
        }
        let axis = axis / magnitude;

        let theta = angle_degrees.to_radians();
        let (sin, cos) = theta.sin_cos();

        // Rodrigues: I*cos + (1 - cos)*(a a^T) + sin*[a]x
        let rotation = Matrix3::identity() * cos
            + (axis * axis.transpose()) * (1.0 - cos)
            + axis.cross_matrix() * sin;

        Ok(rotation.to_homogeneous().into())
    }
}
