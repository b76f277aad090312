//! 4x4 matrix value and the composition rule shared by every builder.
//!
//! Storage is column-major: element (row r, column c) lives at index
//! `c * 4 + r`, so a translation occupies indices 12, 13 and 14. Vectors are
//! column vectors transformed as `M * v`.
use nalgebra::{Matrix4, Point3, Vector4};
use serde::{Deserialize, Serialize};

/// A double-precision 4x4 transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix(Matrix4<f64>);

impl Matrix {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// Build from 16 column-major components.
    pub fn from_array(m: &[f64; 16]) -> Self {
        Self(Matrix4::from_column_slice(m))
    }

    /// Build from 16 column-major single-precision components, widening each.
    pub fn from_array_f32(m: &[f32; 16]) -> Self {
        Self(Matrix4::from_iterator(m.iter().map(|&v| f64::from(v))))
    }

    /// Column-major components.
    pub fn to_array(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.0.as_slice());
        out
    }

    /// Column-major components narrowed to single precision.
    pub fn to_array_f32(&self) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for (dst, src) in out.iter_mut().zip(self.0.iter()) {
            *dst = *src as f32;
        }
        out
    }

    /// Element at (row, column).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[(row, col)]
    }

    pub fn as_matrix4(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// Returns `self * incoming`: the incoming transform reaches geometry
    /// first, then `self`.
    pub fn compose(&self, incoming: &Matrix) -> Matrix {
        Self(self.0 * incoming.0)
    }

    /// Transform a homogeneous column vector.
    pub fn transform(&self, v: &Vector4<f64>) -> Vector4<f64> {
        self.0 * v
    }

    /// Transform a point with w = 1 and return the full clip-space result
    /// without a perspective divide.
    pub fn transform_point(&self, p: &Point3<f64>) -> Vector4<f64> {
        self.transform(&p.to_homogeneous())
    }

    /// Component-wise comparison within an absolute tolerance.
    pub fn approx_eq(&self, other: &Matrix, epsilon: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f64>> for Matrix {
    fn from(m: Matrix4<f64>) -> Self {
        Self(m)
    }
}

impl From<Matrix> for Matrix4<f64> {
    fn from(m: Matrix) -> Self {
        m.0
    }
}
