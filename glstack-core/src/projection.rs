//! View and projection matrix construction
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Clip-plane bounds of an off-center view volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlanes {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub near: f64,
    pub far: f64,
}

impl ClipPlanes {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    /// Symmetric planes for a vertical field of view in degrees.
    pub fn from_perspective(fovy_degrees: f64, aspect: f64, near: f64, far: f64) -> Result<Self> {
        // Negated comparisons so NaN fails too.
        if !(fovy_degrees > 0.0 && fovy_degrees < 180.0) {
            return Err(MatrixError::InvalidFrustum {
                reason: "fovy must lie strictly between 0 and 180 degrees",
            });
        }
        if !(aspect > 0.0) || !aspect.is_finite() {
            return Err(MatrixError::InvalidFrustum {
                reason: "aspect must be positive",
            });
        }

        let top = near * (fovy_degrees.to_radians() / 2.0).tan();
        let right = top * aspect;
        Ok(Self::new(-right, right, -top, top, near, far))
    }

    fn check_finite(&self) -> bool {
        [self.left, self.right, self.bottom, self.top, self.near, self.far]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Projection matrix constructors
pub struct Projection;

impl Projection {
    /// Standard view matrix looking from `eye` toward `center`.
    ///
    /// Rows of the rotation part are (side, up, -forward); the translation
    /// column holds the negated dot products of each basis vector with `eye`.
    pub fn look_at(eye: &Point3<f64>, center: &Point3<f64>, up: &Vector3<f64>) -> Result<Matrix> {
        let forward = center - eye;
        let distance = forward.norm();
        if distance == 0.0 || !distance.is_finite() {
            return Err(MatrixError::DegenerateView {
                reason: "eye and center coincide",
            });
        }
        let forward = forward / distance;

        let side = forward.cross(up);
        let side_len = side.norm();
        if side_len == 0.0 || !side_len.is_finite() {
            return Err(MatrixError::DegenerateView {
                reason: "up vector is parallel to the view direction",
            });
        }
        let side = side / side_len;
        let true_up = side.cross(&forward);

        let eye = eye.coords;
        #[rustfmt::skip]
        let view = Matrix4::new(
            side.x,     side.y,     side.z,     -side.dot(&eye),
            true_up.x,  true_up.y,  true_up.z,  -true_up.dot(&eye),
            -forward.x, -forward.y, -forward.z, forward.dot(&eye),
            0.0,        0.0,        0.0,        1.0,
        );
        Ok(view.into())
    }

    /// Off-center perspective projection.
    pub fn frustum(planes: &ClipPlanes) -> Result<Matrix> {
        let ClipPlanes {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *planes;

        if !planes.check_finite() {
            return Err(MatrixError::InvalidFrustum {
                reason: "clip planes must be finite",
            });
        }
        if !(n > 0.0) {
            return Err(MatrixError::InvalidFrustum {
                reason: "zNear must be positive",
            });
        }
        if !(f > n) {
            return Err(MatrixError::InvalidFrustum {
                reason: "zFar must be greater than zNear",
            });
        }
        if l == r {
            return Err(MatrixError::InvalidFrustum {
                reason: "left and right planes coincide",
            });
        }
        if b == t {
            return Err(MatrixError::InvalidFrustum {
                reason: "bottom and top planes coincide",
            });
        }

        #[rustfmt::skip]
        let projection = Matrix4::new(
            2.0 * n / (r - l), 0.0,               (r + l) / (r - l),  0.0,
            0.0,               2.0 * n / (t - b), (t + b) / (t - b),  0.0,
            0.0,               0.0,               -(f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0,               0.0,               -1.0,               0.0,
        );
        Ok(projection.into())
    }

    /// Symmetric perspective projection from a vertical field of view.
    pub fn perspective(fovy_degrees: f64, aspect: f64, near: f64, far: f64) -> Result<Matrix> {
        Self::frustum(&ClipPlanes::from_perspective(fovy_degrees, aspect, near, far)?)
    }

    /// Parallel projection of the given box onto the unit cube.
    pub fn ortho(planes: &ClipPlanes) -> Result<Matrix> {
        let ClipPlanes {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *planes;

        if !planes.check_finite() {
            return Err(MatrixError::InvalidOrtho {
                reason: "clip planes must be finite",
            });
        }
        if l == r || b == t || n == f {
            return Err(MatrixError::InvalidOrtho {
                reason: "opposing clip planes coincide",
            });
        }

        #[rustfmt::skip]
        let projection = Matrix4::new(
            2.0 / (r - l), 0.0,           0.0,            -(r + l) / (r - l),
            0.0,           2.0 / (t - b), 0.0,            -(t + b) / (t - b),
            0.0,           0.0,           -2.0 / (f - n), -(f + n) / (f - n),
            0.0,           0.0,           0.0,            1.0,
        );
        Ok(projection.into())
    }
}
