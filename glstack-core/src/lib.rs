//! glstack Core Library - fixed-function matrix stacks
//!
//! Model-view and projection stacks with the classic immediate-mode matrix
//! operations: load, push/pop, translate/rotate/scale, look-at, frustum,
//! perspective and ortho. Storage is column-major and every transform
//! composes onto the right of the current matrix.

pub mod config;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod projection;
pub mod stack;
pub mod transform;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::MatrixEngine;
pub use error::{MatrixError, Result};
pub use matrix::Matrix;
pub use projection::{ClipPlanes, Projection};
pub use stack::{MatrixMode, MatrixStack, MAX_STACK_DEPTH};
pub use transform::Transform;
