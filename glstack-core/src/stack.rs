//! Bounded matrix stacks and the mode that selects between them.
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Hard upper bound on stack depth, matching the fixed-function minimum.
pub const MAX_STACK_DEPTH: usize = 16;

/// Which of the two stacks operations act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatrixMode {
    #[default]
    ModelView,
    Projection,
}

/// A preallocated stack of matrices with an explicit `top` index.
///
/// The stack always holds at least one matrix. `top` is 0-based, so the
/// depth reported to callers is `top + 1`.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    slots: [Matrix; MAX_STACK_DEPTH],
    top: usize,
    capacity: usize,
}

impl MatrixStack {
    /// Create a stack holding a single identity matrix.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_STACK_DEPTH {
            return Err(MatrixError::InvalidDepth {
                depth: capacity,
                max: MAX_STACK_DEPTH,
            });
        }
        Ok(Self {
            slots: [Matrix::identity(); MAX_STACK_DEPTH],
            top: 0,
            capacity,
        })
    }

    pub fn top(&self) -> &Matrix {
        &self.slots[self.top]
    }

    /// Number of matrices currently on the stack.
    pub fn depth(&self) -> usize {
        self.top + 1
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Overwrite the top matrix.
    pub fn load(&mut self, m: Matrix) {
        self.slots[self.top] = m;
    }

    /// Replace the top matrix with `top * incoming`.
    pub fn compose(&mut self, incoming: &Matrix) {
        self.slots[self.top] = self.slots[self.top].compose(incoming);
    }

    /// Duplicate the top matrix into a new slot.
    pub fn push(&mut self) -> Result<()> {
        if self.top + 1 >= self.capacity {
            return Err(MatrixError::StackOverflow {
                capacity: self.capacity,
            });
        }
        self.slots[self.top + 1] = self.slots[self.top];
        self.top += 1;
        Ok(())
    }

    /// Discard the top matrix, exposing the one beneath it.
    pub fn pop(&mut self) -> Result<()> {
        if self.top == 0 {
            return Err(MatrixError::StackUnderflow);
        }
        self.top -= 1;
        Ok(())
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self {
            slots: [Matrix::identity(); MAX_STACK_DEPTH],
            top: 0,
            capacity: MAX_STACK_DEPTH,
        }
    }
}
