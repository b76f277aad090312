use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};
use crate::stack::MAX_STACK_DEPTH;

/// Engine configuration: stack capacities fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of matrices on the model-view stack.
    pub model_view_depth: usize,
    /// Maximum number of matrices on the projection stack.
    pub projection_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_view_depth: MAX_STACK_DEPTH,
            projection_depth: MAX_STACK_DEPTH,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        for depth in [self.model_view_depth, self.projection_depth] {
            if depth == 0 || depth > MAX_STACK_DEPTH {
                return Err(MatrixError::InvalidDepth {
                    depth,
                    max: MAX_STACK_DEPTH,
                });
            }
        }
        Ok(())
    }
}
