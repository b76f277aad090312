/// Error kinds reported by stack and builder operations.
///
/// Every variant is a caller-detectable precondition violation. Operations
/// that return one of these leave both stacks exactly as they were.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("matrix stack overflow: capacity of {capacity} already in use")]
    StackOverflow { capacity: usize },
    #[error("matrix stack underflow: only the base matrix remains")]
    StackUnderflow,
    #[error("rotation axis has zero length")]
    DegenerateAxis,
    #[error("invalid frustum: {reason}")]
    InvalidFrustum { reason: &'static str },
    #[error("invalid orthographic volume: {reason}")]
    InvalidOrtho { reason: &'static str },
    #[error("degenerate view: {reason}")]
    DegenerateView { reason: &'static str },
    #[error("invalid stack depth {depth}: must be between 1 and {max}")]
    InvalidDepth { depth: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, MatrixError>;
