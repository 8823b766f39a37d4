use thiserror::Error;

use crate::types::Coordinate;

#[derive(Error, Debug)]
pub enum GPError {
    #[error("arena exhausted: no capacity left for {kind}")]
    ArenaExhausted { kind: &'static str },
    #[error("coordinate {coord:?} is out of bounds")]
    OutOfBounds { coord: Coordinate },
    #[error("no node matched the sampled filter/binding")]
    NoMatch,
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    #[error("task exceeds limit: {limit} allowed, got {actual}")]
    TaskTooLarge { limit: usize, actual: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GPResult<T> = Result<T, GPError>;
