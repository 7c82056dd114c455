use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Every failure the engine can report.
///
/// None of these are recoverable by retrying: an operation that returns an
/// `Err` has produced no partial result. Contract violations (shape
/// mismatches, missing cache entries, bad layer indices) are programming
/// errors in the caller; the remaining variants come from the I/O and
/// configuration collaborators.
#[derive(Debug, Error)]
pub enum NnError {
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("invalid matrix dimensions {rows}x{cols}: both must be at least 1")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("cache entry '{0}' not found")]
    MissingCacheEntry(String),

    #[error("layer index {index} out of range for a network of {len} layers")]
    LayerIndexOutOfRange { index: usize, len: usize },

    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("parse error on line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NnError {
    pub(crate) fn shape(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Self {
        NnError::ShapeMismatch { op, left, right }
    }

    /// True for faults caused by misuse of the API rather than by bad input
    /// data or the environment.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            NnError::ShapeMismatch { .. }
                | NnError::InvalidDimensions { .. }
                | NnError::MissingCacheEntry(_)
                | NnError::LayerIndexOutOfRange { .. }
                | NnError::InvalidNetwork(_)
        )
    }
}
