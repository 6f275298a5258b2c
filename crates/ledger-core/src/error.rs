use std::fmt;

use thiserror::Error;

/// Which integrity check a block failed during chain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Genesis does not carry the `"0"` previous-hash sentinel.
    GenesisPreviousHash,
    /// Stored hash differs from the recomputed one.
    HashMismatch,
    /// `previous_hash` does not point at the predecessor's hash.
    LinkageMismatch,
    /// Hash does not carry the chain's required leading zeros.
    InsufficientWork,
    /// Stored index differs from the block's position.
    IndexMismatch,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ValidationFailure::GenesisPreviousHash => "invalid genesis previous hash",
            ValidationFailure::HashMismatch => "invalid hash",
            ValidationFailure::LinkageMismatch => "invalid previous hash",
            ValidationFailure::InsufficientWork => "insufficient proof of work",
            ValidationFailure::IndexMismatch => "invalid index",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at block {index}")]
pub struct ValidationError {
    pub index: usize,
    pub kind: ValidationFailure,
}

impl ValidationError {
    pub fn new(index: usize, kind: ValidationFailure) -> Self {
        Self { index, kind }
    }
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("difficulty {difficulty} exceeds the {max} hex characters of a hash")]
    DifficultyOutOfRange { difficulty: u32, max: usize },

    #[error("mining block {index} gave up after {attempts} attempts")]
    MiningExhausted { index: u64, attempts: u64 },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
