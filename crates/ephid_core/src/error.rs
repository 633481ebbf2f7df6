use thiserror::Error;

/// Raised when an [`IdentifierSpace`](crate::IdentifierSpace) would break
/// its structural invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpaceError {
    #[error("starter {starter:?} has length {actual}, expected {expected}")]
    StarterLength {
        starter: String,
        expected: usize,
        actual: usize,
    },
    #[error("starter {0:?} has no suffixes")]
    NoSuffixes(String),
    #[error("starter {starter:?} has malformed suffix {suffix:?}")]
    MalformedSuffix { starter: String, suffix: String },
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AllocError {
    /// The identifier space handed to the allocator has no starters.
    #[error("no available identifiers: identifier space is empty")]
    EmptySpace,
    /// Every starter is reserved; release or reset to recover.
    #[error("no available identifiers: all {active} starters are in use")]
    Exhausted { active: usize },
}
