//! Error types for anchor construction

use thiserror::Error;

use crate::error::SpecError;

/// Errors that can occur while building an anchor from a spec
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnchorError {
    /// No anchor type registered under this name
    #[error("unknown anchor type '{name}'")]
    UnknownType { name: String },

    /// A dynamic anchor candidate that is not a fixed position
    #[error("anchor '{name}' cannot be a dynamic anchor candidate")]
    InvalidCandidate { name: String },

    /// Dynamic anchor without candidates
    #[error("dynamic anchor needs at least one candidate")]
    NoCandidates,

    #[error("unknown face '{face}' (expected top, right, bottom or left)")]
    UnknownFace { face: String },

    #[error("unknown perimeter shape '{shape}'")]
    UnknownShape { shape: String },

    #[error("invalid anchor option: {0}")]
    Option(#[from] SpecError),
}

impl AnchorError {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    pub fn candidate(name: impl Into<String>) -> Self {
        Self::InvalidCandidate { name: name.into() }
    }
}
