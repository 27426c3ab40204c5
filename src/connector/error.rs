//! Error types for connector construction

use thiserror::Error;

use crate::error::SpecError;

/// Errors that can occur while building a connector from a spec
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConnectorError {
    /// No connector type registered under this name
    #[error("unknown connector type '{name}'")]
    UnknownType { name: String },

    /// Loopback orientation other than clockwise or anticlockwise
    #[error("unknown loopback orientation '{value}' (expected clockwise or anticlockwise)")]
    InvalidOrientation { value: String },

    #[error("invalid connector option: {0}")]
    Option(#[from] SpecError),
}

impl ConnectorError {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }
}
