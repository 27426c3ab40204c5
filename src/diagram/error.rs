//! Error types for diagram operations

use thiserror::Error;

use crate::anchor::AnchorError;
use crate::connector::ConnectorError;
use crate::types::{ConnectionId, ElementId, EndpointId};

/// Errors that can occur while editing a diagram
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiagramError {
    #[error("unknown element '{element}'")]
    UnknownElement { element: ElementId },

    #[error("unknown endpoint {endpoint}")]
    UnknownEndpoint { endpoint: EndpointId },

    #[error("unknown connection {connection}")]
    UnknownConnection { connection: ConnectionId },

    /// Non-finite coordinates or a negative size
    #[error("invalid bounds for element '{element}': {width} x {height} at ({x}, {y})")]
    InvalidBounds {
        element: ElementId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    #[error("a connection is already being dragged")]
    DragInProgress,

    #[error("no connection is being dragged")]
    NoDrag,

    #[error(transparent)]
    Anchor(#[from] AnchorError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}
