//! Configuration for a diagram instance

use crate::spec::{AnchorSpec, ConnectorSpec};

/// Defaults applied when a connection does not say otherwise
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramConfig {
    /// Anchor used for both ends when a connection names none
    pub default_anchor: AnchorSpec,

    /// Connector used when a connection names none
    pub default_connector: ConnectorSpec,

    /// Stroke width handed to connectors; widens their bounds
    pub stroke_width: f64,

    /// Turn unknown anchor and connector types into a logged warning
    /// instead of an error
    pub do_not_throw_errors: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            default_anchor: AnchorSpec::named("Bottom"),
            default_connector: ConnectorSpec::named("Bezier"),
            stroke_width: 1.0,
            do_not_throw_errors: false,
        }
    }
}

impl DiagramConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor(mut self, anchor: AnchorSpec) -> Self {
        self.default_anchor = anchor;
        self
    }

    pub fn with_connector(mut self, connector: ConnectorSpec) -> Self {
        self.default_connector = connector;
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_do_not_throw_errors(mut self, quiet: bool) -> Self {
        self.do_not_throw_errors = quiet;
        self
    }
}
