//! Anchorage - anchor placement and connector routing for box-and-line diagrams
//!
//! Elements are rectangles. Endpoints sit on elements at anchors: fixed
//! points, dynamic candidate lists, perimeter samples, or continuous
//! anchors that share an element face with their siblings. Connections run
//! between two endpoints along a connector path made of straight, arc and
//! Bezier segments, and carry overlays such as arrows and labels.
//!
//! # Example
//!
//! ```rust
//! use anchorage::render;
//!
//! let svg = render(r#"
//! [[elements]]
//! id = "a"
//! x = 0
//! y = 0
//! w = 100
//! h = 50
//!
//! [[elements]]
//! id = "b"
//! x = 300
//! y = 0
//! w = 100
//! h = 50
//!
//! [[connections]]
//! source = "a"
//! target = "b"
//! "#).unwrap();
//! assert!(svg.contains("<path"));
//! ```

pub mod anchor;
pub mod connector;
pub mod diagram;
pub mod error;
pub mod geom;
pub mod overlay;
pub mod renderer;
pub mod scene;
pub mod segment;
pub mod spec;
pub mod types;

pub use anchor::{Anchor, AnchorError, AnchorLocation, AnchorManager, AnchorRegistry};
pub use connector::{Connector, ConnectorError, ConnectorRegistry};
pub use diagram::{ConnectOptions, Diagram, DiagramConfig, DiagramError, DiagramEvent};
pub use error::SpecError;
pub use geom::{Point, Rect};
pub use overlay::{Overlay, OverlayError, OverlayPlacement};
pub use renderer::{render_svg, DebugMarks, SvgConfig};
pub use scene::{Scene, SceneError};
pub use segment::Segment;
pub use spec::{AnchorSpec, ConnectorSpec, OverlaySpec};
pub use types::{ConnectionId, ElementId, EndpointId, Face, Orientation};

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Print a summary line per connector to stderr
    pub debug: bool,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Debug mode: connector summaries plus anchor and element id marks
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self.svg.marks = debug.then(DebugMarks::default);
        self
    }
}

/// Render a TOML scene to SVG with default configuration
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, &RenderConfig::default())
}

/// Render a TOML scene to SVG
pub fn render_with_config(source: &str, config: &RenderConfig) -> Result<String, RenderError> {
    let scene: Scene = source.parse()?;
    let diagram = scene.build()?;

    if config.debug {
        for connection in diagram.connections() {
            let c = connection.connector();
            let kinds: Vec<&str> = c.segments().iter().map(|s| s.kind()).collect();
            eprintln!(
                "[{}] {} {:?} length={:.1}",
                connection.id(),
                c.type_name(),
                kinds,
                c.length()
            );
        }
    }

    Ok(render_svg(&diagram, &config.svg))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BOXES: &str = r#"
[[elements]]
id = "a"
x = 0
y = 0
w = 100
h = 50

[[elements]]
id = "b"
x = 300
y = 0
w = 100
h = 50
"#;

    #[test]
    fn test_render_elements_only() {
        let svg = render(TWO_BOXES).unwrap();
        assert!(svg.contains(r#"id="a""#));
        assert!(svg.contains(r#"id="b""#));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_render_connection() {
        let source = format!(
            "{TWO_BOXES}\n[[connections]]\nsource = \"a\"\ntarget = \"b\"\nanchors = [\"Right\", \"Left\"]\nconnector = \"Straight\"\n"
        );
        let svg = render(&source).unwrap();
        assert!(svg.contains(r#"d="M100.00 25.00 L300.00 25.00""#));
    }

    #[test]
    fn test_debug_render_marks_anchors() {
        let source = format!(
            "{TWO_BOXES}\n[[connections]]\nsource = \"a\"\ntarget = \"b\"\nanchors = [\"Right\", \"Left\"]\n"
        );
        let config = RenderConfig::new().with_debug(true);
        let svg = render_with_config(&source, &config).unwrap();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(">a</text>"));

        let plain = render_with_config(&source, &config.with_debug(false)).unwrap();
        assert!(!plain.contains("<circle"));
    }

    #[test]
    fn test_render_unknown_connector_is_an_error() {
        let source = format!(
            "{TWO_BOXES}\n[[connections]]\nsource = \"a\"\ntarget = \"b\"\nconnector = \"Zigzag\"\n"
        );
        let err = render(&source).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Scene(SceneError::Diagram(DiagramError::Connector(_)))
        ));
    }

    #[test]
    fn test_render_quietly_skips_unknown_connector() {
        let source = format!(
            "[settings]\ndo-not-throw-errors = true\n{TWO_BOXES}\n[[connections]]\nsource = \"a\"\ntarget = \"b\"\nconnector = \"Zigzag\"\n"
        );
        let svg = render(&source).unwrap();
        assert!(!svg.contains("<path"));
    }
}
