//! Scene files: elements and connections described in TOML
//!
//! ```toml
//! [settings]
//! anchor = "Continuous"
//! connector = "[Flowchart, {cornerRadius: 4}]"
//!
//! [[elements]]
//! id = "a"
//! x = 0
//! y = 0
//! w = 100
//! h = 50
//!
//! [[connections]]
//! source = "a"
//! target = "b"
//! overlays = ["Arrow", "[Label, {label: calls}]"]
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::diagram::{ConnectOptions, Diagram, DiagramConfig, DiagramError};
use crate::geom::Rect;
use crate::overlay::{Overlay, OverlayError};
use crate::spec::{AnchorSpec, ConnectorSpec, OverlaySpec};

/// Errors that can occur when loading a scene
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("element '{0}' is declared twice")]
    DuplicateElement(String),

    #[error("{context} refers to undeclared element '{element}'")]
    UndeclaredElement { context: String, element: String },

    #[error(transparent)]
    Diagram(#[from] DiagramError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

/// Diagram-wide defaults from the `[settings]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    pub anchor: Option<AnchorSpec>,
    pub connector: Option<ConnectorSpec>,
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub do_not_throw_errors: bool,
}

impl Settings {
    pub fn to_config(&self) -> DiagramConfig {
        let mut config = DiagramConfig::new().with_do_not_throw_errors(self.do_not_throw_errors);
        if let Some(anchor) = &self.anchor {
            config = config.with_anchor(anchor.clone());
        }
        if let Some(connector) = &self.connector {
            config = config.with_connector(connector.clone());
        }
        if let Some(width) = self.stroke_width {
            config = config.with_stroke_width(width);
        }
        config
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementDef {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(alias = "w")]
    pub width: f64,
    #[serde(alias = "h")]
    pub height: f64,
}

impl ElementDef {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// An endpoint without connections
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointDef {
    pub element: String,
    pub anchor: AnchorSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionDef {
    pub source: String,
    pub target: String,
    /// Anchor for both ends
    pub anchor: Option<AnchorSpec>,
    /// `[source, target]`; takes precedence over `anchor`
    pub anchors: Option<[AnchorSpec; 2]>,
    pub connector: Option<ConnectorSpec>,
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    #[serde(default)]
    pub endpoints: Vec<EndpointDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

impl FromStr for Scene {
    type Err = SceneError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}

impl Scene {
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Build a diagram and compute every connection
    pub fn build(&self) -> Result<Diagram, SceneError> {
        let declared = self.check_elements()?;
        let mut diagram = Diagram::new(self.settings.to_config());
        diagram.set_suspend_drawing(true, false);

        for element in &self.elements {
            diagram.set_element_bounds(element.id.as_str(), element.rect())?;
        }
        for (i, ep) in self.endpoints.iter().enumerate() {
            require(&declared, &ep.element, || format!("endpoint {}", i + 1))?;
            diagram.add_endpoint(ep.element.as_str(), &ep.anchor)?;
        }
        for (i, def) in self.connections.iter().enumerate() {
            let context = || format!("connection {}", i + 1);
            require(&declared, &def.source, context)?;
            require(&declared, &def.target, context)?;
            diagram.connect(def.source.as_str(), def.target.as_str(), def.options()?)?;
        }

        diagram.set_suspend_drawing(false, true);
        debug!(
            elements = self.elements.len(),
            connections = diagram.connections().count(),
            "scene built"
        );
        Ok(diagram)
    }

    fn check_elements(&self) -> Result<HashSet<&str>, SceneError> {
        let mut declared = HashSet::new();
        for element in &self.elements {
            if !declared.insert(element.id.as_str()) {
                return Err(SceneError::DuplicateElement(element.id.clone()));
            }
        }
        Ok(declared)
    }
}

fn require(
    declared: &HashSet<&str>,
    element: &str,
    context: impl Fn() -> String,
) -> Result<(), SceneError> {
    if declared.contains(element) {
        Ok(())
    } else {
        Err(SceneError::UndeclaredElement {
            context: context(),
            element: element.to_string(),
        })
    }
}

impl ConnectionDef {
    fn options(&self) -> Result<ConnectOptions, SceneError> {
        let mut options = ConnectOptions::new();
        if let Some([source, target]) = &self.anchors {
            options = options.with_anchors(source.clone(), target.clone());
        } else if let Some(anchor) = &self.anchor {
            options = options.with_anchor(anchor.clone());
        }
        if let Some(connector) = &self.connector {
            options = options.with_connector(connector.clone());
        }
        for spec in &self.overlays {
            options = options.with_overlay(Overlay::from_spec(spec)?);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::types::Face;

    const SCENE: &str = r#"
[settings]
anchor = "Continuous"
connector = "Flowchart"
stroke-width = 2

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
width = 100
height = 50

[[connections]]
source = "a"
target = "b"
overlays = ["Arrow", "[Label, {label: calls}]"]
"#;

    #[test]
    fn test_parse_settings_and_elements() {
        let scene: Scene = SCENE.parse().expect("Should parse");
        assert_eq!(scene.settings.stroke_width, Some(2.0));
        assert_eq!(scene.elements[1].rect(), Rect::new(300.0, 0.0, 100.0, 50.0));
        assert_eq!(scene.connections[0].overlays.len(), 2);
        let config = scene.settings.to_config();
        assert_eq!(config.default_connector, ConnectorSpec::named("Flowchart"));
    }

    #[test]
    fn test_build_computes_connections() {
        let diagram: Diagram = SCENE.parse::<Scene>().unwrap().build().unwrap();
        let c = diagram.connections().next().expect("one connection");
        assert_eq!(c.connector().source_point(), Some(Point::new(100.0, 25.0)));
        assert_eq!(c.connector().target_point(), Some(Point::new(300.0, 25.0)));
        assert_eq!(diagram.continuous_face(c.source()), Some(Face::Right));
        assert_eq!(c.overlay_placements().len(), 2);
    }

    #[test]
    fn test_undeclared_element() {
        let scene: Scene = r#"
[[elements]]
id = "a"
x = 0
y = 0
w = 10
h = 10

[[connections]]
source = "a"
target = "z"
"#
        .parse()
        .unwrap();
        let err = scene.build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "connection 1 refers to undeclared element 'z'"
        );
    }

    #[test]
    fn test_bad_spec_is_a_parse_error() {
        let result: Result<Scene, _> = r#"
[settings]
anchor = "[Continuous, {faces: }]"
"#
        .parse();
        assert!(matches!(result, Err(SceneError::ParseError(_))));
    }

    #[test]
    fn test_duplicate_element() {
        let scene: Scene = r#"
[[elements]]
id = "a"
x = 0
y = 0
w = 10
h = 10

[[elements]]
id = "a"
x = 5
y = 5
w = 10
h = 10
"#
        .parse()
        .unwrap();
        assert!(matches!(scene.build(), Err(SceneError::DuplicateElement(id)) if id == "a"));
    }
}
