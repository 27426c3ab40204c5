//! Decorations placed along a computed connector path
//!
//! Arrow-like overlays are described by a head point, the two corners of
//! the tail and a foldback point on the centre line; a diamond is an arrow
//! whose foldback lies past the tail. Labels only need a point.
//!
//! Locations from 0 to 1 are proportions of the path. Anything outside that
//! range is a distance in pixels: from the start when positive, from the
//! end when negative.

use thiserror::Error;

use crate::connector::Connector;
use crate::error::SpecError;
use crate::geom::biltong::{perpendicular_line_to, point_on_line};
use crate::geom::{Bounds, Point, Rect};
use crate::spec::{Options, OverlaySpec};

pub const DEFAULT_ARROW_WIDTH: f64 = 20.0;
pub const DEFAULT_ARROW_LENGTH: f64 = 20.0;
pub const DEFAULT_FOLDBACK: f64 = 0.623;
const DEFAULT_DIAMOND_LENGTH: f64 = 40.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OverlayError {
    #[error("unknown overlay type '{name}'")]
    UnknownType { name: String },

    #[error("invalid overlay option: {0}")]
    Option(#[from] SpecError),
}

/// Geometry of an arrow-shaped overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowShape {
    /// Distance between the two tail corners
    pub width: f64,
    /// Head to tail along the path
    pub length: f64,
    /// Position of the inner point as a fraction of `length` from the head
    pub foldback: f64,
    /// `1.0` points towards the target, `-1.0` towards the source
    pub direction: f64,
}

impl Default for ArrowShape {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARROW_WIDTH,
            length: DEFAULT_ARROW_LENGTH,
            foldback: DEFAULT_FOLDBACK,
            direction: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayKind {
    Arrow(ArrowShape),
    Label(String),
}

/// An overlay attached to a connection
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: Option<String>,
    pub location: f64,
    pub kind: OverlayKind,
}

/// Where an overlay ended up on the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayPlacement {
    Arrow {
        head: Point,
        tail: [Point; 2],
        foldback: Point,
        bounds: Rect,
    },
    Label {
        point: Point,
        text: String,
    },
}

impl OverlayPlacement {
    pub fn bounds(&self) -> Rect {
        match self {
            OverlayPlacement::Arrow { bounds, .. } => *bounds,
            OverlayPlacement::Label { point, .. } => Rect::new(point.x, point.y, 0.0, 0.0),
        }
    }
}

impl Overlay {
    pub fn arrow() -> Self {
        Self::shaped(ArrowShape::default())
    }

    /// Arrow without a notch in its tail
    pub fn plain_arrow() -> Self {
        Self::shaped(ArrowShape {
            foldback: 1.0,
            ..ArrowShape::default()
        })
    }

    pub fn diamond() -> Self {
        Self::shaped(ArrowShape {
            length: DEFAULT_DIAMOND_LENGTH / 2.0,
            foldback: 2.0,
            ..ArrowShape::default()
        })
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            id: None,
            location: 0.5,
            kind: OverlayKind::Label(text.into()),
        }
    }

    fn shaped(shape: ArrowShape) -> Self {
        Self {
            id: None,
            location: 1.0,
            kind: OverlayKind::Arrow(shape),
        }
    }

    pub fn with_location(mut self, location: f64) -> Self {
        self.location = location;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Build an overlay from `Arrow`, `PlainArrow`, `Diamond` or `Label` notation
    pub fn from_spec(spec: &OverlaySpec) -> Result<Self, OverlayError> {
        let options = &spec.options;
        let mut overlay = match spec.name.as_str() {
            "Arrow" => Self::arrow(),
            "PlainArrow" => Self::plain_arrow(),
            "Diamond" => Self::diamond(),
            "Label" => Self::label(options.text("label")?.unwrap_or_default()),
            other => {
                return Err(OverlayError::UnknownType {
                    name: other.to_string(),
                })
            }
        };
        if let OverlayKind::Arrow(shape) = &mut overlay.kind {
            apply_shape_options(shape, options, spec.name == "Diamond")?;
        }
        if let Some(location) = options.number("location")? {
            overlay.location = location;
        }
        if let Some(id) = options.text("id")? {
            overlay.id = Some(id.to_string());
        }
        Ok(overlay)
    }

    /// Place the overlay on a computed connector
    pub fn place(&self, connector: &Connector) -> OverlayPlacement {
        match &self.kind {
            OverlayKind::Label(text) => OverlayPlacement::Label {
                point: along(connector, self.location, 0.0),
                text: text.clone(),
            },
            OverlayKind::Arrow(shape) => place_arrow(connector, self.location, shape),
        }
    }
}

fn apply_shape_options(
    shape: &mut ArrowShape,
    options: &Options,
    halve_length: bool,
) -> Result<(), SpecError> {
    if let Some(width) = options.number("width")? {
        shape.width = width;
    }
    if let Some(length) = options.number("length")? {
        shape.length = if halve_length { length / 2.0 } else { length };
    }
    if let Some(foldback) = options.number("foldback")? {
        shape.foldback = foldback;
    }
    if let Some(direction) = options.number("direction")? {
        shape.direction = if direction < 0.0 { -1.0 } else { 1.0 };
    }
    Ok(())
}

/// Point `distance` pixels along the path from an overlay location
fn along(connector: &Connector, location: f64, distance: f64) -> Point {
    if (0.0..=1.0).contains(&location) {
        connector.point_along_path_from(location, distance, false)
    } else {
        let from = if location < 0.0 { 1.0 } else { 0.0 };
        connector.point_along_path_from(from, location.trunc() + distance, false)
    }
}

fn place_arrow(connector: &Connector, location: f64, shape: &ArrowShape) -> OverlayPlacement {
    let length = shape.length;
    let (head, tail_mid) = if location == 1.0 {
        let head = along(connector, 1.0, 0.0);
        let back = along(connector, 1.0, -length);
        let tail_mid = point_on_line(head, back, length);
        if shape.direction < 0.0 {
            (tail_mid, head)
        } else {
            (head, tail_mid)
        }
    } else if location == 0.0 {
        let tail_mid = along(connector, 0.0, 0.0);
        let ahead = along(connector, 0.0, length);
        let head = point_on_line(tail_mid, ahead, length);
        if shape.direction < 0.0 {
            (tail_mid, head)
        } else {
            (head, tail_mid)
        }
    } else {
        let head = along(connector, location, shape.direction * length / 2.0);
        let mid = along(connector, location, 0.0);
        (head, point_on_line(head, mid, length))
    };

    let tail = perpendicular_line_to(head, tail_mid, shape.width);
    let foldback = point_on_line(head, tail_mid, shape.foldback * length);
    OverlayPlacement::Arrow {
        head,
        tail,
        foldback,
        bounds: Bounds::from_points(&[head, tail[0], tail[1], foldback]).to_rect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorLocation;
    use crate::connector::{ConnectorEnd, ConnectorOptions, ConnectorParams, StraightRouter};
    use crate::types::Orientation;

    /// Straight horizontal connector from (0, 0) to (100, 0)
    fn line() -> Connector {
        let end = |x: f64, element: &str, dx: f64| {
            ConnectorEnd::new(
                AnchorLocation::new(
                    Point::new(x, 0.0),
                    Point::new(0.5, 0.5),
                    Orientation::new(dx, 0.0),
                ),
                element,
                Rect::new(x, 0.0, 0.0, 0.0),
            )
        };
        let mut c = Connector::new(StraightRouter, ConnectorOptions::new());
        c.compute(&ConnectorParams::new(end(0.0, "a", 1.0), end(100.0, "b", -1.0)));
        c
    }

    fn arrow_points(placement: OverlayPlacement) -> (Point, [Point; 2], Point) {
        match placement {
            OverlayPlacement::Arrow {
                head,
                tail,
                foldback,
                ..
            } => (head, tail, foldback),
            other => panic!("Expected arrow, got {:?}", other),
        }
    }

    #[test]
    fn test_arrow_at_target() {
        let (head, tail, foldback) = arrow_points(Overlay::arrow().place(&line()));
        assert!(head.approx_eq(Point::new(100.0, 0.0), 1e-9));
        assert!(tail[0].approx_eq(Point::new(80.0, 10.0), 1e-9));
        assert!(tail[1].approx_eq(Point::new(80.0, -10.0), 1e-9));
        assert!(foldback.approx_eq(Point::new(87.54, 0.0), 1e-9));
    }

    #[test]
    fn test_arrow_centred_mid_path() {
        let (head, tail, _) = arrow_points(Overlay::arrow().with_location(0.5).place(&line()));
        assert!(head.approx_eq(Point::new(60.0, 0.0), 1e-9));
        assert!((tail[0].x - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_reversed_arrow_at_target() {
        let mut overlay = Overlay::plain_arrow();
        if let OverlayKind::Arrow(shape) = &mut overlay.kind {
            shape.direction = -1.0;
        }
        let (head, _, foldback) = arrow_points(overlay.place(&line()));
        assert!(head.approx_eq(Point::new(80.0, 0.0), 1e-9));
        assert!(foldback.approx_eq(Point::new(100.0, 0.0), 1e-9));
    }

    #[test]
    fn test_diamond_foldback_lies_past_tail() {
        let placement = Overlay::diamond().with_location(0.0).place(&line());
        let bounds = placement.bounds();
        let (head, _, foldback) = arrow_points(placement);
        assert!(head.approx_eq(Point::new(20.0, 0.0), 1e-9));
        assert!(foldback.approx_eq(Point::new(-20.0, 0.0), 1e-9));
        assert!((bounds.width - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_locations() {
        let label = Overlay::label("x").with_location(-25.0).place(&line());
        assert_eq!(label.bounds().origin(), Point::new(75.0, 0.0));
        let label = Overlay::label("x").with_location(30.0).place(&line());
        assert_eq!(label.bounds().origin(), Point::new(30.0, 0.0));
    }

    #[test]
    fn test_from_spec() {
        let spec: OverlaySpec = "[Label, {label: \"calls\", location: 0.25, id: l1}]"
            .parse()
            .unwrap();
        let overlay = Overlay::from_spec(&spec).unwrap();
        assert_eq!(overlay.kind, OverlayKind::Label("calls".to_string()));
        assert_eq!(overlay.location, 0.25);
        assert_eq!(overlay.id.as_deref(), Some("l1"));

        let spec: OverlaySpec = "[Diamond, {length: 30, direction: -1}]".parse().unwrap();
        match Overlay::from_spec(&spec).unwrap().kind {
            OverlayKind::Arrow(shape) => {
                assert_eq!(shape.length, 15.0);
                assert_eq!(shape.direction, -1.0);
            }
            other => panic!("Expected arrow, got {:?}", other),
        }

        let spec: OverlaySpec = "Custom".parse().unwrap();
        assert_eq!(
            Overlay::from_spec(&spec),
            Err(OverlayError::UnknownType {
                name: "Custom".to_string()
            })
        );
    }
}
