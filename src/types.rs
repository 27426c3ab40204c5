//! Identifiers and small shared value types

use std::fmt;
use std::str::FromStr;

/// Name of an element (a box on the canvas)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Handle to an endpoint owned by a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(pub u32);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ep{}", self.0)
    }
}

/// Handle to a connection owned by a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "con{}", self.0)
    }
}

/// Outward direction an anchor faces, e.g. `(0, -1)` for a top edge
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub dx: f64,
    pub dy: f64,
}

impl Orientation {
    pub const ZERO: Orientation = Orientation { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    pub fn dot(&self, other: &Orientation) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// Unit vector along the larger component; ties go to x
    pub fn snapped(&self) -> Orientation {
        if self.is_zero() {
            *self
        } else if self.dx.abs() >= self.dy.abs() {
            Orientation::new(self.dx.signum(), 0.0)
        } else {
            Orientation::new(0.0, self.dy.signum())
        }
    }
}

/// Axis a face lies along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left and right faces
    X,
    /// Top and bottom faces
    Y,
}

/// One of the four edges of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    Top,
    Right,
    Bottom,
    Left,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::Top, Face::Right, Face::Bottom, Face::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Face::Top => "top",
            Face::Right => "right",
            Face::Bottom => "bottom",
            Face::Left => "left",
        }
    }

    pub fn opposite(&self) -> Face {
        match self {
            Face::Top => Face::Bottom,
            Face::Right => Face::Left,
            Face::Bottom => Face::Top,
            Face::Left => Face::Right,
        }
    }

    /// Next face going clockwise around the element
    pub fn clockwise(&self) -> Face {
        match self {
            Face::Top => Face::Right,
            Face::Right => Face::Bottom,
            Face::Bottom => Face::Left,
            Face::Left => Face::Top,
        }
    }

    pub fn anticlockwise(&self) -> Face {
        match self {
            Face::Top => Face::Left,
            Face::Right => Face::Top,
            Face::Bottom => Face::Right,
            Face::Left => Face::Bottom,
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Face::Left | Face::Right => Axis::X,
            Face::Top | Face::Bottom => Axis::Y,
        }
    }

    /// Outward orientation of the face
    pub fn orientation(&self) -> Orientation {
        match self {
            Face::Top => Orientation::new(0.0, -1.0),
            Face::Right => Orientation::new(1.0, 0.0),
            Face::Bottom => Orientation::new(0.0, 1.0),
            Face::Left => Orientation::new(-1.0, 0.0),
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Face::Top => 0,
            Face::Right => 1,
            Face::Bottom => 2,
            Face::Left => 3,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Face {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Face::Top),
            "right" => Ok(Face::Right),
            "bottom" => Ok(Face::Bottom),
            "left" => Ok(Face::Left),
            _ => Err(s.to_string()),
        }
    }
}
