use crate::geom::Point;
use crate::types::{Axis, Face, Orientation};

use super::AnchorLocation;

/// An anchor whose position is assigned by the continuous anchor manager
///
/// It only carries the face rules; the manager decides the face and the
/// slot on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousAnchor {
    faces: Vec<Face>,
    clockwise: bool,
    current_face: Option<Face>,
    locked_face: Option<Face>,
    locked_axis: Option<Axis>,
}

impl Default for ContinuousAnchor {
    fn default() -> Self {
        Self::new(Face::ALL.to_vec())
    }
}

impl ContinuousAnchor {
    /// An anchor restricted to `faces`, preferring the first when idle
    pub fn new(faces: Vec<Face>) -> Self {
        Self {
            faces,
            clockwise: true,
            current_face: None,
            locked_face: None,
            locked_axis: None,
        }
    }

    pub fn with_clockwise(mut self, clockwise: bool) -> Self {
        self.clockwise = clockwise;
        self
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn clockwise(&self) -> bool {
        self.clockwise
    }

    /// Face used by an endpoint that has no connections
    pub fn default_face(&self) -> Face {
        self.faces.first().copied().unwrap_or(Face::Top)
    }

    pub fn current_face(&self) -> Option<Face> {
        self.current_face
    }

    pub fn set_current_face(&mut self, face: Face) {
        self.current_face = Some(face);
    }

    /// Whether the manager may put this anchor on `face`
    ///
    /// An axis lock allows both faces of the axis; a face lock allows only
    /// that face.
    pub fn is_edge_supported(&self, face: Face) -> bool {
        match (self.locked_axis, self.locked_face) {
            (Some(axis), _) => face.axis() == axis,
            (None, Some(locked)) => face == locked,
            (None, None) => self.faces.contains(&face),
        }
    }

    /// `face` if supported, else the best supported substitute
    ///
    /// Tries the opposite face first, then the neighbour in the preferred
    /// rotation, then the other neighbour. Falls back to `face` itself.
    pub fn verify_edge(&self, face: Face) -> Face {
        let (second, last) = if self.clockwise {
            (face.clockwise(), face.anticlockwise())
        } else {
            (face.anticlockwise(), face.clockwise())
        };
        [face, face.opposite(), second, last]
            .into_iter()
            .find(|f| self.faces.contains(f))
            .unwrap_or(face)
    }

    /// Lock to the current face
    pub fn lock(&mut self) {
        self.locked_face = self.current_face;
    }

    pub fn unlock(&mut self) {
        self.locked_face = None;
    }

    pub fn locked_face(&self) -> Option<Face> {
        self.locked_face
    }

    /// Restrict to the axis of the current face
    pub fn lock_current_axis(&mut self) {
        if let Some(face) = self.current_face {
            self.locked_axis = Some(face.axis());
        }
    }

    pub fn unlock_current_axis(&mut self) {
        self.locked_axis = None;
    }

    pub fn locked_axis(&self) -> Option<Axis> {
        self.locked_axis
    }

    pub(super) fn compute(&self, slot: Option<AnchorLocation>) -> AnchorLocation {
        slot.unwrap_or_else(|| {
            AnchorLocation::new(Point::origin(), Point::origin(), Orientation::ZERO)
        })
    }
}
