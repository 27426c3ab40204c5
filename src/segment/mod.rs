//! Path segments composing a connector
//!
//! Every segment answers the same queries: length, bounds, the point at a
//! proportional or absolute location, the tangent there, and the point a
//! given distance further along. Segments are immutable once built; a
//! connector rebuilds its list on every compute.

mod arc;
mod bezier;
mod straight;

pub use arc::ArcSegment;
pub use bezier::BezierSegment;
pub use straight::StraightSegment;

use crate::geom::{Bounds, Point};

/// Result of a closest-point query against a segment or a whole path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathHit {
    pub point: Point,
    /// Proportional location (0..=1) of `point` within the segment or path
    pub location: f64,
    pub distance: f64,
}

/// One geometric piece of a connector path
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Straight(StraightSegment),
    Arc(ArcSegment),
    Bezier(BezierSegment),
}

impl Segment {
    /// Short type name, as used in debug output
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Straight(_) => "Straight",
            Segment::Arc(_) => "Arc",
            Segment::Bezier(_) => "Bezier",
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Segment::Straight(s) => s.length(),
            Segment::Arc(s) => s.length(),
            Segment::Bezier(s) => s.length(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Segment::Straight(s) => s.bounds(),
            Segment::Arc(s) => s.bounds(),
            Segment::Bezier(s) => s.bounds(),
        }
    }

    pub fn start(&self) -> Point {
        match self {
            Segment::Straight(s) => s.start(),
            Segment::Arc(s) => s.start(),
            Segment::Bezier(s) => s.start(),
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Segment::Straight(s) => s.end(),
            Segment::Arc(s) => s.end(),
            Segment::Bezier(s) => s.end(),
        }
    }

    /// Point at `location`: a 0..=1 proportion, or pixels from the start
    /// (from the end when negative) if `absolute`
    pub fn point_on_path(&self, location: f64, absolute: bool) -> Point {
        match self {
            Segment::Straight(s) => s.point_on_path(location, absolute),
            Segment::Arc(s) => s.point_on_path(location, absolute),
            Segment::Bezier(s) => s.point_on_path(location, absolute),
        }
    }

    /// Direction of travel at `location`, in radians
    pub fn gradient_at_point(&self, location: f64, absolute: bool) -> f64 {
        match self {
            Segment::Straight(s) => s.gradient_at_point(),
            Segment::Arc(s) => s.gradient_at_point(location, absolute),
            Segment::Bezier(s) => s.gradient_at_point(location, absolute),
        }
    }

    /// Point `distance` pixels further along from `location`
    pub fn point_along_path_from(&self, location: f64, distance: f64, absolute: bool) -> Point {
        match self {
            Segment::Straight(s) => s.point_along_path_from(location, distance, absolute),
            Segment::Arc(s) => s.point_along_path_from(location, distance, absolute),
            Segment::Bezier(s) => s.point_along_path_from(location, distance, absolute),
        }
    }

    pub fn find_closest_point_on_path(&self, point: Point) -> PathHit {
        match self {
            Segment::Straight(s) => s.find_closest_point_on_path(point),
            Segment::Arc(s) => s.find_closest_point_on_path(point),
            Segment::Bezier(s) => s.find_closest_point_on_path(point),
        }
    }

    /// Copy of this segment moved by `(dx, dy)`
    pub fn translated(&self, dx: f64, dy: f64) -> Segment {
        match self {
            Segment::Straight(s) => Segment::Straight(s.translated(dx, dy)),
            Segment::Arc(s) => Segment::Arc(s.translated(dx, dy)),
            Segment::Bezier(s) => Segment::Bezier(s.translated(dx, dy)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translated_keeps_length() {
        let seg = Segment::Straight(StraightSegment::new(
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
        ));
        let moved = seg.translated(10.0, 20.0);
        assert_eq!(moved.start(), Point::new(10.0, 20.0));
        assert_eq!(moved.end(), Point::new(13.0, 24.0));
        assert_eq!(moved.length(), seg.length());
        assert_eq!(moved.kind(), "Straight");
    }
}
