use crate::geom::bezier::{self, CubicCurve};
use crate::geom::{Bounds, Point};

use super::PathHit;

/// A cubic Bezier between `curve[0]` and `curve[3]`
#[derive(Debug, Clone, PartialEq)]
pub struct BezierSegment {
    curve: CubicCurve,
    length: f64,
}

impl BezierSegment {
    pub fn new(start: Point, cp1: Point, cp2: Point, end: Point) -> Self {
        let curve = [start, cp1, cp2, end];
        Self {
            curve,
            length: bezier::length(&curve),
        }
    }

    pub fn curve(&self) -> &CubicCurve {
        &self.curve
    }

    pub fn start(&self) -> Point {
        self.curve[0]
    }

    pub fn end(&self) -> Point {
        self.curve[3]
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Bounds of the control hull, which contains the curve
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.curve)
    }

    /// Absolute distances are converted to a curve parameter by walking
    /// from the start (positive) or the end (negative)
    fn translate_location(&self, location: f64, absolute: bool) -> f64 {
        if absolute {
            let from = if location > 0.0 { 0.0 } else { 1.0 };
            bezier::location_along_curve_from(&self.curve, from, location)
        } else {
            location
        }
    }

    pub fn point_on_path(&self, location: f64, absolute: bool) -> Point {
        let t = self.translate_location(location, absolute);
        bezier::point_on_curve(&self.curve, t)
    }

    pub fn gradient_at_point(&self, location: f64, absolute: bool) -> f64 {
        let t = self.translate_location(location, absolute);
        bezier::gradient_at_point(&self.curve, t)
    }

    pub fn point_along_path_from(&self, location: f64, distance: f64, absolute: bool) -> Point {
        let t = self.translate_location(location, absolute);
        bezier::point_along_curve_from(&self.curve, t, distance)
    }

    pub fn find_closest_point_on_path(&self, point: Point) -> PathHit {
        let hit = bezier::nearest_point_on_curve(point, &self.curve);
        PathHit {
            point: hit.point,
            location: hit.location,
            distance: hit.distance,
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let [a, b, c, d] = self.curve;
        Self {
            curve: [
                a.offset(dx, dy),
                b.offset(dx, dy),
                c.offset(dx, dy),
                d.offset(dx, dy),
            ],
            length: self.length,
        }
    }
}
