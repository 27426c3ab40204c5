use crate::geom::biltong;
use crate::geom::{Bounds, Point};

use super::PathHit;

/// A straight line from `start` to `end`
#[derive(Debug, Clone, PartialEq)]
pub struct StraightSegment {
    start: Point,
    end: Point,
    length: f64,
}

impl StraightSegment {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            length: biltong::line_length(start, end),
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&[self.start, self.end])
    }

    pub fn point_on_path(&self, location: f64, absolute: bool) -> Point {
        if !absolute && location == 0.0 {
            return self.start;
        }
        if !absolute && location == 1.0 {
            return self.end;
        }
        let l = if absolute {
            if location > 0.0 {
                location
            } else {
                self.length + location
            }
        } else {
            location * self.length
        };
        self.advance(self.start, l)
    }

    pub fn gradient_at_point(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }

    pub fn point_along_path_from(&self, location: f64, distance: f64, absolute: bool) -> Point {
        let p = self.point_on_path(location, absolute);
        self.advance(p, distance)
    }

    /// Move `distance` pixels along the direction of travel; zero-length
    /// segments have no direction and stay put
    fn advance(&self, from: Point, distance: f64) -> Point {
        if self.length == 0.0 {
            return from;
        }
        let ux = (self.end.x - self.start.x) / self.length;
        let uy = (self.end.y - self.start.y) / self.length;
        Point::new(from.x + ux * distance, from.y + uy * distance)
    }

    pub fn find_closest_point_on_path(&self, point: Point) -> PathHit {
        if self.length == 0.0 {
            return PathHit {
                point: self.start,
                location: 0.0,
                distance: self.start.distance_to(point),
            };
        }
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let t = (((point.x - self.start.x) * dx + (point.y - self.start.y) * dy)
            / (self.length * self.length))
            .clamp(0.0, 1.0);
        let on = Point::new(self.start.x + t * dx, self.start.y + t * dy);
        PathHit {
            point: on,
            location: t,
            distance: on.distance_to(point),
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.start.offset(dx, dy), self.end.offset(dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg() -> StraightSegment {
        StraightSegment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0))
    }

    #[test]
    fn test_point_on_path_proportional_and_absolute() {
        let s = seg();
        assert_eq!(s.point_on_path(0.25, false), Point::new(25.0, 0.0));
        assert_eq!(s.point_on_path(30.0, true), Point::new(30.0, 0.0));
        assert_eq!(s.point_on_path(-30.0, true), Point::new(70.0, 0.0));
    }

    #[test]
    fn test_point_along_path_from() {
        let s = seg();
        assert_eq!(s.point_along_path_from(0.5, 10.0, false), Point::new(60.0, 0.0));
        assert_eq!(s.point_along_path_from(0.5, -10.0, false), Point::new(40.0, 0.0));
    }

    #[test]
    fn test_closest_point_clamps_to_ends() {
        let s = seg();
        let hit = s.find_closest_point_on_path(Point::new(150.0, 5.0));
        assert_eq!(hit.point, Point::new(100.0, 0.0));
        assert_eq!(hit.location, 1.0);
        let mid = s.find_closest_point_on_path(Point::new(40.0, -3.0));
        assert_eq!(mid.point, Point::new(40.0, 0.0));
        assert_eq!(mid.distance, 3.0);
    }

    #[test]
    fn test_zero_length_segment() {
        let s = StraightSegment::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert_eq!(s.length(), 0.0);
        assert_eq!(s.point_on_path(0.5, false), Point::new(5.0, 5.0));
        assert_eq!(s.point_along_path_from(0.5, 10.0, false), Point::new(5.0, 5.0));
    }
}
