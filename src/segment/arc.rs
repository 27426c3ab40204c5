use std::f64::consts::PI;

use crate::geom::biltong;
use crate::geom::{Bounds, Point};

use super::PathHit;

const TWO_PI: f64 = 2.0 * PI;

/// A circular arc around `center`
///
/// Angles are screen angles as returned by [`biltong::theta`], so a
/// clockwise arc has increasing angles.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcSegment {
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
    sweep: f64,
    length: f64,
    start: Point,
    end: Point,
}

impl ArcSegment {
    /// Arc from `start` to `end`, both assumed to lie on the circle
    pub fn new(center: Point, radius: f64, start: Point, end: Point, anticlockwise: bool) -> Self {
        let start_angle = biltong::theta(center, start);
        let end_angle = biltong::theta(center, end);
        let ea = if end_angle < start_angle {
            end_angle + TWO_PI
        } else {
            end_angle
        };
        let mut sweep = (ea - start_angle).abs();
        if anticlockwise {
            sweep = TWO_PI - sweep;
        }
        Self::build(center, radius, start_angle, end_angle, anticlockwise, sweep, start, end)
    }

    /// A full circle starting and ending at `start_angle`
    pub fn full_circle(center: Point, radius: f64, start_angle: f64, anticlockwise: bool) -> Self {
        let p = point_at(center, radius, start_angle);
        Self::build(center, radius, start_angle, start_angle, anticlockwise, TWO_PI, p, p)
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
        sweep: f64,
        start: Point,
        end: Point,
    ) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
            sweep,
            length: radius * sweep,
            start,
            end,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn anticlockwise(&self) -> bool {
        self.anticlockwise
    }

    /// Swept angle in radians, `2π` for a full circle
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn end_angle(&self) -> f64 {
        self.end_angle
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

    fn angle_for_location(&self, location: f64) -> f64 {
        if self.anticlockwise {
            self.start_angle - self.sweep * location
        } else {
            self.start_angle + self.sweep * location
        }
    }

    fn proportion(&self, location: f64, absolute: bool) -> f64 {
        if !absolute {
            return location;
        }
        if self.length == 0.0 {
            return 0.0;
        }
        if location > 0.0 {
            location / self.length
        } else {
            (self.length + location) / self.length
        }
    }

    pub fn point_on_path(&self, location: f64, absolute: bool) -> Point {
        if !absolute && location == 0.0 {
            return self.start;
        }
        if !absolute && location == 1.0 {
            return self.end;
        }
        let loc = self.proportion(location, absolute);
        point_at(self.center, self.radius, self.angle_for_location(loc))
    }

    /// Direction of travel: the tangent, turned by a quarter for the sweep direction
    pub fn gradient_at_point(&self, location: f64, absolute: bool) -> f64 {
        let angle = self.angle_for_location(self.proportion(location, absolute));
        let tangent = if self.anticlockwise {
            angle - PI / 2.0
        } else {
            angle + PI / 2.0
        };
        tangent.sin().atan2(tangent.cos())
    }

    pub fn point_along_path_from(&self, location: f64, distance: f64, absolute: bool) -> Point {
        let angle = self.angle_for_location(self.proportion(location, absolute));
        if self.radius == 0.0 {
            return point_at(self.center, 0.0, angle);
        }
        let span = distance / self.radius;
        let dir = if self.anticlockwise { -1.0 } else { 1.0 };
        point_at(self.center, self.radius, angle + dir * span)
    }

    /// Whether the screen angle `a` falls within the swept range
    fn covers(&self, a: f64) -> bool {
        let delta = if self.anticlockwise {
            self.start_angle - a
        } else {
            a - self.start_angle
        };
        delta.rem_euclid(TWO_PI) <= self.sweep
    }

    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::from_points(&[self.start, self.end]);
        for a in [0.0, PI / 2.0, PI, 3.0 * PI / 2.0] {
            if self.covers(a) {
                b.include(point_at(self.center, self.radius, a));
            }
        }
        b
    }

    pub fn find_closest_point_on_path(&self, point: Point) -> PathHit {
        let mut best = PathHit {
            point: self.start,
            location: 0.0,
            distance: self.start.distance_to(point),
        };
        let end_distance = self.end.distance_to(point);
        if end_distance < best.distance {
            best = PathHit {
                point: self.end,
                location: 1.0,
                distance: end_distance,
            };
        }
        if point == self.center || self.sweep == 0.0 {
            return best;
        }
        let a = biltong::theta(self.center, point);
        if self.covers(a) {
            let on = point_at(self.center, self.radius, a);
            let d = on.distance_to(point);
            if d < best.distance {
                let delta = if self.anticlockwise {
                    self.start_angle - a
                } else {
                    a - self.start_angle
                };
                best = PathHit {
                    point: on,
                    location: delta.rem_euclid(TWO_PI) / self.sweep,
                    distance: d,
                };
            }
        }
        best
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            center: self.center.offset(dx, dy),
            start: self.start.offset(dx, dy),
            end: self.end.offset(dx, dy),
            ..self.clone()
        }
    }
}

fn point_at(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_quarter_arc_clockwise() {
        // right of centre to below centre, clockwise in screen space
        let arc = ArcSegment::new(
            Point::new(0.0, 0.0),
            10.0,
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            false,
        );
        assert!((arc.sweep() - PI / 2.0).abs() < EPS);
        assert!((arc.length() - 5.0 * PI).abs() < EPS);
        let mid = arc.point_on_path(0.5, false);
        let r = 10.0 / 2f64.sqrt();
        assert!(mid.approx_eq(Point::new(r, r), 1e-9));
    }

    #[test]
    fn test_quarter_arc_anticlockwise_takes_long_way() {
        let arc = ArcSegment::new(
            Point::new(0.0, 0.0),
            10.0,
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            true,
        );
        assert!((arc.sweep() - 3.0 * PI / 2.0).abs() < EPS);
        let mid = arc.point_on_path(0.5, false);
        let r = 10.0 / 2f64.sqrt();
        assert!(mid.approx_eq(Point::new(-r, -r), 1e-9));
    }

    #[test]
    fn test_full_circle_length_and_ends() {
        let arc = ArcSegment::full_circle(Point::new(50.0, 50.0), 25.0, PI / 2.0, false);
        assert!((arc.length() - 50.0 * PI).abs() < EPS);
        assert_eq!(arc.start(), arc.end());
        let b = arc.bounds().to_rect();
        assert!((b.width - 50.0).abs() < 1e-9);
        assert!((b.height - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_along_path_moves_by_arc_length() {
        let arc = ArcSegment::full_circle(Point::new(0.0, 0.0), 10.0, 0.0, false);
        let p = arc.point_along_path_from(0.0, 10.0 * PI / 2.0, false);
        assert!(p.approx_eq(Point::new(0.0, 10.0), 1e-9));
    }

    #[test]
    fn test_closest_point_on_arc() {
        let arc = ArcSegment::full_circle(Point::new(0.0, 0.0), 10.0, 0.0, false);
        let hit = arc.find_closest_point_on_path(Point::new(0.0, 20.0));
        assert!(hit.point.approx_eq(Point::new(0.0, 10.0), 1e-9));
        assert!((hit.distance - 10.0).abs() < 1e-9);
        assert!((hit.location - 0.25).abs() < 1e-9);
    }
}
