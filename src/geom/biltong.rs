//! Planar helpers on point pairs and rectangles
//!
//! Screen coordinates throughout: y grows downwards, so quadrant 1 is
//! "up and to the right" and angles from [`theta`] run clockwise.

use std::f64::consts::PI;

use super::{Point, Rect};

const SEGMENT_MULTIPLIERS: [[f64; 2]; 5] = [[0.0, 0.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0], [-1.0, -1.0]];
const INVERSE_SEGMENT_MULTIPLIERS: [[f64; 2]; 5] =
    [[0.0, 0.0], [-1.0, -1.0], [-1.0, 1.0], [1.0, 1.0], [1.0, -1.0]];

/// Slope of the line from `p1` to `p2`
///
/// Vertical lines give `+inf` when heading down and `-inf` otherwise;
/// horizontal lines give `0.0` heading right and `-0.0` heading left.
pub fn gradient(p1: Point, p2: Point) -> f64 {
    if p2.x == p1.x {
        if p2.y > p1.y {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    } else if p2.y == p1.y {
        if p2.x > p1.x {
            0.0
        } else {
            -0.0
        }
    } else {
        (p2.y - p1.y) / (p2.x - p1.x)
    }
}

/// Slope of the normal to the line from `p1` to `p2`
pub fn normal(p1: Point, p2: Point) -> f64 {
    -1.0 / gradient(p1, p2)
}

/// Quadrant of `p2` relative to `p1`, numbered 1..=4 clockwise from upper-right
///
/// A point straight below counts as quadrant 2, straight above (or equal) as 1.
pub fn quadrant(p1: Point, p2: Point) -> usize {
    if p2.x > p1.x {
        if p2.y > p1.y {
            2
        } else {
            1
        }
    } else if p2.x == p1.x {
        if p2.y > p1.y {
            2
        } else {
            1
        }
    } else if p2.y > p1.y {
        3
    } else {
        4
    }
}

/// Angle of the line from `p1` to `p2`, normalized to `[0, 2π)`
pub fn theta(p1: Point, p2: Point) -> f64 {
    let mut t = gradient(p1, p2).atan();
    let s = quadrant(p1, p2);
    if s == 4 || s == 3 {
        t += PI;
    }
    if t < 0.0 {
        t += 2.0 * PI;
    }
    t
}

pub fn line_length(p1: Point, p2: Point) -> f64 {
    ((p2.y - p1.y).powi(2) + (p2.x - p1.x).powi(2)).sqrt()
}

/// Point at `distance` from `from` along the line towards `to`
///
/// Negative distances go the other way, i.e. before `from`.
pub fn point_on_line(from: Point, to: Point, distance: f64) -> Point {
    let m = gradient(from, to);
    let s = quadrant(from, to);
    let multiplier = if distance > 0.0 {
        SEGMENT_MULTIPLIERS[s]
    } else {
        INVERSE_SEGMENT_MULTIPLIERS[s]
    };
    let t = m.atan();
    let y = (distance * t.sin()).abs() * multiplier[1];
    let x = (distance * t.cos()).abs() * multiplier[0];
    Point::new(from.x + x, from.y + y)
}

/// Line of total `length` perpendicular to `from -> to`, centred on `to`
pub fn perpendicular_line_to(from: Point, to: Point, length: f64) -> [Point; 2] {
    let m = gradient(from, to);
    let theta2 = (-1.0 / m).atan();
    let y = length / 2.0 * theta2.sin();
    let x = length / 2.0 * theta2.cos();
    [Point::new(to.x + x, to.y + y), Point::new(to.x - x, to.y - y)]
}

/// Whether two rectangles overlap; touching edges count as overlapping
pub fn intersects(r1: &Rect, r2: &Rect) -> bool {
    r1.x <= r2.right() && r2.x <= r1.right() && r1.y <= r2.bottom() && r2.y <= r1.bottom()
}

/// Whether `outer` encloses `inner`
pub fn encloses(outer: &Rect, inner: &Rect, allow_shared_edges: bool) -> bool {
    let c = |v1: f64, v2: f64, v3: f64, v4: f64| {
        if allow_shared_edges {
            v1 <= v2 && v3 >= v4
        } else {
            v1 < v2 && v3 > v4
        }
    };
    c(outer.x, inner.x, outer.right(), inner.right())
        && c(outer.y, inner.y, outer.bottom(), inner.bottom())
}

/// Intersection of two line segments, if they cross
pub fn line_intersection(a: [Point; 2], b: [Point; 2]) -> Option<Point> {
    let r = Point::new(a[1].x - a[0].x, a[1].y - a[0].y);
    let s = Point::new(b[1].x - b[0].x, b[1].y - b[0].y);
    let denom = r.x * s.y - r.y * s.x;
    if denom == 0.0 {
        return None;
    }
    let qp = Point::new(b[0].x - a[0].x, b[0].y - a[0].y);
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(a[0].x + t * r.x, a[0].y + t * r.y))
    } else {
        None
    }
}

/// Points where a line segment crosses the edges of a rectangle
pub fn box_intersection(rect: &Rect, line: [Point; 2]) -> Vec<Point> {
    let tl = rect.origin();
    let tr = Point::new(rect.right(), rect.y);
    let br = Point::new(rect.right(), rect.bottom());
    let bl = Point::new(rect.x, rect.bottom());
    let mut hits: Vec<Point> = Vec::new();
    for edge in [[tl, tr], [tr, br], [br, bl], [bl, tl]] {
        if let Some(p) = line_intersection(line, edge) {
            if !hits.iter().any(|h| h.approx_eq(p, 1e-9)) {
                hits.push(p);
            }
        }
    }
    hits
}
