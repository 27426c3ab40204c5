//! Cubic Bezier math: evaluation, nearest point and arc-length walking
//!
//! Arc length is approximated by walking the curve at a fixed parametric
//! step and summing chord lengths. Nearest-point search isolates the roots of
//! the 5th-degree distance polynomial by recursive subdivision.

use super::Point;

/// Four control points: start, first control, second control, end
pub type CubicCurve = [Point; 4];

/// Parametric step used for arc-length walking
pub const STEP: f64 = 0.005;

const MAX_RECURSION: u32 = 64;
const MAX_WALK_STEPS: usize = 1_000_000;

/// Z weights for the cubic case of the distance polynomial
const Z: [[f64; 4]; 3] = [[1.0, 0.6, 0.3, 0.1], [0.4, 0.6, 0.6, 0.4], [0.1, 0.3, 0.6, 1.0]];

/// Result of a nearest-point query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveHit {
    pub point: Point,
    /// Parametric location of `point` on the curve
    pub location: f64,
    /// Distance from the query point to `point`
    pub distance: f64,
}

/// True when all control points coincide
pub fn is_point(curve: &CubicCurve) -> bool {
    curve.iter().all(|p| *p == curve[0])
}

/// Evaluate the curve at `t` using De Casteljau's algorithm
pub fn point_on_curve(curve: &CubicCurve, t: f64) -> Point {
    de_casteljau(curve, t).0
}

/// Split a control polygon of any degree at `t`
///
/// Returns the point on the curve plus the left and right sub-polygons.
fn de_casteljau(points: &[Point], t: f64) -> (Point, Vec<Point>, Vec<Point>) {
    let degree = points.len() - 1;
    let mut rows: Vec<Vec<Point>> = vec![points.to_vec()];
    for i in 1..=degree {
        let prev = &rows[i - 1];
        let row = (0..=degree - i)
            .map(|j| {
                Point::new(
                    (1.0 - t) * prev[j].x + t * prev[j + 1].x,
                    (1.0 - t) * prev[j].y + t * prev[j + 1].y,
                )
            })
            .collect();
        rows.push(row);
    }
    let left = (0..=degree).map(|j| rows[j][0]).collect();
    let right = (0..=degree).map(|j| rows[degree - j][j]).collect();
    (rows[degree][0], left, right)
}

/// First derivative of the curve at `t`
pub fn derivative(curve: &CubicCurve, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = 3.0 * mt * mt;
    let b = 6.0 * mt * t;
    let c = 3.0 * t * t;
    Point::new(
        a * (curve[1].x - curve[0].x) + b * (curve[2].x - curve[1].x) + c * (curve[3].x - curve[2].x),
        a * (curve[1].y - curve[0].y) + b * (curve[2].y - curve[1].y) + c * (curve[3].y - curve[2].y),
    )
}

/// Tangent direction at `t`, as an angle in radians
///
/// Where the derivative vanishes (coincident control points at an end) the
/// chord towards the far end is used instead.
pub fn gradient_at_point(curve: &CubicCurve, t: f64) -> f64 {
    let d = derivative(curve, t);
    if d.x == 0.0 && d.y == 0.0 {
        let p = point_on_curve(curve, t);
        let towards = if t < 0.5 { curve[3] } else { curve[0] };
        let (dx, dy) = if t < 0.5 {
            (towards.x - p.x, towards.y - p.y)
        } else {
            (p.x - towards.x, p.y - towards.y)
        };
        return dy.atan2(dx);
    }
    d.y.atan2(d.x)
}

/// Line of `length` perpendicular to the curve, centred `distance` pixels from `location`
pub fn perpendicular_to_curve_at(
    curve: &CubicCurve,
    location: f64,
    length: f64,
    distance: f64,
) -> [Point; 2] {
    let (p, loc) = walk(curve, location, distance);
    let angle = gradient_at_point(curve, loc);
    let nx = -angle.sin() * length / 2.0;
    let ny = angle.cos() * length / 2.0;
    [Point::new(p.x + nx, p.y + ny), Point::new(p.x - nx, p.y - ny)]
}

/// Point `distance` pixels along the curve from `location` (negative walks back)
pub fn point_along_curve_from(curve: &CubicCurve, location: f64, distance: f64) -> Point {
    walk(curve, location, distance).0
}

/// Parametric location `distance` pixels along the curve from `location`
pub fn location_along_curve_from(curve: &CubicCurve, location: f64, distance: f64) -> f64 {
    walk(curve, location, distance).1
}

fn walk(curve: &CubicCurve, location: f64, distance: f64) -> (Point, f64) {
    if is_point(curve) {
        return (curve[0], location);
    }
    let direction = if distance > 0.0 { 1.0 } else { -1.0 };
    let target = distance.abs();
    let mut prev = point_on_curve(curve, location);
    let mut current = prev;
    let mut tally = 0.0;
    let mut loc = location;
    let mut steps = 0;
    while tally < target && steps < MAX_WALK_STEPS {
        loc += STEP * direction;
        current = point_on_curve(curve, loc);
        tally += current.distance_to(prev);
        prev = current;
        steps += 1;
    }
    (current, loc)
}

/// Approximate arc length, summing chords at [`STEP`] intervals
pub fn length(curve: &CubicCurve) -> f64 {
    if is_point(curve) {
        return 0.0;
    }
    let steps = (1.0 / STEP).round() as usize;
    let mut prev = curve[0];
    let mut tally = 0.0;
    for i in 1..=steps {
        let current = point_on_curve(curve, i as f64 * STEP);
        tally += current.distance_to(prev);
        prev = current;
    }
    tally
}

/// Nearest point on the curve to `point`
pub fn nearest_point_on_curve(point: Point, curve: &CubicCurve) -> CurveHit {
    let location = distance_from_curve(point, curve).0;
    let on_curve = point_on_curve(curve, location);
    CurveHit {
        point: on_curve,
        location,
        distance: on_curve.distance_to(point),
    }
}

/// Parametric location of the nearest point, and the distance to it
pub fn distance_from_curve(point: Point, curve: &CubicCurve) -> (f64, f64) {
    let w = convert_to_bezier_form(point, curve);
    let mut candidates = Vec::new();
    find_roots(&w, &mut candidates, 0);

    let sq = |p: Point| (p.x - point.x).powi(2) + (p.y - point.y).powi(2);
    let mut best_t = 0.0;
    let mut best = sq(curve[0]);
    for t in candidates {
        let d = sq(point_on_curve(curve, t));
        if d < best {
            best = d;
            best_t = t;
        }
    }
    let d = sq(curve[3]);
    if d < best {
        best = d;
        best_t = 1.0;
    }
    (best_t, best.sqrt())
}

/// Express `(B(t) - P) . B'(t)` as a degree-5 Bezier with x = t
fn convert_to_bezier_form(point: Point, curve: &CubicCurve) -> [Point; 6] {
    let c: Vec<Point> = curve
        .iter()
        .map(|p| Point::new(p.x - point.x, p.y - point.y))
        .collect();
    let d: Vec<Point> = (0..3)
        .map(|i| {
            Point::new(
                3.0 * (curve[i + 1].x - curve[i].x),
                3.0 * (curve[i + 1].y - curve[i].y),
            )
        })
        .collect();

    let mut w = [Point::origin(); 6];
    for (i, wp) in w.iter_mut().enumerate() {
        wp.x = i as f64 / 5.0;
    }
    for k in 0..=5usize {
        let lb = k.saturating_sub(2);
        let ub = k.min(3);
        for i in lb..=ub {
            let j = k - i;
            let cd = d[j].x * c[i].x + d[j].y * c[i].y;
            w[i + j].y += cd * Z[j][i];
        }
    }
    w
}

fn find_roots(w: &[Point], roots: &mut Vec<f64>, depth: u32) {
    let degree = w.len() - 1;
    match crossing_count(w) {
        0 => return,
        1 => {
            if depth >= MAX_RECURSION {
                roots.push((w[0].x + w[degree].x) / 2.0);
                return;
            }
            if is_flat_enough(w) {
                roots.push(x_intercept(w));
                return;
            }
        }
        _ => {}
    }
    if depth >= MAX_RECURSION {
        roots.push((w[0].x + w[degree].x) / 2.0);
        return;
    }
    let (_, left, right) = de_casteljau(w, 0.5);
    find_roots(&left, roots, depth + 1);
    find_roots(&right, roots, depth + 1);
}

fn sign(v: f64) -> i8 {
    if v < 0.0 {
        -1
    } else if v > 0.0 {
        1
    } else {
        0
    }
}

fn crossing_count(w: &[Point]) -> usize {
    let mut count = 0;
    let mut old = sign(w[0].y);
    for p in &w[1..] {
        let s = sign(p.y);
        if s != old {
            count += 1;
        }
        old = s;
    }
    count
}

fn is_flat_enough(w: &[Point]) -> bool {
    let degree = w.len() - 1;
    let tolerance = 2f64.powi(-(MAX_RECURSION as i32) - 1);
    let a = w[0].y - w[degree].y;
    let b = w[degree].x - w[0].x;
    let c = w[0].x * w[degree].y - w[degree].x * w[0].y;

    let mut above: f64 = 0.0;
    let mut below: f64 = 0.0;
    for p in &w[1..degree] {
        let value = a * p.x + b * p.y + c;
        if value > above {
            above = value;
        } else if value < below {
            below = value;
        }
    }
    // intercepts of the two bounding lines with y = 0
    let i1 = -(c - above) / a;
    let i2 = -(c - below) / a;
    let error = (i1.max(i2) - i1.min(i2)).abs();
    error < tolerance
}

fn x_intercept(w: &[Point]) -> f64 {
    let degree = w.len() - 1;
    let xnm = w[degree].x - w[0].x;
    let ynm = w[degree].y - w[0].y;
    let s = w[0].x - xnm * w[0].y / ynm;
    if s.is_finite() {
        s
    } else {
        (w[0].x + w[degree].x) / 2.0
    }
}
