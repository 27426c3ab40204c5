//! Orthogonal routing with optional rounded corners
//!
//! The route is picked from a fixed case table keyed on how the two anchor
//! orientations relate ([`OrientationClass`]), which axis the source leaves
//! along and which quadrant the target lies in. There is no obstacle
//! avoidance: the waypoints only depend on the two ends and their stubs.

use crate::geom::Point;
use crate::segment::{ArcSegment, Segment};
use crate::spec::Options;
use crate::types::Axis;

use super::{ConnectorError, ConnectorParams, OrientationClass, PaintInfo, PathBuilder, Router};

/// Stub used when the connector options give none
pub const DEFAULT_STUB: f64 = 30.0;

/// Quadrant lookup for perpendicular routes, indexed by source axis, then
/// the sign of the source and target orientation components
const PERPENDICULAR_X: [[[usize; 4]; 2]; 2] = [[[1, 2, 3, 4], [2, 1, 4, 3]], [[4, 3, 2, 1], [3, 4, 1, 2]]];
const PERPENDICULAR_Y: [[[usize; 4]; 2]; 2] = [[[3, 2, 1, 4], [2, 3, 4, 1]], [[4, 1, 2, 3], [1, 4, 3, 2]]];

#[derive(Debug, Clone, PartialEq)]
pub struct FlowchartRouter {
    /// Where the middle leg sits between the two stubs, 0..=1
    midpoint: f64,
    corner_radius: f64,
}

impl Default for FlowchartRouter {
    fn default() -> Self {
        Self {
            midpoint: 0.5,
            corner_radius: 0.0,
        }
    }
}

impl FlowchartRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_midpoint(mut self, midpoint: f64) -> Self {
        self.midpoint = midpoint;
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn from_options(options: &Options) -> Result<Self, ConnectorError> {
        let mut router = Self::new();
        if let Some(midpoint) = options.number("midpoint")? {
            router.midpoint = midpoint;
        }
        if let Some(radius) = options.number("cornerRadius")? {
            router.corner_radius = radius;
        }
        Ok(router)
    }

    pub fn midpoint(&self) -> f64 {
        self.midpoint
    }

    pub fn corner_radius(&self) -> f64 {
        self.corner_radius
    }

    /// Emit the runs as straight segments, rounding corners if configured
    fn write(&self, runs: &[(Point, Point)], path: &mut PathBuilder) {
        if self.corner_radius <= 0.0 {
            for (a, b) in runs {
                path.straight(*a, *b);
            }
            return;
        }

        let Some(&first) = runs.first() else {
            return;
        };
        let mut current = first;
        for &following in &runs[1..] {
            let mut next = following;
            if is_vertical(&current) != is_vertical(&next) {
                let (cdx, cdy) = direction(&current);
                let (ndx, ndy) = direction(&next);
                let shortest = run_length(&current).min(run_length(&next));
                let r = self.corner_radius.min(shortest / 2.0);

                current.1 = current.1.offset(-cdx * r, -cdy * r);
                next.0 = next.0.offset(ndx * r, ndy * r);

                let anticlockwise = (cdy == ndx && ndx == 1.0)
                    || (cdy == ndx && ndx == 0.0 && cdx != ndy)
                    || (cdy == ndx && ndx == -1.0);
                let sgn_y = if next.0.y > current.1.y { 1 } else { -1 };
                let sgn_x = if next.0.x > current.1.x { 1 } else { -1 };
                let sgn_equal = sgn_y == sgn_x;
                let center = if sgn_equal == anticlockwise {
                    Point::new(next.0.x, current.1.y)
                } else {
                    Point::new(current.1.x, next.0.y)
                };

                path.straight(current.0, current.1);
                path.push(Segment::Arc(ArcSegment::new(
                    center,
                    r,
                    current.1,
                    next.0,
                    anticlockwise,
                )));
            } else {
                path.straight(current.0, current.1);
            }
            current = next;
        }
        path.straight(current.0, current.1);
    }
}

impl Router for FlowchartRouter {
    fn name(&self) -> &str {
        "Flowchart"
    }

    fn axis_aligned(&self) -> bool {
        true
    }

    fn route(&self, info: &PaintInfo, params: &ConnectorParams, path: &mut PathBuilder) {
        let [start_stub, end_stub] = stubs(info);
        let mid = Point::new(
            info.start_stub.x + (info.end_stub.x - info.start_stub.x) * self.midpoint,
            info.start_stub.y + (info.end_stub.y - info.start_stub.y) * self.midpoint,
        );

        let waypoints = match info.class {
            OrientationClass::Perpendicular => perpendicular(info, mid),
            OrientationClass::Orthogonal => orthogonal(info, start_stub, end_stub),
            OrientationClass::Opposite => opposite(info, params, start_stub, end_stub, mid),
        };

        let mut runs = Runs::new(info.start());
        runs.to(start_stub);
        for p in waypoints {
            runs.to(p);
        }
        runs.to(end_stub);
        runs.to(info.end());

        self.write(&runs.coalesced(), path);
    }
}

/// Consecutive waypoints, skipping repeats
struct Runs {
    current: Point,
    runs: Vec<(Point, Point)>,
}

impl Runs {
    fn new(start: Point) -> Self {
        Self {
            current: start,
            runs: Vec::new(),
        }
    }

    fn to(&mut self, p: Point) {
        if p == self.current {
            return;
        }
        self.runs.push((self.current, p));
        self.current = p;
    }

    /// Merge neighbouring runs heading the same way
    fn coalesced(self) -> Vec<(Point, Point)> {
        let mut out: Vec<(Point, Point)> = Vec::with_capacity(self.runs.len());
        for run in self.runs {
            match out.last_mut() {
                Some(prev) if same_direction(prev, &run) => prev.1 = run.1,
                _ => out.push(run),
            }
        }
        out
    }
}

fn is_vertical(run: &(Point, Point)) -> bool {
    run.0.x == run.1.x
}

fn run_length(run: &(Point, Point)) -> f64 {
    run.0.distance_to(run.1)
}

fn sign(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else if v == 0.0 {
        0.0
    } else {
        1.0
    }
}

fn direction(run: &(Point, Point)) -> (f64, f64) {
    (sign(run.1.x - run.0.x), sign(run.1.y - run.0.y))
}

fn same_direction(a: &(Point, Point), b: &(Point, Point)) -> bool {
    let (ax, ay) = (a.1.x - a.0.x, a.1.y - a.0.y);
    let (bx, by) = (b.1.x - b.0.x, b.1.y - b.0.y);
    let cross = ax * by - ay * bx;
    let dot = ax * bx + ay * by;
    dot > 0.0 && cross.abs() <= 1e-9 * run_length(a) * run_length(b)
}

/// Point from a coordinate along the source axis and one across it
fn on_axis(axis: Axis, along: f64, across: f64) -> Point {
    match axis {
        Axis::X => Point::new(along, across),
        Axis::Y => Point::new(across, along),
    }
}

fn along(axis: Axis, p: Point) -> f64 {
    match axis {
        Axis::X => p.x,
        Axis::Y => p.y,
    }
}

fn across(axis: Axis, p: Point) -> f64 {
    match axis {
        Axis::X => p.y,
        Axis::Y => p.x,
    }
}

fn source_component(info: &PaintInfo) -> f64 {
    match info.source_axis {
        Axis::X => info.so.dx,
        Axis::Y => info.so.dy,
    }
}

/// Where the stubs end; opposite ends that overlap meet halfway unless
/// stubs must be respected
fn stubs(info: &PaintInfo) -> [Point; 2] {
    let common = [info.start_stub, info.end_stub];
    if info.class != OrientationClass::Opposite || info.always_respect_stubs {
        return common;
    }
    let axis = info.source_axis;
    let so = source_component(info);
    let (s, t) = (along(axis, info.start()), along(axis, info.end()));
    let (ss, es) = (along(axis, info.start_stub), along(axis, info.end_stub));
    let in_proximity = (so == 1.0 && ((ss > es && t > ss) || (s > es && t > s)))
        || (so == -1.0 && ((ss < es && t < ss) || (s < es && t < s)));
    if !in_proximity {
        return common;
    }
    let mid = (s + t) / 2.0;
    [
        on_axis(axis, mid, across(axis, info.start_stub)),
        on_axis(axis, mid, across(axis, info.end_stub)),
    ]
}

fn perpendicular(info: &PaintInfo, mid: Point) -> Vec<Point> {
    let axis = info.source_axis;
    let (so, to, table) = match axis {
        Axis::X => (info.so.dx, info.to.dy, &PERPENDICULAR_X),
        Axis::Y => (info.so.dy, info.to.dx, &PERPENDICULAR_Y),
    };
    let index = |v: f64| {
        if v == 1.0 {
            Some(1)
        } else if v == -1.0 {
            Some(0)
        } else {
            None
        }
    };
    let (Some(si), Some(ti)) = (index(so), index(to)) else {
        return Vec::new();
    };
    let quadrants = table[si][ti];

    let (ss, es) = (info.start_stub, info.end_stub);
    let (stub1, stub2) = if si == 0 {
        (along(axis, ss), along(axis, es))
    } else {
        (along(axis, es), along(axis, ss))
    };
    let (other_start, other_end) = (across(axis, ss), across(axis, es));
    let other_flipped = (to == -1.0 && other_end < other_start) || (to == 1.0 && other_end > other_start);

    let mid_lines = || match axis {
        Axis::X => vec![Point::new(mid.x, ss.y), Point::new(mid.x, es.y)],
        Axis::Y => vec![Point::new(ss.x, mid.y), Point::new(es.x, mid.y)],
    };
    let lines_to_end = || match axis {
        Axis::X => vec![Point::new(es.x, ss.y)],
        Axis::Y => vec![Point::new(ss.x, es.y)],
    };
    let start_to_end = || match axis {
        Axis::X => vec![Point::new(ss.x, es.y), es],
        Axis::Y => vec![Point::new(es.x, ss.y), es],
    };
    let start_to_mid_to_end = || match axis {
        Axis::X => vec![Point::new(ss.x, mid.y), Point::new(es.x, mid.y), es],
        Axis::Y => vec![Point::new(mid.x, ss.y), Point::new(mid.x, es.y), es],
    };

    let q = info.segment;
    if q == quadrants[3] || (q == quadrants[2] && other_flipped) {
        mid_lines()
    } else if q == quadrants[2] && stub2 < stub1 {
        lines_to_end()
    } else if (q == quadrants[2] && stub2 >= stub1) || (q == quadrants[1] && !other_flipped) {
        start_to_mid_to_end()
    } else if q == quadrants[0] || (q == quadrants[1] && other_flipped) {
        start_to_end()
    } else {
        Vec::new()
    }
}

fn orthogonal(info: &PaintInfo, start_stub: Point, end_stub: Point) -> Vec<Point> {
    let axis = info.source_axis;
    let (ss, oss) = (along(axis, start_stub), across(axis, start_stub));
    let (es, oes) = (along(axis, end_stub), across(axis, end_stub));
    let extent = if source_component(info) == -1.0 {
        ss.min(es)
    } else {
        ss.max(es)
    };
    vec![
        on_axis(axis, extent, oss),
        on_axis(axis, extent, oes),
        on_axis(axis, es, oes),
    ]
}

fn opposite(
    info: &PaintInfo,
    params: &ConnectorParams,
    start_stub: Point,
    end_stub: Point,
    mid: Point,
) -> Vec<Point> {
    let axis = info.source_axis;
    let so = source_component(info);
    let (ss, oss) = (along(axis, start_stub), across(axis, start_stub));
    let es = along(axis, end_stub);

    if params.is_loopback() {
        // run around the far side of the element
        let source = &params.source;
        let (rel, size) = match axis {
            Axis::X => (source.location.rel.y, source.rect.height),
            Axis::Y => (source.location.rel.x, source.rect.width),
        };
        let clear = oss + (1.0 - rel) * size + info.max_stub();
        return vec![on_axis(axis, ss, clear), on_axis(axis, es, clear)];
    }

    let exceeds = match axis {
        Axis::X => info.x_exceeds_stubs,
        Axis::Y => info.y_exceeds_stubs,
    };
    let (mid_along, mid_across) = (along(axis, mid), across(axis, mid));
    if !exceeds || (so == 1.0 && ss > es) || (so == -1.0 && ss < es) {
        vec![on_axis(axis, ss, mid_across), on_axis(axis, es, mid_across)]
    } else if (so == 1.0 && ss < es) || (so == -1.0 && ss > es) {
        vec![
            on_axis(axis, mid_along, across(axis, info.start())),
            on_axis(axis, mid_along, across(axis, info.end())),
        ]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::anchor::AnchorLocation;
    use crate::connector::tests::end;
    use crate::connector::{Connector, ConnectorEnd, ConnectorOptions};
    use crate::geom::Rect;
    use crate::types::{Face, Orientation};

    fn flowchart(router: FlowchartRouter) -> Connector {
        Connector::new(router, ConnectorOptions::new().with_stub(DEFAULT_STUB))
    }

    fn assert_continuous(c: &Connector) {
        for pair in c.segments().windows(2) {
            assert!(
                pair[0].end().approx_eq(pair[1].start(), 1e-9),
                "gap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    fn offset_boxes() -> ConnectorParams {
        ConnectorParams::new(
            end("a", Rect::new(0.0, 0.0, 100.0, 50.0), (1.0, 0.5), Some(Face::Right)),
            end("b", Rect::new(300.0, 200.0, 100.0, 50.0), (0.0, 0.5), Some(Face::Left)),
        )
    }

    #[test]
    fn test_aligned_boxes_give_single_run() {
        let params = ConnectorParams::new(
            end("a", Rect::new(0.0, 0.0, 100.0, 50.0), (1.0, 0.5), Some(Face::Right)),
            end("b", Rect::new(300.0, 0.0, 100.0, 50.0), (0.0, 0.5), Some(Face::Left)),
        );
        let mut c = flowchart(FlowchartRouter::new());
        c.compute(&params);
        assert_eq!(c.segments().len(), 1);
        assert_eq!(c.source_point(), Some(Point::new(100.0, 25.0)));
        assert_eq!(c.target_point(), Some(Point::new(300.0, 25.0)));
    }

    #[test]
    fn test_opposite_offset_uses_middle_leg() {
        let mut c = flowchart(FlowchartRouter::new());
        c.compute(&offset_boxes());
        let points: Vec<(Point, Point)> = c.segments().iter().map(|s| (s.start(), s.end())).collect();
        assert_eq!(
            points,
            vec![
                (Point::new(100.0, 25.0), Point::new(200.0, 25.0)),
                (Point::new(200.0, 25.0), Point::new(200.0, 225.0)),
                (Point::new(200.0, 225.0), Point::new(300.0, 225.0)),
            ]
        );
        assert_eq!(c.length(), 400.0);
    }

    #[test]
    fn test_midpoint_moves_middle_leg() {
        let mut c = flowchart(FlowchartRouter::new().with_midpoint(0.25));
        c.compute(&offset_boxes());
        // stubs end at x=130 and x=270
        assert_eq!(c.segments()[1].start(), Point::new(165.0, 25.0));
    }

    #[test]
    fn test_rounded_corners() {
        let mut c = flowchart(FlowchartRouter::new().with_corner_radius(10.0));
        c.compute(&offset_boxes());
        let kinds: Vec<&str> = c.segments().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec!["Straight", "Arc", "Straight", "Arc", "Straight"]);
        assert_continuous(&c);
        assert!((c.length() - (360.0 + 10.0 * PI)).abs() < 1e-9);
        assert_eq!(c.target_point(), Some(Point::new(300.0, 225.0)));
    }

    #[test]
    fn test_perpendicular_l_shape() {
        let params = ConnectorParams::new(
            end("a", Rect::new(0.0, 0.0, 100.0, 50.0), (1.0, 0.5), Some(Face::Right)),
            end("b", Rect::new(300.0, 200.0, 100.0, 50.0), (0.5, 0.0), Some(Face::Top)),
        );
        let mut c = flowchart(FlowchartRouter::new());
        c.compute(&params);
        assert_continuous(&c);
        assert_eq!(c.segments().len(), 2);
        assert_eq!(c.segments()[0].end(), Point::new(350.0, 25.0));
        assert_eq!(c.target_point(), Some(Point::new(350.0, 200.0)));
    }

    #[test]
    fn test_tilted_orientations_snap_to_axes() {
        let tilted = |element: &str, rect: Rect, point: Point, dx: f64, dy: f64| {
            let rel = Point::new((point.x - rect.x) / rect.width, (point.y - rect.y) / rect.height);
            ConnectorEnd::new(AnchorLocation::new(point, rel, Orientation::new(dx, dy)), element, rect)
        };
        let params = ConnectorParams::new(
            tilted("a", Rect::new(0.0, 0.0, 100.0, 100.0), Point::new(90.0, 80.0), 0.8, 0.6),
            tilted("b", Rect::new(300.0, 250.0, 100.0, 100.0), Point::new(310.0, 270.0), -0.8, -0.6),
        );
        let mut c = flowchart(FlowchartRouter::new());
        c.compute(&params);
        let points: Vec<(Point, Point)> = c.segments().iter().map(|s| (s.start(), s.end())).collect();
        assert_eq!(
            points,
            vec![
                (Point::new(90.0, 80.0), Point::new(200.0, 80.0)),
                (Point::new(200.0, 80.0), Point::new(200.0, 270.0)),
                (Point::new(200.0, 270.0), Point::new(310.0, 270.0)),
            ]
        );
    }

    #[test]
    fn test_same_face_self_loop_has_length() {
        let rect = Rect::new(0.0, 100.0, 90.0, 30.0);
        let params = ConnectorParams::new(
            end("a", rect, (2.0 / 3.0, 0.0), Some(Face::Top)),
            end("a", rect, (1.0 / 3.0, 0.0), Some(Face::Top)),
        );
        let mut c = flowchart(FlowchartRouter::new());
        c.compute(&params);
        assert_continuous(&c);
        assert!((c.length() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_faces_of_one_element_go_around() {
        let rect = Rect::new(100.0, 100.0, 80.0, 40.0);
        let params = ConnectorParams::new(
            end("a", rect, (1.0, 0.5), Some(Face::Right)),
            end("a", rect, (0.0, 0.5), Some(Face::Left)),
        );
        let mut c = flowchart(FlowchartRouter::new());
        c.compute(&params);
        assert_continuous(&c);
        let bottom = c.bounds().bottom();
        assert!(bottom > rect.bottom(), "route should pass below the element");
    }

    #[test]
    fn test_from_options() {
        let options = Options::new()
            .with("cornerRadius", crate::spec::Value::Number(4.0))
            .with("midpoint", crate::spec::Value::Number(0.3));
        let router = FlowchartRouter::from_options(&options).unwrap();
        assert_eq!(router.corner_radius(), 4.0);
        assert_eq!(router.midpoint(), 0.3);
    }
}
