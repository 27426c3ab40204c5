//! Connectors: the routed path between two anchors
//!
//! A [`Connector`] pairs shared settings ([`ConnectorOptions`]) with a
//! [`Router`] that knows one routing style. Each `compute` derives a
//! [`PaintInfo`] frame from the two anchor placements, asks the router for
//! segments in that frame, moves them onto the canvas and rebuilds the
//! table mapping a 0..=1 location to a segment.

mod bezier;
mod config;
mod error;
mod flowchart;
mod registry;
mod state_machine;
mod straight;

pub use bezier::BezierRouter;
pub use config::{ConnectorOptions, DEFAULT_LOOPBACK_RADIUS, DEFAULT_MARGIN};
pub use error::ConnectorError;
pub use flowchart::FlowchartRouter;
pub use registry::{ConnectorFactory, ConnectorRegistry};
pub use state_machine::StateMachineRouter;
pub use straight::StraightRouter;

use std::f64::consts::PI;
use std::fmt;

use crate::anchor::{ratio, AnchorLocation};
use crate::geom::biltong;
use crate::geom::{Bounds, Point, Rect};
use crate::segment::{ArcSegment, PathHit, Segment, StraightSegment};
use crate::types::{Axis, ElementId, Orientation};

/// One end of a connection, as the connector sees it
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorEnd {
    pub location: AnchorLocation,
    pub element: ElementId,
    pub rect: Rect,
}

impl ConnectorEnd {
    pub fn new(location: AnchorLocation, element: impl Into<ElementId>, rect: Rect) -> Self {
        Self {
            location,
            element: element.into(),
            rect,
        }
    }

    pub fn point(&self) -> Point {
        self.location.point
    }
}

/// Inputs to one connector computation
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorParams {
    pub source: ConnectorEnd,
    pub target: ConnectorEnd,
    pub stroke_width: f64,
}

impl ConnectorParams {
    pub fn new(source: ConnectorEnd, target: ConnectorEnd) -> Self {
        Self {
            source,
            target,
            stroke_width: 1.0,
        }
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Both ends sit on the same element
    pub fn is_loopback(&self) -> bool {
        self.source.element == self.target.element
    }
}

/// How the two anchor orientations relate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationClass {
    /// Facing each other's directions exactly (`so · to == -1`)
    Opposite,
    /// Facing the same way (`so · to == 1`)
    Orthogonal,
    /// Anything else, normally at right angles
    Perpendicular,
}

/// Connector geometry in the frame of the box spanning both anchors
///
/// Coordinates other than `x`/`y` are relative to the frame origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintInfo {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Target lies left of the source
    pub swap_x: bool,
    /// Target lies above the source
    pub swap_y: bool,
    pub so: Orientation,
    pub to: Orientation,
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
    pub mx: f64,
    pub my: f64,
    pub x_span: f64,
    pub y_span: f64,
    pub start_stub: Point,
    pub end_stub: Point,
    pub stubs: [f64; 2],
    pub always_respect_stubs: bool,
    /// Horizontal distance between the ends exceeds both stubs together
    pub x_exceeds_stubs: bool,
    pub y_exceeds_stubs: bool,
    pub class: OrientationClass,
    pub source_axis: Axis,
    /// Quadrant of the target relative to the source
    pub segment: usize,
    pub stroke_width: f64,
    pub loopback_radius: f64,
    pub margin: f64,
}

impl PaintInfo {
    pub fn prepare(params: &ConnectorParams, options: &ConnectorOptions) -> Self {
        Self::build(params, options, false)
    }

    /// Like [`PaintInfo::prepare`], with both orientations snapped to their
    /// dominant axis
    pub fn prepare_axis_aligned(params: &ConnectorParams, options: &ConnectorOptions) -> Self {
        Self::build(params, options, true)
    }

    fn build(params: &ConnectorParams, options: &ConnectorOptions, axis_aligned: bool) -> Self {
        let sp = params.source.point();
        let tp = params.target.point();
        let swap_x = tp.x < sp.x;
        let swap_y = tp.y < sp.y;
        let x = if swap_x { tp.x } else { sp.x };
        let y = if swap_y { tp.y } else { sp.y };
        let w = (tp.x - sp.x).abs();
        let h = (tp.y - sp.y).abs();

        let mut so = params.source.location.orientation;
        let mut to = params.target.location.orientation;
        // without an orientation both ends point at each other along the longer axis
        if so.is_zero() || to.is_zero() {
            if w > h {
                let d = if sp.x > tp.x { -1.0 } else { 1.0 };
                so = Orientation::new(d, 0.0);
                to = Orientation::new(-d, 0.0);
            } else {
                let d = if sp.y > tp.y { -1.0 } else { 1.0 };
                so = Orientation::new(0.0, d);
                to = Orientation::new(0.0, -d);
            }
        }
        if axis_aligned {
            so = so.snapped();
            to = to.snapped();
        }

        let [source_gap, target_gap] = options.gap;
        let [source_stub, target_stub] = options.stub;
        let sx = (if swap_x { w } else { 0.0 }) + source_gap * so.dx;
        let sy = (if swap_y { h } else { 0.0 }) + source_gap * so.dy;
        let tx = (if swap_x { 0.0 } else { w }) + target_gap * to.dx;
        let ty = (if swap_y { 0.0 } else { h }) + target_gap * to.dy;

        let dot = so.dot(&to);
        let class = if dot == -1.0 {
            OrientationClass::Opposite
        } else if dot == 1.0 {
            OrientationClass::Orthogonal
        } else {
            OrientationClass::Perpendicular
        };

        Self {
            x,
            y,
            w,
            h,
            swap_x,
            swap_y,
            so,
            to,
            sx,
            sy,
            tx,
            ty,
            mx: (sx + tx) / 2.0,
            my: (sy + ty) / 2.0,
            x_span: (tx - sx).abs(),
            y_span: (ty - sy).abs(),
            start_stub: Point::new(sx + so.dx * source_stub, sy + so.dy * source_stub),
            end_stub: Point::new(tx + to.dx * target_stub, ty + to.dy * target_stub),
            stubs: options.stub,
            always_respect_stubs: options.always_respect_stubs,
            x_exceeds_stubs: (sx - tx).abs() > source_stub + target_stub,
            y_exceeds_stubs: (sy - ty).abs() > source_stub + target_stub,
            class,
            source_axis: if so.dx == 0.0 { Axis::Y } else { Axis::X },
            segment: biltong::quadrant(sp, tp),
            stroke_width: params.stroke_width,
            loopback_radius: options.loopback_radius,
            margin: options.margin,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Gap-adjusted start of the path, in frame coordinates
    pub fn start(&self) -> Point {
        Point::new(self.sx, self.sy)
    }

    /// Gap-adjusted end of the path, in frame coordinates
    pub fn end(&self) -> Point {
        Point::new(self.tx, self.ty)
    }

    /// Canvas point in frame coordinates
    pub fn local(&self, p: Point) -> Point {
        Point::new(p.x - self.x, p.y - self.y)
    }

    pub fn max_stub(&self) -> f64 {
        self.stubs[0].max(self.stubs[1])
    }
}

/// Collects a router's segments, dropping pieces of zero length
#[derive(Debug, Default)]
pub struct PathBuilder {
    segments: Vec<Segment>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: Segment) {
        if segment.length() > 0.0 {
            self.segments.push(segment);
        }
    }

    pub fn straight(&mut self, from: Point, to: Point) {
        self.push(Segment::Straight(StraightSegment::new(from, to)));
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn finish(self) -> Vec<Segment> {
        self.segments
    }
}

/// Full circle sitting `margin` above `anchor`, starting and ending at its lowest point
pub fn loopback_circle(anchor: Point, radius: f64, margin: f64, clockwise: bool) -> Segment {
    let center = Point::new(anchor.x, anchor.y - margin - radius);
    Segment::Arc(ArcSegment::full_circle(center, radius, PI / 2.0, !clockwise))
}

/// A routing style
pub trait Router: fmt::Debug {
    /// Registered type name
    fn name(&self) -> &str;

    /// Append the path for one paint, in [`PaintInfo`] frame coordinates
    fn route(&self, info: &PaintInfo, params: &ConnectorParams, path: &mut PathBuilder);

    /// Whether routes only run horizontally and vertically
    fn axis_aligned(&self) -> bool {
        false
    }
}

/// The path of one connection
#[derive(Debug)]
pub struct Connector {
    router: Box<dyn Router>,
    options: ConnectorOptions,
    segments: Vec<Segment>,
    /// `[start, end]` of each segment as a fraction of the total length
    proportions: Vec<[f64; 2]>,
    total_length: f64,
    paint: Option<PaintInfo>,
}

impl Connector {
    pub fn new(router: impl Router + 'static, options: ConnectorOptions) -> Self {
        Self {
            router: Box::new(router),
            options,
            segments: Vec::new(),
            proportions: Vec::new(),
            total_length: 0.0,
            paint: None,
        }
    }

    pub fn type_name(&self) -> &str {
        self.router.name()
    }

    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }

    /// Rebuild the path for the given anchor placements
    ///
    /// A route of zero length becomes one zero-length straight segment, or
    /// a loopback circle when both ends are on the same element.
    pub fn compute(&mut self, params: &ConnectorParams) {
        let info = if self.router.axis_aligned() {
            PaintInfo::prepare_axis_aligned(params, &self.options)
        } else {
            PaintInfo::prepare(params, &self.options)
        };
        let mut path = PathBuilder::new();
        self.router.route(&info, params, &mut path);

        let origin = info.origin();
        let mut segments: Vec<Segment> = path
            .finish()
            .into_iter()
            .map(|s| s.translated(origin.x, origin.y))
            .collect();

        if segments.is_empty() {
            segments.push(if params.is_loopback() {
                loopback_circle(
                    params.source.point(),
                    self.options.loopback_radius,
                    self.options.margin,
                    false,
                )
            } else {
                let start = Point::new(origin.x + info.sx, origin.y + info.sy);
                Segment::Straight(StraightSegment::new(start, start))
            });
        }

        self.total_length = segments.iter().map(Segment::length).sum();
        self.proportions.clear();
        let mut acc = 0.0;
        for s in &segments {
            let start = ratio(acc, self.total_length);
            acc += s.length();
            self.proportions.push([start, ratio(acc, self.total_length)]);
        }
        self.segments = segments;
        self.paint = Some(info);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Frame from the last compute
    pub fn paint_info(&self) -> Option<&PaintInfo> {
        self.paint.as_ref()
    }

    pub fn length(&self) -> f64 {
        self.total_length
    }

    /// Canvas area covered by the path, widened by half the stroke
    pub fn bounds(&self) -> Rect {
        let mut b = Bounds::empty();
        for s in &self.segments {
            b.merge(&s.bounds());
        }
        let half = self.paint.as_ref().map_or(0.0, |p| p.stroke_width / 2.0);
        if b.is_empty() {
            return Rect::zero();
        }
        b.to_rect().inflate(half)
    }

    /// Segment index and the proportion within it for a path location
    pub fn find_segment_for_location(&self, location: f64, absolute: bool) -> Option<(usize, f64)> {
        let last = self.segments.len().checked_sub(1)?;
        let loc = if absolute {
            let from_start = if location > 0.0 {
                location
            } else {
                self.total_length + location
            };
            ratio(from_start, self.total_length)
        } else {
            location
        };
        let loc = if loc.is_nan() { 0.0 } else { loc.clamp(0.0, 1.0) };
        if loc >= 1.0 {
            return Some((last, 1.0));
        }
        for (i, [start, end]) in self.proportions.iter().enumerate() {
            if *end >= loc {
                return Some((i, ratio(loc - start, end - start).clamp(0.0, 1.0)));
            }
        }
        Some((last, 1.0))
    }

    /// Point at `location`: a 0..=1 proportion of the whole path, or pixels
    /// from the start (from the end when not positive) if `absolute`
    pub fn point_on_path(&self, location: f64, absolute: bool) -> Point {
        match self.find_segment_for_location(location, absolute) {
            Some((i, p)) => self.segments[i].point_on_path(p, false),
            None => Point::origin(),
        }
    }

    /// Direction of travel at `location`, in radians
    pub fn gradient_at_point(&self, location: f64, absolute: bool) -> f64 {
        match self.find_segment_for_location(location, absolute) {
            Some((i, p)) => self.segments[i].gradient_at_point(p, false),
            None => 0.0,
        }
    }

    /// Point `distance` pixels further along the path from `location`
    ///
    /// Walks across segment boundaries and stops at either end of the path.
    pub fn point_along_path_from(&self, location: f64, distance: f64, absolute: bool) -> Point {
        let base = if absolute {
            if location > 0.0 {
                location
            } else {
                self.total_length + location
            }
        } else {
            location * self.total_length
        };
        let target = (base + distance).clamp(0.0, self.total_length);
        self.point_on_path(ratio(target, self.total_length), false)
    }

    /// Closest point on the whole path, with its path location
    pub fn find_closest_point_on_path(&self, point: Point) -> Option<PathHit> {
        let mut best: Option<PathHit> = None;
        for (seg, [start, end]) in self.segments.iter().zip(&self.proportions) {
            let hit = seg.find_closest_point_on_path(point);
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(PathHit {
                    point: hit.point,
                    location: start + (end - start) * hit.location,
                    distance: hit.distance,
                });
            }
        }
        best
    }

    pub fn source_point(&self) -> Option<Point> {
        self.segments.first().map(Segment::start)
    }

    pub fn target_point(&self) -> Option<Point> {
        self.segments.last().map(Segment::end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Face;

    pub(super) fn end(element: &str, rect: Rect, rel: (f64, f64), face: Option<Face>) -> ConnectorEnd {
        let point = Point::new(rect.x + rel.0 * rect.width, rect.y + rel.1 * rect.height);
        let orientation = face.map_or(Orientation::ZERO, |f| f.orientation());
        ConnectorEnd::new(
            AnchorLocation::new(point, Point::new(rel.0, rel.1), orientation),
            element,
            rect,
        )
    }

    fn side_by_side() -> ConnectorParams {
        ConnectorParams::new(
            end("a", Rect::new(0.0, 0.0, 100.0, 50.0), (1.0, 0.5), Some(Face::Right)),
            end("b", Rect::new(300.0, 0.0, 100.0, 50.0), (0.0, 0.5), Some(Face::Left)),
        )
    }

    #[test]
    fn test_paint_info_frame() {
        let info = PaintInfo::prepare(&side_by_side(), &ConnectorOptions::new().with_stub(30.0));
        assert_eq!((info.x, info.y, info.w, info.h), (100.0, 25.0, 200.0, 0.0));
        assert_eq!(info.class, OrientationClass::Opposite);
        assert_eq!(info.source_axis, Axis::X);
        assert_eq!(info.start_stub, Point::new(30.0, 0.0));
        assert_eq!(info.end_stub, Point::new(170.0, 0.0));
        assert!(info.x_exceeds_stubs);
        assert_eq!(info.segment, 1);
    }

    #[test]
    fn test_paint_info_gap_and_swap() {
        let params = ConnectorParams::new(
            end("a", Rect::new(300.0, 0.0, 100.0, 50.0), (0.0, 0.5), Some(Face::Left)),
            end("b", Rect::new(0.0, 0.0, 100.0, 50.0), (1.0, 0.5), Some(Face::Right)),
        );
        let info = PaintInfo::prepare(&params, &ConnectorOptions::new().with_gap(5.0));
        assert!(info.swap_x);
        assert_eq!(info.start(), Point::new(195.0, 0.0));
        assert_eq!(info.end(), Point::new(5.0, 0.0));
    }

    #[test]
    fn test_missing_orientation_is_derived() {
        let params = ConnectorParams::new(
            end("a", Rect::new(0.0, 0.0, 10.0, 10.0), (0.5, 0.5), None),
            end("b", Rect::new(0.0, 200.0, 10.0, 10.0), (0.5, 0.5), None),
        );
        let info = PaintInfo::prepare(&params, &ConnectorOptions::new());
        assert_eq!(info.so, Orientation::new(0.0, 1.0));
        assert_eq!(info.to, Orientation::new(0.0, -1.0));
        assert_eq!(info.class, OrientationClass::Opposite);
        assert_eq!(info.source_axis, Axis::Y);
    }

    #[test]
    fn test_straight_connector_queries() {
        let mut c = Connector::new(StraightRouter, ConnectorOptions::new().with_stub(20.0));
        c.compute(&side_by_side());
        assert_eq!(c.segments().len(), 3);
        assert_eq!(c.length(), 200.0);
        assert_eq!(c.point_on_path(0.0, false), Point::new(100.0, 25.0));
        assert_eq!(c.point_on_path(1.0, false), Point::new(300.0, 25.0));
        assert!(c.point_on_path(0.5, false).approx_eq(Point::new(200.0, 25.0), 1e-9));
        assert!(c.point_on_path(50.0, true).approx_eq(Point::new(150.0, 25.0), 1e-9));
        assert!(c.point_on_path(-50.0, true).approx_eq(Point::new(250.0, 25.0), 1e-9));
        assert_eq!(c.gradient_at_point(0.5, false), 0.0);
        assert!(c
            .point_along_path_from(0.0, 120.0, false)
            .approx_eq(Point::new(220.0, 25.0), 1e-9));
        assert_eq!(c.point_along_path_from(0.9, 500.0, false), Point::new(300.0, 25.0));
        assert_eq!(c.bounds(), Rect::new(99.5, 24.5, 201.0, 1.0));

        let hit = c.find_closest_point_on_path(Point::new(150.0, 60.0)).unwrap();
        assert!(hit.point.approx_eq(Point::new(150.0, 25.0), 1e-9));
        assert!((hit.location - 0.25).abs() < 1e-9);
        assert!((hit.distance - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_lookup() {
        let mut c = Connector::new(StraightRouter, ConnectorOptions::new().with_stub(50.0));
        c.compute(&side_by_side());
        assert_eq!(c.find_segment_for_location(0.0, false), Some((0, 0.0)));
        assert_eq!(c.find_segment_for_location(1.0, false), Some((2, 1.0)));
        let (i, p) = c.find_segment_for_location(0.5, false).unwrap();
        assert_eq!(i, 1);
        assert!((p - 0.5).abs() < 1e-9);
        assert_eq!(c.find_segment_for_location(7.0, false), Some((2, 1.0)));
    }

    #[test]
    fn test_coincident_ends_give_zero_length_segment() {
        let rect_a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect_b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let params = ConnectorParams::new(
            end("a", rect_a, (1.0, 0.5), Some(Face::Right)),
            end("b", rect_b, (0.0, 0.5), Some(Face::Left)),
        );
        let mut c = Connector::new(StraightRouter, ConnectorOptions::new());
        c.compute(&params);
        assert_eq!(c.segments().len(), 1);
        assert_eq!(c.length(), 0.0);
        assert_eq!(c.point_on_path(0.5, false), Point::new(10.0, 5.0));
    }

    #[test]
    fn test_collapsed_self_loop_becomes_circle() {
        let rect = Rect::new(0.0, 100.0, 40.0, 40.0);
        let params = ConnectorParams::new(
            end("a", rect, (0.5, 0.0), Some(Face::Top)),
            end("a", rect, (0.5, 0.0), Some(Face::Top)),
        );
        let mut c = Connector::new(StraightRouter, ConnectorOptions::new());
        c.compute(&params);
        assert_eq!(c.segments()[0].kind(), "Arc");
        assert!((c.length() - 2.0 * PI * DEFAULT_LOOPBACK_RADIUS).abs() < 1e-9);
        assert!(c.point_on_path(0.0, false).approx_eq(Point::new(20.0, 95.0), 1e-9));
        assert!(c.point_on_path(0.5, false).approx_eq(Point::new(20.0, 45.0), 1e-9));
    }

    #[test]
    fn test_uncomputed_connector_is_empty() {
        let c = Connector::new(StraightRouter, ConnectorOptions::new());
        assert_eq!(c.point_on_path(0.5, false), Point::origin());
        assert_eq!(c.bounds(), Rect::zero());
        assert!(c.find_closest_point_on_path(Point::origin()).is_none());
    }
}
