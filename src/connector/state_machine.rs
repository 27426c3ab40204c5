use crate::geom::Point;
use crate::segment::{BezierSegment, Segment};
use crate::spec::Options;

use super::config::loopback_clockwise;
use super::{loopback_circle, ConnectorError, ConnectorParams, PaintInfo, PathBuilder, Router};

pub const DEFAULT_CURVINESS: f64 = 10.0;
pub const DEFAULT_PROXIMITY_LIMIT: f64 = 80.0;

/// Gently bowed curve between anchors pulled slightly off their elements
///
/// Ends closer than the proximity limit are joined with a straight-looking
/// curve through their midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMachineRouter {
    curviness: f64,
    proximity_limit: f64,
    show_loopback: bool,
    clockwise: bool,
}

impl Default for StateMachineRouter {
    fn default() -> Self {
        Self {
            curviness: DEFAULT_CURVINESS,
            proximity_limit: DEFAULT_PROXIMITY_LIMIT,
            show_loopback: true,
            clockwise: false,
        }
    }
}

impl StateMachineRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_curviness(mut self, curviness: f64) -> Self {
        self.curviness = curviness;
        self
    }

    pub fn with_proximity_limit(mut self, limit: f64) -> Self {
        self.proximity_limit = limit;
        self
    }

    pub fn with_loopback(mut self, show: bool, clockwise: bool) -> Self {
        self.show_loopback = show;
        self.clockwise = clockwise;
        self
    }

    pub fn from_options(options: &Options) -> Result<Self, ConnectorError> {
        Ok(Self {
            curviness: options.number("curviness")?.unwrap_or(DEFAULT_CURVINESS),
            proximity_limit: options
                .number("proximityLimit")?
                .unwrap_or(DEFAULT_PROXIMITY_LIMIT),
            show_loopback: options.boolean("showLoopback")?.unwrap_or(true),
            clockwise: loopback_clockwise(options)?,
        })
    }

    pub fn curviness(&self) -> f64 {
        self.curviness
    }

    pub fn proximity_limit(&self) -> f64 {
        self.proximity_limit
    }

    fn control_point(&self, s: Point, t: Point, source_rel: Point, target_rel: Point) -> Point {
        let mid = Point::new((s.x + t.x) / 2.0, (s.y + t.y) / 2.0);
        if s.distance_to(t) <= self.proximity_limit {
            return mid;
        }
        let d = self.curviness;
        let side_x = if source_rel.x < 0.5 { -d } else { d };
        let side_y = if source_rel.y < 0.5 { -d } else { d };
        let across_x = Point::new(mid.x + side_x, mid.y);
        let across_y = Point::new(mid.x, mid.y + side_y);
        match region(s, t) {
            1 => {
                if source_rel.y <= 0.0 && target_rel.y >= 1.0 {
                    across_x
                } else if source_rel.x >= 1.0 && target_rel.x <= 0.0 {
                    across_y
                } else {
                    Point::new(mid.x - d, mid.y - d)
                }
            }
            2 => {
                if source_rel.y >= 1.0 && target_rel.y <= 0.0 {
                    across_x
                } else if source_rel.x >= 1.0 && target_rel.x <= 0.0 {
                    across_y
                } else {
                    Point::new(mid.x + d, mid.y - d)
                }
            }
            3 => {
                if source_rel.y >= 1.0 && target_rel.y <= 0.0 {
                    across_x
                } else if source_rel.x <= 0.0 && target_rel.x >= 1.0 {
                    across_y
                } else {
                    Point::new(mid.x - d, mid.y - d)
                }
            }
            _ => {
                if source_rel.y <= 0.0 && target_rel.y >= 1.0 {
                    across_x
                } else if source_rel.x <= 0.0 && target_rel.x >= 1.0 {
                    across_y
                } else {
                    Point::new(mid.x + d, mid.y - d)
                }
            }
        }
    }
}

/// Which way `t` lies from `s`: 1 up-right, 2 down-right, 3 down-left, 4 up-left
fn region(s: Point, t: Point) -> u8 {
    if s.x <= t.x && t.y <= s.y {
        1
    } else if s.x <= t.x && s.y <= t.y {
        2
    } else if t.x <= s.x && t.y >= s.y {
        3
    } else {
        4
    }
}

/// Push a point off its element by `margin` when it sits on an edge
fn clear_of_edge(p: Point, rel: Point, margin: f64) -> Point {
    let shift = |v: f64, r: f64| {
        if r == 0.0 {
            v - margin
        } else if r == 1.0 {
            v + margin
        } else {
            v
        }
    };
    Point::new(shift(p.x, rel.x), shift(p.y, rel.y))
}

impl Router for StateMachineRouter {
    fn name(&self) -> &str {
        "StateMachine"
    }

    fn route(&self, info: &PaintInfo, params: &ConnectorParams, path: &mut PathBuilder) {
        let source = params.source.location;
        let target = params.target.location;
        if params.is_loopback() && self.show_loopback {
            path.push(loopback_circle(
                info.local(source.point),
                info.loopback_radius,
                info.margin,
                self.clockwise,
            ));
            return;
        }
        let s = clear_of_edge(info.local(source.point), source.rel, info.margin);
        let t = clear_of_edge(info.local(target.point), target.rel, info.margin);
        let cp = self.control_point(s, t, source.rel, target.rel);
        path.push(Segment::Bezier(BezierSegment::new(s, cp, cp, t)));
    }
}
