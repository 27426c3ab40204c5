use crate::geom::Point;
use crate::segment::{BezierSegment, Segment};
use crate::spec::Options;
use crate::types::Orientation;

use super::config::loopback_clockwise;
use super::{loopback_circle, ConnectorError, ConnectorParams, PaintInfo, PathBuilder, Router};

pub const DEFAULT_CURVINESS: f64 = 150.0;
/// Sideways nudge for control points on an axis the anchor does not face along
const MINOR_OFFSET: f64 = 10.0;

/// One cubic curve whose control points follow the anchor orientations
#[derive(Debug, Clone, PartialEq)]
pub struct BezierRouter {
    curviness: f64,
    show_loopback: bool,
    clockwise: bool,
}

impl Default for BezierRouter {
    fn default() -> Self {
        Self {
            curviness: DEFAULT_CURVINESS,
            show_loopback: true,
            clockwise: false,
        }
    }
}

impl BezierRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_curviness(mut self, curviness: f64) -> Self {
        self.curviness = curviness;
        self
    }

    pub fn with_loopback(mut self, show: bool, clockwise: bool) -> Self {
        self.show_loopback = show;
        self.clockwise = clockwise;
        self
    }

    pub fn from_options(options: &Options) -> Result<Self, ConnectorError> {
        Ok(Self {
            curviness: options
                .number("curviness")?
                .filter(|c| *c != 0.0)
                .unwrap_or(DEFAULT_CURVINESS),
            show_loopback: options.boolean("showLoopback")?.unwrap_or(true),
            clockwise: loopback_clockwise(options)?,
        })
    }

    pub fn curviness(&self) -> f64 {
        self.curviness
    }
}

/// Control point for the end at `own`
///
/// Pushed `major` pixels out along each axis the anchor faces; on an axis
/// it does not face, nudged a little towards the other end.
fn control_point(own: Point, other: Point, facing: Orientation, major: f64) -> Point {
    let toward = |from: f64, to: f64| {
        if from < to {
            from + MINOR_OFFSET
        } else {
            from - MINOR_OFFSET
        }
    };
    let x = if facing.dx == 0.0 {
        toward(own.x, other.x)
    } else {
        own.x + major * facing.dx
    };
    let y = if facing.dy == 0.0 {
        toward(own.y, other.y)
    } else {
        own.y + major * facing.dy
    };
    Point::new(x, y)
}

impl Router for BezierRouter {
    fn name(&self) -> &str {
        "Bezier"
    }

    fn route(&self, info: &PaintInfo, params: &ConnectorParams, path: &mut PathBuilder) {
        if params.is_loopback() && self.show_loopback {
            let anchor = info.local(params.source.point());
            path.push(loopback_circle(
                anchor,
                info.loopback_radius,
                info.margin,
                self.clockwise,
            ));
            return;
        }
        let (s, t) = (info.start(), info.end());
        let cp1 = control_point(s, t, info.so, self.curviness);
        let cp2 = control_point(t, s, info.to, self.curviness);
        path.push(Segment::Bezier(BezierSegment::new(s, cp1, cp2, t)));
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::connector::tests::end;
    use crate::connector::{Connector, ConnectorOptions};
    use crate::geom::Rect;
    use crate::spec::Value;
    use crate::types::Face;

    #[test]
    fn test_control_points_follow_orientation() {
        let cp = control_point(
            Point::new(0.0, 0.0),
            Point::new(200.0, 40.0),
            Orientation::new(1.0, 0.0),
            150.0,
        );
        assert_eq!(cp, Point::new(150.0, 10.0));
        let cp = control_point(
            Point::new(200.0, 40.0),
            Point::new(0.0, 0.0),
            Orientation::new(0.0, -1.0),
            150.0,
        );
        assert_eq!(cp, Point::new(190.0, -110.0));
    }

    #[test]
    fn test_curve_joins_anchors() {
        let params = ConnectorParams::new(
            end("a", Rect::new(0.0, 0.0, 100.0, 50.0), (1.0, 0.5), Some(Face::Right)),
            end("b", Rect::new(300.0, 0.0, 100.0, 50.0), (0.0, 0.5), Some(Face::Left)),
        );
        let mut c = Connector::new(BezierRouter::new(), ConnectorOptions::new());
        c.compute(&params);
        assert_eq!(c.segments().len(), 1);
        assert_eq!(c.segments()[0].kind(), "Bezier");
        assert_eq!(c.point_on_path(0.0, false), Point::new(100.0, 25.0));
        assert_eq!(c.point_on_path(1.0, false), Point::new(300.0, 25.0));
        assert!(c.length() > 200.0);
    }

    #[test]
    fn test_self_loop_draws_circle_above_anchor() {
        let rect = Rect::new(50.0, 50.0, 60.0, 40.0);
        let params = ConnectorParams::new(
            end("a", rect, (0.5, 0.0), Some(Face::Top)),
            end("a", rect, (0.5, 1.0), Some(Face::Bottom)),
        );
        let mut c = Connector::new(BezierRouter::new(), ConnectorOptions::new());
        c.compute(&params);
        assert_eq!(c.segments()[0].kind(), "Arc");
        assert!((c.length() - 50.0 * PI).abs() < 1e-9);
        assert!(c.point_on_path(0.0, false).approx_eq(Point::new(80.0, 45.0), 1e-9));
        assert!(c.bounds().bottom() < rect.y);
    }

    #[test]
    fn test_from_options() {
        let options = Options::new()
            .with("curviness", Value::Number(60.0))
            .with("showLoopback", Value::Bool(false));
        let router = BezierRouter::from_options(&options).unwrap();
        assert_eq!(router.curviness(), 60.0);
        assert!(!router.show_loopback);
        assert_eq!(BezierRouter::from_options(&Options::new()).unwrap(), BezierRouter::new());
    }
}
