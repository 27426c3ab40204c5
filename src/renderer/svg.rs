//! SVG generation from a computed diagram

use std::f64::consts::PI;
use std::fmt::Write as _;

use crate::diagram::Diagram;
use crate::geom::{Point, Rect};
use crate::overlay::OverlayPlacement;
use crate::segment::{ArcSegment, Segment};

use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    elements: Vec<String>,
    connections: Vec<String>,
    overlays: Vec<String>,
    marks: Vec<String>,
}

impl SvgBuilder {
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            elements: vec![],
            connections: vec![],
            overlays: vec![],
            marks: vec![],
        }
    }

    fn class(&self, name: &str) -> String {
        format!("{}{}", self.config.class_prefix, name)
    }

    /// Add an element box
    pub fn add_element(&mut self, id: &str, rect: &Rect) {
        self.elements.push(format!(
            r#"  <rect id="{}" class="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
            escape_xml(id),
            self.class("element"),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
        ));
    }

    /// Add a connector path
    pub fn add_connector(&mut self, kind: &str, segments: &[Segment], stroke_width: f64) {
        self.connections.push(format!(
            r#"  <path class="{} {}" d="{}" fill="none" stroke-width="{}"/>"#,
            self.class("connector"),
            self.class(&kind.to_lowercase()),
            path_data_with(segments, self.config.precision),
            stroke_width,
        ));
    }

    /// Add a placed overlay
    pub fn add_overlay(&mut self, placement: &OverlayPlacement) {
        let p = self.config.precision;
        let line = match placement {
            OverlayPlacement::Arrow {
                head,
                tail,
                foldback,
                ..
            } => {
                let points = [*head, tail[0], *foldback, tail[1]]
                    .iter()
                    .map(|q| format!("{:.*},{:.*}", p, q.x, p, q.y))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(r#"  <polygon class="{}" points="{}"/>"#, self.class("arrow"), points)
            }
            OverlayPlacement::Label { point, text } => format!(
                r#"  <text class="{}" x="{:.*}" y="{:.*}" font-size="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
                self.class("label"),
                p,
                point.x,
                p,
                point.y,
                self.config.label_font_size,
                escape_xml(text)
            ),
        };
        self.overlays.push(line);
    }

    /// Dot on an endpoint's anchor point
    pub fn add_anchor_mark(&mut self, point: Point, radius: f64) {
        let p = self.config.precision;
        self.marks.push(format!(
            r#"  <circle class="{}" cx="{:.*}" cy="{:.*}" r="{}"/>"#,
            self.class("anchor"),
            p,
            point.x,
            p,
            point.y,
            radius
        ));
    }

    /// Element id printed above its box
    pub fn add_element_tag(&mut self, id: &str, rect: &Rect) {
        self.marks.push(format!(
            r#"  <text class="{}" x="{}" y="{}" font-size="{}">{}</text>"#,
            self.class("element-id"),
            rect.x,
            rect.y - 4.0,
            self.config.label_font_size,
            escape_xml(id)
        ));
    }

    /// Build the final SVG string
    pub fn build(self, extent: Rect) -> String {
        let margin = self.config.margin;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            extent.x - margin,
            extent.y - margin,
            extent.width + 2.0 * margin,
            extent.height + 2.0 * margin
        );
        svg.push('\n');

        // connectors over elements, overlays over connectors, marks on top
        for line in self
            .elements
            .iter()
            .chain(&self.connections)
            .chain(&self.overlays)
            .chain(&self.marks)
        {
            svg.push_str(line);
            svg.push('\n');
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Render every element, connection and overlay of a diagram
///
/// The diagram must already be painted; suspended diagrams render whatever
/// was computed last.
pub fn render_svg(diagram: &Diagram, config: &SvgConfig) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    let marks = config.marks.as_ref();
    let mut extent: Option<Rect> = None;
    let mut grow = |r: Rect| {
        extent = Some(match extent {
            Some(v) => v.union(&r),
            None => r,
        });
    };

    for (id, rect) in diagram.elements() {
        builder.add_element(id.as_str(), rect);
        if marks.is_some_and(|m| m.element_ids) {
            builder.add_element_tag(id.as_str(), rect);
        }
        grow(*rect);
    }

    let stroke_width = diagram.config().stroke_width;
    for connection in diagram.connections() {
        let connector = connection.connector();
        if connector.segments().is_empty() {
            continue;
        }
        builder.add_connector(connector.type_name(), connector.segments(), stroke_width);
        grow(connector.bounds());
        for placement in connection.overlay_placements() {
            builder.add_overlay(&placement);
            grow(placement.bounds());
        }
    }

    if let Some(marks) = marks {
        for endpoint in diagram.endpoints() {
            if let Some(location) = diagram.endpoint_location(endpoint.id()) {
                builder.add_anchor_mark(location.point, marks.anchor_radius);
            }
        }
    }

    builder.build(extent.unwrap_or_else(Rect::zero))
}

/// SVG path data for a list of segments, with two decimals
pub fn path_data(segments: &[Segment]) -> String {
    path_data_with(segments, 2)
}

/// SVG path data for a list of segments
///
/// A segment that does not start where the previous one ended opens a new
/// subpath.
pub fn path_data_with(segments: &[Segment], decimals: usize) -> String {
    let p = decimals;
    let mut d = String::new();
    let mut pen: Option<Point> = None;
    for segment in segments {
        let start = segment.start();
        if pen.map_or(true, |q| !q.approx_eq(start, 1e-9)) {
            if !d.is_empty() {
                d.push(' ');
            }
            let _ = write!(d, "M{:.*} {:.*}", p, start.x, p, start.y);
        }
        match segment {
            Segment::Straight(s) => {
                let _ = write!(d, " L{:.*} {:.*}", p, s.end().x, p, s.end().y);
            }
            Segment::Bezier(s) => {
                let [_, c1, c2, end] = *s.curve();
                let _ = write!(
                    d,
                    " C{:.*} {:.*} {:.*} {:.*} {:.*} {:.*}",
                    p, c1.x, p, c1.y, p, c2.x, p, c2.y, p, end.x, p, end.y
                );
            }
            Segment::Arc(arc) => push_arc(&mut d, arc, p),
        }
        pen = Some(segment.end());
    }
    d
}

fn push_arc(d: &mut String, arc: &ArcSegment, p: usize) {
    let r = arc.radius();
    let sweep_flag = if arc.anticlockwise() { 0 } else { 1 };
    // a single `A` command cannot draw a closed circle
    let mut stops = Vec::with_capacity(2);
    if arc.sweep() >= 2.0 * PI - 1e-9 {
        stops.push((arc.point_on_path(0.5, false), PI / 2.0));
        stops.push((arc.end(), PI / 2.0));
    } else {
        stops.push((arc.end(), arc.sweep()));
    }
    for (to, sweep) in stops {
        let large = if sweep > PI { 1 } else { 0 };
        let _ = write!(
            d,
            " A{:.*} {:.*} 0 {} {} {:.*} {:.*}",
            p, r, p, r, large, sweep_flag, p, to.x, p, to.y
        );
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
