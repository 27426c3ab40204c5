use std::f64::consts::PI;
use std::str::FromStr;

use super::StaticAnchor;

/// Outline that perimeter anchors are spread along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerimeterShape {
    Circle,
    Ellipse,
    Rectangle,
    Square,
    Diamond,
    Triangle,
}

impl FromStr for PerimeterShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Circle" => Ok(PerimeterShape::Circle),
            "Ellipse" => Ok(PerimeterShape::Ellipse),
            "Rectangle" => Ok(PerimeterShape::Rectangle),
            "Square" => Ok(PerimeterShape::Square),
            "Diamond" => Ok(PerimeterShape::Diamond),
            "Triangle" => Ok(PerimeterShape::Triangle),
            _ => Err(s.to_string()),
        }
    }
}

/// Edge of a unit-square outline: from `(x1, y1)` to `(x2, y2)` facing `(ox, oy)`
type Edge = [f64; 6];

const RECTANGLE: [Edge; 4] = [
    [0.0, 0.0, 1.0, 0.0, 0.0, -1.0],
    [1.0, 0.0, 1.0, 1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0, -1.0, 0.0],
];

const DIAMOND: [Edge; 4] = [
    [0.5, 0.0, 1.0, 0.5, 1.0, -1.0],
    [1.0, 0.5, 0.5, 1.0, 1.0, 1.0],
    [0.5, 1.0, 0.0, 0.5, -1.0, 1.0],
    [0.0, 0.5, 0.5, 0.0, -1.0, -1.0],
];

const TRIANGLE: [Edge; 3] = [
    [0.5, 0.0, 1.0, 1.0, 1.0, -0.5],
    [1.0, 1.0, 0.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.5, 0.0, -1.0, -0.5],
];

/// Candidate anchors spread evenly around `shape`
///
/// `rotation` is in degrees, clockwise around the element centre.
pub fn perimeter_anchors(shape: PerimeterShape, anchor_count: usize, rotation: f64) -> Vec<StaticAnchor> {
    let count = anchor_count.max(1);
    let points = match shape {
        PerimeterShape::Circle | PerimeterShape::Ellipse => ellipse(count),
        PerimeterShape::Rectangle | PerimeterShape::Square => along_edges(count, &RECTANGLE),
        PerimeterShape::Diamond => along_edges(count, &DIAMOND),
        PerimeterShape::Triangle => along_edges(count, &TRIANGLE),
    };
    if rotation == 0.0 {
        return points;
    }
    let (sin, cos) = (rotation * PI / 180.0).sin_cos();
    points
        .into_iter()
        .map(|a| {
            let (dx, dy) = (a.x - 0.5, a.y - 0.5);
            let x = 0.5 + dx * cos - dy * sin;
            let y = 0.5 + dx * sin + dy * cos;
            let o = a.orientation;
            StaticAnchor::new(x, y, o.dx * cos - o.dy * sin, o.dx * sin + o.dy * cos)
        })
        .collect()
}

fn ellipse(count: usize) -> Vec<StaticAnchor> {
    let r = 0.5;
    let step = 2.0 * PI / count as f64;
    (0..count)
        .map(|i| {
            let (sin, cos) = (i as f64 * step).sin_cos();
            StaticAnchor::new(r + r * sin, r + r * cos, sin, cos)
        })
        .collect()
}

fn along_edges(count: usize, edges: &[Edge]) -> Vec<StaticAnchor> {
    let lengths: Vec<f64> = edges
        .iter()
        .map(|e| ((e[2] - e[0]).powi(2) + (e[3] - e[1]).powi(2)).sqrt())
        .collect();
    let total: f64 = lengths.iter().sum();
    let mut anchors = Vec::with_capacity(count);
    for (edge, length) in edges.iter().zip(&lengths) {
        let n = ((count as f64) * length / total).round().max(1.0) as usize;
        for j in 0..n {
            let t = j as f64 / n as f64;
            anchors.push(StaticAnchor::new(
                edge[0] + (edge[2] - edge[0]) * t,
                edge[1] + (edge[3] - edge[1]) * t,
                edge[4],
                edge[5],
            ));
        }
    }
    anchors
}
