//! Geometry properties every connector type must satisfy
//!
//! Each check runs against all built-in connector types on a few element
//! arrangements: side by side, diagonal, stacked, and a loop back onto the
//! same element.

use anchorage::{
    AnchorSpec, ConnectOptions, ConnectionId, ConnectorSpec, Diagram, Point, Rect,
};
use pretty_assertions::assert_eq;

const TYPES: [&str; 5] = [
    "Straight",
    "Bezier",
    "StateMachine",
    "Flowchart",
    "[Flowchart, {cornerRadius: 8}]",
];

const TOLERANCE: f64 = 1e-6;

fn spec(s: &str) -> ConnectorSpec {
    s.parse().expect("connector spec should parse")
}

fn anchor(s: &str) -> AnchorSpec {
    s.parse().expect("anchor spec should parse")
}

/// Diagram with `a` fixed and `b` at `b_rect`, connected from `a` to `b`
fn connected(connector: &str, b_rect: Rect, anchors: (&str, &str)) -> (Diagram, ConnectionId) {
    let mut d = Diagram::default();
    d.set_element_bounds("a", Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
    d.set_element_bounds("b", b_rect).unwrap();
    let id = d
        .connect(
            "a",
            "b",
            ConnectOptions::new()
                .with_anchors(anchor(anchors.0), anchor(anchors.1))
                .with_connector(spec(connector)),
        )
        .unwrap()
        .expect("built-in types are always known");
    (d, id)
}

fn arrangements() -> Vec<(Rect, (&'static str, &'static str))> {
    vec![
        (Rect::new(300.0, 0.0, 100.0, 50.0), ("Right", "Left")),
        (Rect::new(300.0, 200.0, 100.0, 50.0), ("Right", "Left")),
        (Rect::new(300.0, 200.0, 100.0, 50.0), ("Bottom", "Left")),
        (Rect::new(20.0, 200.0, 100.0, 50.0), ("Bottom", "Top")),
        (Rect::new(20.0, 200.0, 100.0, 50.0), ("Continuous", "Continuous")),
        (Rect::new(-300.0, -120.0, 80.0, 80.0), ("Right", "Right")),
    ]
}

#[test]
fn test_segments_join_end_to_start() {
    for connector in TYPES {
        for (rect, anchors) in arrangements() {
            let (d, id) = connected(connector, rect, anchors);
            let segments = d.connection(id).unwrap().connector().segments();
            assert!(!segments.is_empty(), "{connector} produced no segments");
            for pair in segments.windows(2) {
                assert!(
                    pair[0].end().approx_eq(pair[1].start(), TOLERANCE),
                    "{connector} {anchors:?}: {:?} does not meet {:?}",
                    pair[0].end(),
                    pair[1].start()
                );
            }
        }
    }
}

#[test]
fn test_point_on_path_hits_both_ends() {
    for connector in TYPES {
        for (rect, anchors) in arrangements() {
            let (d, id) = connected(connector, rect, anchors);
            let c = d.connection(id).unwrap().connector();
            let segments = c.segments();
            let first = segments.first().unwrap().start();
            let last = segments.last().unwrap().end();
            assert!(
                c.point_on_path(0.0, false).approx_eq(first, TOLERANCE),
                "{connector} {anchors:?}: start"
            );
            assert!(
                c.point_on_path(1.0, false).approx_eq(last, TOLERANCE),
                "{connector} {anchors:?}: end"
            );
        }
    }
}

#[test]
fn test_walking_further_never_goes_back() {
    for connector in TYPES {
        let (d, id) = connected(
            connector,
            Rect::new(300.0, 200.0, 100.0, 50.0),
            ("Right", "Left"),
        );
        let c = d.connection(id).unwrap().connector();
        let total = c.length();
        assert!(total > 0.0);

        let mut previous = -1.0;
        for step in 0..=8 {
            let distance = total * step as f64 / 8.0;
            let p = c.point_along_path_from(0.0, distance, false);
            let hit = c.find_closest_point_on_path(p).unwrap();
            assert!(
                hit.distance < 0.5,
                "{connector}: walked point {p:?} is off the path"
            );
            assert!(
                hit.location > previous - 1e-9,
                "{connector}: location {} after {} at distance {distance}",
                hit.location,
                previous
            );
            previous = hit.location;
        }
        assert!(previous > 0.99, "{connector}: walk stopped at {previous}");
    }
}

#[test]
fn test_self_loops_have_length() {
    for connector in TYPES {
        for anchors in [("Top", "Top"), ("Continuous", "Continuous"), ("Right", "Right")] {
            let mut d = Diagram::default();
            d.set_element_bounds("a", Rect::new(50.0, 50.0, 100.0, 50.0))
                .unwrap();
            let id = d
                .connect(
                    "a",
                    "a",
                    ConnectOptions::new()
                        .with_anchors(anchor(anchors.0), anchor(anchors.1))
                        .with_connector(spec(connector)),
                )
                .unwrap()
                .unwrap();
            let length = d.connection(id).unwrap().connector().length();
            assert!(
                length > 0.0,
                "{connector} {anchors:?}: self-loop collapsed to {length}"
            );
        }
    }
}

#[test]
fn test_static_anchors_stay_on_their_element() {
    let rect = Rect::new(40.0, 60.0, 120.0, 80.0);
    let cases = [
        ("[0, 0, 0, -1]", (0.0, 0.0)),
        ("[1, 1, 0, 1]", (0.0, 0.0)),
        ("[0.3, 0.7, -1, 0]", (0.0, 0.0)),
        ("[0.5, 0, 0, -1, 6, -4]", (6.0, -4.0)),
        ("[1, 0.25, 1, 0, -3, 10]", (-3.0, 10.0)),
    ];
    let mut d = Diagram::default();
    d.set_element_bounds("box", rect).unwrap();
    for (text, (ox, oy)) in cases {
        let ep = d.add_endpoint("box", &anchor(text)).unwrap().unwrap();
        let p = d.endpoint_location(ep).unwrap().point;
        let bounds = Rect::new(rect.x + ox, rect.y + oy, rect.width, rect.height);
        assert!(
            p.x >= bounds.x && p.x <= bounds.right() && p.y >= bounds.y && p.y <= bounds.bottom(),
            "{text}: {p:?} outside {bounds:?}"
        );
    }

    let centre = d.add_endpoint("box", &anchor("Center")).unwrap().unwrap();
    assert_eq!(
        d.endpoint_location(centre).unwrap().point,
        Point::new(100.0, 100.0)
    );
}

#[test]
fn test_flowchart_stays_orthogonal_on_perimeter_anchors() {
    for shape in ["Circle", "Diamond", "Triangle"] {
        let perimeter = format!("[Perimeter, {{shape: {shape}}}]");
        for connector in ["Flowchart", "[Flowchart, {cornerRadius: 8}]"] {
            let (d, id) = connected(
                connector,
                Rect::new(300.0, 250.0, 100.0, 50.0),
                (perimeter.as_str(), perimeter.as_str()),
            );
            for segment in d.connection(id).unwrap().connector().segments() {
                if segment.kind() != "Straight" {
                    continue;
                }
                let (s, e) = (segment.start(), segment.end());
                assert!(
                    (s.x - e.x).abs() < TOLERANCE || (s.y - e.y).abs() < TOLERANCE,
                    "{connector} on {shape}: diagonal run {s:?} -> {e:?}"
                );
            }
        }
    }
}
