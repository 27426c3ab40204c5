//! Continuous anchor placement
//!
//! Each element with continuous anchors keeps four ordered lists, one per
//! face. A redraw of an element:
//!
//! 1. picks a face pair for every continuously anchored connection
//!    touching it, by comparing the 16 face-midpoint pairs between the two
//!    elements and taking the closest pair both anchors accept;
//! 2. moves each endpoint into the list for its face (self-loops go to the
//!    top face at both ends);
//! 3. sorts every list by the direction towards the opposite element and
//!    spreads the entries evenly, slot `i` of `n` at `(i+1)/(n+1)` of the face.
//!
//! Placements are stored per endpoint and read back by
//! [`ContinuousAnchor`] computations through [`AnchorManager::location`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::{debug, trace};

use crate::geom::{biltong, Point, Rect};
use crate::types::{ConnectionId, ElementId, EndpointId, Face};

use super::{ratio, AnchorLocation, ContinuousAnchor};

/// Angle given to self-loops and idle endpoints: straight up
const IDENTITY_ANGLE: f64 = -PI / 2.0;

/// Order faces are compared in when distances tie
const AXES: [Face; 4] = [Face::Left, Face::Top, Face::Right, Face::Bottom];

/// One endpoint waiting for a slot on a face
#[derive(Debug, Clone, PartialEq)]
pub struct FaceEntry {
    /// Direction from this element's centre to the opposite element's centre
    pub angle: f64,
    /// `None` for an endpoint without connections
    pub connection: Option<ConnectionId>,
    pub endpoint: EndpointId,
    pub other_element: ElementId,
}

/// One end of a connection, as the manager sees it
#[derive(Debug, Clone)]
pub struct ConnectionEnd<'a> {
    pub endpoint: EndpointId,
    pub element: &'a ElementId,
    pub rect: Rect,
    /// The end's anchor when it is continuous
    pub anchor: Option<&'a ContinuousAnchor>,
}

#[derive(Debug, Clone)]
pub struct ConnectionEnds<'a> {
    pub id: ConnectionId,
    pub source: ConnectionEnd<'a>,
    pub target: ConnectionEnd<'a>,
}

/// A continuous endpoint with no connections
#[derive(Debug, Clone)]
pub struct IdleEndpoint<'a> {
    pub endpoint: EndpointId,
    pub element: &'a ElementId,
    pub rect: Rect,
    pub face: Face,
}

/// Faces chosen for the two ends of a connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePair {
    pub source: Face,
    pub target: Face,
    /// Angle from the source centre to the target centre
    pub theta: f64,
    /// Angle from the target centre to the source centre
    pub theta2: f64,
}

/// What a redraw touched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedrawOutcome {
    /// Face assigned to each continuous endpoint
    pub faces: Vec<(EndpointId, Face)>,
    /// Elements whose slots were recomputed
    pub elements: Vec<ElementId>,
    /// Connections that may need repainting
    pub connections: Vec<ConnectionId>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

fn face_midpoint(rect: &Rect, face: Face) -> Point {
    let c = rect.center();
    match face {
        Face::Left => Point::new(rect.x, c.y),
        Face::Right => Point::new(rect.right(), c.y),
        Face::Top => Point::new(c.x, rect.y),
        Face::Bottom => Point::new(c.x, rect.bottom()),
    }
}

/// Choose the faces a connection attaches to on each element
///
/// `None` anchors are not continuous and accept any face.
pub fn calculate_orientation(
    source: &Rect,
    target: &Rect,
    source_anchor: Option<&ContinuousAnchor>,
    target_anchor: Option<&ContinuousAnchor>,
) -> FacePair {
    let sc = source.center();
    let tc = target.center();
    let theta = (tc.y - sc.y).atan2(tc.x - sc.x);
    let theta2 = (sc.y - tc.y).atan2(sc.x - tc.x);

    let mut candidates: Vec<(Face, Face, f64)> = Vec::with_capacity(16);
    for sf in AXES {
        for tf in AXES {
            let dist = biltong::line_length(face_midpoint(source, sf), face_midpoint(target, tf));
            candidates.push((sf, tf, dist));
        }
    }
    candidates.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));

    let accepts = |anchor: Option<&ContinuousAnchor>, face: Face| {
        anchor.map_or(true, |a| a.is_edge_supported(face))
    };
    let chosen = candidates
        .iter()
        .find(|(sf, tf, _)| accepts(source_anchor, *sf) && accepts(target_anchor, *tf));

    let (source_face, target_face) = match chosen {
        Some((sf, tf, _)) => (*sf, *tf),
        None => {
            let (sf, tf, _) = candidates[0];
            (
                source_anchor.map_or(sf, |a| a.verify_edge(sf)),
                target_anchor.map_or(tf, |a| a.verify_edge(tf)),
            )
        }
    };

    FacePair {
        source: source_face,
        target: target_face,
        theta,
        theta2,
    }
}

/// Sort key placing entries so neighbouring connections do not cross
fn face_order(face: Face, a: &FaceEntry, b: &FaceEntry) -> Ordering {
    let signed = |t: f64| if t < 0.0 { -PI - t } else { PI - t };
    let ord = match face {
        Face::Left | Face::Top => signed(a.angle).partial_cmp(&signed(b.angle)),
        Face::Right | Face::Bottom => b.angle.partial_cmp(&a.angle),
    };
    ord.unwrap_or(Ordering::Equal)
}

/// Spreads continuous anchors along element faces
#[derive(Debug, Default)]
pub struct AnchorManager {
    lists: HashMap<ElementId, [Vec<FaceEntry>; 4]>,
    locations: HashMap<EndpointId, AnchorLocation>,
    endpoint_faces: HashMap<EndpointId, (ElementId, Face)>,
}

impl AnchorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot assigned to an endpoint by the last placement
    pub fn location(&self, endpoint: EndpointId) -> Option<AnchorLocation> {
        self.locations.get(&endpoint).copied()
    }

    /// Face an endpoint was last placed on
    pub fn face_of(&self, endpoint: EndpointId) -> Option<Face> {
        self.endpoint_faces.get(&endpoint).map(|(_, f)| *f)
    }

    /// Entries on one face of an element, in slot order
    pub fn entries(&self, element: &ElementId, face: Face) -> &[FaceEntry] {
        self.lists
            .get(element)
            .map(|lists| lists[face.index()].as_slice())
            .unwrap_or(&[])
    }

    pub fn has_element(&self, element: &ElementId) -> bool {
        self.lists.contains_key(element)
    }

    /// Recompute faces and slots for connections touching `element`
    pub fn redraw(
        &mut self,
        element: &ElementId,
        connections: &[ConnectionEnds<'_>],
        idle: &[IdleEndpoint<'_>],
    ) -> RedrawOutcome {
        let mut outcome = RedrawOutcome::default();
        let mut rects: HashMap<ElementId, Rect> = HashMap::new();

        for conn in connections {
            let (source, target) = (&conn.source, &conn.target);
            let source_continuous = source.anchor.is_some();
            let target_continuous = target.anchor.is_some();
            if !source_continuous && !target_continuous {
                continue;
            }
            rects.insert(source.element.clone(), source.rect);
            rects.insert(target.element.clone(), target.rect);

            if source.element == target.element {
                for end in [source, target] {
                    if end.anchor.is_some() {
                        self.update_list(
                            end.element,
                            IDENTITY_ANGLE,
                            Some(conn.id),
                            end.endpoint,
                            end.element,
                            false,
                            Face::Top,
                        );
                        outcome.faces.push((end.endpoint, Face::Top));
                    }
                }
            } else {
                // each connection checks its own anchors' supported faces
                let pair =
                    calculate_orientation(&source.rect, &target.rect, source.anchor, target.anchor);
                trace!(
                    connection = %conn.id,
                    source_face = %pair.source,
                    target_face = %pair.target,
                    "continuous faces"
                );
                if source_continuous {
                    self.update_list(
                        source.element,
                        pair.theta,
                        Some(conn.id),
                        source.endpoint,
                        target.element,
                        false,
                        pair.source,
                    );
                    outcome.faces.push((source.endpoint, pair.source));
                }
                if target_continuous {
                    self.update_list(
                        target.element,
                        pair.theta2,
                        Some(conn.id),
                        target.endpoint,
                        source.element,
                        true,
                        pair.target,
                    );
                    outcome.faces.push((target.endpoint, pair.target));
                }
            }

            if source_continuous {
                push_unique(&mut outcome.elements, source.element.clone());
            }
            if target_continuous {
                push_unique(&mut outcome.elements, target.element.clone());
            }
            push_unique(&mut outcome.connections, conn.id);
        }

        for ep in idle {
            rects.insert(ep.element.clone(), ep.rect);
            self.update_list(
                ep.element,
                IDENTITY_ANGLE,
                None,
                ep.endpoint,
                ep.element,
                false,
                ep.face,
            );
            outcome.faces.push((ep.endpoint, ep.face));
            push_unique(&mut outcome.elements, ep.element.clone());
        }

        for el in &outcome.elements {
            if let Some(rect) = rects.get(el) {
                self.place(el, rect);
            }
            for face in Face::ALL {
                for entry in self.entries(el, face) {
                    if let Some(c) = entry.connection {
                        push_unique(&mut outcome.connections, c);
                    }
                }
            }
        }

        debug!(
            element = %element,
            placed = outcome.elements.len(),
            connections = outcome.connections.len(),
            "continuous anchors redrawn"
        );
        outcome
    }

    /// Move `endpoint` into the list for `face` on `element`
    ///
    /// Target ends go before the first entry facing the same element,
    /// source ends go last.
    #[allow(clippy::too_many_arguments)]
    fn update_list(
        &mut self,
        element: &ElementId,
        angle: f64,
        connection: Option<ConnectionId>,
        endpoint: EndpointId,
        other_element: &ElementId,
        reverse: bool,
        face: Face,
    ) {
        self.detach(endpoint);

        let list = &mut self.lists.entry(element.clone()).or_default()[face.index()];
        let entry = FaceEntry {
            angle,
            connection,
            endpoint,
            other_element: other_element.clone(),
        };
        if reverse {
            let idx = list
                .iter()
                .position(|e| &e.other_element == other_element)
                .unwrap_or(0);
            list.insert(idx, entry);
        } else {
            list.push(entry);
        }
        self.endpoint_faces.insert(endpoint, (element.clone(), face));
    }

    /// Remove an endpoint from whichever face list holds it
    fn detach(&mut self, endpoint: EndpointId) {
        if let Some((el, face)) = self.endpoint_faces.remove(&endpoint) {
            if let Some(lists) = self.lists.get_mut(&el) {
                lists[face.index()].retain(|e| e.endpoint != endpoint);
            }
        }
    }

    /// Sort each face of `element` and assign evenly spaced slots
    fn place(&mut self, element: &ElementId, rect: &Rect) {
        let Some(lists) = self.lists.get_mut(element) else {
            return;
        };
        for face in Face::ALL {
            let list = &mut lists[face.index()];
            if list.is_empty() {
                continue;
            }
            list.sort_by(|a, b| face_order(face, a, b));

            let horizontal = matches!(face, Face::Top | Face::Bottom);
            let far_end = matches!(face, Face::Top | Face::Right);
            let other = match face {
                Face::Bottom => rect.height,
                Face::Right => rect.width,
                Face::Top | Face::Left => 0.0,
            };
            let extent = if horizontal { rect.width } else { rect.height };
            let step = extent / (list.len() + 1) as f64;

            for (i, entry) in list.iter().enumerate() {
                let mut val = (i + 1) as f64 * step;
                if far_end {
                    val = extent - val;
                }
                let (dx, dy) = if horizontal { (val, other) } else { (other, val) };
                let location = AnchorLocation::new(
                    Point::new(rect.x + dx, rect.y + dy),
                    Point::new(ratio(dx, rect.width), ratio(dy, rect.height)),
                    face.orientation(),
                );
                self.locations.insert(entry.endpoint, location);
            }
        }
    }

    /// Forget an endpoint entirely
    pub fn remove_endpoint(&mut self, endpoint: EndpointId) {
        self.detach(endpoint);
        self.locations.remove(&endpoint);
    }

    /// Drop every entry belonging to a connection
    pub fn remove_connection(&mut self, connection: ConnectionId) {
        let mut dropped = Vec::new();
        for lists in self.lists.values_mut() {
            for list in lists.iter_mut() {
                list.retain(|e| {
                    let keep = e.connection != Some(connection);
                    if !keep {
                        dropped.push(e.endpoint);
                    }
                    keep
                });
            }
        }
        for ep in dropped {
            self.endpoint_faces.remove(&ep);
            self.locations.remove(&ep);
        }
    }

    /// Drop an element's lists and the placements of endpoints on it
    pub fn remove_element(&mut self, element: &ElementId) {
        if let Some(lists) = self.lists.remove(element) {
            for entry in lists.iter().flatten() {
                self.endpoint_faces.remove(&entry.endpoint);
                self.locations.remove(&entry.endpoint);
            }
        }
    }

    pub fn clear(&mut self) {
        self.lists.clear();
        self.locations.clear();
        self.endpoint_faces.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn end<'a>(
        endpoint: u32,
        element: &'a ElementId,
        rect: Rect,
        anchor: Option<&'a ContinuousAnchor>,
    ) -> ConnectionEnd<'a> {
        ConnectionEnd {
            endpoint: EndpointId(endpoint),
            element,
            rect,
            anchor,
        }
    }

    #[test]
    fn test_orientation_side_by_side() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(300.0, 0.0, 100.0, 50.0);
        let pair = calculate_orientation(&a, &b, None, None);
        assert_eq!((pair.source, pair.target), (Face::Right, Face::Left));
        assert_eq!(pair.theta, 0.0);
    }

    #[test]
    fn test_orientation_respects_supported_faces() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(300.0, 0.0, 100.0, 50.0);
        let top_only = ContinuousAnchor::new(vec![Face::Top]);
        let pair = calculate_orientation(&a, &b, Some(&top_only), None);
        assert_eq!(pair.source, Face::Top);
        assert_eq!(pair.target, Face::Left);
    }

    #[test]
    fn test_single_connection_midpoints() {
        let (a_id, b_id) = (ElementId::new("a"), ElementId::new("b"));
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(300.0, 0.0, 100.0, 50.0);
        let anchor = ContinuousAnchor::default();
        let conn = ConnectionEnds {
            id: ConnectionId(1),
            source: end(1, &a_id, a, Some(&anchor)),
            target: end(2, &b_id, b, Some(&anchor)),
        };
        let mut manager = AnchorManager::new();
        let outcome = manager.redraw(&a_id, &[conn], &[]);

        assert_eq!(
            outcome.faces,
            vec![(EndpointId(1), Face::Right), (EndpointId(2), Face::Left)]
        );
        let src = manager.location(EndpointId(1)).unwrap();
        let tgt = manager.location(EndpointId(2)).unwrap();
        assert_eq!(src.point, Point::new(100.0, 25.0));
        assert_eq!(src.rel, Point::new(1.0, 0.5));
        assert_eq!(tgt.point, Point::new(300.0, 25.0));
        assert_eq!(tgt.orientation, Face::Left.orientation());
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let (a_id, b_id) = (ElementId::new("a"), ElementId::new("b"));
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(0.0, 200.0, 100.0, 50.0);
        let anchor = ContinuousAnchor::default();
        let conn = ConnectionEnds {
            id: ConnectionId(1),
            source: end(1, &a_id, a, Some(&anchor)),
            target: end(2, &b_id, b, Some(&anchor)),
        };
        let mut manager = AnchorManager::new();
        manager.redraw(&a_id, std::slice::from_ref(&conn), &[]);
        manager.redraw(&b_id, std::slice::from_ref(&conn), &[]);
        manager.redraw(&a_id, std::slice::from_ref(&conn), &[]);
        assert_eq!(manager.entries(&a_id, Face::Bottom).len(), 1);
        assert_eq!(manager.entries(&b_id, Face::Top).len(), 1);
    }

    #[test]
    fn test_moving_element_changes_face() {
        let (a_id, b_id) = (ElementId::new("a"), ElementId::new("b"));
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let anchor = ContinuousAnchor::default();
        let mut manager = AnchorManager::new();

        let right = Rect::new(300.0, 0.0, 100.0, 50.0);
        let conn = ConnectionEnds {
            id: ConnectionId(1),
            source: end(1, &a_id, a, Some(&anchor)),
            target: end(2, &b_id, right, Some(&anchor)),
        };
        manager.redraw(&b_id, &[conn], &[]);
        assert_eq!(manager.face_of(EndpointId(1)), Some(Face::Right));

        let below = Rect::new(0.0, 300.0, 100.0, 50.0);
        let conn = ConnectionEnds {
            id: ConnectionId(1),
            source: end(1, &a_id, a, Some(&anchor)),
            target: end(2, &b_id, below, Some(&anchor)),
        };
        manager.redraw(&b_id, &[conn], &[]);
        assert_eq!(manager.face_of(EndpointId(1)), Some(Face::Bottom));
        assert!(manager.entries(&a_id, Face::Right).is_empty());
        assert_eq!(manager.entries(&a_id, Face::Bottom).len(), 1);
    }

    #[test]
    fn test_self_loop_uses_top_face() {
        let a_id = ElementId::new("a");
        let a = Rect::new(0.0, 0.0, 90.0, 30.0);
        let anchor = ContinuousAnchor::default();
        let conn = ConnectionEnds {
            id: ConnectionId(7),
            source: end(1, &a_id, a, Some(&anchor)),
            target: end(2, &a_id, a, Some(&anchor)),
        };
        let mut manager = AnchorManager::new();
        manager.redraw(&a_id, &[conn], &[]);
        let p1 = manager.location(EndpointId(1)).unwrap().point;
        let p2 = manager.location(EndpointId(2)).unwrap().point;
        assert_eq!(p1.y, 0.0);
        assert_eq!(p2.y, 0.0);
        let mut xs = vec![p1.x, p2.x];
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![30.0, 60.0]);
    }

    #[test]
    fn test_idle_endpoint_gets_default_face() {
        let a_id = ElementId::new("a");
        let idle = IdleEndpoint {
            endpoint: EndpointId(3),
            element: &a_id,
            rect: Rect::new(10.0, 10.0, 40.0, 40.0),
            face: Face::Left,
        };
        let mut manager = AnchorManager::new();
        manager.redraw(&a_id, &[], &[idle]);
        let loc = manager.location(EndpointId(3)).unwrap();
        assert_eq!(loc.point, Point::new(10.0, 30.0));
        assert_eq!(loc.orientation, Face::Left.orientation());
    }

    #[test]
    fn test_zero_size_face_ratios_are_zero() {
        let a_id = ElementId::new("a");
        let idle = IdleEndpoint {
            endpoint: EndpointId(3),
            element: &a_id,
            rect: Rect::new(5.0, 5.0, 0.0, 0.0),
            face: Face::Top,
        };
        let mut manager = AnchorManager::new();
        manager.redraw(&a_id, &[], &[idle]);
        let loc = manager.location(EndpointId(3)).unwrap();
        assert_eq!(loc.point, Point::new(5.0, 5.0));
        assert_eq!(loc.rel, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_parallel_connections_do_not_cross() {
        let (a_id, b_id) = (ElementId::new("a"), ElementId::new("b"));
        let a = Rect::new(0.0, 0.0, 100.0, 60.0);
        let b = Rect::new(300.0, 0.0, 100.0, 60.0);
        let anchor = ContinuousAnchor::default();
        let conns: Vec<ConnectionEnds> = (0..2)
            .map(|i| ConnectionEnds {
                id: ConnectionId(i),
                source: end(i * 2, &a_id, a, Some(&anchor)),
                target: end(i * 2 + 1, &b_id, b, Some(&anchor)),
            })
            .collect();
        let mut manager = AnchorManager::new();
        manager.redraw(&a_id, &conns, &[]);

        for i in 0..2 {
            let s = manager.location(EndpointId(i * 2)).unwrap().point;
            let t = manager.location(EndpointId(i * 2 + 1)).unwrap().point;
            assert_eq!(s.y, t.y, "connection {i} should run level");
        }
    }

    #[test]
    fn test_face_filters_apply_per_connection() {
        let (a_id, b_id) = (ElementId::new("a"), ElementId::new("b"));
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(300.0, 0.0, 100.0, 50.0);
        let top_only = ContinuousAnchor::new(vec![Face::Top]);
        let right_only = ContinuousAnchor::new(vec![Face::Right]);
        let any = ContinuousAnchor::default();
        let conns = [
            ConnectionEnds {
                id: ConnectionId(1),
                source: end(1, &a_id, a, Some(&top_only)),
                target: end(2, &b_id, b, Some(&any)),
            },
            ConnectionEnds {
                id: ConnectionId(2),
                source: end(3, &a_id, a, Some(&right_only)),
                target: end(4, &b_id, b, Some(&any)),
            },
        ];
        let mut manager = AnchorManager::new();
        manager.redraw(&a_id, &conns, &[]);

        assert_eq!(manager.face_of(EndpointId(1)), Some(Face::Top));
        assert_eq!(manager.face_of(EndpointId(3)), Some(Face::Right));
        assert_eq!(manager.entries(&a_id, Face::Top).len(), 1);
        assert_eq!(manager.entries(&a_id, Face::Right).len(), 1);
    }

    #[test]
    fn test_remove_connection_and_element() {
        let (a_id, b_id) = (ElementId::new("a"), ElementId::new("b"));
        let anchor = ContinuousAnchor::default();
        let conn = ConnectionEnds {
            id: ConnectionId(1),
            source: end(1, &a_id, Rect::new(0.0, 0.0, 10.0, 10.0), Some(&anchor)),
            target: end(2, &b_id, Rect::new(100.0, 0.0, 10.0, 10.0), Some(&anchor)),
        };
        let mut manager = AnchorManager::new();
        manager.redraw(&a_id, &[conn], &[]);
        manager.remove_connection(ConnectionId(1));
        assert!(manager.location(EndpointId(1)).is_none());
        assert!(manager.entries(&a_id, Face::Right).is_empty());

        manager.remove_element(&a_id);
        assert!(!manager.has_element(&a_id));
        assert!(manager.has_element(&b_id));
    }
}
