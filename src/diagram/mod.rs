//! A diagram instance
//!
//! [`Diagram`] owns everything one drawing needs: the anchor and connector
//! registries, the element rectangles supplied by the caller, endpoints,
//! connections, the continuous anchor manager and the listeners.
//!
//! Geometry is recomputed on demand. [`Diagram::redraw`] re-places the
//! continuous anchors of one element and recomputes every connection that
//! touches it or whose slots moved; [`Diagram::repaint_everything`] does the
//! same for every element. Each of these runs in its own [`PaintPass`], so
//! an anchor is computed at most once per repaint. While drawing is
//! suspended all repaint requests are ignored.

mod config;
mod drag;
mod error;
mod events;

pub use config::DiagramConfig;
pub use error::DiagramError;
pub use events::{DiagramEvent, ListenerId, Listeners};

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace, warn};

use crate::anchor::manager::{ConnectionEnd, ConnectionEnds, IdleEndpoint, RedrawOutcome};
use crate::anchor::{
    Anchor, AnchorError, AnchorEvent, AnchorLocation, AnchorManager, AnchorParams, AnchorRegistry,
    PaintPass,
};
use crate::connector::{Connector, ConnectorEnd, ConnectorError, ConnectorParams, ConnectorRegistry};
use crate::geom::{Point, Rect};
use crate::overlay::{Overlay, OverlayPlacement};
use crate::spec::{AnchorSpec, ConnectorSpec};
use crate::types::{ConnectionId, ElementId, EndpointId, Face};

use drag::DragState;

/// One end of zero or more connections, attached to an element
#[derive(Debug)]
pub struct Endpoint {
    id: EndpointId,
    element: ElementId,
    anchor: Anchor,
    connections: Vec<ConnectionId>,
    /// Created by `connect`; removed with its last connection
    transient: bool,
}

impl Endpoint {
    fn new(id: EndpointId, element: ElementId, anchor: Anchor, transient: bool) -> Self {
        Self {
            id,
            element,
            anchor,
            connections: Vec::new(),
            transient,
        }
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    pub fn element(&self) -> &ElementId {
        &self.element
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    /// Mutable anchor, e.g. to lock it; takes effect on the next repaint
    pub fn anchor_mut(&mut self) -> &mut Anchor {
        &mut self.anchor
    }

    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }
}

#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    source: EndpointId,
    target: EndpointId,
    connector: Connector,
    overlays: Vec<Overlay>,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn source(&self) -> EndpointId {
        self.source
    }

    pub fn target(&self) -> EndpointId {
        self.target
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn add_overlay(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    /// Overlays placed on the path from the last repaint
    pub fn overlay_placements(&self) -> Vec<OverlayPlacement> {
        self.overlays
            .iter()
            .map(|o| o.place(&self.connector))
            .collect()
    }
}

/// Per-connection choices for [`Diagram::connect`]
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// `[source, target]`; the diagram default fills any gap
    pub anchors: [Option<AnchorSpec>; 2],
    pub connector: Option<ConnectorSpec>,
    pub overlays: Vec<Overlay>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same anchor at both ends
    pub fn with_anchor(self, anchor: AnchorSpec) -> Self {
        self.with_anchors(anchor.clone(), anchor)
    }

    pub fn with_anchors(mut self, source: AnchorSpec, target: AnchorSpec) -> Self {
        self.anchors = [Some(source), Some(target)];
        self
    }

    pub fn with_connector(mut self, connector: ConnectorSpec) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.push(overlay);
        self
    }
}

#[derive(Debug)]
pub struct Diagram {
    config: DiagramConfig,
    anchors: AnchorRegistry,
    connectors: ConnectorRegistry,
    elements: BTreeMap<ElementId, Rect>,
    endpoints: BTreeMap<EndpointId, Endpoint>,
    connections: BTreeMap<ConnectionId, Connection>,
    manager: AnchorManager,
    listeners: Listeners,
    suspended: bool,
    drag: Option<DragState>,
    last_id: u32,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(DiagramConfig::default())
    }
}

/// Rectangle an endpoint sits on: the drag proxy for the floating end,
/// a zero rectangle for elements that were never measured
fn element_rect(
    elements: &BTreeMap<ElementId, Rect>,
    drag: Option<&DragState>,
    endpoint: &Endpoint,
) -> Rect {
    match drag {
        Some(d) if d.floating == endpoint.id => d.proxy,
        _ => elements
            .get(&endpoint.element)
            .copied()
            .unwrap_or_else(Rect::zero),
    }
}

fn end_view(endpoint: &Endpoint, rect: Rect) -> ConnectionEnd<'_> {
    ConnectionEnd {
        endpoint: endpoint.id,
        element: &endpoint.element,
        rect,
        anchor: endpoint.anchor.as_continuous(),
    }
}

impl Diagram {
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            config,
            anchors: AnchorRegistry::new(),
            connectors: ConnectorRegistry::new(),
            elements: BTreeMap::new(),
            endpoints: BTreeMap::new(),
            connections: BTreeMap::new(),
            manager: AnchorManager::new(),
            listeners: Listeners::new(),
            suspended: false,
            drag: None,
            last_id: 0,
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn anchor_registry(&self) -> &AnchorRegistry {
        &self.anchors
    }

    /// Register custom anchor types here
    pub fn anchor_registry_mut(&mut self) -> &mut AnchorRegistry {
        &mut self.anchors
    }

    pub fn connector_registry(&self) -> &ConnectorRegistry {
        &self.connectors
    }

    pub fn connector_registry_mut(&mut self) -> &mut ConnectorRegistry {
        &mut self.connectors
    }

    pub fn manager(&self) -> &AnchorManager {
        &self.manager
    }

    pub fn bind(&mut self, listener: impl FnMut(&DiagramEvent) + 'static) -> ListenerId {
        self.listeners.bind(listener)
    }

    pub fn unbind(&mut self, id: ListenerId) -> bool {
        self.listeners.unbind(id)
    }

    // ----- elements -----

    /// Record where an element is; takes effect on the next repaint
    pub fn set_element_bounds(
        &mut self,
        element: impl Into<ElementId>,
        rect: Rect,
    ) -> Result<(), DiagramError> {
        let element = element.into();
        if !rect.is_valid() {
            return Err(DiagramError::InvalidBounds {
                element,
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            });
        }
        trace!(element = %element, ?rect, "element bounds");
        self.elements.insert(element, rect);
        Ok(())
    }

    pub fn element_bounds(&self, element: &ElementId) -> Option<Rect> {
        self.elements.get(element).copied()
    }

    /// Measured elements in id order
    pub fn elements(&self) -> impl Iterator<Item = (&ElementId, &Rect)> {
        self.elements.iter()
    }

    /// Remove an element with all of its endpoints and their connections
    pub fn remove_element(&mut self, element: &ElementId) -> Result<(), DiagramError> {
        let owned: Vec<EndpointId> = self.endpoints_on(element);
        if self.elements.remove(element).is_none() && owned.is_empty() {
            return Err(DiagramError::UnknownElement {
                element: element.clone(),
            });
        }
        let mut affected = BTreeSet::new();
        for ep in owned {
            let connections = self
                .endpoints
                .get(&ep)
                .map(|e| e.connections.clone())
                .unwrap_or_default();
            for c in connections {
                affected.extend(self.detach_connection(c).unwrap_or_default());
            }
            self.endpoints.remove(&ep);
            self.manager.remove_endpoint(ep);
        }
        self.manager.remove_element(element);
        affected.remove(element);
        debug!(element = %element, "element removed");
        let affected: Vec<ElementId> = affected.into_iter().collect();
        self.redraw_elements(&affected);
        Ok(())
    }

    // ----- endpoints -----

    /// Add an endpoint to `element`
    ///
    /// `Ok(None)` when the anchor type is unknown and the diagram is
    /// configured not to raise errors.
    pub fn add_endpoint(
        &mut self,
        element: impl Into<ElementId>,
        anchor: &AnchorSpec,
    ) -> Result<Option<EndpointId>, DiagramError> {
        let element = element.into();
        let Some(anchor) = self.build_anchor(anchor)? else {
            return Ok(None);
        };
        let id = self.insert_endpoint(element.clone(), anchor, false);
        self.redraw_elements(&[element]);
        Ok(Some(id))
    }

    /// Remove an endpoint and every connection attached to it
    pub fn remove_endpoint(&mut self, endpoint: EndpointId) -> Result<(), DiagramError> {
        let ep = self
            .endpoints
            .get(&endpoint)
            .ok_or(DiagramError::UnknownEndpoint { endpoint })?;
        let mut affected: BTreeSet<ElementId> = BTreeSet::from([ep.element.clone()]);
        for c in ep.connections.clone() {
            affected.extend(self.detach_connection(c).unwrap_or_default());
        }
        self.endpoints.remove(&endpoint);
        self.manager.remove_endpoint(endpoint);
        debug!(endpoint = %endpoint, "endpoint removed");
        let affected: Vec<ElementId> = affected.into_iter().collect();
        self.redraw_elements(&affected);
        Ok(())
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(&id)
    }

    pub fn endpoint_mut(&mut self, id: EndpointId) -> Option<&mut Endpoint> {
        self.endpoints.get_mut(&id)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    pub fn endpoints_on(&self, element: &ElementId) -> Vec<EndpointId> {
        self.endpoints
            .values()
            .filter(|e| &e.element == element)
            .map(|e| e.id)
            .collect()
    }

    /// Location from the last repaint that computed this endpoint
    pub fn endpoint_location(&self, id: EndpointId) -> Option<AnchorLocation> {
        self.endpoints.get(&id)?.anchor.current_location()
    }

    /// Face a continuous endpoint was last placed on
    pub fn continuous_face(&self, id: EndpointId) -> Option<Face> {
        self.manager.face_of(id)
    }

    /// Pin an endpoint to a point, or release it with `None`
    pub fn set_anchor_location(
        &mut self,
        endpoint: EndpointId,
        point: Option<Point>,
    ) -> Result<(), DiagramError> {
        let ep = self
            .endpoints
            .get_mut(&endpoint)
            .ok_or(DiagramError::UnknownEndpoint { endpoint })?;
        match point {
            Some(p) => ep.anchor.set_user_defined_location(p),
            None => ep.anchor.clear_user_defined_location(),
        }
        Ok(())
    }

    // ----- connections -----

    /// Connect two elements through new endpoints
    ///
    /// `Ok(None)` when an anchor or connector type is unknown and the
    /// diagram is configured not to raise errors.
    pub fn connect(
        &mut self,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
        options: ConnectOptions,
    ) -> Result<Option<ConnectionId>, DiagramError> {
        let (source, target) = (source.into(), target.into());
        let [source_spec, target_spec] = options.anchors;
        let source_spec = source_spec.unwrap_or_else(|| self.config.default_anchor.clone());
        let target_spec = target_spec.unwrap_or_else(|| self.config.default_anchor.clone());
        let connector_spec = options
            .connector
            .unwrap_or_else(|| self.config.default_connector.clone());

        let Some(source_anchor) = self.build_anchor(&source_spec)? else {
            return Ok(None);
        };
        let Some(target_anchor) = self.build_anchor(&target_spec)? else {
            return Ok(None);
        };
        let Some(connector) = self.build_connector(&connector_spec)? else {
            return Ok(None);
        };

        let s = self.insert_endpoint(source.clone(), source_anchor, true);
        let t = self.insert_endpoint(target, target_anchor, true);
        let id = self.add_connection(s, t, connector, options.overlays);
        self.listeners
            .fire(&DiagramEvent::ConnectionCreated { connection: id });
        self.redraw_elements(&[source]);
        Ok(Some(id))
    }

    /// Connect two existing endpoints
    pub fn connect_endpoints(
        &mut self,
        source: EndpointId,
        target: EndpointId,
        connector: Option<&ConnectorSpec>,
    ) -> Result<Option<ConnectionId>, DiagramError> {
        let source_element = self
            .endpoints
            .get(&source)
            .map(|e| e.element.clone())
            .ok_or(DiagramError::UnknownEndpoint { endpoint: source })?;
        if !self.endpoints.contains_key(&target) {
            return Err(DiagramError::UnknownEndpoint { endpoint: target });
        }
        let spec = connector
            .cloned()
            .unwrap_or_else(|| self.config.default_connector.clone());
        let Some(connector) = self.build_connector(&spec)? else {
            return Ok(None);
        };
        let id = self.add_connection(source, target, connector, Vec::new());
        self.listeners
            .fire(&DiagramEvent::ConnectionCreated { connection: id });
        self.redraw_elements(&[source_element]);
        Ok(Some(id))
    }

    /// Delete a connection; endpoints created for it go with it
    pub fn delete_connection(&mut self, id: ConnectionId) -> Result<(), DiagramError> {
        let affected = self
            .detach_connection(id)
            .ok_or(DiagramError::UnknownConnection { connection: id })?;
        self.redraw_elements(&affected);
        Ok(())
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    /// Connections in creation order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    // ----- drawing -----

    /// Suspend or resume drawing; returns the previous state
    ///
    /// Resuming with `repaint_after` repaints everything at once.
    pub fn set_suspend_drawing(&mut self, suspend: bool, repaint_after: bool) -> bool {
        let was = std::mem::replace(&mut self.suspended, suspend);
        debug!(suspend, "drawing suspension changed");
        if !suspend && repaint_after {
            self.repaint_everything();
        }
        was
    }

    pub fn is_drawing_suspended(&self) -> bool {
        self.suspended
    }

    /// Run `f` with drawing suspended, then repaint once
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let was = self.set_suspend_drawing(true, false);
        let result = f(self);
        if !was {
            self.set_suspend_drawing(false, true);
        }
        result
    }

    /// Repaint after `element` moved; returns the connections recomputed
    pub fn redraw(&mut self, element: &ElementId) -> Vec<ConnectionId> {
        self.redraw_elements(std::slice::from_ref(element))
    }

    pub fn repaint_everything(&mut self) -> Vec<ConnectionId> {
        let elements: BTreeSet<ElementId> =
            self.endpoints.values().map(|e| e.element.clone()).collect();
        let elements: Vec<ElementId> = elements.into_iter().collect();
        self.redraw_elements(&elements)
    }

    fn redraw_elements(&mut self, elements: &[ElementId]) -> Vec<ConnectionId> {
        if self.suspended {
            trace!(elements = elements.len(), "drawing suspended, repaint skipped");
            return Vec::new();
        }
        let mut painted = BTreeSet::new();
        for element in elements {
            let outcome = self.place_continuous(element);
            painted.extend(outcome.connections);
            for ep in self.endpoints.values().filter(|e| &e.element == element) {
                painted.extend(ep.connections.iter().copied());
            }
        }

        let mut pass = PaintPass::new();
        let idle: Vec<EndpointId> = self
            .endpoints
            .values()
            .filter(|e| e.connections.is_empty() && elements.contains(&e.element))
            .map(|e| e.id)
            .collect();
        for ep in idle {
            self.paint_idle_endpoint(ep, &mut pass);
        }
        for id in &painted {
            self.paint_connection(*id, &mut pass);
        }
        self.finish_pass(&mut pass);
        debug!(
            elements = elements.len(),
            connections = painted.len(),
            "repainted"
        );
        painted.into_iter().collect()
    }

    /// Hand the continuous anchors of `element` to the manager
    fn place_continuous(&mut self, element: &ElementId) -> RedrawOutcome {
        let outcome = {
            let endpoints = &self.endpoints;
            let elements = &self.elements;
            let drag = self.drag.as_ref();
            let ends: Vec<ConnectionEnds<'_>> = self
                .connections
                .values()
                .filter_map(|c| {
                    let source = endpoints.get(&c.source)?;
                    let target = endpoints.get(&c.target)?;
                    if &source.element != element && &target.element != element {
                        return None;
                    }
                    Some(ConnectionEnds {
                        id: c.id,
                        source: end_view(source, element_rect(elements, drag, source)),
                        target: end_view(target, element_rect(elements, drag, target)),
                    })
                })
                .collect();
            let idle: Vec<IdleEndpoint<'_>> = endpoints
                .values()
                .filter(|e| &e.element == element && e.connections.is_empty())
                .filter_map(|e| {
                    let anchor = e.anchor.as_continuous()?;
                    Some(IdleEndpoint {
                        endpoint: e.id,
                        element: &e.element,
                        rect: element_rect(elements, drag, e),
                        face: anchor.default_face(),
                    })
                })
                .collect();
            self.manager.redraw(element, &ends, &idle)
        };

        for (ep, face) in &outcome.faces {
            if let Some(anchor) = self
                .endpoints
                .get_mut(ep)
                .and_then(|e| e.anchor.as_continuous_mut())
            {
                anchor.set_current_face(*face);
            }
        }
        outcome
    }

    fn compute_anchor(
        &mut self,
        endpoint: EndpointId,
        own: Rect,
        opposite: Option<Rect>,
        pass: &mut PaintPass,
    ) -> AnchorLocation {
        let params = AnchorParams::new(endpoint, own)
            .with_opposite(opposite)
            .with_continuous(self.manager.location(endpoint));
        self.endpoints
            .get_mut(&endpoint)
            .map(|e| e.anchor.compute(&params, pass))
            .unwrap_or_default()
    }

    fn paint_idle_endpoint(&mut self, endpoint: EndpointId, pass: &mut PaintPass) {
        let Some(ep) = self.endpoints.get(&endpoint) else {
            return;
        };
        let rect = element_rect(&self.elements, self.drag.as_ref(), ep);
        self.compute_anchor(endpoint, rect, None, pass);
    }

    fn paint_connection(&mut self, id: ConnectionId, pass: &mut PaintPass) {
        let Some((source, target)) = self.connections.get(&id).map(|c| (c.source, c.target)) else {
            return;
        };
        let (Some(s), Some(t)) = (self.endpoints.get(&source), self.endpoints.get(&target)) else {
            return;
        };
        let drag = self.drag.as_ref();
        let s_rect = element_rect(&self.elements, drag, s);
        let t_rect = element_rect(&self.elements, drag, t);
        let (s_element, t_element) = (s.element.clone(), t.element.clone());

        let s_location = self.compute_anchor(source, s_rect, Some(t_rect), pass);
        let t_location = self.compute_anchor(target, t_rect, Some(s_rect), pass);
        let params = ConnectorParams::new(
            ConnectorEnd::new(s_location, s_element, s_rect),
            ConnectorEnd::new(t_location, t_element, t_rect),
        )
        .with_stroke_width(self.config.stroke_width);

        if let Some(connection) = self.connections.get_mut(&id) {
            connection.connector.compute(&params);
            trace!(
                connection = %id,
                segments = connection.connector.segments().len(),
                length = connection.connector.length(),
                "connection computed"
            );
        }
    }

    fn finish_pass(&mut self, pass: &mut PaintPass) {
        for event in pass.take_events() {
            let AnchorEvent::AnchorChanged {
                endpoint,
                from,
                to,
                location,
            } = event;
            self.listeners.fire(&DiagramEvent::AnchorChanged {
                endpoint,
                from,
                to,
                location,
            });
        }
    }

    // ----- bookkeeping -----

    fn next_id(&mut self) -> u32 {
        self.last_id += 1;
        self.last_id
    }

    fn build_anchor(&self, spec: &AnchorSpec) -> Result<Option<Anchor>, DiagramError> {
        match self.anchors.build(spec) {
            Ok(anchor) => Ok(Some(anchor)),
            Err(AnchorError::UnknownType { name }) if self.config.do_not_throw_errors => {
                warn!(anchor_type = %name, "unknown anchor type ignored");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn build_connector(&self, spec: &ConnectorSpec) -> Result<Option<Connector>, DiagramError> {
        match self.connectors.build(spec) {
            Ok(connector) => Ok(Some(connector)),
            Err(ConnectorError::UnknownType { name }) if self.config.do_not_throw_errors => {
                warn!(connector_type = %name, "unknown connector type ignored");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn insert_endpoint(&mut self, element: ElementId, anchor: Anchor, transient: bool) -> EndpointId {
        let id = EndpointId(self.next_id());
        trace!(endpoint = %id, element = %element, anchor = anchor.type_name(), "endpoint added");
        self.endpoints
            .insert(id, Endpoint::new(id, element, anchor, transient));
        id
    }

    fn add_connection(
        &mut self,
        source: EndpointId,
        target: EndpointId,
        connector: Connector,
        overlays: Vec<Overlay>,
    ) -> ConnectionId {
        let id = ConnectionId(self.next_id());
        for ep in [source, target] {
            if let Some(e) = self.endpoints.get_mut(&ep) {
                e.connections.push(id);
            }
        }
        debug!(
            connection = %id,
            source = %source,
            target = %target,
            connector = connector.type_name(),
            "connection added"
        );
        self.connections.insert(
            id,
            Connection {
                id,
                source,
                target,
                connector,
                overlays,
            },
        );
        id
    }

    /// Remove a connection without repainting; returns the elements it touched
    fn detach_connection(&mut self, id: ConnectionId) -> Option<Vec<ElementId>> {
        let connection = self.connections.remove(&id)?;
        let mut elements = Vec::new();
        for ep in [connection.source, connection.target] {
            let Some(e) = self.endpoints.get_mut(&ep) else {
                continue;
            };
            e.connections.retain(|c| *c != id);
            if !elements.contains(&e.element) {
                elements.push(e.element.clone());
            }
            if e.transient && e.connections.is_empty() {
                self.endpoints.remove(&ep);
                self.manager.remove_endpoint(ep);
            }
        }
        self.manager.remove_connection(id);
        debug!(connection = %id, "connection deleted");
        self.listeners
            .fire(&DiagramEvent::ConnectionDeleted { connection: id });
        Some(elements)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn two_boxes() -> Diagram {
        let mut d = Diagram::default();
        d.set_element_bounds("a", Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        d.set_element_bounds("b", Rect::new(300.0, 0.0, 100.0, 50.0)).unwrap();
        d
    }

    fn recorder(d: &mut Diagram) -> Rc<RefCell<Vec<DiagramEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        d.bind(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    #[test]
    fn test_connect_with_defaults() {
        let mut d = two_boxes();
        let id = d.connect("a", "b", ConnectOptions::new()).unwrap().unwrap();
        let c = d.connection(id).unwrap();
        assert_eq!(c.connector().type_name(), "Bezier");
        assert_eq!(c.connector().source_point(), Some(Point::new(50.0, 50.0)));
        assert_eq!(c.connector().target_point(), Some(Point::new(350.0, 50.0)));
        assert_eq!(d.endpoints().count(), 2);
    }

    #[test]
    fn test_unknown_types() {
        let mut d = two_boxes();
        let options = ConnectOptions::new().with_connector(ConnectorSpec::named("Zigzag"));
        let err = d.connect("a", "b", options.clone()).unwrap_err();
        assert_eq!(
            err,
            DiagramError::Connector(ConnectorError::unknown("Zigzag"))
        );
        assert_eq!(err.to_string(), "unknown connector type 'Zigzag'");

        let mut quiet = Diagram::new(DiagramConfig::new().with_do_not_throw_errors(true));
        assert_eq!(quiet.connect("a", "b", options), Ok(None));
        assert_eq!(
            quiet.add_endpoint("a", &AnchorSpec::named("Nowhere")),
            Ok(None)
        );
        assert_eq!(quiet.connections().count(), 0);
        assert_eq!(quiet.endpoints().count(), 0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut d = Diagram::default();
        let err = d
            .set_element_bounds("a", Rect::new(0.0, f64::NAN, 10.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, DiagramError::InvalidBounds { .. }));
        assert!(d
            .set_element_bounds("a", Rect::new(0.0, 0.0, -1.0, 10.0))
            .is_err());
        assert_eq!(d.element_bounds(&"a".into()), None);
    }

    #[test]
    fn test_suspend_defers_painting() {
        let mut d = two_boxes();
        d.set_suspend_drawing(true, false);
        let id = d.connect("a", "b", ConnectOptions::new()).unwrap().unwrap();
        assert!(d.connection(id).unwrap().connector().segments().is_empty());
        assert!(d.redraw(&"a".into()).is_empty());

        assert!(d.set_suspend_drawing(false, true));
        assert!(!d.connection(id).unwrap().connector().segments().is_empty());
    }

    #[test]
    fn test_batch_repaints_once_at_end() {
        let mut d = two_boxes();
        let id = d.batch(|d| {
            let id = d.connect("a", "b", ConnectOptions::new()).unwrap().unwrap();
            assert!(d.is_drawing_suspended());
            id
        });
        assert!(!d.is_drawing_suspended());
        assert!(d.connection(id).unwrap().connector().length() > 0.0);
    }

    #[test]
    fn test_delete_connection_drops_its_endpoints() {
        let mut d = two_boxes();
        let kept = d
            .add_endpoint("a", &AnchorSpec::named("Right"))
            .unwrap()
            .unwrap();
        let id = d.connect("a", "b", ConnectOptions::new()).unwrap().unwrap();
        let events = recorder(&mut d);

        d.delete_connection(id).unwrap();
        assert_eq!(d.connections().count(), 0);
        assert_eq!(d.endpoints().map(|e| e.id()).collect::<Vec<_>>(), vec![kept]);
        assert_eq!(
            *events.borrow(),
            vec![DiagramEvent::ConnectionDeleted { connection: id }]
        );
        assert_eq!(
            d.delete_connection(id),
            Err(DiagramError::UnknownConnection { connection: id })
        );
    }

    #[test]
    fn test_dynamic_anchor_change_is_reported() {
        let mut d = two_boxes();
        let options = ConnectOptions::new().with_anchor(AnchorSpec::named("AutoDefault"));
        let id = d.connect("a", "b", options).unwrap().unwrap();
        let source = d.connection(id).unwrap().source();
        assert_eq!(
            d.endpoint_location(source).map(|l| l.point),
            Some(Point::new(100.0, 25.0))
        );

        let events = recorder(&mut d);
        d.set_element_bounds("b", Rect::new(0.0, 300.0, 100.0, 50.0)).unwrap();
        d.redraw(&"b".into());
        assert_eq!(
            d.endpoint_location(source).map(|l| l.point),
            Some(Point::new(50.0, 50.0))
        );
        assert!(events.borrow().iter().any(|e| matches!(
            e,
            DiagramEvent::AnchorChanged { endpoint, to: 2, .. } if *endpoint == source
        )));
    }

    #[test]
    fn test_idle_continuous_endpoint_gets_default_face() {
        let mut d = two_boxes();
        let spec: AnchorSpec = "[Continuous, {faces: [left, bottom]}]".parse().unwrap();
        let ep = d.add_endpoint("a", &spec).unwrap().unwrap();
        assert_eq!(d.continuous_face(ep), Some(Face::Left));
        assert_eq!(
            d.endpoint_location(ep).map(|l| l.point),
            Some(Point::new(0.0, 25.0))
        );
    }

    #[test]
    fn test_pinned_anchor_wins_until_cleared() {
        let mut d = two_boxes();
        let options = ConnectOptions::new()
            .with_anchor(AnchorSpec::named("Right"))
            .with_connector(ConnectorSpec::named("Straight"));
        let id = d.connect("a", "b", options).unwrap().unwrap();
        let source = d.connection(id).unwrap().source();

        d.set_anchor_location(source, Some(Point::new(20.0, 50.0))).unwrap();
        d.redraw(&"a".into());
        assert_eq!(
            d.connection(id).unwrap().connector().source_point(),
            Some(Point::new(20.0, 50.0))
        );

        d.set_anchor_location(source, None).unwrap();
        d.redraw(&"a".into());
        assert_eq!(
            d.connection(id).unwrap().connector().source_point(),
            Some(Point::new(100.0, 25.0))
        );
    }

    #[test]
    fn test_remove_element_takes_connections() {
        let mut d = two_boxes();
        d.set_element_bounds("c", Rect::new(0.0, 200.0, 50.0, 50.0)).unwrap();
        d.connect("a", "b", ConnectOptions::new()).unwrap();
        let survivor = d.connect("b", "c", ConnectOptions::new()).unwrap().unwrap();

        d.remove_element(&"a".into()).unwrap();
        assert_eq!(
            d.connections().map(|c| c.id()).collect::<Vec<_>>(),
            vec![survivor]
        );
        assert!(d.endpoints_on(&"a".into()).is_empty());
        assert_eq!(
            d.remove_element(&"a".into()),
            Err(DiagramError::UnknownElement {
                element: "a".into()
            })
        );
    }

    #[test]
    fn test_unmeasured_element_uses_zero_rect() {
        let mut d = Diagram::default();
        d.set_element_bounds("a", Rect::new(100.0, 100.0, 20.0, 20.0)).unwrap();
        let options = ConnectOptions::new().with_connector(ConnectorSpec::named("Straight"));
        let id = d.connect("a", "ghost", options).unwrap().unwrap();
        assert_eq!(
            d.connection(id).unwrap().connector().target_point(),
            Some(Point::new(0.0, 0.0))
        );
    }
}
