//! Dragging a new connection out of an endpoint
//!
//! While a drag is active the loose end of the connection is a floating
//! endpoint sitting on a zero-size proxy rectangle at the pointer. Hovering
//! over another endpoint lends the floating anchor that endpoint's
//! orientation; dropping swaps the floating endpoint for the real one.

use tracing::debug;

use crate::anchor::FloatingAnchor;
use crate::geom::{Point, Rect};
use crate::spec::ConnectorSpec;
use crate::types::{ConnectionId, ElementId, EndpointId};

use super::{Diagram, DiagramError, DiagramEvent, Endpoint};

#[derive(Debug, Clone)]
pub(super) struct DragState {
    pub source: EndpointId,
    pub floating: EndpointId,
    pub connection: ConnectionId,
    pub proxy: Rect,
    pub hover: Option<EndpointId>,
}

fn proxy_at(pointer: Point) -> Rect {
    Rect::new(pointer.x, pointer.y, 0.0, 0.0)
}

impl Diagram {
    /// Start dragging a connection out of `source`
    ///
    /// `Ok(None)` when the connector type is unknown and the diagram is
    /// configured not to raise errors.
    pub fn begin_drag(
        &mut self,
        source: EndpointId,
        pointer: Point,
        connector: Option<&ConnectorSpec>,
    ) -> Result<Option<ConnectionId>, DiagramError> {
        if self.drag.is_some() {
            return Err(DiagramError::DragInProgress);
        }
        let source_element = self
            .endpoints
            .get(&source)
            .map(|e| e.element.clone())
            .ok_or(DiagramError::UnknownEndpoint { endpoint: source })?;
        let spec = connector
            .cloned()
            .unwrap_or_else(|| self.config.default_connector.clone());
        let Some(connector) = self.build_connector(&spec)? else {
            return Ok(None);
        };

        let floating = EndpointId(self.next_id());
        let proxy_element = ElementId::new(format!("{floating}-proxy"));
        self.endpoints.insert(
            floating,
            Endpoint::new(floating, proxy_element, FloatingAnchor::new().into(), true),
        );
        let connection = self.add_connection(source, floating, connector, Vec::new());
        self.drag = Some(DragState {
            source,
            floating,
            connection,
            proxy: proxy_at(pointer),
            hover: None,
        });
        debug!(source = %source, connection = %connection, "drag started");
        self.redraw_elements(&[source_element]);
        Ok(Some(connection))
    }

    /// Follow the pointer
    pub fn drag_move(&mut self, pointer: Point) -> Result<(), DiagramError> {
        let drag = self.drag.as_mut().ok_or(DiagramError::NoDrag)?;
        drag.proxy = proxy_at(pointer);
        self.repaint_drag();
        Ok(())
    }

    /// The pointer entered `target`; the loose end takes its orientation
    pub fn drag_over(&mut self, target: EndpointId) -> Result<(), DiagramError> {
        let floating = self.drag.as_ref().ok_or(DiagramError::NoDrag)?.floating;
        let orientation = self
            .endpoints
            .get(&target)
            .map(|e| e.anchor.orientation())
            .ok_or(DiagramError::UnknownEndpoint { endpoint: target })?;
        if let Some(anchor) = self
            .endpoints
            .get_mut(&floating)
            .and_then(|e| e.anchor.as_floating_mut())
        {
            anchor.over(orientation);
        }
        if let Some(drag) = self.drag.as_mut() {
            drag.hover = Some(target);
        }
        self.repaint_drag();
        Ok(())
    }

    /// The pointer left the hovered endpoint
    pub fn drag_out(&mut self) -> Result<(), DiagramError> {
        let drag = self.drag.as_mut().ok_or(DiagramError::NoDrag)?;
        drag.hover = None;
        let floating = drag.floating;
        if let Some(anchor) = self
            .endpoints
            .get_mut(&floating)
            .and_then(|e| e.anchor.as_floating_mut())
        {
            anchor.out();
        }
        self.repaint_drag();
        Ok(())
    }

    /// Finish the drag on `target`, or on the hovered endpoint when `None`
    ///
    /// Dropping over nothing aborts the drag and returns `Ok(None)`.
    pub fn drop_drag(
        &mut self,
        target: Option<EndpointId>,
    ) -> Result<Option<ConnectionId>, DiagramError> {
        let drag = self.drag.as_ref().ok_or(DiagramError::NoDrag)?;
        let (hover, floating) = (drag.hover, drag.floating);
        let Some(target) = target.or(hover) else {
            self.abort_drag();
            return Ok(None);
        };
        // the loose end is removed on drop and cannot be its own target
        if target == floating || !self.endpoints.contains_key(&target) {
            return Err(DiagramError::UnknownEndpoint { endpoint: target });
        }
        let Some(state) = self.drag.take() else {
            return Err(DiagramError::NoDrag);
        };

        self.endpoints.remove(&state.floating);
        self.manager.remove_endpoint(state.floating);
        if let Some(c) = self.connections.get_mut(&state.connection) {
            c.target = target;
        }
        let mut elements = Vec::new();
        for ep in [state.source, target] {
            if let Some(e) = self.endpoints.get_mut(&ep) {
                if ep == target {
                    e.connections.push(state.connection);
                }
                if !elements.contains(&e.element) {
                    elements.push(e.element.clone());
                }
            }
        }
        debug!(connection = %state.connection, target = %target, "drag dropped");
        self.listeners.fire(&DiagramEvent::ConnectionCreated {
            connection: state.connection,
        });
        self.redraw_elements(&elements);
        Ok(Some(state.connection))
    }

    /// Cancel the drag, discarding the temporary connection; false if none
    pub fn abort_drag(&mut self) -> bool {
        let Some(state) = self.drag.take() else {
            return false;
        };
        self.connections.remove(&state.connection);
        self.endpoints.remove(&state.floating);
        self.manager.remove_connection(state.connection);
        self.manager.remove_endpoint(state.floating);
        let source_element = self.endpoints.get_mut(&state.source).map(|e| {
            e.connections.retain(|c| *c != state.connection);
            e.element.clone()
        });
        debug!(source = %state.source, "drag aborted");
        self.listeners
            .fire(&DiagramEvent::DragAborted { source: state.source });
        if let Some(element) = source_element {
            self.redraw_elements(&[element]);
        }
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The temporary connection of the active drag
    pub fn dragged_connection(&self) -> Option<ConnectionId> {
        self.drag.as_ref().map(|d| d.connection)
    }

    fn repaint_drag(&mut self) {
        let source_element = self
            .drag
            .as_ref()
            .and_then(|d| self.endpoints.get(&d.source))
            .map(|e| e.element.clone());
        if let Some(element) = source_element {
            self.redraw_elements(&[element]);
        }
    }
}
