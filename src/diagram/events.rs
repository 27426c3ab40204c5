//! Observers for diagram changes

use std::fmt;

use crate::anchor::AnchorLocation;
use crate::types::{ConnectionId, EndpointId};

#[derive(Debug, Clone, PartialEq)]
pub enum DiagramEvent {
    /// A dynamic anchor switched to another candidate during a repaint
    AnchorChanged {
        endpoint: EndpointId,
        from: usize,
        to: usize,
        location: AnchorLocation,
    },
    ConnectionCreated {
        connection: ConnectionId,
    },
    ConnectionDeleted {
        connection: ConnectionId,
    },
    /// A drag was cancelled; its temporary connection is gone
    DragAborted {
        source: EndpointId,
    },
}

/// Handle returned by [`Listeners::bind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&DiagramEvent)>;

/// Callbacks run in the order they were bound
#[derive(Default)]
pub struct Listeners {
    callbacks: Vec<(ListenerId, Callback)>,
    next: u64,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, callback: impl FnMut(&DiagramEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback; false if it was not bound
    pub fn unbind(&mut self, id: ListenerId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(i, _)| *i != id);
        self.callbacks.len() != before
    }

    pub fn fire(&mut self, event: &DiagramEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_fire_in_bind_order_and_unbind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        let first = {
            let seen = seen.clone();
            listeners.bind(move |_| seen.borrow_mut().push("first"))
        };
        {
            let seen = seen.clone();
            listeners.bind(move |_| seen.borrow_mut().push("second"));
        }

        let event = DiagramEvent::ConnectionCreated {
            connection: ConnectionId(1),
        };
        listeners.fire(&event);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);

        assert!(listeners.unbind(first));
        assert!(!listeners.unbind(first));
        listeners.fire(&event);
        assert_eq!(*seen.borrow(), vec!["first", "second", "second"]);
        assert_eq!(listeners.len(), 1);
    }
}
