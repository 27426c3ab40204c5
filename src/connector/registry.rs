//! Named connector types

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::spec::{ConnectorSpec, Options};

use super::flowchart::DEFAULT_STUB as FLOWCHART_STUB;
use super::{
    BezierRouter, Connector, ConnectorError, ConnectorOptions, FlowchartRouter,
    StateMachineRouter, StraightRouter,
};

/// Builds a connector from the options given in its spec
pub type ConnectorFactory = Rc<dyn Fn(&Options) -> Result<Connector, ConnectorError>>;

/// Registry of connector types, keyed by name
pub struct ConnectorRegistry {
    factories: HashMap<String, ConnectorFactory>,
}

impl fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("Straight", |options| {
            Ok(Connector::new(
                StraightRouter,
                ConnectorOptions::from_options(options, 0.0)?,
            ))
        });
        registry.register("Flowchart", |options| {
            Ok(Connector::new(
                FlowchartRouter::from_options(options)?,
                ConnectorOptions::from_options(options, FLOWCHART_STUB)?,
            ))
        });
        registry.register("Bezier", |options| {
            Ok(Connector::new(
                BezierRouter::from_options(options)?,
                ConnectorOptions::from_options(options, 0.0)?,
            ))
        });
        registry.register("StateMachine", |options| {
            Ok(Connector::new(
                StateMachineRouter::from_options(options)?,
                ConnectorOptions::from_options(options, 0.0)?,
            ))
        });
        registry
    }
}

impl ConnectorRegistry {
    /// Registry with every built-in connector type
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&Options) -> Result<Connector, ConnectorError> + 'static,
    ) {
        let name = name.into();
        debug!(connector_type = %name, "registering connector type");
        self.factories.insert(name, Rc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn build(&self, spec: &ConnectorSpec) -> Result<Connector, ConnectorError> {
        let factory = self
            .factories
            .get(&spec.name)
            .ok_or_else(|| ConnectorError::unknown(spec.name.clone()))?;
        factory(&spec.options)
    }
}
