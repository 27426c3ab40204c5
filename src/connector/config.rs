//! Settings shared by every connector type

use crate::spec::Options;

use super::ConnectorError;

pub const DEFAULT_LOOPBACK_RADIUS: f64 = 25.0;
pub const DEFAULT_MARGIN: f64 = 5.0;

/// Stub, gap and loopback settings common to all routers
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorOptions {
    /// Straight run leaving each end: `[source, target]`
    pub stub: [f64; 2],
    /// Clearance between each anchor and the start of its stub
    pub gap: [f64; 2],
    /// Keep full stubs even when the ends are close together
    pub always_respect_stubs: bool,
    pub loopback_radius: f64,
    /// Space between an element and a loopback circle
    pub margin: f64,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            stub: [0.0, 0.0],
            gap: [0.0, 0.0],
            always_respect_stubs: false,
            loopback_radius: DEFAULT_LOOPBACK_RADIUS,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl ConnectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stub(self, stub: f64) -> Self {
        self.with_stubs(stub, stub)
    }

    pub fn with_stubs(mut self, source: f64, target: f64) -> Self {
        self.stub = [source, target];
        self
    }

    pub fn with_gap(self, gap: f64) -> Self {
        self.with_gaps(gap, gap)
    }

    pub fn with_gaps(mut self, source: f64, target: f64) -> Self {
        self.gap = [source, target];
        self
    }

    pub fn with_always_respect_stubs(mut self, respect: bool) -> Self {
        self.always_respect_stubs = respect;
        self
    }

    pub fn with_loopback_radius(mut self, radius: f64) -> Self {
        self.loopback_radius = radius;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Read the common options, using `default_stub` when `stub` is absent
    ///
    /// A zero or negative loopback radius or margin falls back to the default.
    pub fn from_options(options: &Options, default_stub: f64) -> Result<Self, ConnectorError> {
        let stub = options.number_pair("stub")?.unwrap_or([default_stub, default_stub]);
        let gap = options.number_pair("gap")?.unwrap_or([0.0, 0.0]);
        let always_respect_stubs = options.boolean("alwaysRespectStubs")?.unwrap_or(false);
        let loopback_radius = options
            .number("loopbackRadius")?
            .filter(|r| *r > 0.0)
            .unwrap_or(DEFAULT_LOOPBACK_RADIUS);
        let margin = options
            .number("margin")?
            .filter(|m| *m > 0.0)
            .unwrap_or(DEFAULT_MARGIN);
        Ok(Self {
            stub,
            gap,
            always_respect_stubs,
            loopback_radius,
            margin,
        })
    }

    pub fn max_stub(&self) -> f64 {
        self.stub[0].max(self.stub[1])
    }
}

/// Loopback direction from the `orientation` option; anticlockwise unless told otherwise
pub(crate) fn loopback_clockwise(options: &Options) -> Result<bool, ConnectorError> {
    match options.text("orientation")? {
        None | Some("anticlockwise") => Ok(false),
        Some("clockwise") => Ok(true),
        Some(other) => Err(ConnectorError::InvalidOrientation {
            value: other.to_string(),
        }),
    }
}
