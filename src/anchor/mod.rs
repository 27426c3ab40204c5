//! Anchors: where a connection attaches to an element
//!
//! Every anchor turns the owning element's rectangle into an
//! [`AnchorLocation`]: a point, its position relative to the element, and
//! the direction the anchor faces. The variants differ in how the point is
//! chosen:
//!
//! - [`StaticAnchor`]: a fixed position in the element's unit square
//! - [`DynamicAnchor`]: the best of several static candidates, re-chosen
//!   on each paint
//! - [`ContinuousAnchor`]: a slot assigned by the [`AnchorManager`]
//! - [`FloatingAnchor`]: follows the pointer during a drag
//!
//! Results are cached per endpoint in a [`PaintPass`], so asking twice in
//! one pass returns the same location.

mod continuous;
mod dynamic;
mod error;
mod floating;
pub mod manager;
mod perimeter;
mod registry;

pub use continuous::ContinuousAnchor;
pub use dynamic::{AnchorSelector, DynamicAnchor};
pub use error::AnchorError;
pub use floating::FloatingAnchor;
pub use manager::AnchorManager;
pub use perimeter::{perimeter_anchors, PerimeterShape};
pub use registry::{AnchorFactory, AnchorRegistry};

use std::collections::HashMap;

use crate::geom::{Point, Rect};
use crate::types::{EndpointId, Orientation};

/// A computed attachment: `[x, y, rel_x, rel_y]` plus the facing direction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorLocation {
    pub point: Point,
    /// Position within the element's unit square
    pub rel: Point,
    pub orientation: Orientation,
}

impl AnchorLocation {
    pub fn new(point: Point, rel: Point, orientation: Orientation) -> Self {
        Self {
            point,
            rel,
            orientation,
        }
    }

    /// `[x, y, rel_x, rel_y]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.point.x, self.point.y, self.rel.x, self.rel.y]
    }
}

/// Ratio of `value` to `extent`, zero where the extent is zero
pub(crate) fn ratio(value: f64, extent: f64) -> f64 {
    let r = value / extent;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// A fixed position in the element's unit square
#[derive(Debug, Clone, PartialEq)]
pub struct StaticAnchor {
    pub x: f64,
    pub y: f64,
    pub orientation: Orientation,
    /// Pixel nudge applied after scaling
    pub offsets: [f64; 2],
    /// Registered name this anchor was created from, if any
    pub name: Option<String>,
}

impl StaticAnchor {
    pub fn new(x: f64, y: f64, ox: f64, oy: f64) -> Self {
        Self {
            x,
            y,
            orientation: Orientation::new(ox, oy),
            offsets: [0.0, 0.0],
            name: None,
        }
    }

    pub fn with_offsets(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offsets = [offset_x, offset_y];
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Position on `rect` without offsets
    pub fn raw_point(&self, rect: &Rect) -> Point {
        Point::new(rect.x + self.x * rect.width, rect.y + self.y * rect.height)
    }

    pub fn compute(&self, rect: &Rect) -> AnchorLocation {
        let p = self.raw_point(rect);
        AnchorLocation::new(
            p.offset(self.offsets[0], self.offsets[1]),
            Point::new(self.x, self.y),
            self.orientation,
        )
    }
}

/// Inputs to one anchor computation
#[derive(Debug, Clone)]
pub struct AnchorParams {
    pub endpoint: EndpointId,
    /// Rectangle of the owning element; a zero rectangle if not yet measured
    pub element: Rect,
    /// Rectangle of the element at the other end of the connection
    pub opposite: Option<Rect>,
    /// Slot assigned by the continuous anchor manager
    pub continuous: Option<AnchorLocation>,
}

impl AnchorParams {
    pub fn new(endpoint: EndpointId, element: Rect) -> Self {
        Self {
            endpoint,
            element,
            opposite: None,
            continuous: None,
        }
    }

    pub fn with_opposite(mut self, opposite: Option<Rect>) -> Self {
        self.opposite = opposite;
        self
    }

    pub fn with_continuous(mut self, slot: Option<AnchorLocation>) -> Self {
        self.continuous = slot;
        self
    }
}

/// Notification raised while computing anchors
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorEvent {
    /// A dynamic anchor switched candidates
    AnchorChanged {
        endpoint: EndpointId,
        from: usize,
        to: usize,
        location: AnchorLocation,
    },
}

/// Per-repaint scratch space: computed locations and raised events
#[derive(Debug, Default)]
pub struct PaintPass {
    locations: HashMap<EndpointId, AnchorLocation>,
    events: Vec<AnchorEvent>,
}

impl PaintPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, endpoint: EndpointId) -> Option<AnchorLocation> {
        self.locations.get(&endpoint).copied()
    }

    pub fn store(&mut self, endpoint: EndpointId, location: AnchorLocation) {
        self.locations.insert(endpoint, location);
    }

    pub fn emit(&mut self, event: AnchorEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<AnchorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of endpoints computed so far in this pass
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// The strategy an [`Anchor`] uses
#[derive(Debug, Clone)]
pub enum AnchorKind {
    Static(StaticAnchor),
    Dynamic(DynamicAnchor),
    Continuous(ContinuousAnchor),
    Floating(FloatingAnchor),
}

/// An anchor bound to one endpoint
#[derive(Debug, Clone)]
pub struct Anchor {
    kind: AnchorKind,
    user_defined_location: Option<Point>,
    current: Option<AnchorLocation>,
}

impl Anchor {
    pub fn new(kind: AnchorKind) -> Self {
        Self {
            kind,
            user_defined_location: None,
            current: None,
        }
    }

    pub fn kind(&self) -> &AnchorKind {
        &self.kind
    }

    /// Type name for logs and debug output
    pub fn type_name(&self) -> &str {
        match &self.kind {
            AnchorKind::Static(s) => s.name.as_deref().unwrap_or("Static"),
            AnchorKind::Dynamic(_) => "Dynamic",
            AnchorKind::Continuous(_) => "Continuous",
            AnchorKind::Floating(_) => "Floating",
        }
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self.kind, AnchorKind::Continuous(_))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, AnchorKind::Dynamic(_))
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.kind, AnchorKind::Floating(_))
    }

    pub fn as_continuous(&self) -> Option<&ContinuousAnchor> {
        match &self.kind {
            AnchorKind::Continuous(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_continuous_mut(&mut self) -> Option<&mut ContinuousAnchor> {
        match &mut self.kind {
            AnchorKind::Continuous(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_dynamic(&self) -> Option<&DynamicAnchor> {
        match &self.kind {
            AnchorKind::Dynamic(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dynamic_mut(&mut self) -> Option<&mut DynamicAnchor> {
        match &mut self.kind {
            AnchorKind::Dynamic(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_floating_mut(&mut self) -> Option<&mut FloatingAnchor> {
        match &mut self.kind {
            AnchorKind::Floating(f) => Some(f),
            _ => None,
        }
    }

    /// Pin the anchor to a point until [`Anchor::clear_user_defined_location`]
    pub fn set_user_defined_location(&mut self, point: Point) {
        self.user_defined_location = Some(point);
    }

    pub fn clear_user_defined_location(&mut self) {
        self.user_defined_location = None;
    }

    pub fn user_defined_location(&self) -> Option<Point> {
        self.user_defined_location
    }

    /// Freeze dynamic or continuous selection at its current choice
    pub fn lock(&mut self) {
        match &mut self.kind {
            AnchorKind::Dynamic(d) => d.lock(),
            AnchorKind::Continuous(c) => c.lock(),
            _ => {}
        }
    }

    pub fn unlock(&mut self) {
        match &mut self.kind {
            AnchorKind::Dynamic(d) => d.unlock(),
            AnchorKind::Continuous(c) => c.unlock(),
            _ => {}
        }
    }

    /// Location from the most recent compute
    pub fn current_location(&self) -> Option<AnchorLocation> {
        self.current
    }

    /// Direction the anchor currently faces
    pub fn orientation(&self) -> Orientation {
        if let Some(current) = self.current {
            return current.orientation;
        }
        match &self.kind {
            AnchorKind::Static(s) => s.orientation,
            AnchorKind::Dynamic(d) => d.current().orientation,
            AnchorKind::Continuous(c) => c
                .current_face()
                .map(|f| f.orientation())
                .unwrap_or(Orientation::ZERO),
            AnchorKind::Floating(f) => f.orientation(),
        }
    }

    /// Compute this anchor's location for the current paint pass
    pub fn compute(&mut self, params: &AnchorParams, pass: &mut PaintPass) -> AnchorLocation {
        if let Some(hit) = pass.cached(params.endpoint) {
            return hit;
        }

        let location = match &mut self.kind {
            AnchorKind::Static(s) => s.compute(&params.element),
            AnchorKind::Dynamic(d) => {
                let changed = d.select(&params.element, params.opposite.as_ref());
                let location = d.current().compute(&params.element);
                if let Some((from, to)) = changed {
                    pass.emit(AnchorEvent::AnchorChanged {
                        endpoint: params.endpoint,
                        from,
                        to,
                        location,
                    });
                }
                location
            }
            AnchorKind::Continuous(c) => c.compute(params.continuous),
            AnchorKind::Floating(f) => f.compute(&params.element),
        };

        let location = match self.user_defined_location {
            Some(p) => AnchorLocation::new(
                p,
                Point::new(
                    ratio(p.x - params.element.x, params.element.width),
                    ratio(p.y - params.element.y, params.element.height),
                ),
                location.orientation,
            ),
            None => location,
        };

        self.current = Some(location);
        pass.store(params.endpoint, location);
        location
    }
}

impl From<StaticAnchor> for Anchor {
    fn from(a: StaticAnchor) -> Self {
        Anchor::new(AnchorKind::Static(a))
    }
}

impl From<DynamicAnchor> for Anchor {
    fn from(a: DynamicAnchor) -> Self {
        Anchor::new(AnchorKind::Dynamic(a))
    }
}

impl From<ContinuousAnchor> for Anchor {
    fn from(a: ContinuousAnchor) -> Self {
        Anchor::new(AnchorKind::Continuous(a))
    }
}

impl From<FloatingAnchor> for Anchor {
    fn from(a: FloatingAnchor) -> Self {
        Anchor::new(AnchorKind::Floating(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(rect: Rect) -> AnchorParams {
        AnchorParams::new(EndpointId(1), rect)
    }

    #[test]
    fn test_static_compute_scales_and_offsets() {
        let a = StaticAnchor::new(0.5, 1.0, 0.0, 1.0).with_offsets(3.0, -2.0);
        let loc = a.compute(&Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(loc.to_array(), [63.0, 68.0, 0.5, 1.0]);
        assert_eq!(loc.orientation, Orientation::new(0.0, 1.0));
    }

    #[test]
    fn test_compute_is_cached_per_pass() {
        let mut anchor = Anchor::from(StaticAnchor::new(0.0, 0.0, 0.0, -1.0));
        let mut pass = PaintPass::new();
        let first = anchor.compute(&params(Rect::new(0.0, 0.0, 10.0, 10.0)), &mut pass);
        let second = anchor.compute(&params(Rect::new(50.0, 50.0, 10.0, 10.0)), &mut pass);
        assert_eq!(first, second);

        let mut next = PaintPass::new();
        let third = anchor.compute(&params(Rect::new(50.0, 50.0, 10.0, 10.0)), &mut next);
        assert_eq!(third.point, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_user_defined_location_wins_until_cleared() {
        let mut anchor = Anchor::from(StaticAnchor::new(0.0, 0.0, 0.0, -1.0));
        anchor.set_user_defined_location(Point::new(5.0, 7.5));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let loc = anchor.compute(&params(rect), &mut PaintPass::new());
        assert_eq!(loc.point, Point::new(5.0, 7.5));
        assert_eq!(loc.rel, Point::new(0.5, 0.75));

        anchor.clear_user_defined_location();
        let loc = anchor.compute(&params(rect), &mut PaintPass::new());
        assert_eq!(loc.point, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_missing_continuous_slot_is_origin() {
        let mut anchor = Anchor::from(ContinuousAnchor::default());
        let loc = anchor.compute(&params(Rect::zero()), &mut PaintPass::new());
        assert_eq!(loc.point, Point::new(0.0, 0.0));
        assert!(anchor.is_continuous());
    }

    #[test]
    fn test_ratio_guards_zero_extent() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(ratio(5.0, 10.0), 0.5);
    }
}
