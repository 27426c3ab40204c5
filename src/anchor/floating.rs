use crate::geom::{Point, Rect};
use crate::types::Orientation;

use super::AnchorLocation;

/// Anchor of the loose end of a connection being dragged
///
/// Its element is the pointer proxy box; the anchor sits at the box centre
/// and borrows the orientation of whatever anchor it is hovering over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingAnchor {
    hovered: Option<Orientation>,
}

impl FloatingAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start hovering over an anchor facing `orientation`
    pub fn over(&mut self, orientation: Orientation) {
        self.hovered = Some(orientation);
    }

    pub fn out(&mut self) {
        self.hovered = None;
    }

    pub fn is_hovering(&self) -> bool {
        self.hovered.is_some()
    }

    pub fn orientation(&self) -> Orientation {
        self.hovered.unwrap_or(Orientation::ZERO)
    }

    pub(super) fn compute(&self, proxy: &Rect) -> AnchorLocation {
        AnchorLocation::new(proxy.center(), Point::new(0.5, 0.5), self.orientation())
    }
}
