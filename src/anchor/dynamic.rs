use std::fmt;
use std::rc::Rc;

use crate::geom::Rect;

use super::{AnchorError, StaticAnchor};

/// Custom candidate chooser: `(candidates, own rect, opposite rect, current) -> index`
pub type AnchorSelector = dyn Fn(&[StaticAnchor], &Rect, &Rect, usize) -> usize;

/// Chooses among fixed candidates, the one closest to the opposite element
#[derive(Clone)]
pub struct DynamicAnchor {
    candidates: Vec<StaticAnchor>,
    current: usize,
    locked: bool,
    selector: Option<Rc<AnchorSelector>>,
}

impl fmt::Debug for DynamicAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicAnchor")
            .field("candidates", &self.candidates)
            .field("current", &self.current)
            .field("locked", &self.locked)
            .field("selector", &self.selector.is_some())
            .finish()
    }
}

impl DynamicAnchor {
    pub fn new(candidates: Vec<StaticAnchor>) -> Result<Self, AnchorError> {
        if candidates.is_empty() {
            return Err(AnchorError::NoCandidates);
        }
        Ok(Self {
            candidates,
            current: 0,
            locked: false,
            selector: None,
        })
    }

    pub fn with_selector(
        mut self,
        selector: impl Fn(&[StaticAnchor], &Rect, &Rect, usize) -> usize + 'static,
    ) -> Self {
        self.selector = Some(Rc::new(selector));
        self
    }

    pub fn candidates(&self) -> &[StaticAnchor] {
        &self.candidates
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &StaticAnchor {
        &self.candidates[self.current]
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Re-choose the candidate; returns `(from, to)` when the choice changed
    ///
    /// A locked anchor, or one without an opposite element, keeps its choice.
    pub fn select(&mut self, own: &Rect, opposite: Option<&Rect>) -> Option<(usize, usize)> {
        let opposite = match opposite {
            Some(o) if !self.locked => o,
            _ => return None,
        };
        let next = match &self.selector {
            Some(selector) => selector(&self.candidates, own, opposite, self.current),
            None => nearest(&self.candidates, own, opposite).unwrap_or(self.current),
        };
        if next >= self.candidates.len() || next == self.current {
            return None;
        }
        let previous = self.current;
        self.current = next;
        Some((previous, next))
    }
}

/// Index of the candidate minimizing the distance to the opposite centre
/// plus the distance to the element's own centre
fn nearest(candidates: &[StaticAnchor], own: &Rect, opposite: &Rect) -> Option<usize> {
    let target = opposite.center();
    let centre = own.center();
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let p = candidate.raw_point(own);
        let cost = p.distance_to(target) + p.distance_to(centre);
        if !cost.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, c)| cost < c) {
            best = Some((i, cost));
        }
    }
    best.map(|(i, _)| i)
}
