//! Named anchor types

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::spec::{AnchorSpec, Options};
use crate::types::Face;

use super::{
    perimeter_anchors, Anchor, AnchorError, ContinuousAnchor, DynamicAnchor, PerimeterShape,
    StaticAnchor,
};

/// Builds an anchor from the options given in its spec
pub type AnchorFactory = Rc<dyn Fn(&Options) -> Result<Anchor, AnchorError>>;

const DEFAULT_PERIMETER_COUNT: usize = 60;

/// Largest `anchorCount` a perimeter anchor accepts
pub const MAX_PERIMETER_COUNT: usize = 1000;

/// Fixed positions registered under their names: `[x, y, ox, oy]`
const STATIC_ANCHORS: [(&str, [f64; 4]); 13] = [
    ("Top", [0.5, 0.0, 0.0, -1.0]),
    ("Bottom", [0.5, 1.0, 0.0, 1.0]),
    ("Left", [0.0, 0.5, -1.0, 0.0]),
    ("Right", [1.0, 0.5, 1.0, 0.0]),
    ("Center", [0.5, 0.5, 0.0, 0.0]),
    ("TopCenter", [0.5, 0.0, 0.0, -1.0]),
    ("BottomCenter", [0.5, 1.0, 0.0, 1.0]),
    ("LeftMiddle", [0.0, 0.5, -1.0, 0.0]),
    ("RightMiddle", [1.0, 0.5, 1.0, 0.0]),
    ("TopLeft", [0.0, 0.0, 0.0, -1.0]),
    ("TopRight", [1.0, 0.0, 0.0, -1.0]),
    ("BottomLeft", [0.0, 1.0, 0.0, 1.0]),
    ("BottomRight", [1.0, 1.0, 0.0, 1.0]),
];

/// Continuous variants and the faces they are restricted to
const CONTINUOUS_ANCHORS: [(&str, &[Face]); 7] = [
    ("Continuous", &[Face::Top, Face::Right, Face::Bottom, Face::Left]),
    ("ContinuousTop", &[Face::Top]),
    ("ContinuousBottom", &[Face::Bottom]),
    ("ContinuousLeft", &[Face::Left]),
    ("ContinuousRight", &[Face::Right]),
    ("ContinuousLeftRight", &[Face::Left, Face::Right]),
    ("ContinuousTopBottom", &[Face::Top, Face::Bottom]),
];

/// Registry of anchor types, keyed by name
pub struct AnchorRegistry {
    factories: HashMap<String, AnchorFactory>,
    statics: HashMap<String, StaticAnchor>,
}

impl fmt::Debug for AnchorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl Default for AnchorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, [x, y, ox, oy]) in STATIC_ANCHORS {
            registry.register_static(name, StaticAnchor::new(x, y, ox, oy));
        }
        for (name, faces) in CONTINUOUS_ANCHORS {
            let faces = faces.to_vec();
            registry.register(name, move |options| continuous(faces.clone(), options));
        }
        registry.register("AutoDefault", |_| {
            let candidates = ["Top", "Right", "Bottom", "Left"]
                .iter()
                .filter_map(|name| static_by_name(name))
                .collect();
            Ok(DynamicAnchor::new(candidates)?.into())
        });
        registry.register("Perimeter", perimeter);
        registry
    }
}

impl AnchorRegistry {
    /// Registry with every built-in anchor type
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry without any types
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&Options) -> Result<Anchor, AnchorError> + 'static,
    ) {
        let name = name.into();
        debug!(anchor_type = %name, "registering anchor type");
        self.statics.remove(&name);
        self.factories.insert(name, Rc::new(factory));
    }

    /// Register a fixed position under `name`; it may also be a dynamic candidate
    pub fn register_static(&mut self, name: impl Into<String>, anchor: StaticAnchor) {
        let name = name.into();
        let anchor = anchor.with_name(name.clone());
        let for_factory = anchor.clone();
        self.register(name.clone(), move |_| Ok(for_factory.clone().into()));
        self.statics.insert(name, anchor);
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

    /// Build an anchor from its spec
    pub fn build(&self, spec: &AnchorSpec) -> Result<Anchor, AnchorError> {
        match spec {
            AnchorSpec::Named { name, options } => {
                let factory = self
                    .factories
                    .get(name)
                    .ok_or_else(|| AnchorError::unknown(name.clone()))?;
                factory(options)
            }
            AnchorSpec::Coords { .. } => Ok(self.candidate(spec)?.into()),
            AnchorSpec::Dynamic(candidates) => {
                let statics = candidates
                    .iter()
                    .map(|c| self.candidate(c))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DynamicAnchor::new(statics)?.into())
            }
        }
    }

    fn candidate(&self, spec: &AnchorSpec) -> Result<StaticAnchor, AnchorError> {
        match spec {
            AnchorSpec::Coords {
                x,
                y,
                ox,
                oy,
                offset_x,
                offset_y,
            } => Ok(StaticAnchor::new(*x, *y, *ox, *oy).with_offsets(*offset_x, *offset_y)),
            AnchorSpec::Named { name, .. } => match self.statics.get(name) {
                Some(anchor) => Ok(anchor.clone()),
                None if self.contains(name) => Err(AnchorError::candidate(name.clone())),
                None => Err(AnchorError::unknown(name.clone())),
            },
            AnchorSpec::Dynamic(_) => Err(AnchorError::candidate(spec.to_string())),
        }
    }
}

fn static_by_name(name: &str) -> Option<StaticAnchor> {
    STATIC_ANCHORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(n, [x, y, ox, oy])| StaticAnchor::new(*x, *y, *ox, *oy).with_name(*n))
}

fn continuous(default_faces: Vec<Face>, options: &Options) -> Result<Anchor, AnchorError> {
    let faces = match options.text_list("faces")? {
        Some(names) => names
            .iter()
            .map(|n| {
                n.parse::<Face>()
                    .map_err(|face| AnchorError::UnknownFace { face })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => default_faces,
    };
    let clockwise = options.boolean("clockwise")?.unwrap_or(true);
    Ok(ContinuousAnchor::new(faces).with_clockwise(clockwise).into())
}

fn perimeter(options: &Options) -> Result<Anchor, AnchorError> {
    let shape_name = options.text("shape")?.unwrap_or("Circle");
    let shape = shape_name
        .parse::<PerimeterShape>()
        .map_err(|shape| AnchorError::UnknownShape { shape })?;
    let count = options
        .count("anchorCount", MAX_PERIMETER_COUNT)?
        .unwrap_or(DEFAULT_PERIMETER_COUNT);
    let rotation = options.number("rotation")?.unwrap_or(0.0);
    let candidates = perimeter_anchors(shape, count, rotation);
    Ok(DynamicAnchor::new(candidates)?.into())
}
