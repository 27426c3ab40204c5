//! Configuration for SVG rendering

/// How a rendered diagram looks
///
/// Stroke widths come from the diagram itself; this only covers what the
/// renderer adds around the routed geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Margin kept around the union of elements, paths and overlays
    pub margin: f64,
    /// Decimals written for path and overlay coordinates
    pub precision: usize,
    /// Prepended to every class name; empty for bare names
    pub class_prefix: String,
    pub label_font_size: f64,
    /// Debug marks drawn over the diagram, if any
    pub marks: Option<DebugMarks>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            precision: 2,
            class_prefix: "anc-".to_string(),
            label_font_size: 12.0,
            marks: None,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_precision(mut self, decimals: usize) -> Self {
        self.precision = decimals;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn with_label_font_size(mut self, size: f64) -> Self {
        self.label_font_size = size;
        self
    }

    pub fn with_marks(mut self, marks: DebugMarks) -> Self {
        self.marks = Some(marks);
        self
    }

    pub fn without_marks(mut self) -> Self {
        self.marks = None;
        self
    }
}

/// Where endpoints sit and which element is which
#[derive(Debug, Clone, PartialEq)]
pub struct DebugMarks {
    /// Radius of the dot drawn on each endpoint's anchor point
    pub anchor_radius: f64,
    /// Print each element id above its box
    pub element_ids: bool,
}

impl Default for DebugMarks {
    fn default() -> Self {
        Self {
            anchor_radius: 3.0,
            element_ids: true,
        }
    }
}

impl DebugMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor_radius(mut self, radius: f64) -> Self {
        self.anchor_radius = radius;
        self
    }

    pub fn with_element_ids(mut self, show: bool) -> Self {
        self.element_ids = show;
        self
    }
}
