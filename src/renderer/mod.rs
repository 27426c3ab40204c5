//! SVG renderer for computed diagrams
//!
//! Elements become rectangles, connectors become `<path>` elements built
//! from their segments, and overlays are drawn on top as polygons and text.

pub mod config;
pub mod svg;

pub use config::{DebugMarks, SvgConfig};
pub use svg::{path_data, path_data_with, render_svg};
