//! Zoomable sunburst chart core: partition a weighted tree into radial
//! windows, animate focus changes and rebuilds, and emit scenes as JSON or SVG.

pub mod chart;
pub mod color;
pub mod config;
pub mod error;
pub mod layout;
pub mod output;
pub mod render;
pub mod tree;
mod wasm;

pub use chart::{Chart, ChartEvent, FocusListener, Settled, Stage};
pub use config::ChartConfig;
pub use error::{Result, SunburstError};
pub use layout::{partition, LayoutNode, LayoutTree, NodeId, Window};
pub use output::SceneOutput;
pub use render::{build_scene, to_svg};
pub use tree::{MetricReweigh, Reweigh, TreeNode};
pub use wasm::{render_scene, render_svg, SunburstChart};
