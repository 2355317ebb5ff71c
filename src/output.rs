//! Output types for frontend consumption.
//!
//! These structs are serialized to JSON and sent to the page, which either
//! draws them itself or asks for the ready-made SVG.

use serde::Serialize;

/// One wedge of the sunburst.
#[derive(Debug, Clone, Serialize)]
pub struct ArcOutput {
    /// Arena index, passed back on click.
    pub id: usize,
    pub name: String,
    /// Names from the root down to this node, joined with `/`.
    pub path: String,
    /// SVG path data, in coordinates centered on the hub.
    pub d: String,
    pub fill: String,
    pub fill_opacity: f64,
    /// Only nodes with children accept clicks.
    pub clickable: bool,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelOutput {
    pub id: usize,
    pub text: String,
    pub transform: String,
    pub fill_opacity: f64,
}

/// The center circle. Clicking it focuses `id`.
#[derive(Debug, Clone, Serialize)]
pub struct HubOutput {
    pub id: usize,
    pub r: f64,
}

/// Error information for the page
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// Body returned instead of a scene when input is rejected
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub error: ErrorInfo,
}

/// The combined output sent to the page
#[derive(Debug, Clone, Serialize)]
pub struct SceneOutput {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    /// Whole-chart opacity from the fade choreography.
    pub opacity: f64,
    pub font: String,
    /// Name of the node mapped to the hub.
    pub focus: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    pub arcs: Vec<ArcOutput>,
    pub labels: Vec<LabelOutput>,
    pub hub: HubOutput,
}
