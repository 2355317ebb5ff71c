// Scene building: Chart -> SceneOutput.
//
// Every non-root node produces one arc and one label, in breadth-first
// order. Geometry comes from `current`; opacity follows the chart's zoom
// and visibility rules.

use std::f64::consts::PI;

use crate::chart::Chart;
use crate::layout::{LayoutNode, Window};
use crate::output::{ArcOutput, HubOutput, LabelOutput, SceneOutput};

pub mod arc;
pub mod svg;

pub use arc::ArcGenerator;
use arc::num;
pub use self::svg::to_svg;

/// Rotate text to the wedge's mid-angle and flip it on the left half so it
/// never reads upside down.
pub fn label_transform(w: &Window, radius: f64) -> String {
    let x = (w.x0 + w.x1) / 2.0 * 180.0 / PI;
    let y = (w.y0 + w.y1) / 2.0 * radius;
    let flip = if x < 180.0 { 0 } else { 180 };
    format!("rotate({}) translate({},0) rotate({flip})", num(x - 90.0), num(y))
}

/// Integer with `,` thousands separators, rounded half away from zero.
pub fn format_thousands(v: f64) -> String {
    let n = v.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn title(chart: &Chart, node: &LayoutNode) -> String {
    format!(
        "{}\n{}: {}",
        chart.layout().path_of(node.nid),
        node.condition,
        format_thousands(node.size)
    )
}

pub fn build_scene(chart: &Chart) -> SceneOutput {
    let cfg = chart.config();
    let radius = cfg.radius();
    let generator = ArcGenerator::new(radius, cfg.max_pad_angle);
    let layout = chart.layout();

    let mut arcs = Vec::with_capacity(layout.len().saturating_sub(1));
    let mut labels = Vec::with_capacity(layout.len().saturating_sub(1));

    for nid in layout.descendants().into_iter().skip(1) {
        let Some(node) = layout.get(nid) else { continue };
        arcs.push(ArcOutput {
            id: nid.0,
            name: node.name.clone(),
            path: layout.path_of(nid),
            d: generator.path(&node.current),
            fill: chart.color(nid).map(|c| c.hex()).unwrap_or_else(|| "none".to_string()),
            fill_opacity: chart.arc_opacity(node),
            clickable: node.has_children(),
            title: title(chart, node),
        });
        labels.push(LabelOutput {
            id: nid.0,
            text: node.name.clone(),
            transform: label_transform(&node.current, radius),
            fill_opacity: chart.label_opacity(node),
        });
    }

    let focus = layout.get(chart.focus()).map(|n| n.name.clone()).unwrap_or_default();

    SceneOutput {
        width: cfg.width,
        height: cfg.width,
        radius,
        opacity: chart.opacity(),
        font: cfg.font.clone(),
        focus,
        criterion: chart.criterion().map(str::to_string),
        arcs,
        labels,
        hub: HubOutput { id: chart.hub().0, r: radius },
    }
}
