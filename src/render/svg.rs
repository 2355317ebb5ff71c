// SVG export of a scene.
//
// Layout of the document:
//   <svg> -> <g transform=center opacity>
//              <g> arcs (each with a <title>) </g>
//              <g pointer-events=none> labels </g>
//              <circle> hub </circle>
// Arcs and the hub carry `data-node` so a host page can route clicks back.

use ::svg::node::element::{Circle, Element, Group, Path, Text};
use ::svg::node::Text as SvgText;
use ::svg::{Document, Node};

use super::arc::num;
use crate::output::SceneOutput;

pub fn to_svg(scene: &SceneOutput) -> String {
    let half = scene.width / 2.0;

    let mut arcs = Group::new();
    for a in &scene.arcs {
        let mut title = Element::new("title");
        title.append(SvgText::new(a.title.clone()));

        let mut path = Path::new()
            .set("d", a.d.clone())
            .set("fill", a.fill.clone())
            .set("fill-opacity", num(a.fill_opacity))
            .set("data-node", a.id.to_string())
            .add(title);
        if a.clickable {
            path = path.set("style", "cursor: pointer");
        }
        arcs = arcs.add(path);
    }

    let mut labels = Group::new()
        .set("pointer-events", "none")
        .set("text-anchor", "middle")
        .set("style", "user-select: none");
    for l in &scene.labels {
        labels = labels.add(
            Text::new(l.text.clone())
                .set("dy", "0.35em")
                .set("fill-opacity", num(l.fill_opacity))
                .set("transform", l.transform.clone()),
        );
    }

    let hub = Circle::new()
        .set("r", num(scene.hub.r))
        .set("fill", "none")
        .set("pointer-events", "all")
        .set("data-node", scene.hub.id.to_string())
        .set("data-hub", "true");

    let chart = Group::new()
        .set("transform", format!("translate({},{})", num(half), num(half)))
        .set("opacity", num(scene.opacity))
        .add(arcs)
        .add(labels)
        .add(hub);

    Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set("width", num(scene.width))
        .set("height", num(scene.height))
        .set("viewBox", format!("0 0 {} {}", num(scene.width), num(scene.height)))
        .set("style", format!("font: {}", scene.font))
        .add(chart)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Chart;
    use crate::config::ChartConfig;
    use crate::render::build_scene;
    use crate::tree::TreeNode;

    fn scene() -> SceneOutput {
        let tree = TreeNode::new("app", 0.0).with_children(vec![
            TreeNode::new("react", 0.0).with_children(vec![TreeNode::new("scheduler", 2.0)]),
            TreeNode::new("a<b", 1.0),
        ]);
        let mut chart = Chart::new(tree, ChartConfig::default()).unwrap();
        chart.enter(0.0);
        chart.tick(1500.0);
        build_scene(&chart)
    }

    #[test]
    fn test_document_structure() {
        let doc = to_svg(&scene());
        assert!(doc.contains("<svg"));
        assert!(doc.contains(r#"viewBox="0 0 540 540""#));
        assert!(doc.contains(r#"transform="translate(270,270)""#));
        assert_eq!(doc.matches("<path").count(), 3);
        assert_eq!(doc.matches("<text").count(), 3);
        assert_eq!(doc.matches("<title>").count(), 3);
        assert!(doc.contains(r#"data-hub="true""#));
        assert!(doc.contains(r#"r="90""#));
    }

    #[test]
    fn test_only_parents_get_pointer() {
        let doc = to_svg(&scene());
        assert_eq!(doc.matches("cursor: pointer").count(), 1);
    }

    #[test]
    fn test_names_are_escaped() {
        let doc = to_svg(&scene());
        assert!(!doc.contains("a<b"));
        assert!(doc.contains("a&lt;b"));
    }
}
