// Radial partition layout.
//
// Turns a TreeNode hierarchy into a flat LayoutTree arena:
// - value(n) = n.size + sum of value(child)
// - siblings sorted by descending value, ties keep input order
// - root spans [0, 2π]; children split the parent span proportionally to value
// - radial band is [depth, depth + 1]
//
// Output is deterministic: same tree in, same windows out.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SunburstError};
use crate::tree::TreeNode;

pub mod window;

pub use window::{arc_visible, label_visible, Visibility, Window};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub nid: NodeId,
    pub name: String,
    pub condition: String,
    /// Own size as supplied.
    pub size: f64,
    /// Aggregated size of the node and all of its descendants.
    pub value: f64,
    pub depth: usize,
    /// Longest distance to a leaf below this node.
    pub height: usize,
    /// Upward link for ancestry queries. The arena owns every node.
    pub parent: Option<NodeId>,
    /// Sorted by descending value.
    pub children: Vec<NodeId>,
    /// Window assigned by the partition. Never changes after layout.
    pub layout: Window,
    /// Window that is rendered right now.
    pub current: Window,
    /// Window the running animation is heading to.
    pub target: Window,
}

impl LayoutNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, nid: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(nid.0)
    }

    pub fn node(&self, nid: NodeId) -> Result<&LayoutNode> {
        self.nodes.get(nid.0).ok_or(SunburstError::UnknownNode(nid.0))
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [LayoutNode] {
        &mut self.nodes
    }

    pub fn height(&self) -> usize {
        self.nodes.first().map(|n| n.height).unwrap_or(0)
    }

    /// Breadth-first order, root first. Arcs are drawn in this order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root()]);
        while let Some(nid) = queue.pop_front() {
            out.push(nid);
            queue.extend(self.nodes[nid.0].children.iter().copied());
        }
        out
    }

    /// Self first, then each parent up to the root.
    pub fn ancestors(&self, nid: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(nid).map(|n| n.nid);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.nodes[id.0].parent;
        }
        out
    }

    /// The ancestor (or self) sitting at `depth`. `None` when the node is
    /// shallower than `depth`.
    pub fn ancestor_at_depth(&self, nid: NodeId, depth: usize) -> Option<NodeId> {
        self.ancestors(nid)
            .into_iter()
            .find(|id| self.nodes[id.0].depth == depth)
    }

    /// Names from the root down to the node, joined with `/`.
    pub fn path_of(&self, nid: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(nid)
            .into_iter()
            .map(|id| self.nodes[id.0].name.as_str())
            .collect();
        names.reverse();
        names.join("/")
    }

    /// Inverse of [`LayoutTree::path_of`]. First match wins when siblings share a name.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        let mut parts = path.split('/');
        let root = self.nodes.first()?;
        if parts.next()? != root.name {
            return None;
        }
        let mut cursor = root.nid;
        for part in parts {
            cursor = *self.nodes[cursor.0]
                .children
                .iter()
                .find(|c| self.nodes[c.0].name == part)?;
        }
        Some(cursor)
    }
}

/// Lay out a tree as a radial partition.
pub fn partition(tree: &TreeNode) -> Result<LayoutTree> {
    validate_sizes(tree)?;

    let mut nodes = flatten(tree);

    let root = NodeId(0);
    assign_angles(&mut nodes, root, 0.0, TAU);

    for n in nodes.iter_mut() {
        n.current = n.layout;
        n.target = n.layout;
    }

    debug!(
        nodes = nodes.len(),
        height = nodes[0].height,
        value = nodes[0].value,
        "partitioned tree"
    );
    Ok(LayoutTree { nodes })
}

fn validate_sizes(tree: &TreeNode) -> Result<()> {
    let mut path: Vec<&str> = Vec::new();
    let mut stack = vec![(tree, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(&node.name);
        if !node.size.is_finite() || node.size < 0.0 {
            return Err(SunburstError::InvalidSize { path: path.join("/"), size: node.size });
        }
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    Ok(())
}

/// Pre-order flattening into the arena, then a bottom-up pass that
/// aggregates values and sorts children by descending value.
fn flatten(tree: &TreeNode) -> Vec<LayoutNode> {
    let mut out: Vec<LayoutNode> = Vec::new();
    let mut stack: Vec<(&TreeNode, Option<NodeId>, usize)> = vec![(tree, None, 0)];
    while let Some((node, parent, depth)) = stack.pop() {
        let nid = NodeId(out.len());
        let radial = Window::new(0.0, 0.0, depth as f64, depth as f64 + 1.0);
        // -0.0 would sort below 0.0
        let size = node.size + 0.0;
        out.push(LayoutNode {
            nid,
            name: node.name.clone(),
            condition: node.condition.clone(),
            size,
            value: size,
            depth,
            height: 0,
            parent,
            children: Vec::new(),
            layout: radial,
            current: radial,
            target: radial,
        });
        if let Some(p) = parent {
            out[p.0].children.push(nid);
        }
        stack.extend(node.children.iter().rev().map(|c| (c, Some(nid), depth + 1)));
    }

    // children always come after their parent in pre-order
    for i in (0..out.len()).rev() {
        let mut children = std::mem::take(&mut out[i].children);
        // stable: equal values keep input order
        children.sort_by(|a, b| out[b.0].value.total_cmp(&out[a.0].value));
        let value = out[i].size + children.iter().map(|c| out[c.0].value).sum::<f64>();
        let height = children.iter().map(|c| out[c.0].height + 1).max().unwrap_or(0);

        let n = &mut out[i];
        n.value = value;
        n.height = height;
        n.children = children;
    }
    out
}

/// Split each node's span among its children by value, root first.
fn assign_angles(nodes: &mut [LayoutNode], root: NodeId, start: f64, span: f64) {
    let mut stack = vec![(root, start, span)];
    while let Some((nid, start, span)) = stack.pop() {
        let node = &mut nodes[nid.0];
        node.layout.x0 = start;
        node.layout.x1 = start + span;
        let scale = if node.value > 0.0 { span / node.value } else { 0.0 };

        let mut angle = start;
        for &child in &nodes[nid.0].children {
            let child_span = nodes[child.0].value * scale;
            stack.push((child, angle, child_span));
            angle += child_span;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn two_children() -> TreeNode {
        TreeNode::new("root", 0.0).with_children(vec![TreeNode::new("B", 5.0), TreeNode::new("A", 10.0)])
    }

    fn deep_tree() -> TreeNode {
        TreeNode::new("app", 0.0).with_children(vec![
            TreeNode::new("react", 1.0).with_children(vec![
                TreeNode::new("scheduler", 3.0),
                TreeNode::new("loose-envify", 2.0)
                    .with_children(vec![TreeNode::new("js-tokens", 4.0)]),
            ]),
            TreeNode::new("lodash", 6.0),
            TreeNode::new("empty", 0.0),
        ])
    }

    fn by_name(tree: &LayoutTree, name: &str) -> NodeId {
        tree.nodes().iter().find(|n| n.name == name).unwrap().nid
    }

    #[test]
    fn test_two_children_scenario() {
        let tree = partition(&two_children()).unwrap();
        let a = tree.get(by_name(&tree, "A")).unwrap();
        let b = tree.get(by_name(&tree, "B")).unwrap();

        assert!((a.layout.angle_span() - 2.0 * b.layout.angle_span()).abs() < EPS);
        assert_eq!((a.layout.y0, a.layout.y1), (1.0, 2.0));
        assert_eq!((b.layout.y0, b.layout.y1), (1.0, 2.0));
        assert!(label_visible(&a.layout));
        assert!(label_visible(&b.layout));
        // sorted: A (10) before B (5)
        assert_eq!(a.layout.x0, 0.0);
        assert!((b.layout.x0 - a.layout.x1).abs() < EPS);
    }

    #[test]
    fn test_value_aggregates_own_size() {
        let tree = partition(&deep_tree()).unwrap();
        assert_eq!(tree.get(tree.root()).unwrap().value, 16.0);
        assert_eq!(tree.get(by_name(&tree, "react")).unwrap().value, 10.0);
        assert_eq!(tree.get(by_name(&tree, "loose-envify")).unwrap().value, 6.0);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_sibling_spans_sum_to_parent() {
        let tree = partition(&deep_tree()).unwrap();
        for n in tree.nodes() {
            assert!(n.layout.angle_span() >= 0.0);
            if !n.has_children() {
                continue;
            }
            let own = if n.value > 0.0 { n.size / n.value * n.layout.angle_span() } else { 0.0 };
            let sum: f64 = n.children.iter().map(|c| tree.get(*c).unwrap().layout.angle_span()).sum();
            assert!((sum + own - n.layout.angle_span()).abs() < EPS, "node {}", n.name);
        }
    }

    #[test]
    fn test_children_are_contiguous() {
        let tree = partition(&deep_tree()).unwrap();
        for n in tree.nodes() {
            let mut angle = n.layout.x0;
            for c in &n.children {
                let child = tree.get(*c).unwrap();
                assert!((child.layout.x0 - angle).abs() < EPS);
                angle = child.layout.x1;
            }
        }
    }

    #[test]
    fn test_radius_equals_depth() {
        let tree = partition(&deep_tree()).unwrap();
        for n in tree.nodes() {
            assert_eq!(n.layout.y0, n.depth as f64);
            assert_eq!(n.layout.y1, n.depth as f64 + 1.0);
            assert_eq!(n.current, n.layout);
            assert_eq!(n.target, n.layout);
        }
    }

    #[test]
    fn test_sort_descending_with_stable_ties() {
        let input = TreeNode::new("root", 0.0).with_children(vec![
            TreeNode::new("first", 1.0),
            TreeNode::new("big", 5.0),
            TreeNode::new("second", 1.0),
        ]);
        let tree = partition(&input).unwrap();
        let names: Vec<_> = tree.get(tree.root()).unwrap().children.iter()
            .map(|c| tree.get(*c).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["big", "first", "second"]);
    }

    #[test]
    fn test_zero_size_node_is_present_with_zero_width() {
        let tree = partition(&deep_tree()).unwrap();
        let empty = tree.get(by_name(&tree, "empty")).unwrap();
        assert_eq!(empty.layout.angle_span(), 0.0);
        assert!(!arc_visible(&empty.layout));
    }

    #[test]
    fn test_zero_size_root_degrades() {
        let input = TreeNode::new("root", 0.0)
            .with_children(vec![TreeNode::new("a", 0.0), TreeNode::new("b", 0.0)]);
        let tree = partition(&input).unwrap();
        assert_eq!(tree.len(), 3);
        assert!(tree.nodes().iter().skip(1).all(|n| n.layout.angle_span() == 0.0));
    }

    #[test]
    fn test_root_only() {
        let tree = partition(&TreeNode::new("solo", 3.0)).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.get(tree.root()).unwrap().layout, Window::new(0.0, TAU, 0.0, 1.0));
    }

    #[test]
    fn test_invalid_sizes_fail_fast() {
        let input = TreeNode::new("root", 0.0)
            .with_children(vec![TreeNode::new("ok", 1.0), TreeNode::new("bad", -2.0)]);
        match partition(&input) {
            Err(SunburstError::InvalidSize { path, size }) => {
                assert_eq!(path, "root/bad");
                assert_eq!(size, -2.0);
            }
            other => panic!("expected InvalidSize, got {other:?}"),
        }
        assert!(partition(&TreeNode::new("nan", f64::NAN)).is_err());
    }

    #[test]
    fn test_negative_zero_keeps_input_order() {
        let input = TreeNode::new("root", 0.0).with_children(vec![
            TreeNode::new("a", -0.0),
            TreeNode::new("b", 0.0),
            TreeNode::new("c", 0.0),
        ]);
        let tree = partition(&input).unwrap();
        let root = tree.get(tree.root()).unwrap();
        let names: Vec<&str> = root.children.iter().map(|c| tree.get(*c).unwrap().name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(tree.get(by_name(&tree, "a")).unwrap().value.is_sign_positive());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        const DEPTH: usize = 50_000;
        let mut input = TreeNode::new("leaf", 1.0);
        for i in (0..DEPTH).rev() {
            input = TreeNode::new(format!("n{i}"), 0.0).with_children(vec![input]);
        }

        let tree = partition(&input).unwrap();
        assert_eq!(tree.len(), DEPTH + 1);
        assert_eq!(tree.height(), DEPTH);
        let leaf = tree.get(NodeId(DEPTH)).unwrap();
        assert_eq!(leaf.depth, DEPTH);
        assert!((leaf.layout.angle_span() - TAU).abs() < EPS);

        // unlink level by level so the nested drop stays shallow
        let mut next = input;
        while let Some(child) = next.children.pop() {
            next = child;
        }
    }

    #[test]
    fn test_ancestry_queries() {
        let tree = partition(&deep_tree()).unwrap();
        let tokens = by_name(&tree, "js-tokens");
        let react = by_name(&tree, "react");

        assert_eq!(tree.ancestor_at_depth(tokens, 1), Some(react));
        assert_eq!(tree.ancestor_at_depth(tokens, 3), Some(tokens));
        assert_eq!(tree.ancestor_at_depth(react, 2), None);
        assert_eq!(tree.ancestors(tokens).len(), 4);
        assert_eq!(tree.path_of(tokens), "app/react/loose-envify/js-tokens");
        assert_eq!(tree.find_by_path("app/react/loose-envify/js-tokens"), Some(tokens));
        assert_eq!(tree.find_by_path("app/nope"), None);
        assert_eq!(tree.find_by_path("other"), None);
    }

    #[test]
    fn test_descendants_breadth_first() {
        let tree = partition(&deep_tree()).unwrap();
        let depths: Vec<usize> = tree.descendants().iter().map(|id| tree.get(*id).unwrap().depth).collect();
        assert_eq!(depths.len(), tree.len());
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
    }
}
