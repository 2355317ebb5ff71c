// Input hierarchy for the chart.
//
// A TreeNode is produced by an external collaborator (the manifest reader)
// already annotated with a size and a condition for one criterion. The
// chart never parses manifests; it only re-weights an existing tree when
// asked to rebuild under another criterion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SunburstError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    /// Weight used for proportional angle allocation.
    #[serde(default)]
    pub size: f64,
    /// Label of the criterion `size` was measured under (e.g. "downloads").
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    /// Per-criterion weights, consumed by [`MetricReweigh`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: name.into(),
            size,
            condition: String::new(),
            children: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_metric(mut self, criterion: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(criterion.into(), value);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Produces a copy of a tree weighted under another criterion.
///
/// Implementations must keep the structure (names and children) intact and
/// only rewrite `size` and `condition`.
pub trait Reweigh {
    fn reweigh(&self, tree: &TreeNode, criterion: &str) -> Result<TreeNode>;
}

impl<F> Reweigh for F
where
    F: Fn(&TreeNode, &str) -> Result<TreeNode>,
{
    fn reweigh(&self, tree: &TreeNode, criterion: &str) -> Result<TreeNode> {
        self(tree, criterion)
    }
}

/// Reads each node's size from its `metrics` table.
///
/// Nodes without an entry for the criterion weigh 0. A criterion that no
/// node in the tree knows about is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricReweigh;

impl Reweigh for MetricReweigh {
    fn reweigh(&self, tree: &TreeNode, criterion: &str) -> Result<TreeNode> {
        if !knows_criterion(tree, criterion) {
            return Err(SunburstError::UnknownCriterion(criterion.to_string()));
        }
        Ok(reweigh_node(tree, criterion))
    }
}

fn knows_criterion(node: &TreeNode, criterion: &str) -> bool {
    node.metrics.contains_key(criterion)
        || node.children.iter().any(|c| knows_criterion(c, criterion))
}

fn reweigh_node(node: &TreeNode, criterion: &str) -> TreeNode {
    TreeNode {
        name: node.name.clone(),
        size: node.metrics.get(criterion).copied().unwrap_or(0.0),
        condition: criterion.to_string(),
        children: node.children.iter().map(|c| reweigh_node(c, criterion)).collect(),
        metrics: node.metrics.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("app", 0.0).with_children(vec![
            TreeNode::new("react", 0.0)
                .with_metric("downloads", 900.0)
                .with_metric("stars", 10.0),
            TreeNode::new("lodash", 0.0).with_metric("downloads", 300.0),
        ])
    }

    #[test]
    fn test_json_defaults() {
        let tree = TreeNode::from_json(r#"{"name": "root", "children": [{"name": "a", "size": 3}]}"#).unwrap();
        assert_eq!(tree.size, 0.0);
        assert_eq!(tree.condition, "");
        assert_eq!(tree.children[0].size, 3.0);
        assert!(tree.children[0].is_leaf());
    }

    #[test]
    fn test_json_missing_name_is_error() {
        let err = TreeNode::from_json(r#"{"size": 1}"#).unwrap_err();
        assert!(matches!(err, SunburstError::InvalidJson(_)));
    }

    #[test]
    fn test_metric_reweigh_sets_size_and_condition() {
        let tree = MetricReweigh.reweigh(&sample(), "stars").unwrap();
        assert_eq!(tree.condition, "stars");
        assert_eq!(tree.children[0].size, 10.0);
        assert_eq!(tree.children[0].condition, "stars");
        // missing metric weighs nothing
        assert_eq!(tree.children[1].size, 0.0);
    }

    #[test]
    fn test_metric_reweigh_keeps_structure() {
        let original = sample();
        let tree = MetricReweigh.reweigh(&original, "downloads").unwrap();
        let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["react", "lodash"]);
        assert_eq!(tree.children.len(), original.children.len());
    }

    #[test]
    fn test_metric_reweigh_unknown_criterion() {
        let err = MetricReweigh.reweigh(&sample(), "forks").unwrap_err();
        assert!(matches!(err, SunburstError::UnknownCriterion(c) if c == "forks"));
    }

    #[test]
    fn test_closure_reweigh() {
        let double = |t: &TreeNode, c: &str| -> Result<TreeNode> {
            let mut out = t.clone();
            out.size *= 2.0;
            out.condition = c.to_string();
            Ok(out)
        };
        let tree = double.reweigh(&TreeNode::new("x", 2.0), "twice").unwrap();
        assert_eq!(tree.size, 4.0);
    }
}
