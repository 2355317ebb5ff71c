// Click-to-zoom animation.
//
// A transition snapshots every node's `current` window at click time and
// eases it toward `target`. A newer transition simply replaces an older one,
// starting from wherever `current` happens to be.

use crate::layout::{LayoutTree, Visibility, Window};

/// Cubic ease-in-out over [0, 1].
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct ZoomTransition {
    started_at: f64,
    duration: f64,
    from: Vec<Window>,
    /// Visible at the start or at the end, per node.
    arc_shown: Vec<bool>,
    label_shown: Vec<bool>,
}

impl ZoomTransition {
    /// Snapshot `current` for every node. Targets must already be assigned.
    pub fn start(tree: &LayoutTree, vis: &Visibility, now: f64, duration: f64) -> Self {
        let nodes = tree.nodes();
        Self {
            started_at: now,
            duration,
            from: nodes.iter().map(|n| n.current).collect(),
            arc_shown: nodes
                .iter()
                .map(|n| vis.arc_visible(&n.current) || vis.arc_visible(&n.target))
                .collect(),
            label_shown: nodes
                .iter()
                .map(|n| vis.label_visible(&n.current) || vis.label_visible(&n.target))
                .collect(),
        }
    }

    /// Linear progress in [0, 1].
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_done(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Move every node's `current` to its eased position at `now`.
    pub fn apply(&self, tree: &mut LayoutTree, now: f64) {
        let t = ease_cubic_in_out(self.progress(now));
        for (node, from) in tree.nodes_mut().iter_mut().zip(&self.from) {
            node.current = from.lerp(&node.target, t);
        }
    }

    pub fn arc_shown(&self, idx: usize) -> bool {
        self.arc_shown.get(idx).copied().unwrap_or(false)
    }

    pub fn label_shown(&self, idx: usize) -> bool {
        self.label_shown.get(idx).copied().unwrap_or(false)
    }
}
