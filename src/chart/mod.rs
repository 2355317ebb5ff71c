// Chart session: owns the tree, its layout, focus state and animations.
//
// The chart never reads a clock. Every time-dependent operation takes `now`
// in milliseconds, and `tick` advances whatever is running.

use serde::Serialize;
use tracing::{debug, warn};

use crate::color::{OrdinalPalette, Rgb};
use crate::config::ChartConfig;
use crate::error::Result;
use crate::layout::{partition, LayoutNode, LayoutTree, NodeId};
use crate::tree::{MetricReweigh, Reweigh, TreeNode};

pub mod stage;
pub mod transition;

pub use stage::{Canceled, Settled, Stage};
use stage::Waiters;
use transition::ZoomTransition;

/// Receives the focused node's name after every focus change.
///
/// Fire-and-forget: the chart does not wait for or inspect the outcome.
pub trait FocusListener {
    fn focus_changed(&self, name: &str);
}

impl<F: Fn(&str)> FocusListener for F {
    fn focus_changed(&self, name: &str) {
        self(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChartEvent {
    ZoomFinished { focus: String },
    ExitFinished,
    Rebuilt { criterion: String },
    EnterFinished,
}

struct PendingRebuild {
    criterion: String,
    data: TreeNode,
    layout: LayoutTree,
}

pub struct Chart {
    config: ChartConfig,
    data: TreeNode,
    criterion: Option<String>,
    layout: LayoutTree,
    colors: Vec<Option<Rgb>>,
    focus: NodeId,
    /// Datum of the center hub: the focus node's parent, or the root.
    hub: NodeId,
    zoom: Option<ZoomTransition>,
    stage: Stage,
    pending: Option<PendingRebuild>,
    now: f64,
    reweigh: Box<dyn Reweigh>,
    listener: Option<Box<dyn FocusListener>>,
    zoom_waiters: Waiters,
    stage_waiters: Waiters,
}

impl Chart {
    /// Lay out `tree` as given. The chart starts hidden; call [`Chart::enter`].
    pub fn new(tree: TreeNode, config: ChartConfig) -> Result<Self> {
        config.validate()?;
        let layout = partition(&tree)?;
        Ok(Self::from_parts(tree, None, layout, config))
    }

    /// Lay out `tree` weighted under `criterion` by the default re-weighting.
    pub fn with_criterion(tree: TreeNode, criterion: &str, config: ChartConfig) -> Result<Self> {
        config.validate()?;
        let layout = partition(&MetricReweigh.reweigh(&tree, criterion)?)?;
        Ok(Self::from_parts(tree, Some(criterion.to_string()), layout, config))
    }

    fn from_parts(data: TreeNode, criterion: Option<String>, layout: LayoutTree, config: ChartConfig) -> Self {
        let colors = assign_colors(&layout);
        let root = layout.root();
        Self {
            config,
            data,
            criterion,
            layout,
            colors,
            focus: root,
            hub: root,
            zoom: None,
            stage: Stage::Hidden,
            pending: None,
            now: 0.0,
            reweigh: Box::new(MetricReweigh),
            listener: None,
            zoom_waiters: Waiters::default(),
            stage_waiters: Waiters::default(),
        }
    }

    pub fn set_reweigh(&mut self, reweigh: impl Reweigh + 'static) {
        self.reweigh = Box::new(reweigh);
    }

    pub fn set_focus_listener(&mut self, listener: impl FocusListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// The tree as supplied, before any re-weighting.
    pub fn data(&self) -> &TreeNode {
        &self.data
    }

    pub fn criterion(&self) -> Option<&str> {
        self.criterion.as_deref()
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    pub fn hub(&self) -> NodeId {
        self.hub
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Latest timestamp the chart has seen.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn color(&self, nid: NodeId) -> Option<Rgb> {
        self.colors.get(nid.0).copied().flatten()
    }

    pub fn is_animating(&self) -> bool {
        self.zoom.is_some() || self.stage.is_fading()
    }

    /// Click on an arc. Only nodes with children accept focus; clicks on
    /// leaves return `Ok(None)` and change nothing.
    pub fn click(&mut self, nid: NodeId, now: f64) -> Result<Option<NodeId>> {
        if !self.layout.node(nid)?.has_children() {
            debug!(node = nid.0, "ignoring click on leaf");
            return Ok(None);
        }
        Ok(self.focus_on(nid, now)?.then_some(nid))
    }

    /// Click on the center hub: focus moves to the current focus' parent.
    /// At the root nothing happens and the root is returned.
    pub fn click_hub(&mut self, now: f64) -> Result<NodeId> {
        self.observe(now);
        let root = self.layout.root();
        if self.focus == root {
            debug!("ignoring hub click at root");
            return Ok(root);
        }
        let hub = self.hub;
        self.focus_on(hub, now)?;
        Ok(self.focus)
    }

    /// Make `nid` the focus node and start zooming toward it.
    ///
    /// Returns `false` when the node has no angular width and cannot fill
    /// the circle; nothing changes in that case.
    pub fn focus_on(&mut self, nid: NodeId, now: f64) -> Result<bool> {
        self.observe(now);
        let focus_window = self.layout.node(nid)?.layout;

        let targets: Option<Vec<_>> = self
            .layout
            .nodes()
            .iter()
            .map(|n| n.layout.relative_to(&focus_window))
            .collect();
        let Some(targets) = targets else {
            warn!(node = nid.0, "cannot focus a node without angular width");
            return Ok(false);
        };

        // every target is assigned before the transition snapshots
        for (node, target) in self.layout.nodes_mut().iter_mut().zip(targets) {
            node.target = target;
        }

        let focus = self.layout.node(nid)?;
        let name = focus.name.clone();
        self.hub = focus.parent.unwrap_or_else(|| self.layout.root());
        self.focus = nid;

        self.zoom = Some(ZoomTransition::start(
            &self.layout,
            &self.config.visibility(),
            now,
            self.config.zoom_duration_ms,
        ));
        debug!(focus = %name, hub = self.hub.0, "zoom started");

        if let Some(listener) = &self.listener {
            listener.focus_changed(&name);
        }
        Ok(true)
    }

    /// Begin showing a hidden chart.
    pub fn enter(&mut self, now: f64) {
        self.observe(now);
        if self.stage == Stage::Hidden {
            self.stage = Stage::Entering { since: now };
        }
    }

    /// Replace the chart with the stored tree weighted under `criterion`.
    ///
    /// The new layout is computed up front so failures surface here and
    /// leave the chart untouched. A shown chart fades out first; the swap
    /// happens in the `tick` that completes the fade, then it fades back in.
    pub fn rebuild(&mut self, criterion: &str, now: f64) -> Result<()> {
        self.observe(now);
        let data = self.reweigh.reweigh(&self.data, criterion)?;
        let layout = partition(&data)?;
        debug!(criterion, nodes = layout.len(), "rebuild prepared");
        self.pending = Some(PendingRebuild { criterion: criterion.to_string(), data, layout });

        match self.stage {
            Stage::Hidden => {
                self.swap();
            }
            Stage::Shown => {
                self.stage = Stage::Exiting { since: now };
            }
            Stage::Entering { .. } => {
                // fade out from the partial opacity reached so far
                let fade = self.config.fade_duration_ms;
                let since = self.now - (1.0 - self.opacity()) * fade;
                self.stage = Stage::Exiting { since };
            }
            // a newer pending rebuild wins
            Stage::Exiting { .. } => {}
        }
        Ok(())
    }

    /// Advance animations to `now`, returning what completed.
    pub fn tick(&mut self, now: f64) -> Vec<ChartEvent> {
        self.observe(now);
        let mut events = Vec::new();

        if let Some(zoom) = &self.zoom {
            zoom.apply(&mut self.layout, now);
            if zoom.is_done(now) {
                self.zoom = None;
                self.zoom_waiters.resolve_all();
                let focus = self.layout.get(self.focus).map(|n| n.name.clone()).unwrap_or_default();
                events.push(ChartEvent::ZoomFinished { focus });
            }
        }

        let fade = self.config.fade_duration_ms;
        if self.stage.fade_done(now, fade) {
            match self.stage {
                Stage::Exiting { .. } => {
                    events.push(ChartEvent::ExitFinished);
                    if let Some(criterion) = self.swap() {
                        events.push(ChartEvent::Rebuilt { criterion });
                    }
                    self.stage = Stage::Entering { since: now };
                }
                Stage::Entering { .. } => {
                    self.stage = Stage::Shown;
                    self.stage_waiters.resolve_all();
                    events.push(ChartEvent::EnterFinished);
                }
                Stage::Hidden | Stage::Shown => {}
            }
        }
        events
    }

    /// Resolves when the running zoom completes; immediately if idle.
    pub fn zoom_settled(&mut self) -> Settled {
        if self.zoom.is_none() {
            return Waiters::ready();
        }
        self.zoom_waiters.push()
    }

    /// Resolves the next time the chart is fully shown; immediately if it is.
    pub fn stage_settled(&mut self) -> Settled {
        if self.stage == Stage::Shown {
            return Waiters::ready();
        }
        self.stage_waiters.push()
    }

    /// Opacity of the arc for `node`, following the zoom if one is running.
    pub fn arc_opacity(&self, node: &LayoutNode) -> f64 {
        let shown = match &self.zoom {
            Some(zoom) => zoom.arc_shown(node.nid.0),
            None => self.config.visibility().arc_visible(&node.target),
        };
        match (shown, node.has_children()) {
            (false, _) => 0.0,
            (true, true) => self.config.parent_opacity,
            (true, false) => self.config.leaf_opacity,
        }
    }

    pub fn label_opacity(&self, node: &LayoutNode) -> f64 {
        let shown = match &self.zoom {
            Some(zoom) => zoom.label_shown(node.nid.0),
            None => self.config.visibility().label_visible(&node.target),
        };
        if shown { 1.0 } else { 0.0 }
    }

    /// Opacity of the whole chart under the fade choreography.
    pub fn opacity(&self) -> f64 {
        self.stage.opacity(self.now, self.config.fade_duration_ms)
    }

    fn observe(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    /// Install the pending rebuild. In-flight zooms are abandoned.
    fn swap(&mut self) -> Option<String> {
        let pending = self.pending.take()?;
        self.zoom = None;
        self.zoom_waiters.cancel_all();
        self.colors = assign_colors(&pending.layout);
        self.layout = pending.layout;
        self.focus = self.layout.root();
        self.hub = self.layout.root();
        self.criterion = Some(pending.criterion.clone());
        debug!(criterion = %pending.criterion, root = %pending.data.name, "chart rebuilt");
        Some(pending.criterion)
    }
}

/// One color per depth-1 subtree, inherited by every descendant.
fn assign_colors(layout: &LayoutTree) -> Vec<Option<Rgb>> {
    let root = layout.root();
    let top = layout.get(root).map(|n| n.children.len()).unwrap_or(0);
    let mut palette = OrdinalPalette::for_subtrees(top);
    let mut colors = vec![None; layout.len()];
    for nid in layout.descendants().into_iter().skip(1) {
        if let Some(top) = layout.ancestor_at_depth(nid, 1).and_then(|id| layout.get(id)) {
            colors[nid.0] = Some(palette.color(&top.name));
        }
    }
    colors
}
