//! Chainable facade over a set of nodes.
//!
//! Every method consumes and returns the selection so calls chain:
//!
//! ```ignore
//! ctx.select(nodes)
//!     .from(AnimationVars::new().set("y", 20.0).set("o", 0.0).duration(0.3))
//!     .to(AnimationVars::new().set("scale", 1.1).id("pulse").ease("easeInOutSine"));
//! ```
//!
//! Animations are queued per node; controls act on each node's active tween,
//! optionally only when it carries the given id.

use crate::queue::PendingTween;
use crate::scheduler::SchedulerContext;
use crate::surface::{NodeHandle, apply_styles};
use crate::types::TweenMode;
use crate::vars::AnimationVars;

pub struct Selection<'a> {
    ctx: &'a mut SchedulerContext,
    nodes: Vec<NodeHandle>,
}

impl<'a> Selection<'a> {
    pub(crate) fn new(ctx: &'a mut SchedulerContext, nodes: Vec<NodeHandle>) -> Self {
        Self { ctx, nodes }
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Write the properties immediately, bypassing the queues.
    pub fn set(self, vars: AnimationVars) -> Self {
        let properties = vars.properties();
        for node in &self.nodes {
            apply_styles(node, &properties);
        }
        self
    }

    /// Animate from the current values to `vars`.
    pub fn to(self, vars: AnimationVars) -> Self {
        self.animate(TweenMode::To, &vars, None)
    }

    /// Like [`Selection::to`], with options that `vars` does not set itself.
    pub fn to_with(self, vars: AnimationVars, options: AnimationVars) -> Self {
        self.animate(TweenMode::To, &vars, Some(&options))
    }

    /// Jump to `vars` and animate back to the values the nodes have now.
    pub fn from(self, vars: AnimationVars) -> Self {
        self.animate(TweenMode::From, &vars, None)
    }

    pub fn from_with(self, vars: AnimationVars, options: AnimationVars) -> Self {
        self.animate(TweenMode::From, &vars, Some(&options))
    }

    fn animate(self, mode: TweenMode, vars: &AnimationVars, options: Option<&AnimationVars>) -> Self {
        let requests: Vec<PendingTween> = (0..self.nodes.len())
            .map(|index| vars.plan(mode, options, self.ctx.defaults(), index))
            .collect();
        for (node, request) in self.nodes.iter().zip(requests) {
            self.ctx.enqueue(node, request);
        }
        self
    }

    pub fn play(self, id: Option<&str>) -> Self {
        self.each(|ctx, node| ctx.play(node, id))
    }

    pub fn pause(self, id: Option<&str>) -> Self {
        self.each(|ctx, node| ctx.pause(node, id))
    }

    pub fn resume(self, id: Option<&str>) -> Self {
        self.each(|ctx, node| ctx.resume(node, id))
    }

    /// Force end values; each node's queue moves on to its next request.
    pub fn stop(self, id: Option<&str>) -> Self {
        self.each(|ctx, node| ctx.stop(node, id))
    }

    pub fn seek(self, id: Option<&str>, progress: f64) -> Self {
        self.each(|ctx, node| ctx.seek(node, id, progress))
    }

    pub fn restart(self, id: Option<&str>) -> Self {
        self.each(|ctx, node| ctx.restart(node, id))
    }

    fn each(self, mut f: impl FnMut(&mut SchedulerContext, &NodeHandle) -> bool) -> Self {
        for node in &self.nodes {
            f(self.ctx, node);
        }
        self
    }
}
