//! Scheduler owning every node's animation queue.
//!
//! `SchedulerContext` is the single owner of animation bookkeeping. Nodes are
//! associated weakly: the context keeps a `Weak` per node, keyed by the node's
//! identity, and drops the slot once the node is gone. Frames are driven by
//! calling [`SchedulerContext::tick`] from the host's refresh loop; time comes
//! from an injected [`Clock`].
//!
//! # Usage
//!
//! ```ignore
//! use rune_motion::{AnimationVars, ManualClock, MemoryNode, NodeHandle, SchedulerContext};
//!
//! let clock = ManualClock::new();
//! let mut ctx = SchedulerContext::new(Box::new(clock.clone()));
//! let node: NodeHandle = MemoryNode::new("box").with_property("opacity", "1").shared();
//!
//! ctx.select([node.clone()])
//!     .to(AnimationVars::new().set("opacity", 0.0).duration(1.0));
//!
//! for _ in 0..60 {
//!     clock.advance(1000.0 / 60.0);
//!     ctx.tick();
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rune_config::MotionConfig;

use crate::clock::Clock;
use crate::events::{EventQueue, MotionEvent};
use crate::queue::{AnimationQueue, PendingTween};
use crate::selection::Selection;
use crate::surface::{NodeHandle, StyleSurface, node_key};
use crate::tween::Tween;
use crate::types::{NodeKey, TweenId, TweenState};

/// Live controllers of one node, by caller-supplied id.
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    by_id: HashMap<String, TweenId>,
}

impl ControllerRegistry {
    pub fn register(&mut self, tween: &Tween) {
        if let Some(id) = tween.label() {
            self.by_id.insert(id.to_string(), tween.id());
        }
    }

    pub fn lookup(&self, id: &str) -> Option<TweenId> {
        self.by_id.get(id).copied()
    }

    pub fn unregister(&mut self, tween: &Tween) {
        if let Some(id) = tween.label() {
            if self.by_id.get(id) == Some(&tween.id()) {
                self.by_id.remove(id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

struct NodeSlot {
    node: Weak<RefCell<dyn StyleSurface>>,
    queue: AnimationQueue,
    controllers: ControllerRegistry,
}

impl NodeSlot {
    fn new(node: &NodeHandle) -> Self {
        Self {
            node: Rc::downgrade(node),
            queue: AnimationQueue::new(),
            controllers: ControllerRegistry::default(),
        }
    }

    fn upgrade(&self) -> Option<NodeHandle> {
        self.node.upgrade()
    }

    /// The active tween, if `id` is absent or names it.
    fn controller(&mut self, id: Option<&str>) -> Option<&mut Tween> {
        let tween = self.queue.active_mut()?;
        match id {
            None => Some(tween),
            Some(id) => {
                let registered = self.controllers.lookup(id)?;
                (registered == tween.id()).then_some(tween)
            }
        }
    }

    /// Retire the active tween and launch the next queued request.
    fn finish(&mut self, node: &NodeHandle, now: f64, events: &mut EventQueue) {
        if let Some(done) = self.queue.active() {
            self.controllers.unregister(done);
        }
        if self.queue.advance(node, now).is_none() {
            return;
        }
        let waiting = self.queue.pending_len();
        let Some(next) = self.queue.active() else {
            return;
        };
        log::debug!("{} advanced to {} ({waiting} waiting)", next.node(), next.id());
        self.controllers.register(next);
        events.push(event(next, |node, tween, id| MotionEvent::Launched {
            node,
            tween,
            id,
        }));
    }
}

fn event(
    tween: &Tween,
    make: impl FnOnce(NodeKey, TweenId, Option<String>) -> MotionEvent,
) -> MotionEvent {
    make(tween.node(), tween.id(), tween.label().map(str::to_string))
}

/// Owner of all per-node queues, controller registries and pending events.
pub struct SchedulerContext {
    clock: Box<dyn Clock>,
    defaults: MotionConfig,
    slots: IndexMap<NodeKey, NodeSlot>,
    events: EventQueue,
}

impl SchedulerContext {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self::with_config(clock, &MotionConfig::default())
    }

    /// Use `config` for durations, easing and stagger that callers leave out.
    pub fn with_config(clock: Box<dyn Clock>, config: &MotionConfig) -> Self {
        Self {
            clock,
            defaults: config.clone(),
            slots: IndexMap::new(),
            events: EventQueue::new(),
        }
    }

    pub fn defaults(&self) -> &MotionConfig {
        &self.defaults
    }

    /// Current clock time in milliseconds.
    pub fn now(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Chainable handle over `nodes`.
    pub fn select(&mut self, nodes: impl IntoIterator<Item = NodeHandle>) -> Selection<'_> {
        Selection::new(self, nodes.into_iter().collect())
    }

    fn slot<'s>(slots: &'s mut IndexMap<NodeKey, NodeSlot>, node: &NodeHandle) -> &'s mut NodeSlot {
        slots
            .entry(node_key(node))
            .or_insert_with(|| NodeSlot::new(node))
    }

    /// Append a request to the node's queue, launching it if the node is idle.
    pub fn enqueue(&mut self, node: &NodeHandle, request: PendingTween) {
        let now = self.now();
        let slot = Self::slot(&mut self.slots, node);
        if let Some(tween) = slot.queue.enqueue(request, node, now) {
            slot.controllers.register(tween);
            self.events.push(event(tween, |node, tween, id| MotionEvent::Launched {
                node,
                tween,
                id,
            }));
            return;
        }
        log::debug!(
            "{} busy, queued request ({} waiting)",
            node_key(node),
            slot.queue.pending_len()
        );
    }

    /// Write one frame for every node at the clock's current time.
    pub fn tick(&mut self) {
        let now = self.now();
        self.tick_at(now);
    }

    /// Write one frame for every node at `now`.
    ///
    /// Nodes that have been dropped are pruned first. A tween that completes
    /// during this frame hands its node to the next queued request, which
    /// writes its first frame on the following tick.
    pub fn tick_at(&mut self, now: f64) {
        self.prune();
        for slot in self.slots.values_mut() {
            let Some(node) = slot.upgrade() else {
                continue;
            };
            let Some(tween) = slot.queue.active_mut() else {
                continue;
            };
            let report = tween.tick(now, &node);
            if report.started {
                self.events.push(event(tween, |node, tween, id| MotionEvent::Started {
                    node,
                    tween,
                    id,
                }));
            }
            if report.completed {
                self.events.push(event(tween, |node, tween, id| MotionEvent::Completed {
                    node,
                    tween,
                    id,
                }));
                slot.finish(&node, now, &mut self.events);
            }
        }
    }

    fn prune(&mut self) {
        self.slots.retain(|key, slot| {
            let alive = slot.node.strong_count() > 0;
            if !alive {
                log::debug!("{key} dropped, discarding its animations");
            }
            alive
        });
    }

    /// Freeze the node's active tween. Returns `false` if nothing changed.
    pub fn pause(&mut self, node: &NodeHandle, id: Option<&str>) -> bool {
        let now = self.now();
        let Some(tween) = self
            .slots
            .get_mut(&node_key(node))
            .and_then(|slot| slot.controller(id))
        else {
            return false;
        };
        if !tween.pause(now, node) {
            return false;
        }
        self.events.push(event(tween, |node, tween, id| MotionEvent::Paused {
            node,
            tween,
            id,
        }));
        true
    }

    pub fn resume(&mut self, node: &NodeHandle, id: Option<&str>) -> bool {
        let now = self.now();
        let Some(tween) = self
            .slots
            .get_mut(&node_key(node))
            .and_then(|slot| slot.controller(id))
        else {
            return false;
        };
        if !tween.resume(now) {
            return false;
        }
        self.events.push(event(tween, |node, tween, id| MotionEvent::Resumed {
            node,
            tween,
            id,
        }));
        true
    }

    /// Without an id, replay the node's active tween from the start. With an
    /// id, resume that controller if it is paused.
    pub fn play(&mut self, node: &NodeHandle, id: Option<&str>) -> bool {
        if id.is_none() {
            return self.restart(node, None);
        }
        self.resume(node, id)
    }

    /// Seek the controller to 0 and play it.
    pub fn restart(&mut self, node: &NodeHandle, id: Option<&str>) -> bool {
        let now = self.now();
        let Some(tween) = self
            .slots
            .get_mut(&node_key(node))
            .and_then(|slot| slot.controller(id))
        else {
            return false;
        };
        if !tween.seek(0.0, now, node) {
            return false;
        }
        if tween.play(now) {
            self.events.push(event(tween, |node, tween, id| MotionEvent::Resumed {
                node,
                tween,
                id,
            }));
        }
        log::debug!("{} restarted", tween.id());
        true
    }

    /// Force the controller to its end values and advance the node's queue.
    pub fn stop(&mut self, node: &NodeHandle, id: Option<&str>) -> bool {
        let now = self.now();
        let Some(slot) = self.slots.get_mut(&node_key(node)) else {
            return false;
        };
        let Some(tween) = slot.controller(id) else {
            return false;
        };
        if !tween.stop(node) {
            return false;
        }
        self.events.push(event(tween, |node, tween, id| MotionEvent::Stopped {
            node,
            tween,
            id,
        }));
        slot.finish(node, now, &mut self.events);
        true
    }

    /// Write the frame at `progress` without changing play state.
    pub fn seek(&mut self, node: &NodeHandle, id: Option<&str>, progress: f64) -> bool {
        let now = self.now();
        self.slots
            .get_mut(&node_key(node))
            .and_then(|slot| slot.controller(id))
            .is_some_and(|tween| tween.seek(progress, now, node))
    }

    /// Discard the node's active tween and queue without writing anything.
    pub fn release(&mut self, node: &NodeHandle) -> bool {
        let key = node_key(node);
        let released = self.slots.shift_remove(&key).is_some();
        if released {
            log::debug!("{key} released");
        }
        released
    }

    /// Take the events recorded since the last drain. Hosts that poll events
    /// should drain after every tick; only the newest
    /// [`MAX_PENDING_EVENTS`](crate::events::MAX_PENDING_EVENTS) are kept.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.events.drain()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// No node has an active or queued tween.
    pub fn is_idle(&self) -> bool {
        self.slots.values().all(|slot| slot.queue.is_idle())
    }

    /// Nodes with bookkeeping, including ones whose queue has drained.
    pub fn node_count(&self) -> usize {
        self.slots.len()
    }

    /// Requests waiting behind the node's active tween.
    pub fn pending_len(&self, node: &NodeHandle) -> usize {
        self.slots
            .get(&node_key(node))
            .map_or(0, |slot| slot.queue.pending_len())
    }

    pub fn active_state(&self, node: &NodeHandle) -> Option<TweenState> {
        self.active(node).map(Tween::state)
    }

    pub fn active_id(&self, node: &NodeHandle) -> Option<TweenId> {
        self.active(node).map(Tween::id)
    }

    /// The tween currently driving the node.
    pub fn active(&self, node: &NodeHandle) -> Option<&Tween> {
        self.slots.get(&node_key(node))?.queue.active()
    }

    /// Live controller ids registered for the node.
    pub fn controller_count(&self, node: &NodeHandle) -> usize {
        self.slots
            .get(&node_key(node))
            .map_or(0, |slot| slot.controllers.len())
    }
}

impl std::fmt::Debug for SchedulerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerContext")
            .field("now", &self.now())
            .field("defaults", &self.defaults)
            .field("nodes", &self.slots.len())
            .field("events", &self.events.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::surface::MemoryNode;
    use crate::tween::TweenTiming;
    use crate::types::TweenMode;
    use crate::value::StyleValue;

    const EPSILON: f64 = 0.0001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn context() -> (ManualClock, SchedulerContext) {
        let clock = ManualClock::new();
        let ctx = SchedulerContext::new(Box::new(clock.clone()));
        (clock, ctx)
    }

    fn width_to(value: f64, label: Option<&str>) -> PendingTween {
        let mut request = PendingTween::new(
            TweenMode::To,
            vec![("w".to_string(), StyleValue::Number(value))],
            TweenTiming::new(100.0),
        );
        request.label = label.map(str::to_string);
        request
    }

    fn width_node() -> (Rc<RefCell<MemoryNode>>, NodeHandle) {
        let node = MemoryNode::new("n").with_property("width", "0px").shared();
        let handle: NodeHandle = node.clone();
        (node, handle)
    }

    #[test]
    fn test_enqueue_launches_and_registers() {
        let (_clock, mut ctx) = context();
        let (_node, handle) = width_node();

        ctx.enqueue(&handle, width_to(10.0, Some("grow")));
        assert_eq!(ctx.active_state(&handle), Some(TweenState::Scheduled));
        assert_eq!(ctx.controller_count(&handle), 1);

        let events: Vec<_> = ctx.drain_events().collect();
        assert!(matches!(&events[..], [MotionEvent::Launched { id: Some(id), .. }] if id == "grow"));
    }

    #[test]
    fn test_queue_advances_on_completion() {
        let (clock, mut ctx) = context();
        let (node, handle) = width_node();

        ctx.enqueue(&handle, width_to(10.0, None));
        ctx.enqueue(&handle, width_to(20.0, None));
        assert_eq!(ctx.pending_len(&handle), 1);

        ctx.tick();
        clock.set(100.0);
        ctx.tick();
        assert_eq!(node.borrow().number("width"), Some(10.0));
        assert_eq!(ctx.pending_len(&handle), 0);
        assert_eq!(ctx.active_state(&handle), Some(TweenState::Scheduled));

        ctx.tick();
        clock.set(150.0);
        ctx.tick();
        let width = node.borrow().number("width").unwrap();
        assert!(approx_eq(width, 15.0));

        clock.set(200.0);
        ctx.tick();
        assert!(ctx.is_idle());
    }

    #[test]
    fn test_pause_by_unknown_id_is_noop() {
        let (_clock, mut ctx) = context();
        let (_node, handle) = width_node();

        ctx.enqueue(&handle, width_to(10.0, Some("a")));
        assert!(!ctx.pause(&handle, Some("b")));
        assert!(ctx.pause(&handle, Some("a")));
        assert!(!ctx.pause(&handle, Some("a")));
        assert!(ctx.resume(&handle, Some("a")));
    }

    #[test]
    fn test_stop_advances_queue() {
        let (_clock, mut ctx) = context();
        let (node, handle) = width_node();

        ctx.enqueue(&handle, width_to(10.0, Some("first")));
        ctx.enqueue(&handle, width_to(30.0, Some("second")));
        ctx.tick();

        assert!(ctx.stop(&handle, None));
        assert_eq!(node.borrow().number("width"), Some(10.0));
        assert_eq!(ctx.active(&handle).and_then(Tween::label), Some("second"));
        assert!(!ctx.stop(&handle, Some("first")));
    }

    #[test]
    fn test_queue_handoff_with_debug_logging() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
        let (_clock, mut ctx) = context();
        let (_node, handle) = width_node();

        for label in ["a", "b", "c"] {
            ctx.enqueue(&handle, width_to(10.0, Some(label)));
        }
        assert_eq!(ctx.pending_len(&handle), 2);

        ctx.tick();
        assert!(ctx.stop(&handle, Some("a")));
        assert_eq!(ctx.pending_len(&handle), 1);
        assert!(ctx.stop(&handle, Some("b")));
        assert_eq!(ctx.pending_len(&handle), 0);
        assert_eq!(ctx.active(&handle).and_then(Tween::label), Some("c"));

        let launched: Vec<String> = ctx
            .drain_events()
            .filter_map(|event| match event {
                MotionEvent::Launched { id, .. } => id,
                _ => None,
            })
            .collect();
        assert_eq!(launched, ["a", "b", "c"]);
        assert_eq!(ctx.controller_count(&handle), 1);
    }

    #[test]
    fn test_restart_replays_from_start() {
        let (clock, mut ctx) = context();
        let (node, handle) = width_node();

        ctx.enqueue(&handle, width_to(10.0, None));
        ctx.tick();
        clock.set(80.0);
        ctx.tick();

        assert!(ctx.play(&handle, None));
        assert_eq!(node.borrow().number("width"), Some(0.0));

        clock.set(130.0);
        ctx.tick();
        let width = node.borrow().number("width").unwrap();
        assert!(approx_eq(width, 5.0));
    }

    #[test]
    fn test_dropped_nodes_are_pruned() {
        let (_clock, mut ctx) = context();
        let (node, handle) = width_node();

        ctx.enqueue(&handle, width_to(10.0, None));
        assert_eq!(ctx.node_count(), 1);

        drop(handle);
        drop(node);
        ctx.tick();
        assert_eq!(ctx.node_count(), 0);
        assert!(ctx.is_idle());
    }

    #[test]
    fn test_release_discards_without_writing() {
        let (_clock, mut ctx) = context();
        let (node, handle) = width_node();

        ctx.enqueue(&handle, width_to(10.0, None));
        let writes = node.borrow().write_count();
        assert!(ctx.release(&handle));
        ctx.tick();
        assert_eq!(node.borrow().write_count(), writes);
        assert!(!ctx.release(&handle));
    }

    #[test]
    fn test_with_config_applies_defaults() {
        let config = MotionConfig {
            default_duration_s: 2.0,
            ..MotionConfig::default()
        };
        let ctx = SchedulerContext::with_config(Box::new(ManualClock::new()), &config);
        assert!(approx_eq(ctx.defaults().default_duration_s, 2.0));
    }
}
