//! Lifecycle events for tweens.
//!
//! The scheduler records an event whenever a tween changes state. Hosts poll
//! them after each tick instead of (or in addition to) registering
//! callbacks:
//!
//! ```ignore
//! ctx.tick();
//! for event in ctx.drain_events() {
//!     if let MotionEvent::Completed { id: Some(id), .. } = &event {
//!         println!("{id} finished");
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{NodeKey, TweenId};

/// Event emitted when a tween changes state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionEvent {
    /// Tween was taken from the head of its node's queue and played.
    Launched {
        node: NodeKey,
        tween: TweenId,
        id: Option<String>,
    },
    /// Delay elapsed and the first frame was written.
    Started {
        node: NodeKey,
        tween: TweenId,
        id: Option<String>,
    },
    Paused {
        node: NodeKey,
        tween: TweenId,
        id: Option<String>,
    },
    Resumed {
        node: NodeKey,
        tween: TweenId,
        id: Option<String>,
    },
    /// Timeline reached its end.
    Completed {
        node: NodeKey,
        tween: TweenId,
        id: Option<String>,
    },
    /// Forced to its end values by `stop`.
    Stopped {
        node: NodeKey,
        tween: TweenId,
        id: Option<String>,
    },
}

impl MotionEvent {
    pub fn node(&self) -> NodeKey {
        match self {
            Self::Launched { node, .. }
            | Self::Started { node, .. }
            | Self::Paused { node, .. }
            | Self::Resumed { node, .. }
            | Self::Completed { node, .. }
            | Self::Stopped { node, .. } => *node,
        }
    }

    pub fn tween(&self) -> TweenId {
        match self {
            Self::Launched { tween, .. }
            | Self::Started { tween, .. }
            | Self::Paused { tween, .. }
            | Self::Resumed { tween, .. }
            | Self::Completed { tween, .. }
            | Self::Stopped { tween, .. } => *tween,
        }
    }

    /// Caller-supplied animation id, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Launched { id, .. }
            | Self::Started { id, .. }
            | Self::Paused { id, .. }
            | Self::Resumed { id, .. }
            | Self::Completed { id, .. }
            | Self::Stopped { id, .. } => id.as_deref(),
        }
    }

    /// Completed or stopped; the tween will not run again.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Stopped { .. })
    }
}

/// Events kept when the host never drains the queue.
pub const MAX_PENDING_EVENTS: usize = 1024;

/// FIFO of pending events. Once `limit` events are waiting, the oldest is
/// dropped for each new one.
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<MotionEvent>,
    limit: usize,
    dropped: usize,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::bounded(MAX_PENDING_EVENTS)
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            events: VecDeque::new(),
            limit: limit.max(1),
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: MotionEvent) {
        if self.events.len() >= self.limit {
            self.events.pop_front();
            self.dropped += 1;
            if self.dropped == 1 {
                log::warn!("event queue full ({} events), dropping oldest", self.limit);
            }
        }
        self.events.push_back(event);
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<MotionEvent> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events_for_node(&self, node: NodeKey) -> Vec<&MotionEvent> {
        self.events.iter().filter(|e| e.node() == node).collect()
    }
}
