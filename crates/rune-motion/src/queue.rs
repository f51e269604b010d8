//! Per-node FIFO of animations.
//!
//! At most one tween is active per node. Later requests wait in `pending`
//! and are launched, in order, when the active one completes or is stopped.

use std::collections::VecDeque;

use crate::property::{PropertyTarget, resolve};
use crate::surface::{NodeHandle, StyleSurface, apply_styles, current_text};
use crate::tween::{PropertyTrack, Tween, TweenCallbacks, TweenTiming, resolve_tracks};
use crate::types::TweenMode;
use crate::value::StyleValue;

/// A queued animation request. Nothing is resolved against the node until
/// it is launched.
#[derive(Debug, Clone)]
pub struct PendingTween {
    pub mode: TweenMode,
    pub properties: Vec<(String, StyleValue)>,
    pub timing: TweenTiming,
    pub callbacks: TweenCallbacks,
    /// Caller-supplied id.
    pub label: Option<String>,
}

impl PendingTween {
    pub fn new(mode: TweenMode, properties: Vec<(String, StyleValue)>, timing: TweenTiming) -> Self {
        Self {
            mode,
            properties,
            timing,
            callbacks: TweenCallbacks::default(),
            label: None,
        }
    }

    /// Resolve against the node's current state and play.
    ///
    /// In `From` mode the supplied values are written to the node right away
    /// and the node's values from just before that write become the ends.
    pub fn launch(self, node: &NodeHandle, now: f64) -> Tween {
        let tracks = match self.mode {
            TweenMode::To => resolve_tracks(node, &self.properties),
            TweenMode::From => from_tracks(node, &self.properties),
        };
        let mut tween =
            Tween::new(node, tracks, self.timing, self.callbacks).with_label(self.label);
        tween.play(now);
        tween
    }
}

fn from_tracks(node: &NodeHandle, starts: &[(String, StyleValue)]) -> Vec<PropertyTrack> {
    let planned: Vec<(PropertyTarget, StyleValue, StyleValue)> = {
        let surface = node.borrow();
        starts
            .iter()
            .flat_map(|(key, start)| {
                resolve(key)
                    .targets()
                    .into_iter()
                    .map(|target| {
                        let end = implied_end(&*surface, &target, start);
                        (target, start.clone(), end)
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    };

    apply_styles(node, starts);

    let surface = node.borrow();
    planned
        .into_iter()
        .map(|(target, start, end)| PropertyTrack::resolve(&*surface, target, &end, Some(&start)))
        .collect()
}

/// The value a `From` tween returns to: whatever the node shows now.
fn implied_end(surface: &dyn StyleSurface, target: &PropertyTarget, start: &StyleValue) -> StyleValue {
    if let Some(text) = current_text(surface, target) {
        return StyleValue::Text(text);
    }
    match start {
        StyleValue::Text(text) if surface.parse_color(text).is_some() => {
            StyleValue::Text("transparent".to_string())
        }
        _ => StyleValue::Number(target.neutral_value()),
    }
}

/// Queue of one node.
#[derive(Debug, Default)]
pub struct AnimationQueue {
    active: Option<Tween>,
    pending: VecDeque<PendingTween>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request. If the queue was idle it is launched immediately
    /// and the new active tween is returned.
    pub fn enqueue(&mut self, request: PendingTween, node: &NodeHandle, now: f64) -> Option<&Tween> {
        if self.active.is_none() && self.pending.is_empty() {
            self.active = Some(request.launch(node, now));
            return self.active.as_ref();
        }
        self.pending.push_back(request);
        None
    }

    /// Drop the active tween and launch the next request, if any.
    pub fn advance(&mut self, node: &NodeHandle, now: f64) -> Option<&Tween> {
        self.active = None;
        let next = self.pending.pop_front()?;
        self.active = Some(next.launch(node, now));
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Tween> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Tween> {
        self.active.as_mut()
    }

    /// Requests waiting behind the active tween.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemoryNode;
    use crate::types::TweenState;

    fn request(mode: TweenMode, key: &str, value: StyleValue) -> PendingTween {
        PendingTween::new(mode, vec![(key.to_string(), value)], TweenTiming::new(100.0))
    }

    #[test]
    fn test_idle_queue_launches_immediately() {
        let node = MemoryNode::new("n").with_property("opacity", "1").shared();
        let handle: NodeHandle = node.clone();
        let mut queue = AnimationQueue::new();

        let launched = queue.enqueue(request(TweenMode::To, "o", StyleValue::Number(0.0)), &handle, 0.0);
        assert!(launched.is_some_and(|t| t.is_launched()));

        let second = queue.enqueue(request(TweenMode::To, "o", StyleValue::Number(1.0)), &handle, 0.0);
        assert!(second.is_none());
        assert_eq!(queue.pending_len(), 1);
        assert!(!queue.is_idle());
    }

    #[test]
    fn test_advance_launches_in_order() {
        let node = MemoryNode::new("n").shared();
        let handle: NodeHandle = node.clone();
        let mut queue = AnimationQueue::new();

        let mut first = request(TweenMode::To, "w", StyleValue::Number(10.0));
        first.label = Some("first".into());
        let mut second = request(TweenMode::To, "w", StyleValue::Number(20.0));
        second.label = Some("second".into());
        queue.enqueue(first, &handle, 0.0);
        queue.enqueue(second, &handle, 0.0);

        assert_eq!(queue.active().and_then(|t| t.label()), Some("first"));
        let next = queue.advance(&handle, 100.0);
        assert_eq!(next.and_then(|t| t.label()), Some("second"));
        assert_eq!(queue.pending_len(), 0);

        assert!(queue.advance(&handle, 200.0).is_none());
        assert!(queue.is_idle());
    }

    #[test]
    fn test_second_request_resolves_at_launch() {
        let node = MemoryNode::new("n").with_property("width", "0px").shared();
        let handle: NodeHandle = node.clone();
        let mut queue = AnimationQueue::new();

        queue.enqueue(request(TweenMode::To, "w", StyleValue::Number(10.0)), &handle, 0.0);
        queue.enqueue(request(TweenMode::To, "w", "+=5".into()), &handle, 0.0);

        let first = queue.active_mut().unwrap();
        first.tick(0.0, &handle);
        first.tick(100.0, &handle);
        assert_eq!(first.state(), TweenState::Completed);

        // The relative end is resolved against the first tween's result.
        let second = queue.advance(&handle, 100.0).unwrap();
        assert_eq!(
            second.tracks()[0].end,
            crate::value::AnimatedValue::Number(15.0)
        );
    }

    #[test]
    fn test_from_mode_writes_start_and_targets_current() {
        let node = MemoryNode::new("n")
            .with_property("transform", "translateX(20px)")
            .shared();
        let handle: NodeHandle = node.clone();

        let tween = request(TweenMode::From, "x", StyleValue::Number(-50.0)).launch(&handle, 0.0);
        assert_eq!(node.borrow().function_number("transform", "translateX"), Some(-50.0));

        let track = &tween.tracks()[0];
        assert_eq!(track.start, crate::value::AnimatedValue::Number(-50.0));
        assert_eq!(track.end, crate::value::AnimatedValue::Number(20.0));
        assert_eq!(track.unit.as_deref(), Some("px"));
    }

    #[test]
    fn test_from_mode_neutral_end_for_missing_scale() {
        let node = MemoryNode::new("n").shared();
        let handle: NodeHandle = node.clone();
        let tween = request(TweenMode::From, "scale", StyleValue::Number(0.0)).launch(&handle, 0.0);
        assert_eq!(tween.tracks()[0].end, crate::value::AnimatedValue::Number(1.0));
    }
}
