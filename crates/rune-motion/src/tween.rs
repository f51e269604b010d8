//! Tween controller: one timed interpolation over a set of properties on a
//! single node.
//!
//! A tween resolves `(start, end)` pairs once, at construction, and then
//! writes interpolated values to its node on every frame until its timeline
//! ends. Time is supplied by the caller (milliseconds), which keeps the
//! controller independent of any real clock.
//!
//! # Lifecycle
//!
//! ```text
//! Scheduled --play + delay--> Running <--pause/resume--> Paused
//!                                |
//!                                +--t reaches 1--> Completed
//!                                +--stop---------> Stopped
//! ```
//!
//! Tweens do not own their node: the scheduler holds a weak reference and
//! passes a live handle into every call that writes.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::compose::StyleBatch;
use crate::easing::EasingFunction;
use crate::property::{PropertyTarget, resolve};
use crate::surface::{NodeHandle, StyleSurface, current_text, node_key};
use crate::types::{NodeKey, TweenId, TweenState};
use crate::value::{
    AnimatedValue, Interpolate, StyleValue, format_color, format_number, parse_relative,
    split_number_unit, transparent,
};

/// Callback receiving the animated node.
pub type NodeCallback = Rc<dyn Fn(&NodeHandle)>;
/// Callback receiving eased progress.
pub type UpdateCallback = Rc<dyn Fn(f64)>;
/// Callback receiving time progress and the animated node.
pub type ProgressCallback = Rc<dyn Fn(f64, &NodeHandle)>;

/// User callbacks attached to a tween. All are optional.
#[derive(Clone, Default)]
pub struct TweenCallbacks {
    /// Once, on the first frame after the delay.
    pub on_start: Option<NodeCallback>,
    /// Every frame, with eased progress.
    pub on_update: Option<UpdateCallback>,
    /// Every frame and on seek, with time progress.
    pub on_progress: Option<ProgressCallback>,
    /// Once, on natural completion or `stop`.
    pub on_complete: Option<NodeCallback>,
    pub on_pause: Option<NodeCallback>,
}

impl fmt::Debug for TweenCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_pause", &self.on_pause.is_some())
            .finish()
    }
}

/// Timing of a tween, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TweenTiming {
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub easing: EasingFunction,
}

impl Default for TweenTiming {
    fn default() -> Self {
        Self {
            duration_ms: 500.0,
            delay_ms: 0.0,
            easing: EasingFunction::Linear,
        }
    }
}

impl TweenTiming {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    /// Build from facade units (seconds). Negative or non-finite times are
    /// treated as zero.
    pub fn from_seconds(duration_s: f64, delay_s: f64, easing: EasingFunction) -> Self {
        let ms = |s: f64| if s.is_finite() { (s * 1000.0).max(0.0) } else { 0.0 };
        Self {
            duration_ms: ms(duration_s),
            delay_ms: ms(delay_s),
            easing,
        }
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Clamp negative or non-finite times to zero.
    pub fn sanitized(self) -> Self {
        let clamp = |ms: f64| if ms.is_finite() { ms.max(0.0) } else { 0.0 };
        Self {
            duration_ms: clamp(self.duration_ms),
            delay_ms: clamp(self.delay_ms),
            easing: self.easing,
        }
    }
}

/// One animated property with its resolved endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTrack {
    pub target: PropertyTarget,
    pub start: AnimatedValue,
    pub end: AnimatedValue,
    /// Unit written after numeric values; `None` defers to inference.
    pub unit: Option<String>,
}

impl PropertyTrack {
    /// Resolve the endpoints of `target` against the node's current state.
    ///
    /// The start comes from `explicit_start` when given, otherwise from the
    /// node (function argument, colour or leading number, in that order of
    /// applicability). Relative ends (`+=`/`-=`) are applied to the start
    /// here, once.
    pub fn resolve(
        node: &dyn StyleSurface,
        target: PropertyTarget,
        end: &StyleValue,
        explicit_start: Option<&StyleValue>,
    ) -> Self {
        let end_color = match end {
            StyleValue::Text(text) if parse_relative(text).is_none() => node.parse_color(text),
            _ => None,
        };
        let fallback = target.neutral_value();

        let start_text = match explicit_start {
            Some(StyleValue::Number(n)) => {
                return Self::with_start(target, AnimatedValue::Number(*n), None, end, end_color);
            }
            Some(StyleValue::Text(text)) => Some(text.clone()),
            Some(StyleValue::Unset) => None,
            None => current_text(node, &target),
        };

        let (start, start_unit) = if end_color.is_some() {
            let color = start_text
                .as_deref()
                .and_then(|text| node.parse_color(text))
                .unwrap_or_else(transparent);
            (AnimatedValue::Color(color), None)
        } else {
            match start_text.as_deref().and_then(split_number_unit) {
                Some((n, unit)) => (AnimatedValue::Number(n), valid_unit(unit)),
                None => (AnimatedValue::Number(fallback), None),
            }
        };

        Self::with_start(target, start, start_unit, end, end_color)
    }

    fn with_start(
        target: PropertyTarget,
        start: AnimatedValue,
        start_unit: Option<String>,
        end: &StyleValue,
        end_color: Option<crate::value::Rgba>,
    ) -> Self {
        let (end, end_unit) = match end {
            StyleValue::Number(n) => (AnimatedValue::Number(*n), None),
            StyleValue::Unset => (AnimatedValue::Verbatim(String::new()), None),
            StyleValue::Text(text) => {
                if let Some(delta) = parse_relative(text) {
                    let base = start.as_number().unwrap_or(0.0);
                    let unit = split_number_unit(&text.trim()[2..]).and_then(|(_, u)| valid_unit(u));
                    (AnimatedValue::Number(base + delta), unit)
                } else if let Some(color) = end_color {
                    (AnimatedValue::Color(color), None)
                } else {
                    match split_number_unit(text) {
                        Some((n, unit)) if unit.is_empty() || valid_unit(unit).is_some() => {
                            (AnimatedValue::Number(n), valid_unit(unit))
                        }
                        _ => (AnimatedValue::Verbatim(text.clone()), None),
                    }
                }
            }
        };

        let unit = match end {
            AnimatedValue::Number(_) => end_unit.or(start_unit),
            _ => None,
        };
        Self {
            target,
            start,
            end,
            unit,
        }
    }

    /// Value to write at time progress `t` with eased progress `e`.
    ///
    /// Tracks that cannot be interpolated (a keyword end value, or a colour
    /// meeting a number) write nothing until `t` reaches 1, leaving the
    /// node's current value in place.
    pub fn value_at(&self, t: f64, e: f64) -> Option<StyleValue> {
        let value = if t >= 1.0 {
            self.end.clone()
        } else if !self.start.is_continuous_with(&self.end) {
            return None;
        } else if t <= 0.0 {
            self.start.clone()
        } else {
            self.start.interpolate(&self.end, e)
        };

        Some(match value {
            AnimatedValue::Number(n) => match &self.unit {
                Some(unit) => StyleValue::Text(format!("{}{unit}", format_number(n))),
                None => StyleValue::Number(n),
            },
            AnimatedValue::Color(color) => StyleValue::Text(format_color(&color)),
            AnimatedValue::Verbatim(text) if text.is_empty() => StyleValue::Unset,
            AnimatedValue::Verbatim(text) => StyleValue::Text(text),
        })
    }
}

/// Units are alphabetic (`px`, `deg`, `em`) or `%`.
fn valid_unit(unit: &str) -> Option<String> {
    let valid = !unit.is_empty() && unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%');
    valid.then(|| unit.to_string())
}

/// Resolve tracks for caller-supplied end values.
pub fn resolve_tracks(node: &NodeHandle, properties: &[(String, StyleValue)]) -> Vec<PropertyTrack> {
    let surface = node.borrow();
    properties
        .iter()
        .flat_map(|(key, end)| {
            resolve(key)
                .targets()
                .into_iter()
                .map(|target| PropertyTrack::resolve(&*surface, target, end, None))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// What happened during a call to [`Tween::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The delay elapsed and `on_start` ran.
    pub started: bool,
    /// Values were written.
    pub rendered: bool,
    /// The timeline reached its end.
    pub completed: bool,
}

/// A running interpolation on one node.
#[derive(Debug)]
pub struct Tween {
    id: TweenId,
    label: Option<String>,
    node: NodeKey,
    tracks: Vec<PropertyTrack>,
    timing: TweenTiming,
    callbacks: TweenCallbacks,
    state: TweenState,
    launched: bool,
    /// Earliest time of the first frame (launch time plus delay).
    start_at: f64,
    /// Time origin of the timeline, shifted on resume and seek.
    started_at: Option<f64>,
    paused_at: Option<f64>,
    progress: f64,
}

impl Tween {
    /// Create a scheduled tween for `node`.
    pub fn new(
        node: &NodeHandle,
        tracks: Vec<PropertyTrack>,
        timing: TweenTiming,
        callbacks: TweenCallbacks,
    ) -> Self {
        Self {
            id: TweenId::new(),
            label: None,
            node: node_key(node),
            tracks,
            timing: timing.sanitized(),
            callbacks,
            state: TweenState::Scheduled,
            launched: false,
            start_at: 0.0,
            started_at: None,
            paused_at: None,
            progress: 0.0,
        }
    }

    /// Tween from the node's current values to `properties`.
    pub fn to(
        node: &NodeHandle,
        properties: &[(String, StyleValue)],
        timing: TweenTiming,
        callbacks: TweenCallbacks,
    ) -> Self {
        Self::new(node, resolve_tracks(node, properties), timing, callbacks)
    }

    /// Attach a caller-supplied id.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn timing(&self) -> &TweenTiming {
        &self.timing
    }

    pub fn tracks(&self) -> &[PropertyTrack] {
        &self.tracks
    }

    /// Time progress of the last written frame.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// Start the delayed timeline, or resume when paused.
    ///
    /// Returns `false` when nothing changed.
    pub fn play(&mut self, now: f64) -> bool {
        match self.state {
            TweenState::Paused => self.resume(now),
            TweenState::Scheduled if !self.launched => {
                self.launched = true;
                self.start_at = now + self.timing.delay_ms.max(0.0);
                log::debug!(
                    "{} launched on {}, first frame at {:.1}ms",
                    self.id,
                    self.node,
                    self.start_at
                );
                true
            }
            _ => false,
        }
    }

    /// Advance to `now` and write a frame.
    pub fn tick(&mut self, now: f64, node: &NodeHandle) -> TickReport {
        let mut report = TickReport::default();
        match self.state {
            TweenState::Completed | TweenState::Stopped | TweenState::Paused => return report,
            TweenState::Scheduled => {
                if !self.launched || now < self.start_at {
                    return report;
                }
                self.state = TweenState::Running;
                self.started_at = Some(now);
                report.started = true;
                log::debug!("{} started", self.id);
                if let Some(on_start) = self.callbacks.on_start.clone() {
                    on_start(node);
                }
            }
            TweenState::Running => {}
        }

        let started_at = self.started_at.unwrap_or(now);
        let t = if self.timing.duration_ms <= 0.0 {
            1.0
        } else {
            ((now - started_at) / self.timing.duration_ms).clamp(0.0, 1.0)
        };
        let e = self.render(t, node);
        report.rendered = true;

        if let Some(on_update) = self.callbacks.on_update.clone() {
            on_update(e);
        }
        if let Some(on_progress) = self.callbacks.on_progress.clone() {
            on_progress(t, node);
        }

        if t >= 1.0 {
            self.state = TweenState::Completed;
            report.completed = true;
            log::debug!("{} completed", self.id);
            if let Some(on_complete) = self.callbacks.on_complete.clone() {
                on_complete(node);
            }
        }
        report
    }

    /// Freeze the timeline. Idempotent while paused.
    pub fn pause(&mut self, now: f64, node: &NodeHandle) -> bool {
        if !self.launched || self.state.is_terminal() || self.state == TweenState::Paused {
            return false;
        }
        self.paused_at = Some(now);
        self.state = TweenState::Paused;
        log::debug!("{} paused at progress {:.3}", self.id, self.progress);
        if let Some(on_pause) = self.callbacks.on_pause.clone() {
            on_pause(node);
        }
        true
    }

    /// Continue a paused timeline from where it stopped.
    pub fn resume(&mut self, now: f64) -> bool {
        if self.state != TweenState::Paused {
            return false;
        }
        let paused_for = (now - self.paused_at.take().unwrap_or(now)).max(0.0);
        match self.started_at {
            Some(started_at) => {
                self.started_at = Some(started_at + paused_for);
                self.state = TweenState::Running;
            }
            None => {
                self.start_at += paused_for;
                self.state = TweenState::Scheduled;
            }
        }
        log::debug!("{} resumed after {:.1}ms", self.id, paused_for);
        true
    }

    /// Force the end values and complete immediately.
    ///
    /// Returns `false` if the tween had already finished; a finished tween
    /// never writes again.
    pub fn stop(&mut self, node: &NodeHandle) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let mut batch = StyleBatch::new();
        for track in &self.tracks {
            if let Some(value) = track.value_at(1.0, 1.0) {
                batch.push(&track.target, value);
            }
        }
        batch.commit(node);

        self.state = TweenState::Stopped;
        self.progress = 1.0;
        self.paused_at = None;
        log::debug!("{} stopped", self.id);
        if let Some(on_complete) = self.callbacks.on_complete.clone() {
            on_complete(node);
        }
        true
    }

    /// Jump to `progress` (clamped to 0..=1) and write that frame.
    ///
    /// The running/paused state is kept. Once the timeline has started it is
    /// re-based so the next frame (or resume) continues from `progress`.
    /// Seeking to 1 does not complete the tween; the next frame does.
    pub fn seek(&mut self, progress: f64, now: f64, node: &NodeHandle) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let p = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.render(p, node);

        if self.started_at.is_some() {
            let reference = self.paused_at.unwrap_or(now);
            self.started_at = Some(reference - p * self.timing.duration_ms.max(0.0));
        }
        if let Some(on_progress) = self.callbacks.on_progress.clone() {
            on_progress(p, node);
        }
        true
    }

    fn render(&mut self, t: f64, node: &NodeHandle) -> f64 {
        let e = self.timing.easing.evaluate(t);
        let mut batch = StyleBatch::new();
        for track in &self.tracks {
            if let Some(value) = track.value_at(t, e) {
                batch.push(&track.target, value);
            }
        }
        batch.commit(node);
        self.progress = t;
        e
    }
}
