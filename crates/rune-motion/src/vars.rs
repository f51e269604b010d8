//! Declarative animation input: animatable properties mixed with reserved
//! option keys.
//!
//! The keys `id`, `duration`, `delay`, `easing`/`ease`, `stagger` and the
//! callback names (`onStart`, `onEnd`/`onComplete`, `onProgress`,
//! `onPause`) are options; every other key is an animatable property.
//! `easing` wins over `ease`, `onEnd` over `onComplete`.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rune_config::MotionConfig;
use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::queue::PendingTween;
use crate::surface::NodeHandle;
use crate::tween::{NodeCallback, TweenCallbacks, TweenTiming};
use crate::types::TweenMode;
use crate::value::{StyleValue, parse_leading_float};

const CALLBACK_KEYS: &[&str] = &[
    "onStart",
    "onEnd",
    "onComplete",
    "onProgress",
    "onPause",
    "onUpdate",
];

/// Per-index start offset when animating several nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stagger {
    /// Fixed configured increment per index (`stagger: true`, or absent).
    #[default]
    Step,
    /// All nodes start together (`stagger: false`).
    Off,
    /// Explicit increment per index, in seconds.
    Every(f64),
}

impl Stagger {
    /// Parse the JSON form: a boolean or a number of seconds.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(true) => Some(Self::Step),
            serde_json::Value::Bool(false) => Some(Self::Off),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Every),
            _ => None,
        }
    }

    /// Offset in seconds for the node at `index`.
    pub fn offset_s(self, index: usize, step_s: f64) -> f64 {
        let per_index = match self {
            Self::Step => step_s,
            Self::Off => 0.0,
            Self::Every(s) if s.is_finite() => s,
            Self::Every(_) => 0.0,
        };
        per_index * index as f64
    }
}

/// Properties and options for one `to`/`from` call.
#[derive(Clone, Default)]
pub struct AnimationVars {
    properties: IndexMap<String, StyleValue>,
    id: Option<String>,
    duration: Option<f64>,
    delay: Option<f64>,
    easing: Option<String>,
    ease: Option<String>,
    stagger: Option<Stagger>,
    callbacks: TweenCallbacks,
    on_end: Option<NodeCallback>,
    on_complete: Option<NodeCallback>,
}

impl fmt::Debug for AnimationVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationVars")
            .field("properties", &self.properties)
            .field("id", &self.id)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing.as_ref().or(self.ease.as_ref()))
            .field("stagger", &self.stagger)
            .finish_non_exhaustive()
    }
}

impl AnimationVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. Reserved keys become options, callback
    /// keys are ignored (closures cannot be expressed in JSON) and values
    /// that are neither numbers, strings, booleans nor null are skipped.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut vars = Self::new();
        let Some(object) = value.as_object() else {
            log::warn!("animation vars must be a JSON object, got {value}");
            return vars;
        };

        for (key, value) in object {
            if key == "stagger" {
                match Stagger::from_json(value) {
                    Some(stagger) => vars.stagger = Some(stagger),
                    None => log::warn!("ignoring stagger value {value}"),
                }
                continue;
            }
            match StyleValue::from_json(value) {
                Some(style) => vars.insert(key, style),
                None => log::warn!("ignoring non-scalar value for `{key}`"),
            }
        }
        vars
    }

    /// Insert a key, routing reserved option names to their options.
    pub fn insert(&mut self, key: &str, value: StyleValue) {
        let text = || match &value {
            StyleValue::Text(s) => Some(s.clone()),
            StyleValue::Number(n) => Some(n.to_string()),
            StyleValue::Unset => None,
        };
        let seconds = || match &value {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Text(s) => parse_leading_float(s),
            StyleValue::Unset => None,
        };

        match key {
            "id" => self.id = text(),
            "duration" => self.duration = seconds(),
            "delay" => self.delay = seconds(),
            "easing" => self.easing = text(),
            "ease" => self.ease = text(),
            "stagger" => {
                self.stagger = match &value {
                    StyleValue::Number(n) => Some(Stagger::Every(*n)),
                    StyleValue::Text(s) if s == "true" => Some(Stagger::Step),
                    StyleValue::Text(s) if s == "false" => Some(Stagger::Off),
                    _ => None,
                }
            }
            k if CALLBACK_KEYS.contains(&k) => {
                log::warn!("callback `{k}` must be set with its builder method");
            }
            _ => {
                self.properties.insert(key.to_string(), value);
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn set(mut self, key: &str, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Duration in seconds.
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Delay in seconds.
    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = Some(seconds);
        self
    }

    pub fn easing(mut self, descriptor: impl Into<String>) -> Self {
        self.easing = Some(descriptor.into());
        self
    }

    pub fn ease(mut self, descriptor: impl Into<String>) -> Self {
        self.ease = Some(descriptor.into());
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = Some(stagger);
        self
    }

    pub fn on_start(mut self, f: impl Fn(&NodeHandle) + 'static) -> Self {
        self.callbacks.on_start = Some(Rc::new(f));
        self
    }

    pub fn on_end(mut self, f: impl Fn(&NodeHandle) + 'static) -> Self {
        self.on_end = Some(Rc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn(&NodeHandle) + 'static) -> Self {
        self.on_complete = Some(Rc::new(f));
        self
    }

    pub fn on_progress(mut self, f: impl Fn(f64, &NodeHandle) + 'static) -> Self {
        self.callbacks.on_progress = Some(Rc::new(f));
        self
    }

    pub fn on_pause(mut self, f: impl Fn(&NodeHandle) + 'static) -> Self {
        self.callbacks.on_pause = Some(Rc::new(f));
        self
    }

    pub fn on_update(mut self, f: impl Fn(f64) + 'static) -> Self {
        self.callbacks.on_update = Some(Rc::new(f));
        self
    }

    /// Animatable properties in insertion order.
    pub fn properties(&self) -> Vec<(String, StyleValue)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn property(&self, key: &str) -> Option<&StyleValue> {
        self.properties.get(key)
    }

    pub fn animation_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn easing_descriptor(&self) -> Option<&str> {
        self.easing.as_deref().or(self.ease.as_deref())
    }

    fn end_callback(&self) -> Option<NodeCallback> {
        self.on_end.clone().or_else(|| self.on_complete.clone())
    }

    /// Settle the tween for the node at `index` of a selection.
    ///
    /// Options given inline win over `options`, which win over the
    /// configured defaults. The stagger offset is added to the delay.
    pub fn plan(
        &self,
        mode: TweenMode,
        options: Option<&AnimationVars>,
        defaults: &MotionConfig,
        index: usize,
    ) -> PendingTween {
        let easing = self
            .easing_descriptor()
            .or_else(|| options.and_then(Self::easing_descriptor))
            .unwrap_or(defaults.default_easing.as_str());
        let duration = self
            .duration
            .or_else(|| options.and_then(|o| o.duration))
            .filter(|d| d.is_finite())
            .unwrap_or(defaults.default_duration_s);
        let delay = self
            .delay
            .or_else(|| options.and_then(|o| o.delay))
            .unwrap_or(0.0);
        let stagger = self
            .stagger
            .or_else(|| options.and_then(|o| o.stagger))
            .unwrap_or_default();
        let delay = delay + stagger.offset_s(index, defaults.stagger_step_s);

        let inherited = options.map(|o| o.callbacks.clone()).unwrap_or_default();
        let callbacks = TweenCallbacks {
            on_start: self.callbacks.on_start.clone().or(inherited.on_start),
            on_update: self.callbacks.on_update.clone().or(inherited.on_update),
            on_progress: self.callbacks.on_progress.clone().or(inherited.on_progress),
            on_complete: self
                .end_callback()
                .or_else(|| options.and_then(Self::end_callback)),
            on_pause: self.callbacks.on_pause.clone().or(inherited.on_pause),
        };

        let label = self
            .id
            .clone()
            .or_else(|| options.and_then(|o| o.id.clone()));

        PendingTween {
            mode,
            properties: self.properties(),
            timing: TweenTiming::from_seconds(duration, delay, EasingFunction::resolve(easing)),
            callbacks,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    const EPSILON: f64 = 0.0001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_reserved_keys_are_options() {
        let vars = AnimationVars::from_json(&json!({
            "opacity": 0,
            "x": "+=10",
            "id": "fade",
            "duration": 1.5,
            "delay": 0.25,
            "ease": "easeInQuad",
            "onStart": "ignored",
        }));

        assert_eq!(vars.properties().len(), 2);
        assert_eq!(vars.property("opacity"), Some(&StyleValue::Number(0.0)));
        assert_eq!(vars.property("x"), Some(&StyleValue::Text("+=10".into())));
        assert_eq!(vars.animation_id(), Some("fade"));

        let pending = vars.plan(TweenMode::To, None, &MotionConfig::default(), 0);
        assert!(approx_eq(pending.timing.duration_ms, 1500.0));
        assert!(approx_eq(pending.timing.delay_ms, 250.0));
        assert_eq!(pending.timing.easing, EasingFunction::resolve("easeInQuad"));
        assert_eq!(pending.label.as_deref(), Some("fade"));
    }

    #[test]
    fn test_easing_precedence() {
        let vars = AnimationVars::new()
            .ease("easeInQuad")
            .easing("easeOutQuad")
            .set("o", 1);
        let pending = vars.plan(TweenMode::To, None, &MotionConfig::default(), 0);
        assert_eq!(pending.timing.easing, EasingFunction::resolve("easeOutQuad"));
    }

    #[test]
    fn test_defaults_apply() {
        let defaults = MotionConfig {
            default_duration_s: 2.0,
            default_easing: "ease".into(),
            ..MotionConfig::default()
        };
        let pending = AnimationVars::new()
            .set("o", 0)
            .stagger(Stagger::Off)
            .plan(TweenMode::To, None, &defaults, 3);
        assert!(approx_eq(pending.timing.duration_ms, 2000.0));
        assert_eq!(pending.timing.delay_ms, 0.0);
        assert_eq!(pending.timing.easing, EasingFunction::Ease);
    }

    #[test]
    fn test_stagger_offsets() {
        let defaults = MotionConfig::default();
        assert!(approx_eq(Stagger::Step.offset_s(3, defaults.stagger_step_s), 0.3));
        assert_eq!(Stagger::Off.offset_s(3, 0.1), 0.0);
        assert!(approx_eq(Stagger::Every(0.25).offset_s(2, 0.1), 0.5));

        let vars = AnimationVars::from_json(&json!({ "o": 0, "delay": 1, "stagger": 0.5 }));
        let pending = vars.plan(TweenMode::To, None, &defaults, 2);
        assert!(approx_eq(pending.timing.delay_ms, 2000.0));

        let vars = AnimationVars::from_json(&json!({ "o": 0, "stagger": true }));
        let pending = vars.plan(TweenMode::To, None, &defaults, 1);
        assert!(approx_eq(pending.timing.delay_ms, 100.0));
    }

    #[test]
    fn test_options_fill_gaps() {
        let vars = AnimationVars::new().set("x", -50).duration(0.2);
        let options = AnimationVars::new().duration(5.0).delay(0.1).id("intro");
        let pending = vars.plan(TweenMode::From, Some(&options), &MotionConfig::default(), 0);
        assert!(approx_eq(pending.timing.duration_ms, 200.0));
        assert!(approx_eq(pending.timing.delay_ms, 100.0));
        assert_eq!(pending.label.as_deref(), Some("intro"));
        assert_eq!(pending.mode, TweenMode::From);
    }

    #[test]
    fn test_end_callback_precedence() {
        let hits = Rc::new(Cell::new(0));
        let (a, b) = (hits.clone(), hits.clone());
        let vars = AnimationVars::new()
            .on_complete(move |_| a.set(a.get() + 1))
            .on_end(move |_| b.set(b.get() + 10));
        let pending = vars.plan(TweenMode::To, None, &MotionConfig::default(), 0);

        let node: NodeHandle = crate::surface::MemoryNode::new("n").shared();
        if let Some(on_complete) = pending.callbacks.on_complete {
            on_complete(&node);
        }
        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn test_non_object_json() {
        let vars = AnimationVars::from_json(&json!([1, 2, 3]));
        assert!(vars.properties().is_empty());
    }
}
