//! Declarative, chainable property animation for style-bearing nodes.
//!
//! This crate provides:
//! - **Property resolution**: shorthand aliases (`x`, `o`, `mx`, ...) resolved
//!   to canonical properties, transform functions or filter functions
//! - **Composition**: partial updates merged into `transform`/`filter`
//!   strings without disturbing other functions
//! - **Easing**: named presets plus `spring(...)` and `cubicBezier(...)`
//! - **Tweens**: timed interpolation of numbers and colours with
//!   play/pause/resume/stop/seek
//! - **Queues**: at most one tween per node, later requests run in order
//!
//! # Architecture
//!
//! ```text
//! SchedulerContext (owns everything, ticked by the host)
//!   └── per node (weak)
//!         ├── AnimationQueue: active Tween + pending requests
//!         └── ControllerRegistry: caller id → active tween
//!
//! Selection (chainable facade)
//!   └── AnimationVars ──plan──▶ PendingTween ──launch──▶ Tween
//!                                                         └── StyleBatch ──▶ StyleSurface
//! ```

pub mod clock;
pub mod compose;
pub mod easing;
pub mod error;
pub mod events;
pub mod property;
pub mod queue;
pub mod scheduler;
pub mod selection;
pub mod surface;
pub mod tween;
pub mod types;
pub mod value;
pub mod vars;

pub use clock::{Clock, ManualClock, SystemClock};
pub use compose::{FunctionList, StyleBatch, compose, compose_args};
pub use easing::{EasingFamily, EasingFunction, EasingMode};
pub use error::{MotionError, Result};
pub use events::{EventQueue, MotionEvent};
pub use property::{CompositeKind, PropertyClass, PropertyTarget};
pub use queue::{AnimationQueue, PendingTween};
pub use rune_config::MotionConfig;
pub use scheduler::{ControllerRegistry, SchedulerContext};
pub use selection::Selection;
pub use surface::{MemoryNode, NodeHandle, StyleSurface, apply_styles, node_key};
pub use tween::{PropertyTrack, TickReport, Tween, TweenCallbacks, TweenTiming};
pub use types::{NodeKey, TweenId, TweenMode, TweenState};
pub use value::{AnimatedValue, Interpolate, Rgba, StyleValue};
pub use vars::{AnimationVars, Stagger};
