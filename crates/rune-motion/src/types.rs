//! Core identifiers and lifecycle states.
//!
//! - `TweenId`: Unique identifier for a tween instance
//! - `NodeKey`: Identity of a node inside the scheduler's side tables
//! - `TweenState`: Current state of a tween
//! - `TweenMode`: Whether supplied values are end values or start values

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a tween instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweenId(pub u64);

impl TweenId {
    /// Generate a new unique tween ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TweenId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TweenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tween#{}", self.0)
    }
}

/// Identity of a node, derived from the address of its shared allocation.
///
/// Keys are only meaningful while the node is alive; the scheduler checks
/// the weak handle stored next to the key before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub usize);

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node@{:#x}", self.0)
    }
}

/// Current state of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenState {
    /// Created, waiting to be played or for its delay to elapse.
    #[default]
    Scheduled,
    /// Producing frames.
    Running,
    /// Frozen; elapsed time does not advance.
    Paused,
    /// Reached the end of its timeline.
    Completed,
    /// Forced to its end values by `stop`.
    Stopped,
}

impl TweenState {
    /// Completed and stopped tweens never produce another frame.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

/// How the supplied property values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenMode {
    /// Values are end values; start values are read from the node.
    #[default]
    To,
    /// Values are start values; end values are the node's current values.
    From,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_ids_are_unique() {
        let a = TweenId::new();
        let b = TweenId::new();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(TweenState::Completed.is_terminal());
        assert!(TweenState::Stopped.is_terminal());
        assert!(!TweenState::Scheduled.is_terminal());
        assert!(!TweenState::Running.is_terminal());
        assert!(!TweenState::Paused.is_terminal());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&TweenState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        let mode: TweenMode = serde_json::from_str("\"from\"").unwrap();
        assert_eq!(mode, TweenMode::From);
    }
}
