//! Easing functions for animation timing.
//!
//! The catalog covers:
//! - Linear
//! - CSS keywords (`ease`, `ease-in`, `ease-out`, `ease-in-out`)
//! - Preset families (quad, cubic, quart, quint, sine, expo, circ, back,
//!   elastic, bounce), each with `In`, `Out` and `InOut` variants
//! - `cubicBezier(x1, y1, x2, y2)` custom curves
//! - `spring(stiffness, mass, damping, velocity)` oscillators
//!
//! # Usage
//!
//! ```
//! use rune_motion::easing::EasingFunction;
//!
//! let ease = EasingFunction::resolve("easeOutCubic");
//! let progress = ease.evaluate(0.5);
//! assert!(progress > 0.5);
//!
//! let spring = EasingFunction::resolve("spring(1, 80, 10, 0)");
//! assert_eq!(spring.evaluate(1.0), 1.0);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};

/// Family of a preset curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFamily {
    Quad,
    Cubic,
    Quart,
    Quint,
    Sine,
    Expo,
    Circ,
    /// Overshoots below 0 before accelerating.
    Back,
    /// Oscillates around the endpoint.
    Elastic,
    Bounce,
}

impl EasingFamily {
    const ALL: [(&'static str, EasingFamily); 10] = [
        ("Quad", Self::Quad),
        ("Cubic", Self::Cubic),
        ("Quart", Self::Quart),
        ("Quint", Self::Quint),
        ("Sine", Self::Sine),
        ("Expo", Self::Expo),
        ("Circ", Self::Circ),
        ("Back", Self::Back),
        ("Elastic", Self::Elastic),
        ("Bounce", Self::Bounce),
    ];

    /// Every family, in catalog order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().map(|(_, family)| family)
    }

    /// Look up a family by its preset suffix (`"Cubic"` in `easeInCubic`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, family)| *family)
    }

    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, family)| *family == self)
            .map_or("Quad", |(n, _)| n)
    }

    /// The accelerating form; `Out` and `InOut` are derived by reflection.
    fn ease_in(self, t: f64) -> f64 {
        match self {
            Self::Quad => t.powi(2),
            Self::Cubic => t.powi(3),
            Self::Quart => t.powi(4),
            Self::Quint => t.powi(5),
            Self::Sine => 1.0 - (t * PI / 2.0).cos(),
            Self::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Self::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::Back => {
                const C1: f64 = 1.70158;
                const C3: f64 = C1 + 1.0;
                C3 * t * t * t - C1 * t * t
            }
            Self::Elastic => {
                const C4: f64 = (2.0 * PI) / 3.0;
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * C4).sin()
                }
            }
            Self::Bounce => 1.0 - bounce_out(1.0 - t),
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Direction of a preset curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingMode {
    In,
    Out,
    InOut,
}

impl EasingMode {
    fn prefix(self) -> &'static str {
        match self {
            Self::In => "easeIn",
            Self::Out => "easeOut",
            Self::InOut => "easeInOut",
        }
    }
}

/// Easing function for animation timing.
///
/// Easing functions map linear time progress (0.0 to 1.0) to value
/// progress. Every function returns exactly 0 at `t = 0` and exactly 1 at
/// `t = 1`; overshooting curves may leave the unit range in between.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    #[default]
    Linear,

    /// CSS `ease`, `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,
    /// CSS `ease-in`, `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// CSS `ease-out`, `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// CSS `ease-in-out`, `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Named preset such as `easeOutBounce`.
    Preset { family: EasingFamily, mode: EasingMode },

    /// Custom cubic bezier curve. x values are clamped to [0, 1] when
    /// evaluated; y values are free.
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },

    /// Damped harmonic oscillator released from rest displacement 1.
    Spring {
        stiffness: f64,
        mass: f64,
        damping: f64,
        velocity: f64,
    },
}

impl EasingFunction {
    pub const SPRING_DEFAULTS: [f64; 4] = [1.0, 80.0, 10.0, 0.0];

    /// Evaluate the easing function at the given time progress.
    ///
    /// # Arguments
    /// * `t` - Progress value, clamped to 0.0..=1.0
    pub fn evaluate(&self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::Preset { family, mode } => match mode {
                EasingMode::In => family.ease_in(t),
                EasingMode::Out => 1.0 - family.ease_in(1.0 - t),
                EasingMode::InOut => {
                    if t < 0.5 {
                        family.ease_in(2.0 * t) / 2.0
                    } else {
                        1.0 - family.ease_in(2.0 - 2.0 * t) / 2.0
                    }
                }
            },
            Self::CubicBezier { x1, y1, x2, y2 } => {
                cubic_bezier(x1.clamp(0.0, 1.0), y1, x2.clamp(0.0, 1.0), y2, t)
            }
            Self::Spring {
                stiffness,
                mass,
                damping,
                velocity,
            } => match SpringCurve::new(stiffness, mass, damping, velocity) {
                Some(curve) => curve.progress(t),
                None => t,
            },
        }
    }

    pub fn preset(family: EasingFamily, mode: EasingMode) -> Self {
        Self::Preset { family, mode }
    }

    /// Custom cubic bezier curve; x values are clamped into [0, 1].
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::CubicBezier {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// Spring oscillator, validated.
    pub fn spring(stiffness: f64, mass: f64, damping: f64, velocity: f64) -> Result<Self> {
        for (name, value) in [("stiffness", stiffness), ("mass", mass), ("damping", damping)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MotionError::InvalidParameter { name, value });
            }
        }
        if !velocity.is_finite() {
            return Err(MotionError::InvalidParameter {
                name: "velocity",
                value: velocity,
            });
        }
        Ok(Self::Spring {
            stiffness,
            mass,
            damping,
            velocity,
        })
    }

    /// Strictly parse an easing descriptor.
    ///
    /// Accepts preset names (`easeInOutQuad`), CSS keywords, and the
    /// parametrized forms `spring(...)` and `cubicBezier(...)` /
    /// `cubic-bezier(...)`. Missing spring parameters take their defaults.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let s = descriptor.trim();

        if let Some(open) = s.find('(') {
            let name = s[..open].trim();
            let inner = s[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| malformed(s, "missing closing parenthesis"))?;
            let args = parse_args(s, inner)?;

            return match name {
                "spring" => {
                    if args.len() > 4 {
                        return Err(malformed(s, "spring takes at most four parameters"));
                    }
                    let mut params = Self::SPRING_DEFAULTS;
                    for (slot, arg) in params.iter_mut().zip(&args) {
                        if let Some(value) = arg {
                            *slot = *value;
                        }
                    }
                    Self::spring(params[0], params[1], params[2], params[3])
                }
                "cubicBezier" | "cubic-bezier" => {
                    let points: Vec<f64> = args.iter().flatten().copied().collect();
                    let &[x1, y1, x2, y2] = points.as_slice() else {
                        return Err(malformed(s, "cubic bezier needs exactly four numbers"));
                    };
                    if args.len() != 4 {
                        return Err(malformed(s, "cubic bezier needs exactly four numbers"));
                    }
                    for (name, value) in [("x1", x1), ("x2", x2)] {
                        if !(0.0..=1.0).contains(&value) {
                            return Err(MotionError::InvalidParameter { name, value });
                        }
                    }
                    Ok(Self::CubicBezier { x1, y1, x2, y2 })
                }
                _ => Err(MotionError::UnknownEasing(name.to_string())),
            };
        }

        let keyword = match s {
            "linear" => Some(Self::Linear),
            "ease" => Some(Self::Ease),
            "ease-in" => Some(Self::EaseIn),
            "ease-out" => Some(Self::EaseOut),
            "ease-in-out" => Some(Self::EaseInOut),
            _ => None,
        };
        if let Some(easing) = keyword {
            return Ok(easing);
        }

        let (mode, family) = if let Some(rest) = s.strip_prefix("easeInOut") {
            (EasingMode::InOut, rest)
        } else if let Some(rest) = s.strip_prefix("easeIn") {
            (EasingMode::In, rest)
        } else if let Some(rest) = s.strip_prefix("easeOut") {
            (EasingMode::Out, rest)
        } else {
            return Err(MotionError::UnknownEasing(s.to_string()));
        };

        EasingFamily::from_name(family)
            .map(|family| Self::Preset { family, mode })
            .ok_or_else(|| MotionError::UnknownEasing(s.to_string()))
    }

    /// Parse a descriptor, falling back to [`EasingFunction::Linear`] when it
    /// cannot be resolved.
    pub fn resolve(descriptor: &str) -> Self {
        Self::parse(descriptor).unwrap_or_else(|err| {
            log::warn!("{err}; falling back to linear easing");
            Self::Linear
        })
    }
}

impl FromStr for EasingFunction {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::Preset { family, mode } => write!(f, "{}{}", mode.prefix(), family.name()),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubicBezier({x1}, {y1}, {x2}, {y2})")
            }
            Self::Spring {
                stiffness,
                mass,
                damping,
                velocity,
            } => write!(f, "spring({stiffness}, {mass}, {damping}, {velocity})"),
        }
    }
}

fn malformed(descriptor: &str, reason: &str) -> MotionError {
    MotionError::MalformedEasing {
        descriptor: descriptor.to_string(),
        reason: reason.to_string(),
    }
}

/// Comma-separated numbers; blank slots are `None`.
fn parse_args(descriptor: &str, inner: &str) -> Result<Vec<Option<f64>>> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(str::trim)
        .map(|arg| {
            if arg.is_empty() {
                Ok(None)
            } else {
                arg.parse::<f64>()
                    .map(Some)
                    .map_err(|_| malformed(descriptor, &format!("`{arg}` is not a number")))
            }
        })
        .collect()
}

/// Analytic damped oscillator, displacement `x(τ)` from 1 towards 0.
struct SpringCurve {
    omega: f64,
    zeta: f64,
    /// Initial displacement velocity; a positive spring velocity moves
    /// towards the target, so this is its negation.
    v0: f64,
    settle: f64,
}

impl SpringCurve {
    /// Displacement below which the spring counts as settled.
    const SETTLE_THRESHOLD: f64 = 1e-4;

    fn new(stiffness: f64, mass: f64, damping: f64, velocity: f64) -> Option<Self> {
        if !(stiffness > 0.0 && mass > 0.0 && damping > 0.0 && velocity.is_finite()) {
            return None;
        }
        let omega = (stiffness / mass).sqrt();
        let zeta = damping / (2.0 * (stiffness * mass).sqrt());
        let decay = if zeta < 1.0 {
            zeta * omega
        } else {
            omega * (zeta - (zeta * zeta - 1.0).sqrt())
        };
        if !(decay.is_finite() && decay > 0.0) {
            return None;
        }

        let mut curve = Self {
            omega,
            zeta,
            v0: -velocity,
            settle: -Self::SETTLE_THRESHOLD.ln() / decay,
        };
        // The envelope ignores the polynomial factor of (near-)critical
        // damping; stretch the window until the displacement is small.
        for _ in 0..16 {
            if curve.displacement(curve.settle).abs() < Self::SETTLE_THRESHOLD {
                break;
            }
            curve.settle *= 1.25;
        }
        Some(curve)
    }

    fn is_critical(&self) -> bool {
        (self.zeta - 1.0).abs() < 1e-6
    }

    fn displacement(&self, tau: f64) -> f64 {
        let (w0, zeta, v0) = (self.omega, self.zeta, self.v0);
        if self.is_critical() {
            (-w0 * tau).exp() * (1.0 + (w0 + v0) * tau)
        } else if zeta < 1.0 {
            let wd = w0 * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * w0 * tau).exp();
            envelope * ((wd * tau).cos() + (zeta * w0 + v0) / wd * (wd * tau).sin())
        } else {
            let s = w0 * (zeta * zeta - 1.0).sqrt();
            let r1 = -zeta * w0 + s;
            let r2 = -zeta * w0 - s;
            let c2 = (v0 - r1) / (r2 - r1);
            let c1 = 1.0 - c2;
            c1 * (r1 * tau).exp() + c2 * (r2 * tau).exp()
        }
    }

    fn progress(&self, t: f64) -> f64 {
        1.0 - self.displacement(t * self.settle)
    }
}

/// Evaluate a cubic bezier curve at time progress `progress`.
///
/// Newton-Raphson finds the curve parameter whose x matches the input, with
/// bisection as a fallback when the derivative flattens out; the y
/// coordinate at that parameter is the result.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }
    let t = solve_bezier_x(x1, x2, progress);
    bezier_axis(y1, y2, t)
}

fn solve_bezier_x(x1: f64, x2: f64, target_x: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let mut t = target_x;
    for _ in 0..8 {
        let x = bezier_axis(x1, x2, t) - target_x;
        if x.abs() < EPSILON {
            return t;
        }
        let dx = bezier_x_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    // x(t) is monotonic for x control points in [0, 1].
    let (mut lo, mut hi) = (0.0, 1.0);
    t = target_x;
    for _ in 0..64 {
        let x = bezier_axis(x1, x2, t);
        if (x - target_x).abs() < EPSILON {
            break;
        }
        if x < target_x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    t
}

/// One coordinate of the curve: 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_axis(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

/// dx/dt = 3(1-t)²·x1 + 6(1-t)t·(x2-x1) + 3t²·(1-x2)
#[inline]
fn bezier_x_derivative(x1: f64, x2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}
