//! Value model: caller-facing property values, animated values and the
//! interpolation between them.
//!
//! Numbers interpolate linearly, colours channel-wise in sRGB space (alpha
//! included), and anything else is held at its start value until the end of
//! the timeline and then written verbatim.

use palette::Srgba;
use serde::{Deserialize, Serialize};

/// RGBA colour with channels in `0.0..=1.0`.
pub type Rgba = Srgba<f32>;

/// A property value as supplied by callers.
///
/// `Unset` removes an entry from a composite property (`transform`,
/// `filter`) and clears a direct property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Bare number; a unit is inferred when written.
    Number(f64),
    /// Text such as `"10px"`, `"+=5"`, `"#f00"` or `"auto"`.
    Text(String),
    /// Explicit absence.
    Unset,
}

impl StyleValue {
    /// Parse a JSON value. Booleans are stringified, objects and arrays
    /// are not representable and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Unset),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Empty text and `Unset` both mean "remove".
    pub fn is_removal(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Into::into)
    }
}

/// A value being animated.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimatedValue {
    Number(f64),
    Color(Rgba),
    /// Non-interpolable; switched to at the end of the timeline.
    Verbatim(String),
}

impl AnimatedValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Whether values strictly between the endpoints are meaningful.
    pub fn is_continuous_with(&self, to: &Self) -> bool {
        matches!(
            (self, to),
            (Self::Number(_), Self::Number(_)) | (Self::Color(_), Self::Color(_))
        )
    }
}

/// Trait for values that can be blended towards a target.
///
/// # Arguments
/// * `to` - Target value
/// * `t` - Blend factor (0.0 = self, 1.0 = to). Factors outside the unit
///   range extrapolate, which is what overshooting easings rely on.
pub trait Interpolate: Sized {
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[inline]
fn lerp_f32(from: f32, to: f32, t: f64) -> f32 {
    from + (to - from) * t as f32
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp(*self, *to, t)
    }
}

impl Interpolate for Rgba {
    /// Channel-wise blend; the result is clamped so overshoot cannot
    /// produce an out-of-gamut colour.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Srgba::new(
            lerp_f32(self.red, to.red, t).clamp(0.0, 1.0),
            lerp_f32(self.green, to.green, t).clamp(0.0, 1.0),
            lerp_f32(self.blue, to.blue, t).clamp(0.0, 1.0),
            lerp_f32(self.alpha, to.alpha, t).clamp(0.0, 1.0),
        )
    }
}

impl Interpolate for AnimatedValue {
    /// Mismatched variants step: the start value holds until `t >= 1`.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a.interpolate(b, t)),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.interpolate(b, t)),
            _ if t >= 1.0 => to.clone(),
            _ => self.clone(),
        }
    }
}

/// Fully transparent black, the start colour when a node has none.
pub fn transparent() -> Rgba {
    Srgba::new(0.0, 0.0, 0.0, 0.0)
}

/// Parse any CSS colour string.
///
/// Bare hex digits without `#` are rejected so that numeric strings such
/// as `"100"` are never mistaken for colours.
pub fn parse_css_color(input: &str) -> Option<Rgba> {
    let s = input.trim();
    if s.is_empty() || s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let color = csscolorparser::parse(s).ok()?;
    Some(Srgba::new(
        color.r as f32,
        color.g as f32,
        color.b as f32,
        color.a as f32,
    ))
}

/// Serialize a colour as `rgba(r, g, b, a)` with 8-bit channels.
pub fn format_color(color: &Rgba) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color.red),
        channel(color.green),
        channel(color.blue),
        format_number(color.alpha.clamp(0.0, 1.0) as f64)
    )
}

/// Format a number for a style string: at most four decimals, no trailing
/// zeros and never `-0`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{rounded}")
}

/// Split a string into its leading number and the trimmed remainder.
///
/// Leading whitespace is skipped; the number accepts an optional sign,
/// a decimal point and an exponent. `"10px"` yields `(10.0, "px")`,
/// `"auto"` yields `None`.
pub fn split_number_unit(input: &str) -> Option<(f64, &str)> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let is_digit = |i: usize| i < len && bytes[i].is_ascii_digit();

    let mut end = 0;
    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut mantissa = end - int_start;

    if end < len && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while is_digit(frac_end) {
            frac_end += 1;
        }
        let fraction = frac_end - end - 1;
        if mantissa > 0 || fraction > 0 {
            mantissa += fraction;
            end = frac_end;
        }
    }
    if mantissa == 0 {
        return None;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while is_digit(exp_end) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    let value = s[..end].parse::<f64>().ok()?;
    Some((value, s[end..].trim()))
}

/// Leading number of a string, ignoring whatever follows it.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    split_number_unit(input).map(|(value, _)| value)
}

/// Signed delta of a relative value: `"+=5"` is `5`, `"-=3"` is `-3`.
pub fn parse_relative(input: &str) -> Option<f64> {
    let s = input.trim();
    if let Some(rest) = s.strip_prefix("+=") {
        parse_leading_float(rest)
    } else if let Some(rest) = s.strip_prefix("-=") {
        parse_leading_float(rest).map(|v| -v)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 0.0001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_eq_f32(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn test_number_interpolation() {
        let from = 0.0_f64;
        let to = 100.0_f64;
        assert!(approx_eq(from.interpolate(&to, 0.0), 0.0));
        assert!(approx_eq(from.interpolate(&to, 0.25), 25.0));
        assert!(approx_eq(from.interpolate(&to, 1.0), 100.0));
        // Overshoot extrapolates.
        assert!(approx_eq(from.interpolate(&to, 1.1), 110.0));
    }

    #[test]
    fn test_color_interpolation() {
        let red: Rgba = Srgba::new(1.0, 0.0, 0.0, 1.0);
        let blue: Rgba = Srgba::new(0.0, 0.0, 1.0, 0.0);
        let mid = red.interpolate(&blue, 0.5);
        assert!(approx_eq_f32(mid.red, 0.5));
        assert!(approx_eq_f32(mid.green, 0.0));
        assert!(approx_eq_f32(mid.blue, 0.5));
        assert!(approx_eq_f32(mid.alpha, 0.5));
    }

    #[test]
    fn test_verbatim_steps_at_end() {
        let from = AnimatedValue::Number(0.0);
        let to = AnimatedValue::Verbatim("auto".to_string());
        assert_eq!(from.interpolate(&to, 0.99), from);
        assert_eq!(from.interpolate(&to, 1.0), to);
        assert!(!from.is_continuous_with(&to));
    }

    #[test]
    fn test_split_number_unit() {
        assert_eq!(split_number_unit("10px"), Some((10.0, "px")));
        assert_eq!(split_number_unit("  -2.5em"), Some((-2.5, "em")));
        assert_eq!(split_number_unit(".5"), Some((0.5, "")));
        assert_eq!(split_number_unit("1e3ms"), Some((1000.0, "ms")));
        assert_eq!(split_number_unit("45deg"), Some((45.0, "deg")));
        assert_eq!(split_number_unit("50%"), Some((50.0, "%")));
        assert_eq!(split_number_unit("auto"), None);
        assert_eq!(split_number_unit("-"), None);
        assert_eq!(split_number_unit("."), None);
    }

    #[test]
    fn test_parse_relative() {
        assert_eq!(parse_relative("+=5"), Some(5.0));
        assert_eq!(parse_relative("-=3"), Some(-3.0));
        assert_eq!(parse_relative(" +=2.5px"), Some(2.5));
        assert_eq!(parse_relative("5"), None);
        assert_eq!(parse_relative("+=abc"), None);
    }

    #[test]
    fn test_parse_css_color() {
        let red = parse_css_color("#ff0000").unwrap();
        assert!(approx_eq_f32(red.red, 1.0));
        assert!(approx_eq_f32(red.alpha, 1.0));

        let half = parse_css_color("rgba(0, 0, 255, 0.5)").unwrap();
        assert!(approx_eq_f32(half.blue, 1.0));
        assert!(approx_eq_f32(half.alpha, 0.5));

        assert!(parse_css_color("transparent").is_some());
        assert!(parse_css_color("100").is_none());
        assert!(parse_css_color("10px").is_none());
        assert!(parse_css_color("").is_none());
    }

    #[test]
    fn test_format_color() {
        let c: Rgba = Srgba::new(1.0, 0.5, 0.0, 0.25);
        assert_eq!(format_color(&c), "rgba(255, 128, 0, 0.25)");
        assert_eq!(format_color(&transparent()), "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_number(-12.345678), "-12.3457");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_style_value_from_json() {
        use serde_json::json;
        assert_eq!(StyleValue::from_json(&json!(1.5)), Some(StyleValue::Number(1.5)));
        assert_eq!(
            StyleValue::from_json(&json!("+=5")),
            Some(StyleValue::Text("+=5".to_string()))
        );
        assert_eq!(StyleValue::from_json(&json!(null)), Some(StyleValue::Unset));
        assert_eq!(StyleValue::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn test_removal_values() {
        assert!(StyleValue::Unset.is_removal());
        assert!(StyleValue::from("").is_removal());
        assert!(!StyleValue::from(0.0).is_removal());
        assert_eq!(StyleValue::from(None::<f64>), StyleValue::Unset);
    }
}
