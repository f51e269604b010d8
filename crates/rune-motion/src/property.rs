//! Property resolution: shorthand aliases, classification and unit
//! inference.
//!
//! Every key a caller supplies is resolved once into a [`PropertyClass`];
//! writers and tweens dispatch on the class rather than re-inspecting the
//! name.

use crate::value::{StyleValue, format_number, parse_css_color, split_number_unit};

/// Transform functions composed into the `transform` property.
pub const TRANSFORM_FUNCTIONS: &[&str] = &[
    "translateX",
    "translateY",
    "translateZ",
    "scaleX",
    "scaleY",
    "scaleZ",
    "scale",
    "rotateX",
    "rotateY",
    "rotateZ",
    "rotate",
    "skewX",
    "skewY",
    "skew",
    "perspective",
    "translate",
    "translate3d",
    "scale3d",
    "rotate3d",
    "matrix",
    "matrix3d",
];

/// Filter functions composed into the `filter` property.
pub const FILTER_FUNCTIONS: &[&str] = &[
    "blur",
    "brightness",
    "contrast",
    "grayscale",
    "hue-rotate",
    "invert",
    "saturate",
    "sepia",
    "drop-shadow",
];

const UNITLESS: &[&str] = &["opacity", "z-index", "flex-grow", "flex-shrink", "line-height"];

const KEYWORDS: &[&str] = &["none", "auto", "inherit", "initial", "unset", "normal", "bold"];

/// Functions whose neutral argument is 1 rather than 0.
const UNIT_NEUTRAL: &[&str] = &["scale", "scaleX", "scaleY", "scaleZ", "brightness", "contrast", "saturate"];

enum Alias {
    One(&'static str),
    Many(&'static [&'static str]),
}

fn alias(key: &str) -> Option<Alias> {
    use Alias::{Many, One};
    let alias = match key {
        "x" | "tx" => One("translateX"),
        "y" | "ty" => One("translateY"),
        "tz" => One("translateZ"),
        "sx" => One("scaleX"),
        "sy" => One("scaleY"),
        "rx" => One("rotateX"),
        "ry" => One("rotateY"),
        "hueRotate" => One("hue-rotate"),
        "dropShadow" => One("drop-shadow"),

        "w" => One("width"),
        "h" => One("height"),
        "l" => One("left"),
        "r" => One("right"),
        "t" => One("top"),
        "b" => One("bottom"),

        "m" => One("margin"),
        "mt" => One("marginTop"),
        "mb" => One("marginBottom"),
        "ml" => One("marginLeft"),
        "mr" => One("marginRight"),
        "mx" => Many(&["marginLeft", "marginRight"]),
        "my" => Many(&["marginTop", "marginBottom"]),
        "p" => One("padding"),
        "pt" => One("paddingTop"),
        "pb" => One("paddingBottom"),
        "pl" => One("paddingLeft"),
        "pr" => One("paddingRight"),
        "px" => Many(&["paddingLeft", "paddingRight"]),
        "py" => Many(&["paddingTop", "paddingBottom"]),

        "fs" => One("fontSize"),
        "fw" => One("fontWeight"),
        "lh" => One("lineHeight"),
        "ta" => One("textAlign"),
        "td" => One("textDecoration"),
        "tt" => One("textTransform"),
        "ls" => One("letterSpacing"),

        "d" => One("display"),
        "jc" => One("justifyContent"),
        "ai" => One("alignItems"),
        "fd" => One("flexDirection"),
        "fwf" => One("flexWrap"),
        "g" => One("gap"),
        "gg" => One("gridGap"),
        "gr" => One("gridRow"),
        "gc" => One("gridColumn"),

        "br" => One("borderRadius"),
        "bw" => One("borderWidth"),
        "bs" => One("boxShadow"),
        "bt" => One("borderTop"),
        "bb" => One("borderBottom"),
        "bl" => One("borderLeft"),
        "brd" => One("borderRight"),

        "bg" => One("background"),
        "bc" => One("borderColor"),
        "c" => One("color"),
        "o" => One("opacity"),
        "vis" => One("visibility"),
        "cp" => One("clipPath"),
        "msk" => One("maskImage"),

        "z" => One("zIndex"),
        "pointer" | "pe" => One("pointerEvents"),
        "cur" => One("cursor"),
        _ => return None,
    };
    Some(alias)
}

/// Which composite property a function belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Transform,
    Filter,
}

impl CompositeKind {
    /// Name of the composite property on the node.
    pub fn property_name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Filter => "filter",
        }
    }

    /// Unit appended to a numeric argument of `function`.
    pub fn default_unit(self, function: &str) -> &'static str {
        match self {
            Self::Transform => match function {
                "translate3d" | "rotate3d" => "",
                "perspective" => "px",
                f if f.starts_with("translate") => "px",
                f if f.starts_with("rotate") || f.starts_with("skew") => "deg",
                _ => "",
            },
            Self::Filter => match function {
                "blur" => "px",
                "grayscale" | "invert" => "%",
                "hue-rotate" => "deg",
                _ => "",
            },
        }
    }
}

/// Resolved classification of a property key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyClass {
    /// Plain style property, kebab-case.
    Direct(String),
    /// Function inside the `transform` property.
    TransformFn(String),
    /// Function inside the `filter` property.
    FilterFn(String),
    /// Several direct properties receiving the same value.
    FanOut(Vec<String>),
}

/// Where a single resolved value is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTarget {
    pub name: String,
    pub composite: Option<CompositeKind>,
}

impl PropertyTarget {
    pub fn direct(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            composite: None,
        }
    }

    /// Neutral value for a missing function argument.
    pub fn neutral_value(&self) -> f64 {
        if self.composite.is_some() && UNIT_NEUTRAL.contains(&self.name.as_str()) {
            1.0
        } else {
            0.0
        }
    }
}

impl PropertyClass {
    /// Expand into the individual write targets.
    pub fn targets(&self) -> Vec<PropertyTarget> {
        match self {
            Self::Direct(name) => vec![PropertyTarget::direct(name.clone())],
            Self::TransformFn(name) => vec![PropertyTarget {
                name: name.clone(),
                composite: Some(CompositeKind::Transform),
            }],
            Self::FilterFn(name) => vec![PropertyTarget {
                name: name.clone(),
                composite: Some(CompositeKind::Filter),
            }],
            Self::FanOut(names) => names.iter().cloned().map(PropertyTarget::direct).collect(),
        }
    }
}

/// Resolve a caller-supplied key.
pub fn resolve(key: &str) -> PropertyClass {
    let canonical = match alias(key) {
        Some(Alias::Many(names)) => {
            return PropertyClass::FanOut(names.iter().map(|n| to_kebab_case(n)).collect());
        }
        Some(Alias::One(name)) => name,
        None => key,
    };

    if TRANSFORM_FUNCTIONS.contains(&canonical) {
        PropertyClass::TransformFn(canonical.to_string())
    } else if FILTER_FUNCTIONS.contains(&canonical) {
        PropertyClass::FilterFn(canonical.to_string())
    } else {
        PropertyClass::Direct(to_kebab_case(canonical))
    }
}

/// `marginLeft` becomes `margin-left`; custom properties and names that are
/// already kebab-case are returned unchanged.
pub fn to_kebab_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn is_unitless(name: &str) -> bool {
    UNITLESS.contains(&name)
}

pub fn is_keyword(value: &str) -> bool {
    KEYWORDS.contains(&value.trim())
}

/// Whether a string already carries a unit, a percentage or a CSS function
/// that produces a length.
pub fn carries_unit(value: &str) -> bool {
    let v = value.trim();
    v.contains('%')
        || v.contains("calc(")
        || v.contains("var(")
        || ["px", "em", "rem", "vh", "vw"]
            .iter()
            .any(|unit| v.ends_with(unit))
}

/// Render a direct property value as a style string.
///
/// Text that carries a unit or is a keyword passes through unchanged, as
/// does any text that is not a bare number. Numbers, and text holding only a
/// number, get `px` unless the property is unitless or custom.
pub fn apply_unit(name: &str, value: &StyleValue) -> String {
    let takes_px = !(is_unitless(name) || name.starts_with("--"));
    match value {
        StyleValue::Unset => String::new(),
        StyleValue::Number(n) if takes_px => format!("{}px", format_number(*n)),
        StyleValue::Number(n) => format_number(*n),
        StyleValue::Text(text) if is_keyword(text) || carries_unit(text) => text.clone(),
        StyleValue::Text(text) => match split_number_unit(text) {
            Some((n, "")) if takes_px => format!("{}px", format_number(n)),
            _ => text.clone(),
        },
    }
}

/// Final text written for a direct property: unit inference plus the
/// `background` and `pointer-events` conveniences.
///
/// A `background` that is not a colour, keyword or CSS function is treated
/// as an image path and covers the element. `pointer-events` accepts
/// booleans (`true` is `auto`, `false` is `none`).
pub fn direct_text(name: &str, value: &StyleValue) -> String {
    match (name, value) {
        ("background", StyleValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty()
                || is_keyword(text)
                || text.contains('(')
                || parse_css_color(text).is_some()
            {
                text.to_string()
            } else {
                format!("url({text}) center/cover no-repeat")
            }
        }
        ("pointer-events", StyleValue::Text(text)) => match text.trim() {
            "true" => "auto".to_string(),
            "false" => "none".to_string(),
            other => other.to_string(),
        },
        _ => apply_unit(name, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_shorthands() {
        assert_eq!(resolve("x"), PropertyClass::TransformFn("translateX".into()));
        assert_eq!(resolve("ty"), PropertyClass::TransformFn("translateY".into()));
        assert_eq!(resolve("rotate"), PropertyClass::TransformFn("rotate".into()));
        assert_eq!(resolve("scale"), PropertyClass::TransformFn("scale".into()));
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(resolve("hueRotate"), PropertyClass::FilterFn("hue-rotate".into()));
        assert_eq!(resolve("dropShadow"), PropertyClass::FilterFn("drop-shadow".into()));
        assert_eq!(resolve("blur"), PropertyClass::FilterFn("blur".into()));
    }

    #[test]
    fn test_direct_properties_are_kebab_case() {
        assert_eq!(resolve("o"), PropertyClass::Direct("opacity".into()));
        assert_eq!(resolve("ml"), PropertyClass::Direct("margin-left".into()));
        assert_eq!(resolve("backgroundColor"), PropertyClass::Direct("background-color".into()));
        assert_eq!(resolve("z"), PropertyClass::Direct("z-index".into()));
        assert_eq!(resolve("--accent"), PropertyClass::Direct("--accent".into()));
        assert_eq!(resolve("unknown-thing"), PropertyClass::Direct("unknown-thing".into()));
    }

    #[test]
    fn test_fan_out() {
        let class = resolve("mx");
        assert_eq!(
            class,
            PropertyClass::FanOut(vec!["margin-left".into(), "margin-right".into()])
        );
        let targets = class.targets();
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.composite.is_none()));
    }

    #[test]
    fn test_default_units() {
        let t = CompositeKind::Transform;
        assert_eq!(t.default_unit("translateX"), "px");
        assert_eq!(t.default_unit("perspective"), "px");
        assert_eq!(t.default_unit("rotate"), "deg");
        assert_eq!(t.default_unit("skewY"), "deg");
        assert_eq!(t.default_unit("scale"), "");
        assert_eq!(t.default_unit("matrix"), "");
        assert_eq!(t.default_unit("translate3d"), "");

        let f = CompositeKind::Filter;
        assert_eq!(f.default_unit("blur"), "px");
        assert_eq!(f.default_unit("grayscale"), "%");
        assert_eq!(f.default_unit("hue-rotate"), "deg");
        assert_eq!(f.default_unit("brightness"), "");
    }

    #[test]
    fn test_neutral_values() {
        let scale = resolve("sx").targets().remove(0);
        assert_eq!(scale.neutral_value(), 1.0);
        let brightness = resolve("brightness").targets().remove(0);
        assert_eq!(brightness.neutral_value(), 1.0);
        let x = resolve("x").targets().remove(0);
        assert_eq!(x.neutral_value(), 0.0);
    }

    #[test]
    fn test_unit_inference() {
        assert_eq!(apply_unit("width", &StyleValue::Number(10.0)), "10px");
        assert_eq!(apply_unit("opacity", &StyleValue::Number(0.5)), "0.5");
        assert_eq!(apply_unit("z-index", &StyleValue::Number(3.0)), "3");
        assert_eq!(apply_unit("width", &"50%".into()), "50%");
        assert_eq!(apply_unit("width", &"auto".into()), "auto");
        assert_eq!(apply_unit("--gap", &StyleValue::Number(4.0)), "4");
        assert_eq!(apply_unit("width", &"12".into()), "12px");
        assert_eq!(apply_unit("opacity", &"0.25".into()), "0.25");
        assert_eq!(apply_unit("margin", &"1.5rem".into()), "1.5rem");
        assert_eq!(apply_unit("font-weight", &"bold".into()), "bold");
        assert_eq!(apply_unit("color", &"#ff0000".into()), "#ff0000");
    }

    #[test]
    fn test_background_and_pointer_conveniences() {
        assert_eq!(
            direct_text("background", &"img/hero.png".into()),
            "url(img/hero.png) center/cover no-repeat"
        );
        assert_eq!(direct_text("background", &"#38bdf8".into()), "#38bdf8");
        assert_eq!(
            direct_text("background", &"linear-gradient(red, blue)".into()),
            "linear-gradient(red, blue)"
        );
        assert_eq!(direct_text("pointer-events", &"false".into()), "none");
        assert_eq!(direct_text("pointer-events", &"true".into()), "auto");
        assert_eq!(direct_text("pointer-events", &"visible".into()), "visible");
        assert_eq!(direct_text("width", &StyleValue::Number(3.0)), "3px");
    }

    #[test]
    fn test_unit_detection() {
        assert!(carries_unit("10px"));
        assert!(carries_unit("1.5rem"));
        assert!(carries_unit("calc(100% - 4px)"));
        assert!(!carries_unit("10"));
        assert!(is_keyword("auto"));
        assert!(!is_keyword("bolder"));
    }
}
