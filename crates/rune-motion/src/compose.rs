//! Composition of multi-function properties (`transform`, `filter`).
//!
//! A composite string such as `translateX(10px) rotate(45deg)` is parsed into
//! an ordered map of function name to argument string. Updates overwrite or
//! remove individual entries; everything else keeps its previous argument
//! text, so several animations can drive different functions of the same
//! property without clobbering each other.

use indexmap::IndexMap;

use crate::property::{CompositeKind, PropertyTarget, direct_text};
use crate::surface::NodeHandle;
use crate::value::{StyleValue, format_number, split_number_unit};

/// Ordered set of `name(args)` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionList {
    /// `None` marks a bare token that is not a function call; it is kept
    /// verbatim.
    entries: IndexMap<String, Option<String>>,
}

impl FunctionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a composite string. `none` and the empty string are empty
    /// lists. Nested parentheses inside arguments are allowed.
    pub fn parse(input: &str) -> Self {
        let mut entries = IndexMap::new();
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "none" {
            return Self { entries };
        }

        let mut rest = trimmed;
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let name_end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(rest.len());
            let after = &rest[name_end..];

            if name_end > 0 && after.starts_with('(') {
                match matching_paren(after) {
                    Some(close) => {
                        entries.insert(
                            rest[..name_end].to_string(),
                            Some(after[1..close].trim().to_string()),
                        );
                        rest = &after[close + 1..];
                    }
                    None => {
                        entries.insert(rest.to_string(), None);
                        break;
                    }
                }
            } else {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                entries.insert(rest[..end].to_string(), None);
                rest = &rest[end..];
            }
        }

        Self { entries }
    }

    /// Argument string of a function, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|args| args.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert or overwrite; an existing entry keeps its position.
    pub fn set(&mut self, name: impl Into<String>, args: impl Into<String>) {
        self.entries.insert(name.into(), Some(args.into()));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.shift_remove(name).is_some()
    }

    /// Apply a partial update. Removal values delete the entry, anything
    /// else is formatted with the function's default unit.
    pub fn apply(&mut self, kind: CompositeKind, updates: &[(String, StyleValue)]) {
        for (name, value) in updates {
            if value.is_removal() {
                self.remove(name);
            } else {
                let args = format_argument(value, kind.default_unit(name));
                self.set(name.clone(), args);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FunctionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, args)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match args {
                Some(args) => write!(f, "{name}({args})")?,
                None => f.write_str(name)?,
            }
        }
        Ok(())
    }
}

fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Format one argument. Numbers, and text that is nothing but a number,
/// receive `unit`; other text is used as-is.
fn format_argument(value: &StyleValue, unit: &str) -> String {
    match value {
        StyleValue::Number(n) => format!("{}{unit}", format_number(*n)),
        StyleValue::Text(text) => match split_number_unit(text) {
            Some((n, "")) => format!("{}{unit}", format_number(n)),
            _ => text.trim().to_string(),
        },
        StyleValue::Unset => String::new(),
    }
}

/// Compose `updates` onto the current composite string.
pub fn compose(kind: CompositeKind, current: &str, updates: &[(String, StyleValue)]) -> String {
    let mut list = FunctionList::parse(current);
    list.apply(kind, updates);
    list.to_string()
}

/// Join several arguments for multi-argument functions such as
/// `translate(10px, 20px)`. Unset values are skipped.
pub fn compose_args(values: &[StyleValue], unit: &str) -> String {
    values
        .iter()
        .filter(|v| !matches!(v, StyleValue::Unset))
        .map(|v| format_argument(v, unit))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A set of property writes committed to a node in one batch.
///
/// Direct values are unit-inferred when pushed; composite function updates
/// are merged into the node's current `transform`/`filter` strings at commit
/// time.
#[derive(Debug, Default)]
pub struct StyleBatch {
    direct: Vec<(String, String)>,
    transform: Vec<(String, StyleValue)>,
    filter: Vec<(String, StyleValue)>,
}

impl StyleBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: &PropertyTarget, value: StyleValue) {
        match target.composite {
            None => {
                let text = direct_text(&target.name, &value);
                self.direct.push((target.name.clone(), text));
            }
            Some(CompositeKind::Transform) => self.transform.push((target.name.clone(), value)),
            Some(CompositeKind::Filter) => self.filter.push((target.name.clone(), value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.transform.is_empty() && self.filter.is_empty()
    }

    /// Resolve composites against the node and write everything at once.
    ///
    /// A whole `transform`/`filter` string written directly is appended to
    /// the node's current one (a later function of the same name replaces
    /// the earlier one); `none` or an empty value resets it. Function
    /// updates in the same batch are then composed on top, and each
    /// composite property is written once.
    pub fn commit(self, node: &NodeHandle) {
        let Self {
            mut direct,
            transform,
            filter,
        } = self;

        for (kind, updates) in [
            (CompositeKind::Transform, transform),
            (CompositeKind::Filter, filter),
        ] {
            let name = kind.property_name();
            let mut written = None;
            direct.retain(|(property, value)| {
                if property == name {
                    written = Some(value.clone());
                    false
                } else {
                    true
                }
            });
            if updates.is_empty() && written.is_none() {
                continue;
            }

            let current = node.borrow().get_property(name).unwrap_or_default();
            let base = match written {
                None => current,
                Some(text) if is_reset(&text) => {
                    if updates.is_empty() {
                        direct.push((name.to_string(), text));
                        continue;
                    }
                    String::new()
                }
                Some(text) if is_reset(&current) => text,
                Some(text) => format!("{} {}", current.trim(), text.trim()),
            };
            direct.push((name.to_string(), compose(kind, &base, &updates)));
        }

        if direct.is_empty() {
            return;
        }
        log::trace!("writing {} style value(s)", direct.len());
        node.borrow_mut().set_properties(&direct);
    }
}

fn is_reset(composite: &str) -> bool {
    let trimmed = composite.trim();
    trimmed.is_empty() || trimmed == "none"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(name: &str, value: impl Into<StyleValue>) -> (String, StyleValue) {
        (name.to_string(), value.into())
    }

    #[test]
    fn test_parse_ordered_entries() {
        let list = FunctionList::parse("translateX(10px) rotate(45deg)  scale(1.5)");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get("translateX"), Some("10px"));
        assert_eq!(list.get("rotate"), Some("45deg"));
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["translateX", "rotate", "scale"]);
    }

    #[test]
    fn test_parse_nested_arguments() {
        let list = FunctionList::parse("drop-shadow(0 0 2px rgba(0, 0, 0, 0.5)) blur(3px)");
        assert_eq!(list.get("drop-shadow"), Some("0 0 2px rgba(0, 0, 0, 0.5)"));
        assert_eq!(list.get("blur"), Some("3px"));
    }

    #[test]
    fn test_parse_none_and_empty() {
        assert!(FunctionList::parse("none").is_empty());
        assert!(FunctionList::parse("   ").is_empty());
    }

    #[test]
    fn test_compose_preserves_untouched_entries() {
        let out = compose(
            CompositeKind::Transform,
            "a(1) b(2)",
            &[update("a", "1")],
        );
        let list = FunctionList::parse(&out);
        assert_eq!(list.get("a"), Some("1"));
        assert_eq!(list.get("b"), Some("2"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_compose_removal() {
        let out = compose(
            CompositeKind::Transform,
            "a(1) b(2)",
            &[("a".to_string(), StyleValue::Unset)],
        );
        assert_eq!(out, "b(2)");

        let out = compose(CompositeKind::Filter, "blur(2px) sepia(1)", &[update("blur", "")]);
        assert_eq!(out, "sepia(1)");
    }

    #[test]
    fn test_compose_is_idempotent() {
        let once = compose(
            CompositeKind::Transform,
            "rotate(10deg) translateX(5px)",
            &[update("translateX", 20.0), update("scale", 2.0)],
        );
        assert_eq!(once, "rotate(10deg) translateX(20px) scale(2)");
        assert_eq!(FunctionList::parse(&once).to_string(), once);
        assert_eq!(compose(CompositeKind::Transform, &once, &[]), once);
    }

    #[test]
    fn test_default_units_applied_to_numbers() {
        let out = compose(
            CompositeKind::Filter,
            "",
            &[
                update("blur", 4.0),
                update("grayscale", 50.0),
                update("hue-rotate", "90"),
                update("brightness", 1.2),
            ],
        );
        assert_eq!(out, "blur(4px) grayscale(50%) hue-rotate(90deg) brightness(1.2)");
    }

    #[test]
    fn test_foreign_tokens_preserved() {
        let out = compose(
            CompositeKind::Filter,
            "url(#f) weird blur(1px)",
            &[update("blur", 2.0)],
        );
        assert_eq!(out, "url(#f) weird blur(2px)");
    }

    fn batch_on(initial: &str, writes: &[(&str, StyleValue)]) -> String {
        let node = crate::surface::MemoryNode::new("n")
            .with_property("transform", initial)
            .shared();
        let handle: NodeHandle = node.clone();
        let mut batch = StyleBatch::new();
        for (key, value) in writes {
            for target in crate::property::resolve(key).targets() {
                batch.push(&target, value.clone());
            }
        }
        batch.commit(&handle);
        let node = node.borrow();
        node.property("transform").unwrap_or_default().to_string()
    }

    #[test]
    fn test_direct_transform_merges_with_function_updates() {
        let out = batch_on(
            "scale(2)",
            &[("transform", "rotate(5deg)".into()), ("x", StyleValue::Number(10.0))],
        );
        assert_eq!(out, "scale(2) rotate(5deg) translateX(10px)");

        let replaced = batch_on("scale(2) rotate(1deg)", &[("transform", "rotate(5deg)".into())]);
        assert_eq!(replaced, "scale(2) rotate(5deg)");
    }

    #[test]
    fn test_direct_transform_none_resets() {
        let reset = batch_on(
            "scale(2)",
            &[("transform", "none".into()), ("x", StyleValue::Number(4.0))],
        );
        assert_eq!(reset, "translateX(4px)");

        let cleared = batch_on("scale(2)", &[("transform", "none".into())]);
        assert_eq!(cleared, "none");
    }

    #[test]
    fn test_compose_args() {
        let args = compose_args(&[StyleValue::Number(10.0), "50%".into(), StyleValue::Unset], "px");
        assert_eq!(args, "10px, 50%");
    }
}
