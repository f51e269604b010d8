//! The node property surface the engine reads from and writes to.
//!
//! Hosts implement [`StyleSurface`] for their node type and hand the engine
//! shared handles. [`MemoryNode`] is a self-contained implementation for
//! headless use.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::compose::{FunctionList, StyleBatch};
use crate::property::{self, PropertyTarget};
use crate::types::NodeKey;
use crate::value::{Rgba, StyleValue, parse_css_color};

/// Read/write access to a node's styles.
pub trait StyleSurface {
    /// Current computed value of a property. Composite properties are read
    /// as `transform` and `filter`.
    fn get_property(&self, name: &str) -> Option<String>;

    /// Write several properties at once. An empty value clears the property.
    fn set_properties(&mut self, batch: &[(String, String)]);

    /// Colour grammar of the rendering engine.
    fn parse_color(&self, value: &str) -> Option<Rgba> {
        parse_css_color(value)
    }
}

/// Shared handle to a node.
pub type NodeHandle = Rc<RefCell<dyn StyleSurface>>;

/// Identity key of a node handle.
pub fn node_key(node: &NodeHandle) -> NodeKey {
    NodeKey(Rc::as_ptr(node) as *const () as usize)
}

/// Current text of a write target: the property value for direct targets,
/// the function argument for composite ones.
pub fn current_text(surface: &dyn StyleSurface, target: &PropertyTarget) -> Option<String> {
    match target.composite {
        None => surface.get_property(&target.name),
        Some(kind) => {
            let composite = surface.get_property(kind.property_name())?;
            FunctionList::parse(&composite)
                .get(&target.name)
                .map(str::to_string)
        }
    }
}

/// Resolve and write properties immediately, without animating.
pub fn apply_styles(node: &NodeHandle, properties: &[(String, StyleValue)]) {
    let mut batch = StyleBatch::new();
    for (key, value) in properties {
        for target in property::resolve(key).targets() {
            batch.push(&target, value.clone());
        }
    }
    batch.commit(node);
}

/// In-memory node with an ordered property map.
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    label: String,
    properties: IndexMap<String, String>,
    writes: usize,
}

impl MemoryNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Builder-style initial property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Wrap into a shared cell. Clone the result into a [`NodeHandle`] to
    /// hand it to the scheduler while keeping typed access.
    pub fn shared(self) -> Rc<RefCell<MemoryNode>> {
        Rc::new(RefCell::new(self))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Leading number of a property value.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(crate::value::parse_leading_float)
    }

    /// Leading number of a function inside a composite property.
    pub fn function_number(&self, composite: &str, function: &str) -> Option<f64> {
        let list = FunctionList::parse(self.property(composite)?);
        list.get(function).and_then(crate::value::parse_leading_float)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of batched writes received.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl StyleSurface for MemoryNode {
    fn get_property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn set_properties(&mut self, batch: &[(String, String)]) {
        self.writes += 1;
        for (name, value) in batch {
            if value.is_empty() {
                self.properties.shift_remove(name);
            } else {
                self.properties.insert(name.clone(), value.clone());
            }
        }
    }
}
